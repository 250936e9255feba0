use shared_types::AppError;
use std::path::{Path, PathBuf};

/// File extensions accepted for document and chat uploads.
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "txt", "pdf", "png", "jpg", "jpeg", "gif", "doc", "docx", "xls", "xlsx",
];

/// Whether a filename carries an accepted extension.
pub fn allowed_file(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| ALLOWED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Strip path separators and control characters from a client-supplied
/// filename so it cannot escape the uploads directory.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_matches(['.', '_']);
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Write uploaded bytes under the uploads directory with the given
/// (already prefixed) filename. Returns the stored relative path.
pub async fn store_upload(filename: &str, bytes: &[u8]) -> Result<String, AppError> {
    let dir = crate::config::uploads_dir();
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::internal(format!("Failed to create uploads dir: {e}")))?;

    let path = PathBuf::from(&dir).join(filename);
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| AppError::internal(format!("Failed to store upload: {e}")))?;

    Ok(path.to_string_lossy().into_owned())
}

/// Read a stored file back; 404 when it is gone from disk.
pub async fn read_stored(file_path: &str) -> Result<Vec<u8>, AppError> {
    tokio::fs::read(file_path)
        .await
        .map_err(|_| AppError::not_found("File not found"))
}
