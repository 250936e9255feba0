use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use shared_types::{AppError, Case, Document, DocumentRow, User};

use crate::auth::extractors::AuthRequired;
use crate::auth::jwt::Claims;
use crate::repo;
use crate::rest::current_user;
use crate::storage;

/// Load the case and require the caller to be a party on it (or admin).
async fn case_for_party(
    pool: &Pool<Postgres>,
    claims: &Claims,
    case_id: Uuid,
) -> Result<(Case, User), AppError> {
    let user = current_user(pool, claims).await?;

    let case = repo::case::find_by_id(pool, case_id)
        .await?
        .ok_or_else(|| AppError::not_found("Case not found"))?;

    match user.role.as_str() {
        "client" if case.client_id != user.id => Err(AppError::forbidden("Access denied")),
        "lawyer" if case.lawyer_id != Some(user.id) => Err(AppError::forbidden("Access denied")),
        _ => Ok((case, user)),
    }
}

/// POST /document/upload/{case_id} — multipart upload of one file with
/// its metadata fields (title, document_type, description,
/// is_confidential).
#[utoipa::path(
    post,
    path = "/document/upload/{case_id}",
    params(("case_id" = Uuid, Path, description = "Case id")),
    responses(
        (status = 201, description = "Stored document", body = Document),
        (status = 400, description = "Missing file or disallowed type", body = AppError),
        (status = 403, description = "Not a party on this case", body = AppError)
    ),
    tag = "documents"
)]
pub async fn upload_document(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
    Path(case_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Document>), AppError> {
    let (case, user) = case_for_party(&pool, &claims, case_id).await?;

    let mut title: Option<String> = None;
    let mut document_type: Option<String> = None;
    let mut description: Option<String> = None;
    let mut is_confidential = false;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("Invalid multipart field: {e}")))?
    {
        match field.name() {
            Some("title") => {
                title = Some(field.text().await.map_err(|e| {
                    AppError::bad_request(format!("Invalid title field: {e}"))
                })?)
            }
            Some("document_type") => {
                document_type = Some(field.text().await.map_err(|e| {
                    AppError::bad_request(format!("Invalid document_type field: {e}"))
                })?)
            }
            Some("description") => {
                description = Some(field.text().await.map_err(|e| {
                    AppError::bad_request(format!("Invalid description field: {e}"))
                })?)
            }
            Some("is_confidential") => {
                let text = field.text().await.map_err(|e| {
                    AppError::bad_request(format!("Invalid is_confidential field: {e}"))
                })?;
                is_confidential = matches!(text.as_str(), "true" | "1" | "yes");
            }
            Some("file") => {
                let filename = field.file_name().unwrap_or("document").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::bad_request(format!("Invalid file field: {e}")))?;
                file = Some((filename, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let (filename, bytes) = file.ok_or_else(|| AppError::bad_request("No file selected"))?;
    if !storage::allowed_file(&filename) {
        return Err(AppError::bad_request("File type not allowed"));
    }

    let title = title
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| filename.clone());
    let document_type = document_type
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "legal_document".to_string());

    let stored_name = format!(
        "{}_{}",
        chrono::Utc::now().format("%Y%m%d_%H%M%S"),
        storage::sanitize_filename(&filename)
    );
    let file_path = storage::store_upload(&stored_name, &bytes).await?;

    let document = repo::document::insert(
        &pool,
        case.id,
        user.id,
        &title,
        &document_type,
        &file_path,
        description,
        is_confidential,
    )
    .await?;
    tracing::info!(document_id = %document.id, case_id = %case.id, "document uploaded");

    Ok((StatusCode::CREATED, Json(document)))
}

/// GET /document/case/{case_id} — case attachments, newest first.
#[utoipa::path(
    get,
    path = "/document/case/{case_id}",
    params(("case_id" = Uuid, Path, description = "Case id")),
    responses(
        (status = 200, description = "Documents", body = Vec<DocumentRow>),
        (status = 403, description = "Not a party on this case", body = AppError)
    ),
    tag = "documents"
)]
pub async fn list_case_documents(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
    Path(case_id): Path<Uuid>,
) -> Result<Json<Vec<DocumentRow>>, AppError> {
    let (case, _user) = case_for_party(&pool, &claims, case_id).await?;
    Ok(Json(repo::document::list_rows_by_case(&pool, case.id).await?))
}

/// GET /document/{id}/download — stream the stored file back.
#[utoipa::path(
    get,
    path = "/document/{id}/download",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "File contents"),
        (status = 403, description = "Not a party on this case", body = AppError),
        (status = 404, description = "Document or file missing", body = AppError)
    ),
    tag = "documents"
)]
pub async fn download_document(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let document = repo::document::find_by_id(&pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Document not found"))?;

    // Party check runs against the owning case.
    let _ = case_for_party(&pool, &claims, document.case_id).await?;

    let bytes = storage::read_stored(&document.file_path).await?;
    let disposition = format!("attachment; filename=\"{}\"", document.title);

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// DELETE /document/{id} — uploader or admin.
#[utoipa::path(
    delete,
    path = "/document/{id}",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not the uploader", body = AppError),
        (status = 404, description = "Document not found", body = AppError)
    ),
    tag = "documents"
)]
pub async fn delete_document(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let user = current_user(&pool, &claims).await?;

    let document = repo::document::find_by_id(&pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Document not found"))?;

    if document.uploaded_by_id != user.id && user.role != "admin" {
        return Err(AppError::forbidden("Access denied"));
    }

    repo::document::delete(&pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
