use shared_types::{AppError, Document, DocumentRow};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;

pub async fn insert(
    pool: &Pool<Postgres>,
    case_id: Uuid,
    uploaded_by_id: Uuid,
    title: &str,
    document_type: &str,
    file_path: &str,
    description: Option<String>,
    is_confidential: bool,
) -> Result<Document, AppError> {
    sqlx::query_as::<_, Document>(
        r#"
        INSERT INTO documents
            (case_id, uploaded_by_id, title, document_type, file_path,
             description, is_confidential)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, case_id, uploaded_by_id, title, document_type, file_path,
                  description, is_confidential, created_at
        "#,
    )
    .bind(case_id)
    .bind(uploaded_by_id)
    .bind(title)
    .bind(document_type)
    .bind(file_path)
    .bind(description)
    .bind(is_confidential)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

pub async fn find_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<Document>, AppError> {
    sqlx::query_as::<_, Document>(
        r#"
        SELECT id, case_id, uploaded_by_id, title, document_type, file_path,
               description, is_confidential, created_at
        FROM documents
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Case attachments, newest first.
pub async fn list_rows_by_case(
    pool: &Pool<Postgres>,
    case_id: Uuid,
) -> Result<Vec<DocumentRow>, AppError> {
    sqlx::query_as::<_, DocumentRow>(
        r#"
        SELECT d.id, d.case_id, d.uploaded_by_id, d.title, d.document_type,
               d.file_path, d.description, d.is_confidential, d.created_at,
               u.first_name || ' ' || u.last_name AS uploaded_by
        FROM documents d
        JOIN users u ON u.id = d.uploaded_by_id
        WHERE d.case_id = $1
        ORDER BY d.created_at DESC
        "#,
    )
    .bind(case_id)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

pub async fn delete(pool: &Pool<Postgres>, id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM documents WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;
    Ok(result.rows_affected() > 0)
}
