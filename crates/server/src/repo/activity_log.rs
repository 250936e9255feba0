use shared_types::{ActivityLog, AppError};
use sqlx::{PgExecutor, Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;

/// Record an admin/audit action on the caller's executor so the entry
/// commits or rolls back with the action it describes.
pub async fn insert<'e, E>(
    db: E,
    user_id: Uuid,
    action: &str,
    description: &str,
    ip_address: Option<String>,
    user_agent: Option<String>,
) -> Result<(), AppError>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO activity_logs (user_id, action, description, ip_address, user_agent)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(user_id)
    .bind(action)
    .bind(description)
    .bind(ip_address)
    .bind(user_agent)
    .execute(db)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(())
}

/// Paginated audit trail, newest first. Returns (entries, total_count).
pub async fn list(
    pool: &Pool<Postgres>,
    user_id: Option<Uuid>,
    action: Option<&str>,
    page: i64,
    per_page: i64,
) -> Result<(Vec<ActivityLog>, i64), AppError> {
    let offset = (page - 1).max(0) * per_page;

    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM activity_logs
        WHERE ($1::UUID IS NULL OR user_id = $1)
          AND ($2::TEXT IS NULL OR action = $2)
        "#,
    )
    .bind(user_id)
    .bind(action)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    let entries = sqlx::query_as::<_, ActivityLog>(
        r#"
        SELECT id, user_id, action, description, ip_address, user_agent, created_at
        FROM activity_logs
        WHERE ($1::UUID IS NULL OR user_id = $1)
          AND ($2::TEXT IS NULL OR action = $2)
        ORDER BY created_at DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(user_id)
    .bind(action)
    .bind(per_page)
    .bind(offset)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok((entries, total))
}
