use shared_types::{AppError, CaseRef, Notification};
use sqlx::{PgExecutor, Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;

/// Insert an unread notification row on the caller's executor.
///
/// Runs on whatever executor the caller passes — inside a transaction
/// this makes the notice commit or roll back together with the event
/// that triggered it. Never commits independently.
pub async fn notify<'e, E>(
    db: E,
    recipient_id: Uuid,
    notification_type: &str,
    title: &str,
    message: &str,
    related_case_id: Option<Uuid>,
) -> Result<(), AppError>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO notifications (recipient_id, notification_type, title, message, related_case_id)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(recipient_id)
    .bind(notification_type)
    .bind(title)
    .bind(message)
    .bind(related_case_id)
    .execute(db)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(())
}

/// Create a notification and return the row (admin-originated notices).
pub async fn create(
    pool: &Pool<Postgres>,
    recipient_id: Uuid,
    notification_type: &str,
    title: &str,
    message: &str,
    related_case_id: Option<Uuid>,
) -> Result<Notification, AppError> {
    sqlx::query_as::<_, Notification>(
        r#"
        INSERT INTO notifications (recipient_id, notification_type, title, message, related_case_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, recipient_id, notification_type, title, message,
                  is_read, related_case_id, created_at
        "#,
    )
    .bind(recipient_id)
    .bind(notification_type)
    .bind(title)
    .bind(message)
    .bind(related_case_id)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// List a recipient's notifications, newest first.
pub async fn list(
    pool: &Pool<Postgres>,
    recipient_id: Uuid,
    unread_only: bool,
    limit: Option<i64>,
) -> Result<Vec<Notification>, AppError> {
    sqlx::query_as::<_, Notification>(
        r#"
        SELECT id, recipient_id, notification_type, title, message,
               is_read, related_case_id, created_at
        FROM notifications
        WHERE recipient_id = $1
          AND (NOT $2 OR is_read = FALSE)
        ORDER BY created_at DESC
        LIMIT $3
        "#,
    )
    .bind(recipient_id)
    .bind(unread_only)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Find one notification owned by the recipient.
pub async fn find_for_recipient(
    pool: &Pool<Postgres>,
    id: Uuid,
    recipient_id: Uuid,
) -> Result<Option<Notification>, AppError> {
    sqlx::query_as::<_, Notification>(
        r#"
        SELECT id, recipient_id, notification_type, title, message,
               is_read, related_case_id, created_at
        FROM notifications
        WHERE id = $1 AND recipient_id = $2
        "#,
    )
    .bind(id)
    .bind(recipient_id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Count of unread notifications for a recipient.
pub async fn unread_count(pool: &Pool<Postgres>, recipient_id: Uuid) -> Result<i64, AppError> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND is_read = FALSE",
    )
    .bind(recipient_id)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Mark one notification read. Returns false when it does not exist or
/// belongs to someone else.
pub async fn mark_read(
    pool: &Pool<Postgres>,
    id: Uuid,
    recipient_id: Uuid,
) -> Result<bool, AppError> {
    let result = sqlx::query(
        "UPDATE notifications SET is_read = TRUE WHERE id = $1 AND recipient_id = $2",
    )
    .bind(id)
    .bind(recipient_id)
    .execute(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(result.rows_affected() > 0)
}

/// Mark every unread notification read; returns the number affected.
/// Idempotent — a second call affects zero rows.
pub async fn mark_all_read(pool: &Pool<Postgres>, recipient_id: Uuid) -> Result<u64, AppError> {
    let result = sqlx::query(
        "UPDATE notifications SET is_read = TRUE WHERE recipient_id = $1 AND is_read = FALSE",
    )
    .bind(recipient_id)
    .execute(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(result.rows_affected())
}

/// Delete one notification owned by the recipient.
pub async fn delete(pool: &Pool<Postgres>, id: Uuid, recipient_id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND recipient_id = $2")
        .bind(id)
        .bind(recipient_id)
        .execute(pool)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;

    Ok(result.rows_affected() > 0)
}

/// Compact case reference for embedding in a notification response.
pub async fn case_ref(pool: &Pool<Postgres>, case_id: Uuid) -> Result<Option<CaseRef>, AppError> {
    let row = sqlx::query_as::<_, (Uuid, String, String)>(
        "SELECT id, title, case_number FROM cases WHERE id = $1",
    )
    .bind(case_id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row.map(|(id, title, case_number)| CaseRef {
        id,
        title,
        case_number,
    }))
}
