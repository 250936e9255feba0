use shared_types::{AppError, Case, Chat, ChatRow, User};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;
use crate::repo::notification;

/// Persist a chat message and the notification for the other party —
/// one transaction. The live-channel publish happens after commit, in
/// the handler.
pub async fn send(
    pool: &Pool<Postgres>,
    case: &Case,
    sender: &User,
    message: &str,
    attachment: Option<String>,
) -> Result<Chat, AppError> {
    let mut tx = pool.begin().await.map_err(SqlxErrorExt::into_app_error)?;

    let chat = sqlx::query_as::<_, Chat>(
        r#"
        INSERT INTO chats (case_id, sender_id, message, attachment)
        VALUES ($1, $2, $3, $4)
        RETURNING id, case_id, sender_id, message, attachment, is_read, created_at
        "#,
    )
    .bind(case.id)
    .bind(sender.id)
    .bind(message)
    .bind(&attachment)
    .fetch_one(&mut *tx)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    // The other party: lawyer when the client writes, client otherwise.
    let recipient = if sender.id == case.client_id {
        case.lawyer_id
    } else {
        Some(case.client_id)
    };

    if let Some(recipient_id) = recipient {
        notification::notify(
            &mut *tx,
            recipient_id,
            "new_message",
            "New Message",
            &format!("You have a new message in case \"{}\"", case.title),
            Some(case.id),
        )
        .await?;
    }

    tx.commit().await.map_err(SqlxErrorExt::into_app_error)?;
    Ok(chat)
}

/// Full case history in chronological order.
pub async fn list_rows_by_case(
    pool: &Pool<Postgres>,
    case_id: Uuid,
) -> Result<Vec<ChatRow>, AppError> {
    sqlx::query_as::<_, ChatRow>(
        r#"
        SELECT ch.id, ch.case_id, ch.sender_id, ch.message, ch.attachment,
               ch.is_read, ch.created_at,
               u.first_name || ' ' || u.last_name AS sender_name
        FROM chats ch
        JOIN users u ON u.id = ch.sender_id
        WHERE ch.case_id = $1
        ORDER BY ch.created_at ASC
        "#,
    )
    .bind(case_id)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Flip unread incoming messages to read when the recipient opens the
/// thread. Returns the number of messages affected.
pub async fn mark_read(
    pool: &Pool<Postgres>,
    case_id: Uuid,
    reader_id: Uuid,
) -> Result<u64, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE chats SET is_read = TRUE
        WHERE case_id = $1 AND sender_id <> $2 AND is_read = FALSE
        "#,
    )
    .bind(case_id)
    .bind(reader_id)
    .execute(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(result.rows_affected())
}

/// Messages not sent by me and not yet marked read.
pub async fn unread_count(
    pool: &Pool<Postgres>,
    case_id: Uuid,
    reader_id: Uuid,
) -> Result<i64, AppError> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM chats
        WHERE case_id = $1 AND sender_id <> $2 AND is_read = FALSE
        "#,
    )
    .bind(case_id)
    .bind(reader_id)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}
