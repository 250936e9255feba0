use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use shared_types::{
    AppError, CreateNotificationRequest, NotificationListParams, NotificationResponse,
    UnreadCountResponse,
};

use crate::auth::extractors::{AuthRequired, RoleRequired, ADMIN};
use crate::repo;

/// GET /notification/ — the caller's notifications, newest first.
#[utoipa::path(
    get,
    path = "/notification/",
    params(NotificationListParams),
    responses(
        (status = 200, description = "Notifications", body = Vec<NotificationResponse>)
    ),
    tag = "notifications"
)]
pub async fn list_notifications(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
    Query(params): Query<NotificationListParams>,
) -> Result<Json<Vec<NotificationResponse>>, AppError> {
    let notifications = repo::notification::list(
        &pool,
        claims.sub,
        params.unread_only.unwrap_or(false),
        params.limit,
    )
    .await?;

    Ok(Json(
        notifications
            .into_iter()
            .map(NotificationResponse::from)
            .collect(),
    ))
}

/// GET /notification/unread-count
#[utoipa::path(
    get,
    path = "/notification/unread-count",
    responses(
        (status = 200, description = "Unread count", body = UnreadCountResponse)
    ),
    tag = "notifications"
)]
pub async fn unread_count(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
) -> Result<Json<UnreadCountResponse>, AppError> {
    let count = repo::notification::unread_count(&pool, claims.sub).await?;
    Ok(Json(UnreadCountResponse { count }))
}

/// GET /notification/{id} — marks the notice read on view.
#[utoipa::path(
    get,
    path = "/notification/{id}",
    params(("id" = Uuid, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification", body = NotificationResponse),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "notifications"
)]
pub async fn get_notification(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
    Path(id): Path<Uuid>,
) -> Result<Json<NotificationResponse>, AppError> {
    let notification = repo::notification::find_for_recipient(&pool, id, claims.sub)
        .await?
        .ok_or_else(|| AppError::not_found("Notification not found"))?;

    if !notification.is_read {
        repo::notification::mark_read(&pool, id, claims.sub).await?;
    }

    let mut response = NotificationResponse::from(notification);
    response.is_read = true;
    if let Some(case_id) = response.related_case_id {
        response.case = repo::notification::case_ref(&pool, case_id).await?;
    }

    Ok(Json(response))
}

/// PATCH /notification/{id}/read
#[utoipa::path(
    patch,
    path = "/notification/{id}/read",
    params(("id" = Uuid, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Marked read"),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "notifications"
)]
pub async fn mark_read(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !repo::notification::mark_read(&pool, id, claims.sub).await? {
        return Err(AppError::not_found("Notification not found"));
    }
    Ok(Json(
        serde_json::json!({ "success": "Notification marked as read" }),
    ))
}

/// PATCH /notification/mark-all-read — idempotent bulk read-marking.
#[utoipa::path(
    patch,
    path = "/notification/mark-all-read",
    responses(
        (status = 200, description = "Count of notifications affected")
    ),
    tag = "notifications"
)]
pub async fn mark_all_read(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
) -> Result<Json<serde_json::Value>, AppError> {
    let count = repo::notification::mark_all_read(&pool, claims.sub).await?;
    Ok(Json(serde_json::json!({
        "success": "All notifications marked as read",
        "count": count,
    })))
}

/// POST /notification/ — admin-originated manual notice.
#[utoipa::path(
    post,
    path = "/notification/",
    request_body = CreateNotificationRequest,
    responses(
        (status = 201, description = "Notification created"),
        (status = 404, description = "Recipient not found", body = AppError)
    ),
    tag = "notifications"
)]
pub async fn create_notification(
    State(pool): State<Pool<Postgres>>,
    RoleRequired(_claims): RoleRequired<ADMIN>,
    Json(body): Json<CreateNotificationRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    if body.title.trim().is_empty() || body.message.trim().is_empty() {
        return Err(AppError::bad_request(
            "Recipient ID, type, title, and message are required",
        ));
    }

    repo::user::find_by_id(&pool, body.recipient_id)
        .await?
        .ok_or_else(|| AppError::not_found("Recipient not found"))?;

    let notification = repo::notification::create(
        &pool,
        body.recipient_id,
        &body.notification_type,
        &body.title,
        &body.message,
        body.related_case_id,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": "Notification created successfully",
            "notification_id": notification.id,
        })),
    ))
}

/// DELETE /notification/{id}
#[utoipa::path(
    delete,
    path = "/notification/{id}",
    params(("id" = Uuid, Path, description = "Notification id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "notifications"
)]
pub async fn delete_notification(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if repo::notification::delete(&pool, id, claims.sub).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Notification not found"))
    }
}
