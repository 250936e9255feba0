use axum::{
    extract::{Path, State},
    Json,
};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use shared_types::{AppError, LawyerRequestRow};

use crate::auth::extractors::AuthRequired;
use crate::error_convert::SqlxErrorExt;
use crate::repo;
use crate::rest::current_user;

/// GET /client/lawyer-requests — pending bids across the client's cases.
#[utoipa::path(
    get,
    path = "/client/lawyer-requests",
    responses(
        (status = 200, description = "Pending requests", body = Vec<LawyerRequestRow>),
        (status = 403, description = "Clients only", body = AppError)
    ),
    tag = "client"
)]
pub async fn list_lawyer_requests(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
) -> Result<Json<Vec<LawyerRequestRow>>, AppError> {
    let user = current_user(&pool, &claims).await?;
    if user.role != "client" {
        return Err(AppError::forbidden("Client access required"));
    }

    Ok(Json(
        repo::lawyer_request::list_pending_rows_for_client(&pool, user.id).await?,
    ))
}

/// POST /client/lawyer-requests/{id}/accept
///
/// Accepting one bid atomically staffs the case and rejects every other
/// pending bid on it.
#[utoipa::path(
    post,
    path = "/client/lawyer-requests/{id}/accept",
    params(("id" = Uuid, Path, description = "Lawyer request id")),
    responses(
        (status = 200, description = "Request accepted, case assigned"),
        (status = 400, description = "Request already processed", body = AppError),
        (status = 403, description = "Not your case", body = AppError),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "client"
)]
pub async fn accept_lawyer_request(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = current_user(&pool, &claims).await?;
    if user.role != "client" {
        return Err(AppError::forbidden("Client access required"));
    }

    let request = repo::lawyer_request::find_by_id(&pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Lawyer request not found"))?;

    let case = repo::case::find_by_id(&pool, request.case_id)
        .await?
        .ok_or_else(|| AppError::not_found("Case not found"))?;
    if case.client_id != user.id {
        return Err(AppError::forbidden("Access denied"));
    }

    let case = repo::lawyer_request::accept(&pool, &request, &user).await?;
    tracing::info!(
        case_id = %case.id,
        lawyer_id = ?case.lawyer_id,
        "lawyer request accepted"
    );

    Ok(Json(
        serde_json::json!({ "success": "Lawyer request accepted successfully" }),
    ))
}

/// POST /client/lawyer-requests/{id}/reject — decline a single bid.
#[utoipa::path(
    post,
    path = "/client/lawyer-requests/{id}/reject",
    params(("id" = Uuid, Path, description = "Lawyer request id")),
    responses(
        (status = 200, description = "Request rejected"),
        (status = 400, description = "Request already processed", body = AppError),
        (status = 403, description = "Not your case", body = AppError),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "client"
)]
pub async fn reject_lawyer_request(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = current_user(&pool, &claims).await?;
    if user.role != "client" {
        return Err(AppError::forbidden("Client access required"));
    }

    let request = repo::lawyer_request::find_by_id(&pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Lawyer request not found"))?;

    let case = repo::case::find_by_id(&pool, request.case_id)
        .await?
        .ok_or_else(|| AppError::not_found("Case not found"))?;
    if case.client_id != user.id {
        return Err(AppError::forbidden("Access denied"));
    }

    repo::lawyer_request::reject(&pool, &request, &case.title).await?;

    Ok(Json(
        serde_json::json!({ "success": "Lawyer request rejected" }),
    ))
}

/// GET /client/stats — headline numbers for the client's account.
#[utoipa::path(
    get,
    path = "/client/stats",
    responses(
        (status = 200, description = "Client statistics", body = serde_json::Value),
        (status = 403, description = "Clients only", body = AppError)
    ),
    tag = "client"
)]
pub async fn client_stats(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = current_user(&pool, &claims).await?;
    if user.role != "client" {
        return Err(AppError::forbidden("Client access required"));
    }

    let stats = repo::case::stats(&pool, Some(user.id), None).await?;

    let total_spent: Option<f64> = sqlx::query_scalar(
        r#"
        SELECT SUM(amount)
        FROM transactions
        WHERE client_id = $1 AND status = 'completed'
        "#,
    )
    .bind(user.id)
    .fetch_one(&pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    let pending_requests: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM lawyer_requests lr
        JOIN cases c ON c.id = lr.case_id
        WHERE c.client_id = $1 AND lr.status = 'pending'
        "#,
    )
    .bind(user.id)
    .fetch_one(&pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    let unread_notifications = repo::notification::unread_count(&pool, user.id).await?;

    Ok(Json(serde_json::json!({
        "total_cases": stats.total_cases,
        "active_cases": stats.open_cases + stats.active_cases,
        "resolved_cases": stats.resolved_cases,
        "total_spent": total_spent.unwrap_or(0.0),
        "pending_requests": pending_requests,
        "unread_notifications": unread_notifications,
    })))
}
