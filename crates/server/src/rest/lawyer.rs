use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use shared_types::{
    AppError, CreatedRequestResponse, LawyerRequestRow, RequestCaseRequest, RequestListParams,
    User,
};

use crate::auth::extractors::AuthRequired;
use crate::error_convert::SqlxErrorExt;
use crate::repo;
use crate::rest::current_user;

/// Load the caller and require an approved lawyer account.
async fn approved_lawyer(
    pool: &Pool<Postgres>,
    claims: &crate::auth::jwt::Claims,
) -> Result<User, AppError> {
    let user = current_user(pool, claims).await?;
    if user.role != "lawyer" {
        return Err(AppError::forbidden("Lawyer access required"));
    }
    if user.approval_status != "approved" {
        return Err(AppError::forbidden("Lawyer account not approved"));
    }
    Ok(user)
}

/// GET /lawyer/available-cases — alias of /case/available kept for the
/// lawyer-scoped prefix.
#[utoipa::path(
    get,
    path = "/lawyer/available-cases",
    responses(
        (status = 200, description = "Open cases matching specializations"),
        (status = 403, description = "Approved lawyers only", body = AppError)
    ),
    tag = "lawyer"
)]
pub async fn available_cases(
    state: State<Pool<Postgres>>,
    auth: AuthRequired,
    params: Query<shared_types::CaseListParams>,
) -> Result<Json<Vec<shared_types::AvailableCaseResponse>>, AppError> {
    crate::rest::case::available_cases(state, auth, params).await
}

/// POST /lawyer/cases/{id}/request — bid on an open case.
#[utoipa::path(
    post,
    path = "/lawyer/cases/{id}/request",
    params(("id" = Uuid, Path, description = "Case id")),
    request_body = RequestCaseRequest,
    responses(
        (status = 201, description = "Request filed", body = CreatedRequestResponse),
        (status = 400, description = "Case not open or duplicate request", body = AppError),
        (status = 403, description = "Approved lawyers only", body = AppError),
        (status = 404, description = "Case not found", body = AppError)
    ),
    tag = "lawyer"
)]
pub async fn request_case(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
    Path(id): Path<Uuid>,
    Json(body): Json<RequestCaseRequest>,
) -> Result<(StatusCode, Json<CreatedRequestResponse>), AppError> {
    let lawyer = approved_lawyer(&pool, &claims).await?;

    let case = repo::case::find_by_id(&pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Case not found"))?;

    if case.status != "open" {
        return Err(AppError::bad_request("Case is not open for requests"));
    }

    if repo::lawyer_request::exists(&pool, case.id, lawyer.id).await? {
        return Err(AppError::bad_request("You have already requested this case"));
    }

    let request = repo::lawyer_request::create(&pool, &case, &lawyer, body).await?;
    tracing::info!(case_id = %case.id, lawyer_id = %lawyer.id, "case requested");

    Ok((
        StatusCode::CREATED,
        Json(CreatedRequestResponse {
            request_id: request.id,
        }),
    ))
}

/// GET /lawyer/my-requests — the lawyer's own bids.
#[utoipa::path(
    get,
    path = "/lawyer/my-requests",
    params(RequestListParams),
    responses(
        (status = 200, description = "The lawyer's requests", body = Vec<LawyerRequestRow>),
        (status = 403, description = "Lawyers only", body = AppError)
    ),
    tag = "lawyer"
)]
pub async fn my_requests(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
    Query(params): Query<RequestListParams>,
) -> Result<Json<Vec<LawyerRequestRow>>, AppError> {
    let user = current_user(&pool, &claims).await?;
    if user.role != "lawyer" {
        return Err(AppError::forbidden("Lawyer access required"));
    }

    Ok(Json(
        repo::lawyer_request::list_rows_by_lawyer(&pool, user.id, params.status.as_deref())
            .await?,
    ))
}

/// GET /lawyer/stats — headline numbers for the lawyer's account.
#[utoipa::path(
    get,
    path = "/lawyer/stats",
    responses(
        (status = 200, description = "Lawyer statistics", body = serde_json::Value),
        (status = 403, description = "Lawyers only", body = AppError)
    ),
    tag = "lawyer"
)]
pub async fn lawyer_stats(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = current_user(&pool, &claims).await?;
    if user.role != "lawyer" {
        return Err(AppError::forbidden("Lawyer access required"));
    }

    let stats = repo::case::stats(&pool, None, Some(user.id)).await?;

    let pending_requests: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM lawyer_requests WHERE lawyer_id = $1 AND status = 'pending'",
    )
    .bind(user.id)
    .fetch_one(&pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    let total_earned: Option<f64> = sqlx::query_scalar(
        r#"
        SELECT SUM(amount)
        FROM transactions
        WHERE lawyer_id = $1 AND status = 'completed' AND transaction_type = 'payment'
        "#,
    )
    .bind(user.id)
    .fetch_one(&pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    let unread_notifications = repo::notification::unread_count(&pool, user.id).await?;

    Ok(Json(serde_json::json!({
        "total_cases": stats.total_cases,
        "active_cases": stats.active_cases,
        "resolved_cases": stats.resolved_cases,
        "pending_requests": pending_requests,
        "total_earned": total_earned.unwrap_or(0.0),
        "unread_notifications": unread_notifications,
    })))
}
