use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use shared_types::{
    ActivityLog, AdminListParams, AppError, AssignLawyersRequest, AssignLawyersResponse,
    CaseListParams, CaseListRow, CreateLegalServiceRequest, LegalService, PaginatedResponse,
    RejectLawyerRequest, ToggleActiveRequest, TransactionRow, UpdateLegalServiceRequest,
    UserResponse,
};

use crate::auth::extractors::{RequestMeta, RoleRequired, ADMIN};
use crate::error_convert::ValidateRequest;
use crate::repo;

/// GET /admin/lawyers — lawyer roster with approval/search filters.
#[utoipa::path(
    get,
    path = "/admin/lawyers",
    params(AdminListParams),
    responses(
        (status = 200, description = "Lawyers", body = PaginatedResponse<UserResponse>),
        (status = 403, description = "Admin only", body = AppError)
    ),
    tag = "admin"
)]
pub async fn list_lawyers(
    State(pool): State<Pool<Postgres>>,
    RoleRequired(_claims): RoleRequired<ADMIN>,
    Query(params): Query<AdminListParams>,
) -> Result<Json<PaginatedResponse<UserResponse>>, AppError> {
    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(15).clamp(1, 100);

    let (lawyers, total) = repo::user::list(
        &pool,
        Some("lawyer"),
        params.approval_status.as_deref(),
        params.search.as_deref(),
        page,
        per_page,
    )
    .await?;

    let data = lawyers.into_iter().map(UserResponse::from).collect();
    Ok(Json(PaginatedResponse::new(data, page, per_page, total)))
}

/// POST /admin/lawyers/{id}/approve
#[utoipa::path(
    post,
    path = "/admin/lawyers/{id}/approve",
    params(("id" = Uuid, Path, description = "Lawyer id")),
    responses(
        (status = 200, description = "Lawyer approved"),
        (status = 400, description = "Already processed", body = AppError),
        (status = 404, description = "Lawyer not found", body = AppError)
    ),
    tag = "admin"
)]
pub async fn approve_lawyer(
    State(pool): State<Pool<Postgres>>,
    RoleRequired(claims): RoleRequired<ADMIN>,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let lawyer = repo::user::find_by_id(&pool, id)
        .await?
        .filter(|u| u.role == "lawyer")
        .ok_or_else(|| AppError::not_found("Lawyer not found"))?;

    let updated = repo::user::approve_lawyer(
        &pool,
        claims.sub,
        &lawyer,
        meta.ip_address,
        meta.user_agent,
    )
    .await?;
    tracing::info!(lawyer_id = %updated.id, "lawyer approved");

    Ok(Json(serde_json::json!({
        "success": "Lawyer approved successfully",
        "lawyer_id": updated.id,
        "approval_status": updated.approval_status,
    })))
}

/// POST /admin/lawyers/{id}/reject
#[utoipa::path(
    post,
    path = "/admin/lawyers/{id}/reject",
    params(("id" = Uuid, Path, description = "Lawyer id")),
    request_body = RejectLawyerRequest,
    responses(
        (status = 200, description = "Lawyer rejected"),
        (status = 400, description = "Already processed", body = AppError),
        (status = 404, description = "Lawyer not found", body = AppError)
    ),
    tag = "admin"
)]
pub async fn reject_lawyer(
    State(pool): State<Pool<Postgres>>,
    RoleRequired(claims): RoleRequired<ADMIN>,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
    body: Option<Json<RejectLawyerRequest>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let lawyer = repo::user::find_by_id(&pool, id)
        .await?
        .filter(|u| u.role == "lawyer")
        .ok_or_else(|| AppError::not_found("Lawyer not found"))?;

    let reason = body
        .and_then(|Json(b)| b.rejection_reason)
        .unwrap_or_else(|| "Application did not meet our requirements".to_string());

    let updated = repo::user::reject_lawyer(
        &pool,
        claims.sub,
        &lawyer,
        &reason,
        meta.ip_address,
        meta.user_agent,
    )
    .await?;
    tracing::info!(lawyer_id = %updated.id, "lawyer rejected");

    Ok(Json(serde_json::json!({
        "success": "Lawyer rejected successfully",
        "lawyer_id": updated.id,
        "approval_status": updated.approval_status,
        "rejection_reason": reason,
    })))
}

/// GET /admin/cases — every case on the platform.
#[utoipa::path(
    get,
    path = "/admin/cases",
    params(CaseListParams),
    responses(
        (status = 200, description = "Cases", body = Vec<CaseListRow>),
        (status = 403, description = "Admin only", body = AppError)
    ),
    tag = "admin"
)]
pub async fn list_cases(
    State(pool): State<Pool<Postgres>>,
    RoleRequired(_claims): RoleRequired<ADMIN>,
    Query(params): Query<CaseListParams>,
) -> Result<Json<Vec<CaseListRow>>, AppError> {
    let rows = repo::case::list_rows(
        &pool,
        None,
        None,
        params.status.as_deref(),
        params.priority.as_deref(),
        params.service,
        params.limit,
    )
    .await?;
    Ok(Json(rows))
}

/// POST /admin/cases/{id}/assign-lawyers — direct assignment, bypassing
/// the request flow. Per-id validation errors are collected rather than
/// failing the call; valid assignments commit.
#[utoipa::path(
    post,
    path = "/admin/cases/{id}/assign-lawyers",
    params(("id" = Uuid, Path, description = "Case id")),
    request_body = AssignLawyersRequest,
    responses(
        (status = 200, description = "Assignment outcome", body = AssignLawyersResponse),
        (status = 400, description = "No lawyer ids given", body = AppError),
        (status = 404, description = "Case not found", body = AppError)
    ),
    tag = "admin"
)]
pub async fn assign_lawyers(
    State(pool): State<Pool<Postgres>>,
    RoleRequired(_claims): RoleRequired<ADMIN>,
    Path(id): Path<Uuid>,
    Json(body): Json<AssignLawyersRequest>,
) -> Result<Json<AssignLawyersResponse>, AppError> {
    if body.lawyer_ids.is_empty() {
        return Err(AppError::bad_request("lawyer_ids must not be empty"));
    }

    let outcome =
        repo::case::assign_lawyers(&pool, id, &body.lawyer_ids, body.message.as_deref())
            .await?
            .ok_or_else(|| AppError::not_found("Case not found"))?;

    tracing::info!(
        case_id = %id,
        assigned = outcome.assigned_lawyers.len(),
        errors = outcome.errors.len(),
        "admin assignment"
    );

    Ok(Json(outcome))
}

/// PATCH /admin/users/{id}/active — suspend or restore an account.
#[utoipa::path(
    patch,
    path = "/admin/users/{id}/active",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = ToggleActiveRequest,
    responses(
        (status = 200, description = "Updated account", body = UserResponse),
        (status = 404, description = "User not found", body = AppError)
    ),
    tag = "admin"
)]
pub async fn toggle_user_active(
    State(pool): State<Pool<Postgres>>,
    RoleRequired(_claims): RoleRequired<ADMIN>,
    Path(id): Path<Uuid>,
    Json(body): Json<ToggleActiveRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user = repo::user::set_active(&pool, id, body.is_active)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(UserResponse::from(user)))
}

/// POST /admin/services — add a practice area to the catalog.
#[utoipa::path(
    post,
    path = "/admin/services",
    request_body = CreateLegalServiceRequest,
    responses(
        (status = 201, description = "Service created", body = LegalService),
        (status = 422, description = "Validation failed", body = AppError)
    ),
    tag = "admin"
)]
pub async fn create_service(
    State(pool): State<Pool<Postgres>>,
    RoleRequired(_claims): RoleRequired<ADMIN>,
    Json(body): Json<CreateLegalServiceRequest>,
) -> Result<(StatusCode, Json<LegalService>), AppError> {
    body.validate_request()?;
    let service = repo::legal_service::create(&pool, body).await?;
    Ok((StatusCode::CREATED, Json(service)))
}

/// PATCH /admin/services/{id} — edit or deactivate a practice area.
#[utoipa::path(
    patch,
    path = "/admin/services/{id}",
    params(("id" = i32, Path, description = "Service id")),
    request_body = UpdateLegalServiceRequest,
    responses(
        (status = 200, description = "Updated service", body = LegalService),
        (status = 404, description = "Service not found", body = AppError)
    ),
    tag = "admin"
)]
pub async fn update_service(
    State(pool): State<Pool<Postgres>>,
    RoleRequired(_claims): RoleRequired<ADMIN>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateLegalServiceRequest>,
) -> Result<Json<LegalService>, AppError> {
    let service = repo::legal_service::update(&pool, id, body)
        .await?
        .ok_or_else(|| AppError::not_found("Legal service not found"))?;
    Ok(Json(service))
}

/// GET /admin/transactions — platform-wide payment records.
#[utoipa::path(
    get,
    path = "/admin/transactions",
    responses(
        (status = 200, description = "Transactions", body = Vec<TransactionRow>),
        (status = 403, description = "Admin only", body = AppError)
    ),
    tag = "admin"
)]
pub async fn list_transactions(
    State(pool): State<Pool<Postgres>>,
    RoleRequired(_claims): RoleRequired<ADMIN>,
) -> Result<Json<Vec<TransactionRow>>, AppError> {
    Ok(Json(
        repo::transaction::list_rows(&pool, None, None, None).await?,
    ))
}

/// GET /admin/activity-logs — paginated audit trail.
#[utoipa::path(
    get,
    path = "/admin/activity-logs",
    params(AdminListParams),
    responses(
        (status = 200, description = "Audit entries", body = PaginatedResponse<ActivityLog>),
        (status = 403, description = "Admin only", body = AppError)
    ),
    tag = "admin"
)]
pub async fn list_activity_logs(
    State(pool): State<Pool<Postgres>>,
    RoleRequired(_claims): RoleRequired<ADMIN>,
    Query(params): Query<AdminListParams>,
) -> Result<Json<PaginatedResponse<ActivityLog>>, AppError> {
    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(25).clamp(1, 100);

    let (entries, total) = repo::activity_log::list(&pool, None, None, page, per_page).await?;
    Ok(Json(PaginatedResponse::new(entries, page, per_page, total)))
}
