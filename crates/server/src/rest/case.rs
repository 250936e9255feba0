use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use shared_types::{
    is_valid_case_priority, is_valid_case_status, AppError, AvailableCaseResponse,
    CaseDetailResponse, CaseListRow, CaseStatsResponse, CreateCaseRequest, CreatedCaseResponse,
    PartySummary, SearchParams, ServiceSummary, UpdateCaseStatusRequest, User,
    CaseListParams, CASE_PRIORITIES, CASE_STATUSES,
};

use crate::auth::extractors::AuthRequired;
use crate::error_convert::ValidateRequest;
use crate::repo;
use crate::rest::current_user;

/// Scope a query to the caller: clients see their own cases, lawyers
/// their assignments, admins everything.
fn scope(user: &User) -> (Option<Uuid>, Option<Uuid>) {
    match user.role.as_str() {
        "client" => (Some(user.id), None),
        "lawyer" => (None, Some(user.id)),
        _ => (None, None),
    }
}

/// POST /case/ — clients open a new case.
#[utoipa::path(
    post,
    path = "/case/",
    request_body = CreateCaseRequest,
    responses(
        (status = 201, description = "Case created", body = CreatedCaseResponse),
        (status = 400, description = "Invalid service or fields", body = AppError),
        (status = 403, description = "Clients only", body = AppError)
    ),
    tag = "cases"
)]
pub async fn create_case(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
    Json(body): Json<CreateCaseRequest>,
) -> Result<(StatusCode, Json<CreatedCaseResponse>), AppError> {
    let user = current_user(&pool, &claims).await?;
    if user.role != "client" {
        return Err(AppError::forbidden("Only clients can create cases"));
    }

    body.validate_request()?;

    if let Some(ref priority) = body.priority {
        if !is_valid_case_priority(priority) {
            return Err(AppError::bad_request(format!(
                "Invalid priority: {}. Valid values: {}",
                priority,
                CASE_PRIORITIES.join(", ")
            )));
        }
    }

    let service = repo::legal_service::find_by_id(&pool, body.legal_service_id).await?;
    match service {
        Some(s) if s.is_active => {}
        _ => return Err(AppError::bad_request("Invalid legal service")),
    }

    let case = repo::case::create(&pool, &user, body).await?;
    tracing::info!(case_id = %case.id, case_number = %case.case_number, "case created");

    Ok((
        StatusCode::CREATED,
        Json(CreatedCaseResponse {
            case_id: case.id,
            case_number: case.case_number,
        }),
    ))
}

/// GET /case/ — role-scoped listing with filters.
#[utoipa::path(
    get,
    path = "/case/",
    params(CaseListParams),
    responses(
        (status = 200, description = "Cases", body = Vec<CaseListRow>)
    ),
    tag = "cases"
)]
pub async fn list_cases(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
    Query(params): Query<CaseListParams>,
) -> Result<Json<Vec<CaseListRow>>, AppError> {
    let user = current_user(&pool, &claims).await?;
    let (client_id, lawyer_id) = scope(&user);

    let rows = repo::case::list_rows(
        &pool,
        client_id,
        lawyer_id,
        params.status.as_deref(),
        params.priority.as_deref(),
        params.service,
        params.limit,
    )
    .await?;

    Ok(Json(rows))
}

/// GET /case/{id} — full detail for a party on the case or an admin.
#[utoipa::path(
    get,
    path = "/case/{id}",
    params(("id" = Uuid, Path, description = "Case id")),
    responses(
        (status = 200, description = "Case detail", body = CaseDetailResponse),
        (status = 403, description = "Not a party on this case", body = AppError),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "cases"
)]
pub async fn get_case(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
    Path(id): Path<Uuid>,
) -> Result<Json<CaseDetailResponse>, AppError> {
    let user = current_user(&pool, &claims).await?;

    let case = repo::case::find_by_id(&pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Case not found"))?;

    match user.role.as_str() {
        "client" if case.client_id != user.id => {
            return Err(AppError::forbidden("Access denied"))
        }
        "lawyer" if case.lawyer_id != Some(user.id) => {
            return Err(AppError::forbidden("Access denied"))
        }
        _ => {}
    }

    let client = repo::user::find_by_id(&pool, case.client_id)
        .await?
        .ok_or_else(|| AppError::not_found("Client not found"))?;

    let lawyer = match case.lawyer_id {
        Some(lawyer_id) => repo::user::find_by_id(&pool, lawyer_id).await?,
        None => None,
    };

    let service = repo::legal_service::find_by_id(&pool, case.legal_service_id)
        .await?
        .ok_or_else(|| AppError::not_found("Legal service not found"))?;

    let documents = repo::document::list_rows_by_case(&pool, case.id).await?;

    // Bids are visible to the case's client and to admins only.
    let lawyer_requests = if user.role == "client" || user.role == "admin" {
        repo::lawyer_request::list_rows_by_case(&pool, case.id).await?
    } else {
        Vec::new()
    };

    Ok(Json(CaseDetailResponse {
        id: case.id,
        case_number: case.case_number,
        title: case.title,
        description: case.description,
        status: case.status,
        priority: case.priority,
        budget: case.budget,
        deadline: case.deadline,
        created_at: case.created_at,
        updated_at: case.updated_at,
        assigned_at: case.assigned_at,
        resolved_at: case.resolved_at,
        client: PartySummary {
            id: client.id,
            name: client.full_name(),
            email: client.email,
        },
        lawyer: lawyer.map(|l| PartySummary {
            id: l.id,
            name: l.full_name(),
            email: l.email,
        }),
        legal_service: ServiceSummary {
            id: service.id,
            name: service.name,
        },
        documents,
        lawyer_requests,
    }))
}

/// PATCH /case/{id}/status — assigned lawyer or admin.
#[utoipa::path(
    patch,
    path = "/case/{id}/status",
    params(("id" = Uuid, Path, description = "Case id")),
    request_body = UpdateCaseStatusRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 400, description = "Invalid status", body = AppError),
        (status = 403, description = "Not the assigned lawyer", body = AppError),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "cases"
)]
pub async fn update_case_status(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateCaseStatusRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = current_user(&pool, &claims).await?;

    let case = repo::case::find_by_id(&pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Case not found"))?;

    match user.role.as_str() {
        "lawyer" if case.lawyer_id != Some(user.id) => {
            return Err(AppError::forbidden("Access denied"))
        }
        "lawyer" | "admin" => {}
        _ => {
            return Err(AppError::forbidden(
                "Only lawyers and admins can update case status",
            ))
        }
    }

    if !is_valid_case_status(&body.status) {
        return Err(AppError::bad_request(format!(
            "Invalid status: {}. Valid values: {}",
            body.status,
            CASE_STATUSES.join(", ")
        )));
    }

    let updated = repo::case::update_status(&pool, &case, &body.status).await?;
    tracing::info!(case_id = %updated.id, status = %updated.status, "case status updated");

    Ok(Json(
        serde_json::json!({ "success": "Case status updated successfully" }),
    ))
}

/// GET /case/search — role-scoped search over title and case number.
#[utoipa::path(
    get,
    path = "/case/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching cases", body = Vec<CaseListRow>)
    ),
    tag = "cases"
)]
pub async fn search_cases(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<CaseListRow>>, AppError> {
    let q = params.q.unwrap_or_default();
    if q.len() < 2 {
        return Ok(Json(Vec::new()));
    }

    let user = current_user(&pool, &claims).await?;
    let (client_id, lawyer_id) = scope(&user);

    Ok(Json(
        repo::case::search_rows(&pool, client_id, lawyer_id, &q).await?,
    ))
}

/// GET /case/available — open cases in the lawyer's practice areas.
#[utoipa::path(
    get,
    path = "/case/available",
    params(CaseListParams),
    responses(
        (status = 200, description = "Open cases matching specializations", body = Vec<AvailableCaseResponse>),
        (status = 403, description = "Approved lawyers only", body = AppError)
    ),
    tag = "cases"
)]
pub async fn available_cases(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
    Query(params): Query<CaseListParams>,
) -> Result<Json<Vec<AvailableCaseResponse>>, AppError> {
    let user = current_user(&pool, &claims).await?;
    if user.role != "lawyer" {
        return Err(AppError::forbidden("Only lawyers can view available cases"));
    }
    if user.approval_status != "approved" {
        return Err(AppError::forbidden("Lawyer account not approved"));
    }

    let limit = params.limit.unwrap_or(20).clamp(1, 100);
    let rows = repo::case::available_for_lawyer(
        &pool,
        user.id,
        params.priority.as_deref(),
        params.service,
        limit,
    )
    .await?;
    let requested = repo::case::requested_case_ids(&pool, user.id).await?;

    let out = rows
        .into_iter()
        .map(|row| {
            let description = if row.description.len() > 200 {
                let mut end = 200;
                while !row.description.is_char_boundary(end) {
                    end -= 1;
                }
                format!("{}...", &row.description[..end])
            } else {
                row.description.clone()
            };
            AvailableCaseResponse {
                id: row.id,
                case_number: row.case_number,
                title: row.title,
                description,
                priority: row.priority,
                budget: row.budget,
                deadline: row.deadline,
                created_at: row.created_at,
                client_name: row.client_name,
                legal_service: row.service_name,
                already_requested: requested.contains(&row.id),
            }
        })
        .collect();

    Ok(Json(out))
}

/// GET /case/stats — per-role counts by status.
#[utoipa::path(
    get,
    path = "/case/stats",
    responses(
        (status = 200, description = "Case counts", body = CaseStatsResponse)
    ),
    tag = "cases"
)]
pub async fn case_stats(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
) -> Result<Json<CaseStatsResponse>, AppError> {
    let user = current_user(&pool, &claims).await?;
    let (client_id, lawyer_id) = scope(&user);
    Ok(Json(repo::case::stats(&pool, client_id, lawyer_id).await?))
}
