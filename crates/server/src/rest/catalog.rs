use axum::{
    extract::{Query, State},
    Json,
};
use sqlx::{Pool, Postgres};

use shared_types::{AppError, LawyerSearchParams, LegalService, UserResponse};

use crate::repo;

/// GET /services — active practice areas (public).
#[utoipa::path(
    get,
    path = "/services",
    responses(
        (status = 200, description = "Active legal services", body = Vec<LegalService>)
    ),
    tag = "catalog"
)]
pub async fn list_services(
    State(pool): State<Pool<Postgres>>,
) -> Result<Json<Vec<LegalService>>, AppError> {
    Ok(Json(repo::legal_service::list(&pool, true).await?))
}

/// GET /lawyers — approved lawyer directory (public).
#[utoipa::path(
    get,
    path = "/lawyers",
    responses(
        (status = 200, description = "Approved lawyers", body = Vec<UserResponse>)
    ),
    tag = "catalog"
)]
pub async fn list_lawyers(
    State(pool): State<Pool<Postgres>>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let (lawyers, _) = repo::user::list(&pool, Some("lawyer"), Some("approved"), None, 1, 100).await?;

    let mut out = Vec::with_capacity(lawyers.len());
    for lawyer in lawyers {
        let mut response = UserResponse::from(lawyer);
        response.specializations = repo::user::specializations_for(&pool, response.id).await?;
        out.push(response);
    }
    Ok(Json(out))
}

/// GET /lawyers/search — directory search by name or practice area.
#[utoipa::path(
    get,
    path = "/lawyers/search",
    params(LawyerSearchParams),
    responses(
        (status = 200, description = "Matching lawyers", body = Vec<UserResponse>)
    ),
    tag = "catalog"
)]
pub async fn search_lawyers(
    State(pool): State<Pool<Postgres>>,
    Query(params): Query<LawyerSearchParams>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let (lawyers, _) = repo::user::list(
        &pool,
        Some("lawyer"),
        Some("approved"),
        params.q.as_deref(),
        1,
        50,
    )
    .await?;

    let mut out = Vec::new();
    for lawyer in lawyers {
        let specializations = repo::user::specializations_for(&pool, lawyer.id).await?;
        if let Some(service) = params.service {
            if !specializations.iter().any(|s| s.id == service) {
                continue;
            }
        }
        let mut response = UserResponse::from(lawyer);
        response.specializations = specializations;
        out.push(response);
    }
    Ok(Json(out))
}
