use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use shared_types::{
    AdminListParams, AppError, PaginatedResponse, RegisterUserRequest, UpdateUserRequest,
    UserResponse, UserRole,
};

use crate::auth::extractors::{AuthRequired, RoleRequired, ADMIN};
use crate::auth::password;
use crate::error_convert::ValidateRequest;
use crate::repo;
use crate::rest::current_user;

/// POST /user/ — public registration for clients and lawyers.
#[utoipa::path(
    post,
    path = "/user/",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 409, description = "Username or email taken", body = AppError),
        (status = 422, description = "Validation failed", body = AppError)
    ),
    tag = "users"
)]
pub async fn register_user(
    State(pool): State<Pool<Postgres>>,
    Json(body): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    body.validate_request()?;

    let role = match body.role.as_str() {
        "client" => UserRole::Client,
        "lawyer" => UserRole::Lawyer,
        other => {
            return Err(AppError::bad_request(format!(
                "Invalid role: {}. Valid values: client, lawyer",
                other
            )))
        }
    };

    let password_hash = password::hash_password(&body.password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

    let user = repo::user::create(&pool, body, password_hash, role).await?;
    tracing::info!(user_id = %user.id, role = %user.role, "account registered");

    let mut response = UserResponse::from(user);
    if role == UserRole::Lawyer {
        response.specializations = repo::user::specializations_for(&pool, response.id).await?;
    }

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /user/ — admin listing with filters and pagination.
#[utoipa::path(
    get,
    path = "/user/",
    params(AdminListParams),
    responses(
        (status = 200, description = "Accounts", body = PaginatedResponse<UserResponse>),
        (status = 403, description = "Admin only", body = AppError)
    ),
    tag = "users"
)]
pub async fn list_users(
    State(pool): State<Pool<Postgres>>,
    RoleRequired(_claims): RoleRequired<ADMIN>,
    Query(params): Query<AdminListParams>,
) -> Result<Json<PaginatedResponse<UserResponse>>, AppError> {
    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(15).clamp(1, 100);

    let (users, total) = repo::user::list(
        &pool,
        None,
        params.approval_status.as_deref(),
        params.search.as_deref(),
        page,
        per_page,
    )
    .await?;

    let data = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(PaginatedResponse::new(data, page, per_page, total)))
}

/// GET /user/pending-lawyers — lawyers awaiting moderation.
#[utoipa::path(
    get,
    path = "/user/pending-lawyers",
    responses(
        (status = 200, description = "Pending lawyers", body = Vec<UserResponse>),
        (status = 403, description = "Admin only", body = AppError)
    ),
    tag = "users"
)]
pub async fn list_pending_lawyers(
    State(pool): State<Pool<Postgres>>,
    RoleRequired(_claims): RoleRequired<ADMIN>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let lawyers = repo::user::pending_lawyers(&pool).await?;
    Ok(Json(lawyers.into_iter().map(UserResponse::from).collect()))
}

/// GET /user/{id} — own profile, or any profile for admins.
#[utoipa::path(
    get,
    path = "/user/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "Account", body = UserResponse),
        (status = 403, description = "Not your profile", body = AppError),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "users"
)]
pub async fn get_user(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    let me = current_user(&pool, &claims).await?;
    if me.id != id && me.role != "admin" {
        return Err(AppError::forbidden("Access denied"));
    }

    let user = repo::user::find_by_id(&pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let mut response = UserResponse::from(user);
    if response.role == "lawyer" {
        response.specializations = repo::user::specializations_for(&pool, id).await?;
    }
    Ok(Json(response))
}

/// PATCH /user/{id} — self-service or admin profile update.
#[utoipa::path(
    patch,
    path = "/user/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated account", body = UserResponse),
        (status = 403, description = "Not your profile", body = AppError),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "users"
)]
pub async fn update_user(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let me = current_user(&pool, &claims).await?;
    if me.id != id && me.role != "admin" {
        return Err(AppError::forbidden("Access denied"));
    }

    let user = repo::user::update(&pool, id, body)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let mut response = UserResponse::from(user);
    if response.role == "lawyer" {
        response.specializations = repo::user::specializations_for(&pool, id).await?;
    }
    Ok(Json(response))
}

/// DELETE /user/{id} — admin only; cascades to the account's cases.
#[utoipa::path(
    delete,
    path = "/user/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "users"
)]
pub async fn delete_user(
    State(pool): State<Pool<Postgres>>,
    RoleRequired(_claims): RoleRequired<ADMIN>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if repo::user::delete(&pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("User not found"))
    }
}
