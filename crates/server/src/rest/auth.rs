use axum::{extract::State, Json};
use sqlx::{Pool, Postgres};

use shared_types::{
    AppError, ChangePasswordRequest, LoginRequest, LoginResponse, UserResponse,
};

use crate::auth::extractors::{AuthRequired, RequestMeta};
use crate::auth::{jwt, password};
use crate::error_convert::ValidateRequest;
use crate::repo;
use crate::rest::current_user;

/// POST /auth/login
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = AppError)
    ),
    tag = "auth"
)]
pub async fn login(
    State(pool): State<Pool<Postgres>>,
    meta: RequestMeta,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = repo::user::find_by_email(&pool, &body.email)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid email or password"))?;

    let valid = password::verify_password(&body.password, &user.password_hash)
        .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;
    if !valid {
        return Err(AppError::unauthorized("Invalid email or password"));
    }

    if !user.is_active {
        return Err(AppError::forbidden("Account is deactivated"));
    }

    let access_token = jwt::create_access_token(user.id, &user.email, &user.role)
        .map_err(|e| AppError::internal(format!("Token creation failed: {e}")))?;

    repo::activity_log::insert(
        &pool,
        user.id,
        "login",
        &format!("{} logged in", user.full_name()),
        meta.ip_address,
        meta.user_agent,
    )
    .await?;

    tracing::info!(user_id = %user.id, role = %user.role, "login");

    Ok(Json(LoginResponse {
        access_token,
        user: UserResponse::from(user),
    }))
}

/// GET /auth/current_user
#[utoipa::path(
    get,
    path = "/auth/current_user",
    responses(
        (status = 200, description = "Current account", body = UserResponse),
        (status = 401, description = "Not authenticated", body = AppError)
    ),
    tag = "auth"
)]
pub async fn fetch_current_user(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
) -> Result<Json<UserResponse>, AppError> {
    let user = current_user(&pool, &claims).await?;
    let mut response = UserResponse::from(user);
    if response.role == "lawyer" {
        response.specializations = repo::user::specializations_for(&pool, response.id).await?;
    }
    Ok(Json(response))
}

/// PATCH /auth/change_password
#[utoipa::path(
    patch,
    path = "/auth/change_password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 401, description = "Wrong current password", body = AppError)
    ),
    tag = "auth"
)]
pub async fn change_password(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    body.validate_request()?;

    let user = current_user(&pool, &claims).await?;

    let valid = password::verify_password(&body.old_password, &user.password_hash)
        .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;
    if !valid {
        return Err(AppError::unauthorized("Current password is incorrect"));
    }

    let new_hash = password::hash_password(&body.new_password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;
    repo::user::set_password(&pool, user.id, &new_hash).await?;

    Ok(Json(
        serde_json::json!({ "success": "Password changed successfully" }),
    ))
}
