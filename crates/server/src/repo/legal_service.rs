use shared_types::{
    AppError, CreateLegalServiceRequest, LegalService, UpdateLegalServiceRequest,
};
use sqlx::{Pool, Postgres};

use crate::error_convert::SqlxErrorExt;

/// List services, optionally restricted to active ones.
pub async fn list(pool: &Pool<Postgres>, active_only: bool) -> Result<Vec<LegalService>, AppError> {
    sqlx::query_as::<_, LegalService>(
        r#"
        SELECT id, name, description, icon, is_active, created_at
        FROM legal_services
        WHERE (NOT $1 OR is_active = TRUE)
        ORDER BY name
        "#,
    )
    .bind(active_only)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

pub async fn find_by_id(pool: &Pool<Postgres>, id: i32) -> Result<Option<LegalService>, AppError> {
    sqlx::query_as::<_, LegalService>(
        r#"
        SELECT id, name, description, icon, is_active, created_at
        FROM legal_services
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

pub async fn create(
    pool: &Pool<Postgres>,
    req: CreateLegalServiceRequest,
) -> Result<LegalService, AppError> {
    sqlx::query_as::<_, LegalService>(
        r#"
        INSERT INTO legal_services (name, description, icon)
        VALUES ($1, $2, $3)
        RETURNING id, name, description, icon, is_active, created_at
        "#,
    )
    .bind(&req.name)
    .bind(&req.description)
    .bind(&req.icon)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Update only the provided fields. Returns the updated row or None.
pub async fn update(
    pool: &Pool<Postgres>,
    id: i32,
    req: UpdateLegalServiceRequest,
) -> Result<Option<LegalService>, AppError> {
    sqlx::query_as::<_, LegalService>(
        r#"
        UPDATE legal_services SET
            name        = COALESCE($2, name),
            description = COALESCE($3, description),
            icon        = COALESCE($4, icon),
            is_active   = COALESCE($5, is_active)
        WHERE id = $1
        RETURNING id, name, description, icon, is_active, created_at
        "#,
    )
    .bind(id)
    .bind(&req.name)
    .bind(&req.description)
    .bind(&req.icon)
    .bind(req.is_active)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}
