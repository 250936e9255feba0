use shared_types::{
    default_approval_status, AppError, RegisterUserRequest, ServiceSummary, UpdateUserRequest,
    User, UserRole,
};
use sqlx::{PgConnection, Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;
use crate::repo::{activity_log, notification};

/// Insert a new account together with its specialization set.
/// Approval status follows the role-derivation rule unless the caller
/// passed one explicitly.
pub async fn create(
    pool: &Pool<Postgres>,
    req: RegisterUserRequest,
    password_hash: String,
    role: UserRole,
) -> Result<User, AppError> {
    let mut tx = pool.begin().await.map_err(SqlxErrorExt::into_app_error)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users
            (username, email, password_hash, first_name, last_name, role,
             phone, address, years_of_experience, education, bio, hourly_rate,
             approval_status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING id, username, email, password_hash, first_name, last_name, role,
                  phone, address, is_active, years_of_experience, education, bio,
                  hourly_rate, approval_status, created_at
        "#,
    )
    .bind(&req.username)
    .bind(&req.email)
    .bind(&password_hash)
    .bind(&req.first_name)
    .bind(&req.last_name)
    .bind(role.as_str())
    .bind(&req.phone)
    .bind(&req.address)
    .bind(req.years_of_experience)
    .bind(&req.education)
    .bind(&req.bio)
    .bind(req.hourly_rate)
    .bind(default_approval_status(role))
    .fetch_one(&mut *tx)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    if role == UserRole::Lawyer && !req.specializations.is_empty() {
        replace_specializations(&mut tx, user.id, &req.specializations).await?;
    }

    tx.commit().await.map_err(SqlxErrorExt::into_app_error)?;
    Ok(user)
}

pub async fn find_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<User>, AppError> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password_hash, first_name, last_name, role,
               phone, address, is_active, years_of_experience, education, bio,
               hourly_rate, approval_status, created_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

pub async fn find_by_email(pool: &Pool<Postgres>, email: &str) -> Result<Option<User>, AppError> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password_hash, first_name, last_name, role,
               phone, address, is_active, years_of_experience, education, bio,
               hourly_rate, approval_status, created_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Update only the provided profile fields. Specializations, when
/// present, replace the existing set in the same transaction.
pub async fn update(
    pool: &Pool<Postgres>,
    id: Uuid,
    req: UpdateUserRequest,
) -> Result<Option<User>, AppError> {
    let mut tx = pool.begin().await.map_err(SqlxErrorExt::into_app_error)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET
            first_name          = COALESCE($2, first_name),
            last_name           = COALESCE($3, last_name),
            email               = COALESCE($4, email),
            phone               = COALESCE($5, phone),
            address             = COALESCE($6, address),
            years_of_experience = COALESCE($7, years_of_experience),
            education           = COALESCE($8, education),
            bio                 = COALESCE($9, bio),
            hourly_rate         = COALESCE($10, hourly_rate)
        WHERE id = $1
        RETURNING id, username, email, password_hash, first_name, last_name, role,
                  phone, address, is_active, years_of_experience, education, bio,
                  hourly_rate, approval_status, created_at
        "#,
    )
    .bind(id)
    .bind(&req.first_name)
    .bind(&req.last_name)
    .bind(&req.email)
    .bind(&req.phone)
    .bind(&req.address)
    .bind(req.years_of_experience)
    .bind(&req.education)
    .bind(&req.bio)
    .bind(req.hourly_rate)
    .fetch_optional(&mut *tx)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    let Some(user) = user else {
        return Ok(None);
    };

    if let Some(ref specializations) = req.specializations {
        replace_specializations(&mut tx, user.id, specializations).await?;
    }

    tx.commit().await.map_err(SqlxErrorExt::into_app_error)?;
    Ok(Some(user))
}

pub async fn set_password(
    pool: &Pool<Postgres>,
    id: Uuid,
    password_hash: &str,
) -> Result<(), AppError> {
    sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;
    Ok(())
}

pub async fn delete(pool: &Pool<Postgres>, id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;
    Ok(result.rows_affected() > 0)
}

pub async fn set_active(
    pool: &Pool<Postgres>,
    id: Uuid,
    is_active: bool,
) -> Result<Option<User>, AppError> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET is_active = $2
        WHERE id = $1
        RETURNING id, username, email, password_hash, first_name, last_name, role,
                  phone, address, is_active, years_of_experience, education, bio,
                  hourly_rate, approval_status, created_at
        "#,
    )
    .bind(id)
    .bind(is_active)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Paginated listing with role / approval / name-or-email filters.
/// Returns (users, total_count).
pub async fn list(
    pool: &Pool<Postgres>,
    role: Option<&str>,
    approval_status: Option<&str>,
    search: Option<&str>,
    page: i64,
    per_page: i64,
) -> Result<(Vec<User>, i64), AppError> {
    let pattern = search.map(|s| format!("%{}%", s));
    let offset = (page - 1).max(0) * per_page;

    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM users
        WHERE ($1::TEXT IS NULL OR role = $1)
          AND ($2::TEXT IS NULL OR approval_status = $2)
          AND ($3::TEXT IS NULL OR first_name ILIKE $3 OR last_name ILIKE $3
               OR username ILIKE $3 OR email ILIKE $3)
        "#,
    )
    .bind(role)
    .bind(approval_status)
    .bind(&pattern)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password_hash, first_name, last_name, role,
               phone, address, is_active, years_of_experience, education, bio,
               hourly_rate, approval_status, created_at
        FROM users
        WHERE ($1::TEXT IS NULL OR role = $1)
          AND ($2::TEXT IS NULL OR approval_status = $2)
          AND ($3::TEXT IS NULL OR first_name ILIKE $3 OR last_name ILIKE $3
               OR username ILIKE $3 OR email ILIKE $3)
        ORDER BY created_at DESC
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(role)
    .bind(approval_status)
    .bind(&pattern)
    .bind(per_page)
    .bind(offset)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok((users, total))
}

/// Lawyers still waiting on moderation, oldest first.
pub async fn pending_lawyers(pool: &Pool<Postgres>) -> Result<Vec<User>, AppError> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password_hash, first_name, last_name, role,
               phone, address, is_active, years_of_experience, education, bio,
               hourly_rate, approval_status, created_at
        FROM users
        WHERE role = 'lawyer' AND approval_status = 'pending'
        ORDER BY created_at ASC
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Approve a pending lawyer: flip the status, notify the lawyer, and
/// record the admin action — one transaction.
pub async fn approve_lawyer(
    pool: &Pool<Postgres>,
    admin_id: Uuid,
    lawyer: &User,
    ip_address: Option<String>,
    user_agent: Option<String>,
) -> Result<User, AppError> {
    let mut tx = pool.begin().await.map_err(SqlxErrorExt::into_app_error)?;

    let updated = sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET approval_status = 'approved'
        WHERE id = $1 AND role = 'lawyer' AND approval_status = 'pending'
        RETURNING id, username, email, password_hash, first_name, last_name, role,
                  phone, address, is_active, years_of_experience, education, bio,
                  hourly_rate, approval_status, created_at
        "#,
    )
    .bind(lawyer.id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(SqlxErrorExt::into_app_error)?
    .ok_or_else(|| AppError::bad_request("This lawyer has already been processed"))?;

    notification::notify(
        &mut *tx,
        lawyer.id,
        "lawyer_approved",
        "Account Approved",
        "Congratulations! Your lawyer account has been approved and you can now access the platform.",
        None,
    )
    .await?;

    activity_log::insert(
        &mut *tx,
        admin_id,
        "update",
        &format!("Approved lawyer registration for {}", lawyer.full_name()),
        ip_address,
        user_agent,
    )
    .await?;

    tx.commit().await.map_err(SqlxErrorExt::into_app_error)?;
    Ok(updated)
}

/// Reject a pending lawyer; mirrors `approve_lawyer`.
pub async fn reject_lawyer(
    pool: &Pool<Postgres>,
    admin_id: Uuid,
    lawyer: &User,
    reason: &str,
    ip_address: Option<String>,
    user_agent: Option<String>,
) -> Result<User, AppError> {
    let mut tx = pool.begin().await.map_err(SqlxErrorExt::into_app_error)?;

    let updated = sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET approval_status = 'rejected'
        WHERE id = $1 AND role = 'lawyer' AND approval_status = 'pending'
        RETURNING id, username, email, password_hash, first_name, last_name, role,
                  phone, address, is_active, years_of_experience, education, bio,
                  hourly_rate, approval_status, created_at
        "#,
    )
    .bind(lawyer.id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(SqlxErrorExt::into_app_error)?
    .ok_or_else(|| AppError::bad_request("This lawyer has already been processed"))?;

    notification::notify(
        &mut *tx,
        lawyer.id,
        "lawyer_rejected",
        "Account Application Rejected",
        &format!(
            "Your lawyer account application has been rejected. Reason: {}",
            reason
        ),
        None,
    )
    .await?;

    activity_log::insert(
        &mut *tx,
        admin_id,
        "update",
        &format!(
            "Rejected lawyer registration for {} - Reason: {}",
            lawyer.full_name(),
            reason
        ),
        ip_address,
        user_agent,
    )
    .await?;

    tx.commit().await.map_err(SqlxErrorExt::into_app_error)?;
    Ok(updated)
}

/// Services a lawyer practices in.
pub async fn specializations_for(
    pool: &Pool<Postgres>,
    user_id: Uuid,
) -> Result<Vec<ServiceSummary>, AppError> {
    let rows = sqlx::query_as::<_, (i32, String)>(
        r#"
        SELECT ls.id, ls.name
        FROM lawyer_specializations s
        JOIN legal_services ls ON ls.id = s.legal_service_id
        WHERE s.user_id = $1
        ORDER BY ls.name
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(rows
        .into_iter()
        .map(|(id, name)| ServiceSummary { id, name })
        .collect())
}

/// Replace a lawyer's specialization set inside the caller's transaction.
/// Unknown service ids fail the foreign key and roll the whole update back.
pub async fn replace_specializations(
    conn: &mut PgConnection,
    user_id: Uuid,
    service_ids: &[i32],
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM lawyer_specializations WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *conn)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;

    for service_id in service_ids {
        sqlx::query(
            r#"
            INSERT INTO lawyer_specializations (user_id, legal_service_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(service_id)
        .execute(&mut *conn)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;
    }

    Ok(())
}

/// First admin account by creation time; recipient of platform notices.
pub async fn first_admin(pool: &Pool<Postgres>) -> Result<Option<Uuid>, AppError> {
    sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM users WHERE role = 'admin' ORDER BY created_at ASC LIMIT 1",
    )
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}
