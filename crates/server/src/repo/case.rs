use rand::Rng;
use shared_types::{
    AppError, AssignLawyersResponse, Case, CaseListRow, CaseStatsResponse, CreateCaseRequest,
    User,
};
use sqlx::{Pool, Postgres};
use std::collections::HashSet;
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;
use crate::repo::notification;

/// Generate a case number: `CASE-YYYYMMDD-####` with a random suffix.
pub fn generate_case_number() -> String {
    let date = chrono::Utc::now().format("%Y%m%d");
    let suffix: u32 = rand::thread_rng().gen_range(0..10_000);
    format!("CASE-{}-{:04}", date, suffix)
}

/// "in_progress" -> "In Progress", for notification copy.
pub fn humanize_status(status: &str) -> String {
    status
        .split('_')
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Insert a new case and notify the first admin of the platform — one
/// transaction. Retries the generated number once on a collision.
pub async fn create(
    pool: &Pool<Postgres>,
    client: &User,
    req: CreateCaseRequest,
) -> Result<Case, AppError> {
    let priority = req.priority.as_deref().unwrap_or("medium");
    let deadline = req
        .deadline
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc());

    let mut tx = pool.begin().await.map_err(SqlxErrorExt::into_app_error)?;

    let mut case = None;
    for attempt in 0..2 {
        let case_number = generate_case_number();
        let inserted = sqlx::query_as::<_, Case>(
            r#"
            INSERT INTO cases
                (case_number, client_id, legal_service_id, title, description,
                 priority, budget, deadline)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (case_number) DO NOTHING
            RETURNING id, case_number, client_id, lawyer_id, legal_service_id,
                      title, description, priority, status, budget, deadline,
                      created_at, updated_at, assigned_at, resolved_at
            "#,
        )
        .bind(&case_number)
        .bind(client.id)
        .bind(req.legal_service_id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(priority)
        .bind(req.budget)
        .bind(deadline)
        .fetch_optional(&mut *tx)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;

        if let Some(inserted) = inserted {
            case = Some(inserted);
            break;
        }
        tracing::warn!(attempt, "case number collision, regenerating");
    }
    let case = case.ok_or_else(|| AppError::internal("Failed to generate a unique case number"))?;

    let admin = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM users WHERE role = 'admin' ORDER BY created_at ASC LIMIT 1",
    )
    .fetch_optional(&mut *tx)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    if let Some(admin_id) = admin {
        notification::notify(
            &mut *tx,
            admin_id,
            "case_status_update",
            "New Case Created",
            &format!(
                "A new case \"{}\" has been created by {}",
                case.title,
                client.full_name()
            ),
            Some(case.id),
        )
        .await?;
    }

    tx.commit().await.map_err(SqlxErrorExt::into_app_error)?;
    Ok(case)
}

pub async fn find_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<Case>, AppError> {
    sqlx::query_as::<_, Case>(
        r#"
        SELECT id, case_number, client_id, lawyer_id, legal_service_id,
               title, description, priority, status, budget, deadline,
               created_at, updated_at, assigned_at, resolved_at
        FROM cases
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Role-scoped listing with filters; `client_id`/`lawyer_id` of None
/// means "no restriction" (admin view).
pub async fn list_rows(
    pool: &Pool<Postgres>,
    client_id: Option<Uuid>,
    lawyer_id: Option<Uuid>,
    status: Option<&str>,
    priority: Option<&str>,
    service: Option<i32>,
    limit: Option<i64>,
) -> Result<Vec<CaseListRow>, AppError> {
    sqlx::query_as::<_, CaseListRow>(
        r#"
        SELECT c.id, c.case_number, c.client_id, c.lawyer_id, c.legal_service_id,
               c.title, c.description, c.priority, c.status, c.budget, c.deadline,
               c.created_at, c.updated_at, c.assigned_at, c.resolved_at,
               cl.first_name || ' ' || cl.last_name AS client_name,
               lw.first_name || ' ' || lw.last_name AS lawyer_name,
               ls.name AS service_name
        FROM cases c
        JOIN users cl ON cl.id = c.client_id
        LEFT JOIN users lw ON lw.id = c.lawyer_id
        JOIN legal_services ls ON ls.id = c.legal_service_id
        WHERE ($1::UUID IS NULL OR c.client_id = $1)
          AND ($2::UUID IS NULL OR c.lawyer_id = $2)
          AND ($3::TEXT IS NULL OR c.status = $3)
          AND ($4::TEXT IS NULL OR c.priority = $4)
          AND ($5::INT IS NULL OR c.legal_service_id = $5)
        ORDER BY c.created_at DESC
        LIMIT $6
        "#,
    )
    .bind(client_id)
    .bind(lawyer_id)
    .bind(status)
    .bind(priority)
    .bind(service)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

pub async fn find_row_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<CaseListRow>, AppError> {
    sqlx::query_as::<_, CaseListRow>(
        r#"
        SELECT c.id, c.case_number, c.client_id, c.lawyer_id, c.legal_service_id,
               c.title, c.description, c.priority, c.status, c.budget, c.deadline,
               c.created_at, c.updated_at, c.assigned_at, c.resolved_at,
               cl.first_name || ' ' || cl.last_name AS client_name,
               lw.first_name || ' ' || lw.last_name AS lawyer_name,
               ls.name AS service_name
        FROM cases c
        JOIN users cl ON cl.id = c.client_id
        LEFT JOIN users lw ON lw.id = c.lawyer_id
        JOIN legal_services ls ON ls.id = c.legal_service_id
        WHERE c.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Role-scoped search over title and case number.
pub async fn search_rows(
    pool: &Pool<Postgres>,
    client_id: Option<Uuid>,
    lawyer_id: Option<Uuid>,
    q: &str,
) -> Result<Vec<CaseListRow>, AppError> {
    let pattern = format!("%{}%", q);
    sqlx::query_as::<_, CaseListRow>(
        r#"
        SELECT c.id, c.case_number, c.client_id, c.lawyer_id, c.legal_service_id,
               c.title, c.description, c.priority, c.status, c.budget, c.deadline,
               c.created_at, c.updated_at, c.assigned_at, c.resolved_at,
               cl.first_name || ' ' || cl.last_name AS client_name,
               lw.first_name || ' ' || lw.last_name AS lawyer_name,
               ls.name AS service_name
        FROM cases c
        JOIN users cl ON cl.id = c.client_id
        LEFT JOIN users lw ON lw.id = c.lawyer_id
        JOIN legal_services ls ON ls.id = c.legal_service_id
        WHERE ($1::UUID IS NULL OR c.client_id = $1)
          AND ($2::UUID IS NULL OR c.lawyer_id = $2)
          AND (c.title ILIKE $3 OR c.case_number ILIKE $3)
        ORDER BY c.created_at DESC
        LIMIT 10
        "#,
    )
    .bind(client_id)
    .bind(lawyer_id)
    .bind(&pattern)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Open cases matching the lawyer's specialization set.
pub async fn available_for_lawyer(
    pool: &Pool<Postgres>,
    lawyer_id: Uuid,
    priority: Option<&str>,
    service: Option<i32>,
    limit: i64,
) -> Result<Vec<CaseListRow>, AppError> {
    sqlx::query_as::<_, CaseListRow>(
        r#"
        SELECT c.id, c.case_number, c.client_id, c.lawyer_id, c.legal_service_id,
               c.title, c.description, c.priority, c.status, c.budget, c.deadline,
               c.created_at, c.updated_at, c.assigned_at, c.resolved_at,
               cl.first_name || ' ' || cl.last_name AS client_name,
               lw.first_name || ' ' || lw.last_name AS lawyer_name,
               ls.name AS service_name
        FROM cases c
        JOIN users cl ON cl.id = c.client_id
        LEFT JOIN users lw ON lw.id = c.lawyer_id
        JOIN legal_services ls ON ls.id = c.legal_service_id
        WHERE c.status = 'open'
          AND c.legal_service_id IN
              (SELECT legal_service_id FROM lawyer_specializations WHERE user_id = $1)
          AND ($2::TEXT IS NULL OR c.priority = $2)
          AND ($3::INT IS NULL OR c.legal_service_id = $3)
        ORDER BY c.created_at DESC
        LIMIT $4
        "#,
    )
    .bind(lawyer_id)
    .bind(priority)
    .bind(service)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Case ids the lawyer has already bid on.
pub async fn requested_case_ids(
    pool: &Pool<Postgres>,
    lawyer_id: Uuid,
) -> Result<HashSet<Uuid>, AppError> {
    let ids = sqlx::query_scalar::<_, Uuid>(
        "SELECT case_id FROM lawyer_requests WHERE lawyer_id = $1",
    )
    .bind(lawyer_id)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(ids.into_iter().collect())
}

/// Per-status counts for the caller's scope.
pub async fn stats(
    pool: &Pool<Postgres>,
    client_id: Option<Uuid>,
    lawyer_id: Option<Uuid>,
) -> Result<CaseStatsResponse, AppError> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT status, COUNT(*)
        FROM cases
        WHERE ($1::UUID IS NULL OR client_id = $1)
          AND ($2::UUID IS NULL OR lawyer_id = $2)
        GROUP BY status
        "#,
    )
    .bind(client_id)
    .bind(lawyer_id)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    let mut out = CaseStatsResponse::default();
    for (status, count) in rows {
        out.total_cases += count;
        match status.as_str() {
            "open" => out.open_cases = count,
            "assigned" => out.assigned_cases = count,
            "in_progress" => out.in_progress_cases = count,
            "resolved" => out.resolved_cases = count,
            "closed" => out.closed_cases = count,
            "cancelled" => out.cancelled_cases = count,
            _ => {}
        }
    }
    out.active_cases = out.assigned_cases + out.in_progress_cases;
    Ok(out)
}

/// Move a case to a new status and notify the client — one transaction.
/// `resolved_at` is stamped only on the first entry into `resolved`.
pub async fn update_status(
    pool: &Pool<Postgres>,
    case: &Case,
    new_status: &str,
) -> Result<Case, AppError> {
    let mut tx = pool.begin().await.map_err(SqlxErrorExt::into_app_error)?;

    let updated = sqlx::query_as::<_, Case>(
        r#"
        UPDATE cases SET
            status = $2,
            updated_at = NOW(),
            resolved_at = CASE
                WHEN $2 = 'resolved' THEN COALESCE(resolved_at, NOW())
                ELSE resolved_at
            END
        WHERE id = $1
        RETURNING id, case_number, client_id, lawyer_id, legal_service_id,
                  title, description, priority, status, budget, deadline,
                  created_at, updated_at, assigned_at, resolved_at
        "#,
    )
    .bind(case.id)
    .bind(new_status)
    .fetch_one(&mut *tx)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    notification::notify(
        &mut *tx,
        updated.client_id,
        "case_status_update",
        "Case Status Updated",
        &format!(
            "Your case \"{}\" status has been updated to {}",
            updated.title,
            humanize_status(new_status)
        ),
        Some(updated.id),
    )
    .await?;

    tx.commit().await.map_err(SqlxErrorExt::into_app_error)?;
    Ok(updated)
}

/// Admin direct assignment, bypassing the request flow.
///
/// Locks the case row for the duration of the check-then-update so two
/// concurrent assignment calls serialize instead of interleaving. Each
/// candidate is validated independently; failures are collected as
/// per-id errors while valid assignments still commit. With several
/// valid ids the single lawyer_id column keeps the last one.
pub async fn assign_lawyers(
    pool: &Pool<Postgres>,
    case_id: Uuid,
    lawyer_ids: &[Uuid],
    message: Option<&str>,
) -> Result<Option<AssignLawyersResponse>, AppError> {
    let mut tx = pool.begin().await.map_err(SqlxErrorExt::into_app_error)?;

    let case = sqlx::query_as::<_, Case>(
        r#"
        SELECT id, case_number, client_id, lawyer_id, legal_service_id,
               title, description, priority, status, budget, deadline,
               created_at, updated_at, assigned_at, resolved_at
        FROM cases
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(case_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    let Some(case) = case else {
        return Ok(None);
    };

    let mut assigned = Vec::new();
    let mut errors = Vec::new();

    for &lawyer_id in lawyer_ids {
        let lawyer = sqlx::query_as::<_, (String, String, String)>(
            "SELECT role, approval_status, first_name || ' ' || last_name FROM users WHERE id = $1",
        )
        .bind(lawyer_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;

        let Some((role, approval_status, _name)) = lawyer else {
            errors.push(format!("Lawyer with ID {} not found", lawyer_id));
            continue;
        };
        if role != "lawyer" {
            errors.push(format!("User {} is not a lawyer", lawyer_id));
            continue;
        }
        if approval_status != "approved" {
            errors.push(format!("Lawyer {} is not approved", lawyer_id));
            continue;
        }

        sqlx::query(
            r#"
            UPDATE cases SET
                lawyer_id = $2,
                status = 'assigned',
                assigned_at = COALESCE(assigned_at, NOW()),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(case.id)
        .bind(lawyer_id)
        .execute(&mut *tx)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;

        let lawyer_message = message
            .map(str::to_owned)
            .unwrap_or_else(|| format!("You have been assigned to case \"{}\" by admin.", case.title));

        notification::notify(
            &mut *tx,
            lawyer_id,
            "case_assignment",
            "New Case Assignment",
            &lawyer_message,
            Some(case.id),
        )
        .await?;

        notification::notify(
            &mut *tx,
            case.client_id,
            "case_assignment",
            "Lawyer Assigned",
            &format!("A lawyer has been assigned to your case \"{}\"", case.title),
            Some(case.id),
        )
        .await?;

        assigned.push(lawyer_id);
    }

    tx.commit().await.map_err(SqlxErrorExt::into_app_error)?;

    Ok(Some(AssignLawyersResponse {
        assigned_lawyers: assigned,
        errors,
    }))
}
