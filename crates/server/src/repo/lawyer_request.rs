use shared_types::{AppError, Case, LawyerRequest, LawyerRequestRow, RequestCaseRequest, User};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;
use crate::repo::notification;

/// Whether this lawyer already has a request (any status) on the case.
pub async fn exists(
    pool: &Pool<Postgres>,
    case_id: Uuid,
    lawyer_id: Uuid,
) -> Result<bool, AppError> {
    let found = sqlx::query_scalar::<_, i32>(
        "SELECT 1 FROM lawyer_requests WHERE case_id = $1 AND lawyer_id = $2",
    )
    .bind(case_id)
    .bind(lawyer_id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(found.is_some())
}

/// File a pending bid and notify the case's client — one transaction.
/// The UNIQUE (case_id, lawyer_id) constraint backstops the duplicate
/// pre-check under concurrent submissions.
pub async fn create(
    pool: &Pool<Postgres>,
    case: &Case,
    lawyer: &User,
    req: RequestCaseRequest,
) -> Result<LawyerRequest, AppError> {
    let mut tx = pool.begin().await.map_err(SqlxErrorExt::into_app_error)?;

    let request = sqlx::query_as::<_, LawyerRequest>(
        r#"
        INSERT INTO lawyer_requests (case_id, lawyer_id, message, proposed_fee)
        VALUES ($1, $2, $3, $4)
        RETURNING id, case_id, lawyer_id, message, proposed_fee, status,
                  created_at, responded_at
        "#,
    )
    .bind(case.id)
    .bind(lawyer.id)
    .bind(&req.message)
    .bind(req.proposed_fee)
    .fetch_one(&mut *tx)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    notification::notify(
        &mut *tx,
        case.client_id,
        "case_request",
        "New Case Request",
        &format!(
            "Lawyer {} has requested to handle your case \"{}\"",
            lawyer.full_name(),
            case.title
        ),
        Some(case.id),
    )
    .await?;

    tx.commit().await.map_err(SqlxErrorExt::into_app_error)?;
    Ok(request)
}

pub async fn find_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<LawyerRequest>, AppError> {
    sqlx::query_as::<_, LawyerRequest>(
        r#"
        SELECT id, case_id, lawyer_id, message, proposed_fee, status,
               created_at, responded_at
        FROM lawyer_requests
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// A lawyer's own bids, optionally filtered by status, newest first.
pub async fn list_rows_by_lawyer(
    pool: &Pool<Postgres>,
    lawyer_id: Uuid,
    status: Option<&str>,
) -> Result<Vec<LawyerRequestRow>, AppError> {
    sqlx::query_as::<_, LawyerRequestRow>(
        r#"
        SELECT lr.id, lr.case_id, lr.lawyer_id, lr.message, lr.proposed_fee,
               lr.status, lr.created_at, lr.responded_at,
               u.first_name || ' ' || u.last_name AS lawyer_name,
               c.title AS case_title,
               c.case_number
        FROM lawyer_requests lr
        JOIN users u ON u.id = lr.lawyer_id
        JOIN cases c ON c.id = lr.case_id
        WHERE lr.lawyer_id = $1
          AND ($2::TEXT IS NULL OR lr.status = $2)
        ORDER BY lr.created_at DESC
        "#,
    )
    .bind(lawyer_id)
    .bind(status)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// All bids received on one case, newest first.
pub async fn list_rows_by_case(
    pool: &Pool<Postgres>,
    case_id: Uuid,
) -> Result<Vec<LawyerRequestRow>, AppError> {
    sqlx::query_as::<_, LawyerRequestRow>(
        r#"
        SELECT lr.id, lr.case_id, lr.lawyer_id, lr.message, lr.proposed_fee,
               lr.status, lr.created_at, lr.responded_at,
               u.first_name || ' ' || u.last_name AS lawyer_name,
               c.title AS case_title,
               c.case_number
        FROM lawyer_requests lr
        JOIN users u ON u.id = lr.lawyer_id
        JOIN cases c ON c.id = lr.case_id
        WHERE lr.case_id = $1
        ORDER BY lr.created_at DESC
        "#,
    )
    .bind(case_id)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Pending bids across every case owned by a client, newest first.
pub async fn list_pending_rows_for_client(
    pool: &Pool<Postgres>,
    client_id: Uuid,
) -> Result<Vec<LawyerRequestRow>, AppError> {
    sqlx::query_as::<_, LawyerRequestRow>(
        r#"
        SELECT lr.id, lr.case_id, lr.lawyer_id, lr.message, lr.proposed_fee,
               lr.status, lr.created_at, lr.responded_at,
               u.first_name || ' ' || u.last_name AS lawyer_name,
               c.title AS case_title,
               c.case_number
        FROM lawyer_requests lr
        JOIN users u ON u.id = lr.lawyer_id
        JOIN cases c ON c.id = lr.case_id
        WHERE c.client_id = $1
          AND lr.status = 'pending'
        ORDER BY lr.created_at DESC
        "#,
    )
    .bind(client_id)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Accept one bid: mark it accepted, staff the case, reject every other
/// pending bid on that case, and notify all affected lawyers.
///
/// All-or-nothing — a failure in any step rolls back the lot, so no
/// state is observable where the case is assigned but a sibling bid is
/// still pending.
pub async fn accept(
    pool: &Pool<Postgres>,
    request: &LawyerRequest,
    client: &User,
) -> Result<Case, AppError> {
    let mut tx = pool.begin().await.map_err(SqlxErrorExt::into_app_error)?;

    let accepted = sqlx::query_as::<_, LawyerRequest>(
        r#"
        UPDATE lawyer_requests SET status = 'accepted', responded_at = NOW()
        WHERE id = $1 AND status = 'pending'
        RETURNING id, case_id, lawyer_id, message, proposed_fee, status,
                  created_at, responded_at
        "#,
    )
    .bind(request.id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(SqlxErrorExt::into_app_error)?
    .ok_or_else(|| AppError::bad_request("This request has already been processed"))?;

    let case = sqlx::query_as::<_, Case>(
        r#"
        UPDATE cases SET
            lawyer_id = $2,
            status = 'assigned',
            assigned_at = COALESCE(assigned_at, NOW()),
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, case_number, client_id, lawyer_id, legal_service_id,
                  title, description, priority, status, budget, deadline,
                  created_at, updated_at, assigned_at, resolved_at
        "#,
    )
    .bind(accepted.case_id)
    .bind(accepted.lawyer_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    let rejected_lawyers = sqlx::query_scalar::<_, Uuid>(
        r#"
        UPDATE lawyer_requests SET status = 'rejected', responded_at = NOW()
        WHERE case_id = $1 AND id <> $2 AND status = 'pending'
        RETURNING lawyer_id
        "#,
    )
    .bind(case.id)
    .bind(accepted.id)
    .fetch_all(&mut *tx)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    notification::notify(
        &mut *tx,
        accepted.lawyer_id,
        "case_accepted",
        "Case Request Accepted",
        &format!(
            "Your request for case \"{}\" has been accepted by {}",
            case.title,
            client.full_name()
        ),
        Some(case.id),
    )
    .await?;

    for lawyer_id in rejected_lawyers {
        notification::notify(
            &mut *tx,
            lawyer_id,
            "case_rejected",
            "Case Request Rejected",
            &format!("Your request for case \"{}\" was not selected", case.title),
            Some(case.id),
        )
        .await?;
    }

    tx.commit().await.map_err(SqlxErrorExt::into_app_error)?;
    Ok(case)
}

/// Reject a single bid and notify its lawyer; the case is untouched.
pub async fn reject(
    pool: &Pool<Postgres>,
    request: &LawyerRequest,
    case_title: &str,
) -> Result<LawyerRequest, AppError> {
    let mut tx = pool.begin().await.map_err(SqlxErrorExt::into_app_error)?;

    let rejected = sqlx::query_as::<_, LawyerRequest>(
        r#"
        UPDATE lawyer_requests SET status = 'rejected', responded_at = NOW()
        WHERE id = $1 AND status = 'pending'
        RETURNING id, case_id, lawyer_id, message, proposed_fee, status,
                  created_at, responded_at
        "#,
    )
    .bind(request.id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(SqlxErrorExt::into_app_error)?
    .ok_or_else(|| AppError::bad_request("This request has already been processed"))?;

    notification::notify(
        &mut *tx,
        rejected.lawyer_id,
        "case_rejected",
        "Case Request Rejected",
        &format!("Your request for case \"{}\" has been rejected", case_title),
        Some(rejected.case_id),
    )
    .await?;

    tx.commit().await.map_err(SqlxErrorExt::into_app_error)?;
    Ok(rejected)
}
