use chrono::Utc;
use rand::Rng;
use shared_types::{AppError, Case, CreateTransactionRequest, Transaction, TransactionRow};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;

/// Generate a transaction number: `TXN-YYYYMMDD-######`.
pub fn generate_transaction_number() -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("TXN-{}-{:06}", date, suffix)
}

/// Manually record a transaction against a case (admin path). The
/// simulated gateway path lives in `repo::invoice::pay`.
pub async fn create(
    pool: &Pool<Postgres>,
    case: &Case,
    req: CreateTransactionRequest,
) -> Result<Transaction, AppError> {
    let lawyer_id = case
        .lawyer_id
        .ok_or_else(|| AppError::bad_request("Case has no assigned lawyer"))?;

    sqlx::query_as::<_, Transaction>(
        r#"
        INSERT INTO transactions
            (transaction_number, case_id, client_id, lawyer_id, transaction_type,
             amount, description, payment_method)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, transaction_number, case_id, client_id, lawyer_id,
                  transaction_type, amount, status, description, payment_method,
                  payment_reference, created_at, completed_at
        "#,
    )
    .bind(generate_transaction_number())
    .bind(case.id)
    .bind(case.client_id)
    .bind(lawyer_id)
    .bind(&req.transaction_type)
    .bind(req.amount)
    .bind(&req.description)
    .bind(&req.payment_method)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

pub async fn find_row_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<TransactionRow>, AppError> {
    sqlx::query_as::<_, TransactionRow>(
        r#"
        SELECT t.id, t.transaction_number, t.case_id, t.client_id, t.lawyer_id,
               t.transaction_type, t.amount, t.status, t.description,
               t.payment_method, t.payment_reference, t.created_at, t.completed_at,
               cl.first_name || ' ' || cl.last_name AS client_name,
               lw.first_name || ' ' || lw.last_name AS lawyer_name
        FROM transactions t
        JOIN users cl ON cl.id = t.client_id
        JOIN users lw ON lw.id = t.lawyer_id
        WHERE t.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Role-scoped listing; None/None lists everything (admin view).
pub async fn list_rows(
    pool: &Pool<Postgres>,
    client_id: Option<Uuid>,
    lawyer_id: Option<Uuid>,
    status: Option<&str>,
) -> Result<Vec<TransactionRow>, AppError> {
    sqlx::query_as::<_, TransactionRow>(
        r#"
        SELECT t.id, t.transaction_number, t.case_id, t.client_id, t.lawyer_id,
               t.transaction_type, t.amount, t.status, t.description,
               t.payment_method, t.payment_reference, t.created_at, t.completed_at,
               cl.first_name || ' ' || cl.last_name AS client_name,
               lw.first_name || ' ' || lw.last_name AS lawyer_name
        FROM transactions t
        JOIN users cl ON cl.id = t.client_id
        JOIN users lw ON lw.id = t.lawyer_id
        WHERE ($1::UUID IS NULL OR t.client_id = $1)
          AND ($2::UUID IS NULL OR t.lawyer_id = $2)
          AND ($3::TEXT IS NULL OR t.status = $3)
        ORDER BY t.created_at DESC
        "#,
    )
    .bind(client_id)
    .bind(lawyer_id)
    .bind(status)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Update a transaction's status; `completed_at` is stamped on the
/// first transition into `completed`.
pub async fn update_status(
    pool: &Pool<Postgres>,
    id: Uuid,
    status: &str,
) -> Result<Option<Transaction>, AppError> {
    sqlx::query_as::<_, Transaction>(
        r#"
        UPDATE transactions SET
            status = $2,
            completed_at = CASE
                WHEN $2 = 'completed' THEN COALESCE(completed_at, NOW())
                ELSE completed_at
            END
        WHERE id = $1
        RETURNING id, transaction_number, case_id, client_id, lawyer_id,
                  transaction_type, amount, status, description, payment_method,
                  payment_reference, created_at, completed_at
        "#,
    )
    .bind(id)
    .bind(status)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}
