use chrono::{Duration, Utc};
use rand::Rng;
use shared_types::{AppError, Case, CreateInvoiceRequest, Invoice, InvoiceRow, Transaction};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;
use crate::repo::notification;

/// Generate an invoice number: `INV-YYYYMMDD-####` with a random suffix.
pub fn generate_invoice_number() -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix: u32 = rand::thread_rng().gen_range(0..10_000);
    format!("INV-{}-{:04}", date, suffix)
}

/// Create a draft invoice against a case. `total_amount` is computed
/// here, once; later edits go through status transitions only.
pub async fn create(
    pool: &Pool<Postgres>,
    case: &Case,
    lawyer_id: Uuid,
    req: CreateInvoiceRequest,
) -> Result<Invoice, AppError> {
    let tax_amount = req.tax_amount.unwrap_or(0.0);
    let total_amount = req.amount + tax_amount;
    let due_date = (Utc::now() + Duration::days(req.due_days.unwrap_or(30))).date_naive();

    sqlx::query_as::<_, Invoice>(
        r#"
        INSERT INTO invoices
            (invoice_number, case_id, client_id, lawyer_id, amount, tax_amount,
             total_amount, description, due_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, invoice_number, case_id, client_id, lawyer_id, amount,
                  tax_amount, total_amount, description, status, issue_date,
                  due_date, paid_date, transaction_id
        "#,
    )
    .bind(generate_invoice_number())
    .bind(case.id)
    .bind(case.client_id)
    .bind(lawyer_id)
    .bind(req.amount)
    .bind(tax_amount)
    .bind(total_amount)
    .bind(&req.description)
    .bind(due_date)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

pub async fn find_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<Invoice>, AppError> {
    sqlx::query_as::<_, Invoice>(
        r#"
        SELECT id, invoice_number, case_id, client_id, lawyer_id, amount,
               tax_amount, total_amount, description, status, issue_date,
               due_date, paid_date, transaction_id
        FROM invoices
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

pub async fn find_row_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<InvoiceRow>, AppError> {
    sqlx::query_as::<_, InvoiceRow>(
        r#"
        SELECT i.id, i.invoice_number, i.case_id, i.client_id, i.lawyer_id,
               i.amount, i.tax_amount, i.total_amount, i.description, i.status,
               i.issue_date, i.due_date, i.paid_date, i.transaction_id,
               cl.first_name || ' ' || cl.last_name AS client_name,
               lw.first_name || ' ' || lw.last_name AS lawyer_name,
               c.title AS case_title
        FROM invoices i
        JOIN users cl ON cl.id = i.client_id
        JOIN users lw ON lw.id = i.lawyer_id
        JOIN cases c ON c.id = i.case_id
        WHERE i.id = $1
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
) -> Result<Vec<InvoiceRow>, AppError> {
    sqlx::query_as::<_, InvoiceRow>(
        r#"
        SELECT i.id, i.invoice_number, i.case_id, i.client_id, i.lawyer_id,
               i.amount, i.tax_amount, i.total_amount, i.description, i.status,
               i.issue_date, i.due_date, i.paid_date, i.transaction_id,
               cl.first_name || ' ' || cl.last_name AS client_name,
               lw.first_name || ' ' || lw.last_name AS lawyer_name,
               c.title AS case_title
        FROM invoices i
        JOIN users cl ON cl.id = i.client_id
        JOIN users lw ON lw.id = i.lawyer_id
        JOIN cases c ON c.id = i.case_id
        WHERE ($1::UUID IS NULL OR i.client_id = $1)
          AND ($2::UUID IS NULL OR i.lawyer_id = $2)
          AND ($3::TEXT IS NULL OR i.status = $3)
        ORDER BY i.issue_date DESC
        "#,
    )
    .bind(client_id)
    .bind(lawyer_id)
    .bind(status)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Send a draft invoice to the client — only `draft` invoices move, and
/// the client notification commits with the transition.
pub async fn send(
    pool: &Pool<Postgres>,
    invoice: &Invoice,
    case_title: &str,
) -> Result<Invoice, AppError> {
    let mut tx = pool.begin().await.map_err(SqlxErrorExt::into_app_error)?;

    let sent = sqlx::query_as::<_, Invoice>(
        r#"
        UPDATE invoices SET status = 'sent'
        WHERE id = $1 AND status = 'draft'
        RETURNING id, invoice_number, case_id, client_id, lawyer_id, amount,
                  tax_amount, total_amount, description, status, issue_date,
                  due_date, paid_date, transaction_id
        "#,
    )
    .bind(invoice.id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(SqlxErrorExt::into_app_error)?
    .ok_or_else(|| AppError::bad_request("Only draft invoices can be sent"))?;

    notification::notify(
        &mut *tx,
        sent.client_id,
        "invoice_generated",
        "New Invoice",
        &format!(
            "You have received an invoice for ${:.2} for case \"{}\"",
            sent.total_amount, case_title
        ),
        Some(sent.case_id),
    )
    .await?;

    tx.commit().await.map_err(SqlxErrorExt::into_app_error)?;
    Ok(sent)
}

/// Pay a sent invoice: synthesize a completed payment transaction for
/// the full total, stamp the invoice paid, link the transaction, and
/// notify the lawyer — one atomic operation.
///
/// The status guard runs inside the transaction, so a second payment
/// attempt finds the invoice no longer `sent`, fails, and leaves no
/// second transaction behind.
pub async fn pay(
    pool: &Pool<Postgres>,
    invoice: &Invoice,
    payment_method: &str,
) -> Result<(Invoice, Transaction), AppError> {
    let mut tx = pool.begin().await.map_err(SqlxErrorExt::into_app_error)?;

    let transaction = sqlx::query_as::<_, Transaction>(
        r#"
        INSERT INTO transactions
            (transaction_number, case_id, client_id, lawyer_id, transaction_type,
             amount, status, description, payment_method, completed_at)
        VALUES ($1, $2, $3, $4, 'payment', $5, 'completed', $6, $7, NOW())
        RETURNING id, transaction_number, case_id, client_id, lawyer_id,
                  transaction_type, amount, status, description, payment_method,
                  payment_reference, created_at, completed_at
        "#,
    )
    .bind(crate::repo::transaction::generate_transaction_number())
    .bind(invoice.case_id)
    .bind(invoice.client_id)
    .bind(invoice.lawyer_id)
    .bind(invoice.total_amount)
    .bind(format!("Payment for invoice {}", invoice.invoice_number))
    .bind(payment_method)
    .fetch_one(&mut *tx)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    let paid = sqlx::query_as::<_, Invoice>(
        r#"
        UPDATE invoices SET
            status = 'paid',
            paid_date = CURRENT_DATE,
            transaction_id = $2
        WHERE id = $1 AND status = 'sent'
        RETURNING id, invoice_number, case_id, client_id, lawyer_id, amount,
                  tax_amount, total_amount, description, status, issue_date,
                  due_date, paid_date, transaction_id
        "#,
    )
    .bind(invoice.id)
    .bind(transaction.id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(SqlxErrorExt::into_app_error)?
    .ok_or_else(|| AppError::bad_request("Invoice cannot be paid"))?;

    notification::notify(
        &mut *tx,
        paid.lawyer_id,
        "payment_received",
        "Payment Received",
        &format!(
            "Payment of ${:.2} received for invoice {}",
            paid.total_amount, paid.invoice_number
        ),
        Some(paid.case_id),
    )
    .await?;

    tx.commit().await.map_err(SqlxErrorExt::into_app_error)?;
    Ok((paid, transaction))
}

/// Admin escape hatch for direct status edits.
pub async fn update_status(
    pool: &Pool<Postgres>,
    id: Uuid,
    status: &str,
) -> Result<Option<Invoice>, AppError> {
    sqlx::query_as::<_, Invoice>(
        r#"
        UPDATE invoices SET status = $2
        WHERE id = $1
        RETURNING id, invoice_number, case_id, client_id, lawyer_id, amount,
                  tax_amount, total_amount, description, status, issue_date,
                  due_date, paid_date, transaction_id
        "#,
    )
    .bind(id)
    .bind(status)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}
