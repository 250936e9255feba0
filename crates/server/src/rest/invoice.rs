use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use shared_types::{
    is_valid_invoice_status, AppError, CreateInvoiceRequest, CreatedInvoiceResponse, InvoiceRow,
    PayInvoiceRequest, PayInvoiceResponse, UpdateInvoiceStatusRequest, INVOICE_STATUSES,
};

use crate::auth::extractors::{AuthRequired, RoleRequired, ADMIN};
use crate::error_convert::ValidateRequest;
use crate::repo;
use crate::rest::current_user;

#[derive(Debug, Default, serde::Deserialize)]
pub struct InvoiceListParams {
    pub status: Option<String>,
}

/// GET /invoice/ — role-scoped listing.
#[utoipa::path(
    get,
    path = "/invoice/",
    responses(
        (status = 200, description = "Invoices", body = Vec<InvoiceRow>)
    ),
    tag = "invoices"
)]
pub async fn list_invoices(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
    Query(params): Query<InvoiceListParams>,
) -> Result<Json<Vec<InvoiceRow>>, AppError> {
    let user = current_user(&pool, &claims).await?;
    let (client_id, lawyer_id) = match user.role.as_str() {
        "client" => (Some(user.id), None),
        "lawyer" => (None, Some(user.id)),
        _ => (None, None),
    };

    Ok(Json(
        repo::invoice::list_rows(&pool, client_id, lawyer_id, params.status.as_deref()).await?,
    ))
}

/// GET /invoice/{id}
#[utoipa::path(
    get,
    path = "/invoice/{id}",
    params(("id" = Uuid, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "Invoice", body = InvoiceRow),
        (status = 403, description = "Not your invoice", body = AppError),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "invoices"
)]
pub async fn get_invoice(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
    Path(id): Path<Uuid>,
) -> Result<Json<InvoiceRow>, AppError> {
    let user = current_user(&pool, &claims).await?;

    let invoice = repo::invoice::find_row_by_id(&pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Invoice not found"))?;

    match user.role.as_str() {
        "client" if invoice.client_id != user.id => {
            return Err(AppError::forbidden("Access denied"))
        }
        "lawyer" if invoice.lawyer_id != user.id => {
            return Err(AppError::forbidden("Access denied"))
        }
        _ => {}
    }

    Ok(Json(invoice))
}

/// POST /invoice/ — lawyers bill their own cases.
#[utoipa::path(
    post,
    path = "/invoice/",
    request_body = CreateInvoiceRequest,
    responses(
        (status = 201, description = "Draft invoice created", body = CreatedInvoiceResponse),
        (status = 403, description = "Lawyers only", body = AppError),
        (status = 404, description = "Case not found or not yours", body = AppError)
    ),
    tag = "invoices"
)]
pub async fn create_invoice(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
    Json(body): Json<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<CreatedInvoiceResponse>), AppError> {
    let user = current_user(&pool, &claims).await?;
    if user.role != "lawyer" {
        return Err(AppError::forbidden("Only lawyers can create invoices"));
    }

    body.validate_request()?;

    let case = repo::case::find_by_id(&pool, body.case_id)
        .await?
        .filter(|c| c.lawyer_id == Some(user.id))
        .ok_or_else(|| AppError::not_found("Case not found or not assigned to you"))?;

    let invoice = repo::invoice::create(&pool, &case, user.id, body).await?;
    tracing::info!(invoice_id = %invoice.id, case_id = %case.id, "invoice created");

    Ok((
        StatusCode::CREATED,
        Json(CreatedInvoiceResponse {
            invoice_id: invoice.id,
            invoice_number: invoice.invoice_number,
        }),
    ))
}

/// PATCH /invoice/{id}/send — draft → sent, notifying the client.
#[utoipa::path(
    patch,
    path = "/invoice/{id}/send",
    params(("id" = Uuid, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "Invoice sent"),
        (status = 400, description = "Only draft invoices can be sent", body = AppError),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "invoices"
)]
pub async fn send_invoice(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = current_user(&pool, &claims).await?;
    if user.role != "lawyer" {
        return Err(AppError::forbidden("Only lawyers can send invoices"));
    }

    let invoice = repo::invoice::find_by_id(&pool, id)
        .await?
        .filter(|i| i.lawyer_id == user.id)
        .ok_or_else(|| AppError::not_found("Invoice not found"))?;

    let case = repo::case::find_by_id(&pool, invoice.case_id)
        .await?
        .ok_or_else(|| AppError::not_found("Case not found"))?;

    repo::invoice::send(&pool, &invoice, &case.title).await?;

    Ok(Json(
        serde_json::json!({ "success": "Invoice sent successfully" }),
    ))
}

/// POST /invoice/{id}/pay — the simulated gateway. Only `sent`
/// invoices are payable; the settling transaction, the paid stamp, and
/// the lawyer's notification commit atomically.
#[utoipa::path(
    post,
    path = "/invoice/{id}/pay",
    params(("id" = Uuid, Path, description = "Invoice id")),
    request_body = PayInvoiceRequest,
    responses(
        (status = 200, description = "Payment recorded", body = PayInvoiceResponse),
        (status = 400, description = "Invoice cannot be paid", body = AppError),
        (status = 403, description = "Clients only", body = AppError),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "invoices"
)]
pub async fn pay_invoice(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
    Path(id): Path<Uuid>,
    body: Option<Json<PayInvoiceRequest>>,
) -> Result<Json<PayInvoiceResponse>, AppError> {
    let user = current_user(&pool, &claims).await?;
    if user.role != "client" {
        return Err(AppError::forbidden("Only clients can pay invoices"));
    }

    let invoice = repo::invoice::find_by_id(&pool, id)
        .await?
        .filter(|i| i.client_id == user.id)
        .ok_or_else(|| AppError::not_found("Invoice not found"))?;

    if invoice.status != "sent" {
        return Err(AppError::bad_request("Invoice cannot be paid"));
    }

    let payment_method = body
        .and_then(|Json(b)| b.payment_method)
        .unwrap_or_else(|| "credit_card".to_string());

    let (paid, transaction) = repo::invoice::pay(&pool, &invoice, &payment_method).await?;
    tracing::info!(
        invoice_id = %paid.id,
        transaction_id = %transaction.id,
        "invoice paid"
    );

    Ok(Json(PayInvoiceResponse {
        transaction_id: transaction.id,
        transaction_number: transaction.transaction_number,
    }))
}

/// PATCH /invoice/{id}/status — admin escape hatch.
#[utoipa::path(
    patch,
    path = "/invoice/{id}/status",
    params(("id" = Uuid, Path, description = "Invoice id")),
    request_body = UpdateInvoiceStatusRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 400, description = "Invalid status", body = AppError),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "invoices"
)]
pub async fn update_invoice_status(
    State(pool): State<Pool<Postgres>>,
    RoleRequired(_claims): RoleRequired<ADMIN>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateInvoiceStatusRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !is_valid_invoice_status(&body.status) {
        return Err(AppError::bad_request(format!(
            "Invalid status: {}. Valid values: {}",
            body.status,
            INVOICE_STATUSES.join(", ")
        )));
    }

    repo::invoice::update_status(&pool, id, &body.status)
        .await?
        .ok_or_else(|| AppError::not_found("Invoice not found"))?;

    Ok(Json(
        serde_json::json!({ "success": "Invoice status updated successfully" }),
    ))
}
