use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use shared_types::{
    is_valid_transaction_status, is_valid_transaction_type, AppError, CreateTransactionRequest,
    TransactionRow, UpdateTransactionStatusRequest, TRANSACTION_STATUSES, TRANSACTION_TYPES,
};

use crate::auth::extractors::{AuthRequired, RoleRequired, ADMIN};
use crate::repo;
use crate::rest::current_user;

#[derive(Debug, Default, serde::Deserialize)]
pub struct TransactionListParams {
    pub status: Option<String>,
}

/// GET /transaction/ — role-scoped listing.
#[utoipa::path(
    get,
    path = "/transaction/",
    responses(
        (status = 200, description = "Transactions", body = Vec<TransactionRow>)
    ),
    tag = "transactions"
)]
pub async fn list_transactions(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
    Query(params): Query<TransactionListParams>,
) -> Result<Json<Vec<TransactionRow>>, AppError> {
    let user = current_user(&pool, &claims).await?;
    let (client_id, lawyer_id) = match user.role.as_str() {
        "client" => (Some(user.id), None),
        "lawyer" => (None, Some(user.id)),
        _ => (None, None),
    };

    Ok(Json(
        repo::transaction::list_rows(&pool, client_id, lawyer_id, params.status.as_deref())
            .await?,
    ))
}

/// GET /transaction/{id}
#[utoipa::path(
    get,
    path = "/transaction/{id}",
    params(("id" = Uuid, Path, description = "Transaction id")),
    responses(
        (status = 200, description = "Transaction", body = TransactionRow),
        (status = 403, description = "Not your transaction", body = AppError),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "transactions"
)]
pub async fn get_transaction(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionRow>, AppError> {
    let user = current_user(&pool, &claims).await?;

    let transaction = repo::transaction::find_row_by_id(&pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Transaction not found"))?;

    match user.role.as_str() {
        "client" if transaction.client_id != user.id => {
            return Err(AppError::forbidden("Access denied"))
        }
        "lawyer" if transaction.lawyer_id != user.id => {
            return Err(AppError::forbidden("Access denied"))
        }
        _ => {}
    }

    Ok(Json(transaction))
}

/// POST /transaction/ — admin manual record against an assigned case.
#[utoipa::path(
    post,
    path = "/transaction/",
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transaction recorded"),
        (status = 400, description = "Invalid type or unassigned case", body = AppError),
        (status = 404, description = "Case not found", body = AppError)
    ),
    tag = "transactions"
)]
pub async fn create_transaction(
    State(pool): State<Pool<Postgres>>,
    RoleRequired(_claims): RoleRequired<ADMIN>,
    Json(body): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    if !is_valid_transaction_type(&body.transaction_type) {
        return Err(AppError::bad_request(format!(
            "Invalid transaction_type: {}. Valid values: {}",
            body.transaction_type,
            TRANSACTION_TYPES.join(", ")
        )));
    }
    if body.amount <= 0.0 {
        return Err(AppError::bad_request("Amount must be positive"));
    }

    let case = repo::case::find_by_id(&pool, body.case_id)
        .await?
        .ok_or_else(|| AppError::not_found("Case not found"))?;

    let transaction = repo::transaction::create(&pool, &case, body).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": "Transaction created successfully",
            "transaction_id": transaction.id,
            "transaction_number": transaction.transaction_number,
        })),
    ))
}

/// PATCH /transaction/{id}/status — admin only.
#[utoipa::path(
    patch,
    path = "/transaction/{id}/status",
    params(("id" = Uuid, Path, description = "Transaction id")),
    request_body = UpdateTransactionStatusRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 400, description = "Invalid status", body = AppError),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "transactions"
)]
pub async fn update_transaction_status(
    State(pool): State<Pool<Postgres>>,
    RoleRequired(_claims): RoleRequired<ADMIN>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTransactionStatusRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !is_valid_transaction_status(&body.status) {
        return Err(AppError::bad_request(format!(
            "Invalid status: {}. Valid values: {}",
            body.status,
            TRANSACTION_STATUSES.join(", ")
        )));
    }

    repo::transaction::update_status(&pool, id, &body.status)
        .await?
        .ok_or_else(|| AppError::not_found("Transaction not found"))?;

    Ok(Json(
        serde_json::json!({ "success": "Transaction status updated successfully" }),
    ))
}
