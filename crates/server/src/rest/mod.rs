pub mod admin;
pub mod auth;
pub mod case;
pub mod catalog;
pub mod chat;
pub mod client;
pub mod document;
pub mod invoice;
pub mod lawyer;
pub mod notification;
pub mod transaction;
pub mod user;

use axum::{
    routing::{delete, get, patch, post},
    Json, Router,
};
use shared_types::{AppError, User};
use sqlx::{Pool, Postgres};

use crate::auth::jwt::Claims;
use crate::db::AppState;

/// Load the authenticated account's row. 401 when the token references
/// a deleted account, 403 when the account has been deactivated.
pub async fn current_user(pool: &Pool<Postgres>, claims: &Claims) -> Result<User, AppError> {
    let user = crate::repo::user::find_by_id(pool, claims.sub)
        .await?
        .ok_or_else(|| AppError::unauthorized("User not found"))?;
    if !user.is_active {
        return Err(AppError::forbidden("Account is deactivated"));
    }
    Ok(user)
}

/// Build the combined REST API router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        // Health & OpenAPI
        .route("/health", get(crate::health::health_check))
        .route("/openapi.json", get(serve_openapi))
        // Auth
        .route("/auth/login", post(auth::login))
        .route("/auth/current_user", get(auth::fetch_current_user))
        .route("/auth/change_password", patch(auth::change_password))
        // Users
        .route("/user/", post(user::register_user).get(user::list_users))
        .route("/user/pending-lawyers", get(user::list_pending_lawyers))
        .route(
            "/user/{id}",
            get(user::get_user)
                .patch(user::update_user)
                .delete(user::delete_user),
        )
        // Public catalog
        .route("/services", get(catalog::list_services))
        .route("/lawyers", get(catalog::list_lawyers))
        .route("/lawyers/search", get(catalog::search_lawyers))
        // Cases
        .route("/case/", get(case::list_cases).post(case::create_case))
        .route("/case/search", get(case::search_cases))
        .route("/case/available", get(case::available_cases))
        .route("/case/stats", get(case::case_stats))
        .route("/case/{id}", get(case::get_case))
        .route("/case/{id}/status", patch(case::update_case_status))
        // Client request flow
        .route("/client/lawyer-requests", get(client::list_lawyer_requests))
        .route(
            "/client/lawyer-requests/{id}/accept",
            post(client::accept_lawyer_request),
        )
        .route(
            "/client/lawyer-requests/{id}/reject",
            post(client::reject_lawyer_request),
        )
        .route("/client/stats", get(client::client_stats))
        // Lawyer request flow
        .route("/lawyer/available-cases", get(lawyer::available_cases))
        .route("/lawyer/cases/{id}/request", post(lawyer::request_case))
        .route("/lawyer/my-requests", get(lawyer::my_requests))
        .route("/lawyer/stats", get(lawyer::lawyer_stats))
        // Admin moderation
        .route("/admin/lawyers", get(admin::list_lawyers))
        .route("/admin/lawyers/{id}/approve", post(admin::approve_lawyer))
        .route("/admin/lawyers/{id}/reject", post(admin::reject_lawyer))
        .route("/admin/cases", get(admin::list_cases))
        .route(
            "/admin/cases/{id}/assign-lawyers",
            post(admin::assign_lawyers),
        )
        .route("/admin/users/{id}/active", patch(admin::toggle_user_active))
        .route("/admin/services", post(admin::create_service))
        .route("/admin/services/{id}", patch(admin::update_service))
        .route("/admin/transactions", get(admin::list_transactions))
        .route("/admin/activity-logs", get(admin::list_activity_logs))
        // Chat
        .route("/chat/{case_id}/messages", get(chat::list_messages))
        .route("/chat/{case_id}/send", post(chat::send_message))
        .route("/chat/{case_id}/read", post(chat::mark_read))
        .route("/chat/{case_id}/unread-count", get(chat::unread_count))
        .route("/chat/{case_id}/ws", get(chat::case_ws))
        // Documents
        .route("/document/upload/{case_id}", post(document::upload_document))
        .route("/document/case/{case_id}", get(document::list_case_documents))
        .route("/document/{id}/download", get(document::download_document))
        .route("/document/{id}", delete(document::delete_document))
        // Invoices
        .route(
            "/invoice/",
            get(invoice::list_invoices).post(invoice::create_invoice),
        )
        .route("/invoice/{id}", get(invoice::get_invoice))
        .route("/invoice/{id}/send", patch(invoice::send_invoice))
        .route("/invoice/{id}/pay", post(invoice::pay_invoice))
        .route("/invoice/{id}/status", patch(invoice::update_invoice_status))
        // Transactions
        .route(
            "/transaction/",
            get(transaction::list_transactions).post(transaction::create_transaction),
        )
        .route("/transaction/{id}", get(transaction::get_transaction))
        .route(
            "/transaction/{id}/status",
            patch(transaction::update_transaction_status),
        )
        // Notifications
        .route(
            "/notification/",
            get(notification::list_notifications).post(notification::create_notification),
        )
        .route("/notification/unread-count", get(notification::unread_count))
        .route(
            "/notification/mark-all-read",
            patch(notification::mark_all_read),
        )
        .route(
            "/notification/{id}",
            get(notification::get_notification).delete(notification::delete_notification),
        )
        .route("/notification/{id}/read", patch(notification::mark_read))
}

/// Build the REST API router with rate limiting applied.
pub fn api_router_with_rate_limit(
    rate_limit: crate::rate_limit::RateLimitState,
) -> Router<AppState> {
    api_router().layer(axum::middleware::from_fn_with_state(
        rate_limit,
        crate::rate_limit::rate_limit_middleware,
    ))
}

async fn serve_openapi() -> Json<serde_json::Value> {
    Json(crate::openapi::openapi_json())
}
