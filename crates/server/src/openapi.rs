use utoipa::OpenApi;

/// Aggregated OpenAPI document for the REST surface.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::health::health_check,
        crate::rest::auth::login,
        crate::rest::auth::fetch_current_user,
        crate::rest::auth::change_password,
        crate::rest::user::register_user,
        crate::rest::user::list_users,
        crate::rest::user::list_pending_lawyers,
        crate::rest::user::get_user,
        crate::rest::user::update_user,
        crate::rest::user::delete_user,
        crate::rest::catalog::list_services,
        crate::rest::catalog::list_lawyers,
        crate::rest::catalog::search_lawyers,
        crate::rest::case::create_case,
        crate::rest::case::list_cases,
        crate::rest::case::get_case,
        crate::rest::case::update_case_status,
        crate::rest::case::search_cases,
        crate::rest::case::available_cases,
        crate::rest::case::case_stats,
        crate::rest::client::list_lawyer_requests,
        crate::rest::client::accept_lawyer_request,
        crate::rest::client::reject_lawyer_request,
        crate::rest::client::client_stats,
        crate::rest::lawyer::available_cases,
        crate::rest::lawyer::request_case,
        crate::rest::lawyer::my_requests,
        crate::rest::lawyer::lawyer_stats,
        crate::rest::admin::list_lawyers,
        crate::rest::admin::approve_lawyer,
        crate::rest::admin::reject_lawyer,
        crate::rest::admin::list_cases,
        crate::rest::admin::assign_lawyers,
        crate::rest::admin::toggle_user_active,
        crate::rest::admin::create_service,
        crate::rest::admin::update_service,
        crate::rest::admin::list_transactions,
        crate::rest::admin::list_activity_logs,
        crate::rest::chat::list_messages,
        crate::rest::chat::send_message,
        crate::rest::chat::mark_read,
        crate::rest::chat::unread_count,
        crate::rest::document::upload_document,
        crate::rest::document::list_case_documents,
        crate::rest::document::download_document,
        crate::rest::document::delete_document,
        crate::rest::invoice::list_invoices,
        crate::rest::invoice::get_invoice,
        crate::rest::invoice::create_invoice,
        crate::rest::invoice::send_invoice,
        crate::rest::invoice::pay_invoice,
        crate::rest::invoice::update_invoice_status,
        crate::rest::transaction::list_transactions,
        crate::rest::transaction::get_transaction,
        crate::rest::transaction::create_transaction,
        crate::rest::transaction::update_transaction_status,
        crate::rest::notification::list_notifications,
        crate::rest::notification::unread_count,
        crate::rest::notification::get_notification,
        crate::rest::notification::mark_read,
        crate::rest::notification::mark_all_read,
        crate::rest::notification::create_notification,
        crate::rest::notification::delete_notification,
    ),
    components(schemas(
        shared_types::AppError,
        shared_types::AppErrorKind,
        shared_types::User,
        shared_types::UserResponse,
        shared_types::LoginRequest,
        shared_types::LoginResponse,
        shared_types::RegisterUserRequest,
        shared_types::UpdateUserRequest,
        shared_types::ChangePasswordRequest,
        shared_types::LegalService,
        shared_types::ServiceSummary,
        shared_types::CreateLegalServiceRequest,
        shared_types::UpdateLegalServiceRequest,
        shared_types::Case,
        shared_types::CaseListRow,
        shared_types::CaseDetailResponse,
        shared_types::CreateCaseRequest,
        shared_types::CreatedCaseResponse,
        shared_types::UpdateCaseStatusRequest,
        shared_types::AvailableCaseResponse,
        shared_types::CaseStatsResponse,
        shared_types::LawyerRequest,
        shared_types::LawyerRequestRow,
        shared_types::RequestCaseRequest,
        shared_types::CreatedRequestResponse,
        shared_types::AssignLawyersRequest,
        shared_types::AssignLawyersResponse,
        shared_types::RejectLawyerRequest,
        shared_types::ToggleActiveRequest,
        shared_types::Chat,
        shared_types::ChatMessageResponse,
        shared_types::SendMessageRequest,
        shared_types::Document,
        shared_types::DocumentRow,
        shared_types::Invoice,
        shared_types::InvoiceRow,
        shared_types::CreateInvoiceRequest,
        shared_types::CreatedInvoiceResponse,
        shared_types::PayInvoiceRequest,
        shared_types::PayInvoiceResponse,
        shared_types::UpdateInvoiceStatusRequest,
        shared_types::Transaction,
        shared_types::TransactionRow,
        shared_types::CreateTransactionRequest,
        shared_types::UpdateTransactionStatusRequest,
        shared_types::Notification,
        shared_types::NotificationResponse,
        shared_types::CreateNotificationRequest,
        shared_types::UnreadCountResponse,
        shared_types::ActivityLog,
        shared_types::CaseRef,
        shared_types::PartySummary,
        shared_types::PaginationMeta,
    )),
    tags(
        (name = "auth", description = "Login and session"),
        (name = "users", description = "Account registration and profiles"),
        (name = "catalog", description = "Public services and lawyer directory"),
        (name = "cases", description = "Case lifecycle"),
        (name = "client", description = "Client request flow"),
        (name = "lawyer", description = "Lawyer request flow"),
        (name = "admin", description = "Moderation and oversight"),
        (name = "chat", description = "Per-case messaging"),
        (name = "documents", description = "Case attachments"),
        (name = "invoices", description = "Billing"),
        (name = "transactions", description = "Payment records"),
        (name = "notifications", description = "Persisted notices"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// Serialized OpenAPI document for the /openapi.json route.
pub fn openapi_json() -> serde_json::Value {
    serde_json::to_value(ApiDoc::openapi()).unwrap_or_default()
}
