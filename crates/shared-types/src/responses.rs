use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Chat, Notification, User};

// ── Joined row structs (query DTOs) ─────────────────────────────────

/// Case row joined with the display names list endpoints need.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct CaseListRow {
    pub id: Uuid,
    pub case_number: String,
    pub client_id: Uuid,
    pub lawyer_id: Option<Uuid>,
    pub legal_service_id: i32,
    pub title: String,
    pub description: String,
    pub priority: String,
    pub status: String,
    pub budget: Option<f64>,
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub client_name: String,
    pub lawyer_name: Option<String>,
    pub service_name: String,
}

/// Lawyer request row joined with lawyer and case display fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct LawyerRequestRow {
    pub id: Uuid,
    pub case_id: Uuid,
    pub lawyer_id: Uuid,
    pub message: Option<String>,
    pub proposed_fee: Option<f64>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
    pub lawyer_name: String,
    pub case_title: String,
    pub case_number: String,
}

/// Invoice row joined with party names and case title.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct InvoiceRow {
    pub id: Uuid,
    pub invoice_number: String,
    pub case_id: Uuid,
    pub client_id: Uuid,
    pub lawyer_id: Uuid,
    pub amount: f64,
    pub tax_amount: f64,
    pub total_amount: f64,
    pub description: String,
    pub status: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
    pub transaction_id: Option<Uuid>,
    pub client_name: String,
    pub lawyer_name: String,
    pub case_title: String,
}

/// Transaction row joined with party names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct TransactionRow {
    pub id: Uuid,
    pub transaction_number: String,
    pub case_id: Uuid,
    pub client_id: Uuid,
    pub lawyer_id: Uuid,
    pub transaction_type: String,
    pub amount: f64,
    pub status: String,
    pub description: Option<String>,
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub client_name: String,
    pub lawyer_name: String,
}

/// Chat row joined with the sender's display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct ChatRow {
    pub id: Uuid,
    pub case_id: Uuid,
    pub sender_id: Uuid,
    pub message: String,
    pub attachment: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub sender_name: String,
}

/// Document row joined with the uploader's display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct DocumentRow {
    pub id: Uuid,
    pub case_id: Uuid,
    pub uploaded_by_id: Uuid,
    pub title: String,
    pub document_type: String,
    pub file_path: String,
    pub description: Option<String>,
    pub is_confidential: bool,
    pub created_at: DateTime<Utc>,
    pub uploaded_by: String,
}

// ── API response shapes ─────────────────────────────────────────────

/// Compact reference to a legal service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ServiceSummary {
    pub id: i32,
    pub name: String,
}

/// Compact reference to a user on a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PartySummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Compact reference to a case inside another resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CaseRef {
    pub id: Uuid,
    pub title: String,
    pub case_number: String,
}

/// Public account profile (no password hash).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_of_experience: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<f64>,
    pub approval_status: String,
    pub created_at: DateTime<Utc>,
    /// Specialization services; populated for lawyers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub specializations: Vec<ServiceSummary>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        let full_name = u.full_name();
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            full_name,
            role: u.role,
            phone: u.phone,
            address: u.address,
            is_active: u.is_active,
            years_of_experience: u.years_of_experience,
            education: u.education,
            bio: u.bio,
            hourly_rate: u.hourly_rate,
            approval_status: u.approval_status,
            created_at: u.created_at,
            specializations: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LoginResponse {
    pub access_token: String,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreatedCaseResponse {
    pub case_id: Uuid,
    pub case_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreatedRequestResponse {
    pub request_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreatedInvoiceResponse {
    pub invoice_id: Uuid,
    pub invoice_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PayInvoiceResponse {
    pub transaction_id: Uuid,
    pub transaction_number: String,
}

/// Outcome of an admin multi-assignment call; valid assignments commit
/// even when some ids fail validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AssignLawyersResponse {
    pub assigned_lawyers: Vec<Uuid>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UnreadCountResponse {
    pub count: i64,
}

/// Case detail including related documents and (for client/admin) the
/// lawyer requests received.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CaseDetailResponse {
    pub id: Uuid,
    pub case_number: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    pub client: PartySummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lawyer: Option<PartySummary>,
    pub legal_service: ServiceSummary,
    pub documents: Vec<DocumentRow>,
    pub lawyer_requests: Vec<LawyerRequestRow>,
}

/// An open case offered to a lawyer, with a flag for an existing bid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AvailableCaseResponse {
    pub id: Uuid,
    pub case_number: String,
    pub title: String,
    pub description: String,
    pub priority: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub client_name: String,
    pub legal_service: String,
    pub already_requested: bool,
}

/// Per-role case counts by status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CaseStatsResponse {
    pub total_cases: i64,
    pub open_cases: i64,
    pub assigned_cases: i64,
    pub in_progress_cases: i64,
    pub resolved_cases: i64,
    pub closed_cases: i64,
    pub cancelled_cases: i64,
    pub active_cases: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ChatMessageResponse {
    pub id: Uuid,
    pub case_id: Uuid,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
    pub is_read: bool,
    pub is_current_user: bool,
    pub created_at: DateTime<Utc>,
}

impl ChatMessageResponse {
    pub fn from_row(row: ChatRow, current_user: Uuid) -> Self {
        Self {
            id: row.id,
            case_id: row.case_id,
            sender_id: row.sender_id,
            sender_name: row.sender_name,
            message: row.message,
            attachment: row.attachment,
            is_read: row.is_read,
            is_current_user: row.sender_id == current_user,
            created_at: row.created_at,
        }
    }

    pub fn from_chat(chat: Chat, sender_name: String, current_user: Uuid) -> Self {
        Self {
            id: chat.id,
            case_id: chat.case_id,
            sender_id: chat.sender_id,
            sender_name,
            message: chat.message,
            attachment: chat.attachment,
            is_read: chat.is_read,
            is_current_user: chat.sender_id == current_user,
            created_at: chat.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NotificationResponse {
    pub id: Uuid,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_case_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case: Option<CaseRef>,
}

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            notification_type: n.notification_type,
            title: n.title,
            message: n.message,
            is_read: n.is_read,
            related_case_id: n.related_case_id,
            created_at: n.created_at,
            case: None,
        }
    }
}

/// Paginated response wrapper for admin listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PaginationMeta {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, page: i64, per_page: i64, total: i64) -> Self {
        let total_pages = if per_page > 0 {
            (total + per_page - 1) / per_page
        } else {
            1
        };
        Self {
            data: items,
            meta: PaginationMeta {
                page,
                per_page,
                total,
                total_pages,
            },
        }
    }
}
