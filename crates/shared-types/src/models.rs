use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A platform account. Lawyer-only columns are NULL for clients and
/// admins; `approval_status` is meaningful only for lawyers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub years_of_experience: Option<i32>,
    pub education: Option<String>,
    pub bio: Option<String>,
    pub hourly_rate: Option<f64>,
    pub approval_status: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A practice area offered on the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct LegalService {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub icon: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A unit of legal work requested by a client, optionally staffed by a
/// lawyer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct Case {
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
}

/// A lawyer's bid on an open case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct LawyerRequest {
    pub id: Uuid,
    pub case_id: Uuid,
    pub lawyer_id: Uuid,
    pub message: Option<String>,
    pub proposed_fee: Option<f64>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

/// One chat message inside a case thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct Chat {
    pub id: Uuid,
    pub case_id: Uuid,
    pub sender_id: Uuid,
    pub message: String,
    pub attachment: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Metadata for a file attached to a case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct Document {
    pub id: Uuid,
    pub case_id: Uuid,
    pub uploaded_by_id: Uuid,
    pub title: String,
    pub document_type: String,
    pub file_path: String,
    pub description: Option<String>,
    pub is_confidential: bool,
    pub created_at: DateTime<Utc>,
}

/// A payment record tied to a case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct Transaction {
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
}

/// A billing document issued by a lawyer against a case.
/// `total_amount` is computed once at creation as amount + tax_amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct Invoice {
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
}

/// A persisted notice addressed to a single recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub related_case_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Admin audit trail entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct ActivityLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub action: String,
    pub description: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}
