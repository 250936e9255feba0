use serde::{Deserialize, Serialize};

// ── Validation constants ────────────────────────────────────────────

/// Valid case status values matching the DB CHECK constraint.
pub const CASE_STATUSES: &[&str] = &[
    "open", "assigned", "in_progress", "resolved", "closed", "cancelled",
];

/// Valid case priority values matching the DB CHECK constraint.
pub const CASE_PRIORITIES: &[&str] = &["low", "medium", "high", "urgent"];

/// Valid lawyer request status values.
pub const REQUEST_STATUSES: &[&str] = &["pending", "accepted", "rejected"];

/// Valid lawyer approval status values.
pub const APPROVAL_STATUSES: &[&str] = &["pending", "approved", "rejected"];

/// Valid invoice status values.
pub const INVOICE_STATUSES: &[&str] = &["draft", "sent", "paid", "overdue"];

/// Valid transaction type values.
pub const TRANSACTION_TYPES: &[&str] = &["payment", "refund", "fee"];

/// Valid transaction status values.
pub const TRANSACTION_STATUSES: &[&str] = &["pending", "completed", "failed"];

/// Valid activity log actions.
pub const ACTIVITY_ACTIONS: &[&str] = &["create", "update", "delete", "login", "logout"];

pub fn is_valid_case_status(s: &str) -> bool {
    CASE_STATUSES.contains(&s)
}

pub fn is_valid_case_priority(s: &str) -> bool {
    CASE_PRIORITIES.contains(&s)
}

pub fn is_valid_invoice_status(s: &str) -> bool {
    INVOICE_STATUSES.contains(&s)
}

pub fn is_valid_transaction_type(s: &str) -> bool {
    TRANSACTION_TYPES.contains(&s)
}

pub fn is_valid_transaction_status(s: &str) -> bool {
    TRANSACTION_STATUSES.contains(&s)
}

// ── Roles ───────────────────────────────────────────────────────────

/// Platform role attached to every account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Client,
    Lawyer,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Client => "client",
            UserRole::Lawyer => "lawyer",
            UserRole::Admin => "admin",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "client" => Some(UserRole::Client),
            "lawyer" => Some(UserRole::Lawyer),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }

    /// Whether this role satisfies a required role. Roles are not a
    /// hierarchy: clients and lawyers only satisfy themselves, while
    /// admin satisfies every requirement.
    pub fn satisfies(&self, required: &UserRole) -> bool {
        self == required || *self == UserRole::Admin
    }
}

/// Derive the approval status a new account starts with. Lawyers enter
/// the moderation queue; clients and admins are approved immediately.
/// Single source of truth for the rule previously buried in constructor
/// branches.
pub fn default_approval_status(role: UserRole) -> &'static str {
    match role {
        UserRole::Lawyer => "pending",
        UserRole::Client | UserRole::Admin => "approved",
    }
}
