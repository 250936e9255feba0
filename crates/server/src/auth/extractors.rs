use axum::{extract::FromRequestParts, http::request::Parts};
use shared_types::{AppError, UserRole};

use super::jwt::Claims;

/// Extractor that requires authentication. Returns 401 if no valid token.
pub struct AuthRequired(pub Claims);

impl<S: Send + Sync> FromRequestParts<S> for AuthRequired {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthRequired)
            .ok_or_else(|| AppError::unauthorized("Authentication required"))
    }
}

/// Extractor that requires authentication AND a specific platform role.
/// Returns 401 if unauthenticated, 403 if the role does not satisfy the
/// requirement.
///
/// Role constants (match `UserRole` variants):
/// - 1 = Client
/// - 2 = Lawyer
/// - 3 = Admin
/// Admin satisfies every requirement; client and lawyer match exactly.
pub struct RoleRequired<const ROLE: u8>(pub Claims);

pub const CLIENT: u8 = 1;
pub const LAWYER: u8 = 2;
pub const ADMIN: u8 = 3;

impl<const ROLE: u8, S: Send + Sync> FromRequestParts<S> for RoleRequired<ROLE> {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<Claims>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized("Authentication required"))?;

        let user_role = UserRole::from_str_opt(&claims.role)
            .ok_or_else(|| AppError::forbidden("Unknown role"))?;
        let required_role = match ROLE {
            1 => UserRole::Client,
            2 => UserRole::Lawyer,
            _ => UserRole::Admin,
        };

        if !user_role.satisfies(&required_role) {
            return Err(AppError::forbidden(format!(
                "{} access required",
                required_role.as_str()
            )));
        }

        Ok(RoleRequired(claims))
    }
}

/// Request origin metadata recorded in activity logs.
pub struct RequestMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl<S: Send + Sync> FromRequestParts<S> for RequestMeta {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ip_address = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string());
        let user_agent = parts
            .headers
            .get(axum::http::header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        Ok(RequestMeta {
            ip_address,
            user_agent,
        })
    }
}
