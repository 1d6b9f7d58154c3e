use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::{error::AppError, models::UserId};

/// Header set by the upstream identity provider after authentication
pub const USER_ID_HEADER: &str = "x-user-id";

/// The already-authenticated caller
///
/// Authentication happens upstream; this extractor only reads the user id the
/// identity provider forwarded and rejects requests that lack a valid one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub UserId);

impl AuthenticatedUser {
    fn from_parts(parts: &Parts) -> Result<Self, AppError> {
        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| AppError::Unauthorized(format!("Missing {} header", USER_ID_HEADER)))?;

        header
            .to_str()
            .ok()
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .map(AuthenticatedUser)
            .ok_or_else(|| AppError::Unauthorized(format!("Malformed {} header", USER_ID_HEADER)))
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_parts(parts)
    }
}
