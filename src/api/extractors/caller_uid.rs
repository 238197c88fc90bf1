//! Caller identifier extractor.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::config::USER_ID_HEADER;
use crate::errors::AppError;

/// The raw identity provider UID from the `X-User-Id` header.
///
/// Used where the caller may not have a persisted profile yet
/// (`POST /users/sync`). Everywhere else the auth middleware resolves
/// the header into an `Actor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerUid(pub String);

impl CallerUid {
    /// Read and trim the header; missing or blank is unauthenticated.
    pub fn from_parts(parts: &Parts) -> Result<Self, AppError> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|uid| !uid.is_empty())
            .map(|uid| CallerUid(uid.to_string()))
            .ok_or(AppError::Unauthorized)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CallerUid
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_parts(parts)
    }
}
