//! Client error types

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Caller header missing or unknown to the server
    #[error("Authentication required")]
    Unauthorized,

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Order changed concurrently
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Rate limited by the server
    #[error("Too many requests")]
    RateLimited,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl ClientError {
    /// Map a non-success response back into an error, reading the server's
    /// `{"error": {"message"}}` body when there is one.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorEnvelope>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.to_string());

        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::FORBIDDEN => ClientError::Forbidden(message),
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            StatusCode::BAD_REQUEST => ClientError::Validation(message),
            StatusCode::CONFLICT => ClientError::Conflict(message),
            StatusCode::TOO_MANY_REQUESTS => ClientError::RateLimited,
            _ => ClientError::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_message_from_error_envelope() {
        let body = r#"{"error":{"code":"FORBIDDEN","message":"Forbidden"}}"#;
        assert!(matches!(
            ClientError::from_response(StatusCode::FORBIDDEN, body),
            ClientError::Forbidden(m) if m == "Forbidden"
        ));
    }

    #[test]
    fn test_falls_back_to_raw_body() {
        assert!(matches!(
            ClientError::from_response(StatusCode::BAD_GATEWAY, "upstream down"),
            ClientError::Internal(m) if m == "upstream down"
        ));
        assert!(matches!(
            ClientError::from_response(StatusCode::TOO_MANY_REQUESTS, ""),
            ClientError::RateLimited
        ));
    }
}
