//! Client error types

use access_engine::BackendError;
use http::StatusCode;
use shared::{AppError, ErrorCode};
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a failure envelope
    #[error("API error {}: {}", .0.code, .0.message)]
    Api(AppError),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required
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

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Map a non-success status without a decodable envelope
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            StatusCode::FORBIDDEN => Self::Forbidden(body),
            StatusCode::NOT_FOUND => Self::NotFound(body),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Self::Validation(body),
            _ => Self::Internal(body),
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

impl From<ClientError> for BackendError {
    fn from(err: ClientError) -> Self {
        let (code, message) = match err {
            ClientError::Http(e) => return BackendError::Transport(e.to_string()),
            ClientError::InvalidResponse(msg) => return BackendError::InvalidResponse(msg),
            ClientError::Serialization(e) => return BackendError::InvalidResponse(e.to_string()),
            ClientError::Api(e) => (e.code, e.message),
            ClientError::Unauthorized => (
                ErrorCode::NotAuthenticated,
                ErrorCode::NotAuthenticated.message().to_string(),
            ),
            ClientError::Forbidden(msg) => (ErrorCode::PermissionDenied, msg),
            ClientError::NotFound(msg) => (ErrorCode::NotFound, msg),
            ClientError::Validation(msg) => (ErrorCode::ValidationFailed, msg),
            ClientError::Internal(msg) => (ErrorCode::InternalError, msg),
        };
        BackendError::Rejected {
            code: Some(code),
            message,
        }
    }
}
