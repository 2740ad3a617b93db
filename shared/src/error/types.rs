//! Error types and API response structures

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Application error with structured error code and details
///
/// - Standardized error codes via [`ErrorCode`]
/// - Human-readable messages
/// - Optional structured details for debugging
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (field-level errors, context, etc.)
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }
}

/// Response envelope used by the access-control backend
///
/// ```json
/// { "success": true, "message": "Saved", "data": { ... } }
/// ```
///
/// Failures carry `success: false`, an optional numeric `code` and a
/// `message`. Both `data` and `code` may be absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the backend accepted the request
    #[serde(default = "default_success")]
    pub success: bool,
    /// Error code (0 or absent for success)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    /// Human-readable message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Response data
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Additional error details (present on failure)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

fn default_success() -> bool {
    true
}

impl<T> ApiResponse<T> {
    /// Convert a failure envelope into an [`AppError`]
    ///
    /// Unknown numeric codes degrade to [`ErrorCode::Unknown`].
    pub fn to_error(&self) -> Option<AppError> {
        if self.success && self.code.unwrap_or(0) == 0 {
            return None;
        }
        let code = self
            .code
            .and_then(|c| ErrorCode::try_from(c).ok())
            .filter(|c| !c.is_success())
            .unwrap_or(ErrorCode::Unknown);
        let mut err = match &self.message {
            Some(msg) => AppError::with_message(code, msg.clone()),
            None => AppError::new(code),
        };
        err.details = self.details.clone();
        Some(err)
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
