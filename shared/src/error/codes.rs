//! Unified error codes for the access-control console
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Module hierarchy errors
//! - 4xxx: Role errors
//! - 5xxx: Privilege errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so the backend, the
/// engine and any frontend agree on the same numeric identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Operation already in progress
    OperationInProgress = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 3xxx: Module hierarchy ====================
    /// Module not found
    ModuleNotFound = 3001,
    /// Module name already used by a sibling
    ModuleNameExists = 3002,
    /// Tree input is structurally broken (dangling parent, bad level)
    MalformedTree = 3003,
    /// Level/parent pairing violates the three-level hierarchy
    InvalidHierarchy = 3004,
    /// Maximum depth reached, cannot nest further
    MaxDepthExceeded = 3005,

    // ==================== 4xxx: Role ====================
    /// Role not found
    RoleNotFound = 4001,
    /// Role name already exists
    RoleNameExists = 4002,
    /// Module is not assigned to the role
    ModuleNotAssigned = 4003,

    // ==================== 5xxx: Privilege ====================
    /// Module has no privilege catalog
    NoPrivilegeCatalog = 5001,
    /// Privilege matrix save was rejected
    PrivilegeSaveFailed = 5002,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Network error
    NetworkError = 9101,
    /// Timeout error
    TimeoutError = 9102,
    /// Editor session was closed while a request was in flight
    SessionClosed = 9201,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::OperationInProgress => "Operation already in progress",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",

            // Module hierarchy
            ErrorCode::ModuleNotFound => "Module not found",
            ErrorCode::ModuleNameExists => "Module name already exists",
            ErrorCode::MalformedTree => "Module tree is malformed",
            ErrorCode::InvalidHierarchy => "Invalid module level for this parent",
            ErrorCode::MaxDepthExceeded => "Maximum module depth exceeded",

            // Role
            ErrorCode::RoleNotFound => "Role not found",
            ErrorCode::RoleNameExists => "Role name already exists",
            ErrorCode::ModuleNotAssigned => "Module is not assigned to the role",

            // Privilege
            ErrorCode::NoPrivilegeCatalog => "Module has no privilege catalog",
            ErrorCode::PrivilegeSaveFailed => "Privilege matrix could not be saved",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Request timed out",
            ErrorCode::SessionClosed => "Editor session closed",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::OperationInProgress),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),

            // Module hierarchy
            3001 => Ok(ErrorCode::ModuleNotFound),
            3002 => Ok(ErrorCode::ModuleNameExists),
            3003 => Ok(ErrorCode::MalformedTree),
            3004 => Ok(ErrorCode::InvalidHierarchy),
            3005 => Ok(ErrorCode::MaxDepthExceeded),

            // Role
            4001 => Ok(ErrorCode::RoleNotFound),
            4002 => Ok(ErrorCode::RoleNameExists),
            4003 => Ok(ErrorCode::ModuleNotAssigned),

            // Privilege
            5001 => Ok(ErrorCode::NoPrivilegeCatalog),
            5002 => Ok(ErrorCode::PrivilegeSaveFailed),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9101 => Ok(ErrorCode::NetworkError),
            9102 => Ok(ErrorCode::TimeoutError),
            9201 => Ok(ErrorCode::SessionClosed),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::ModuleNotFound.code(), 3001);
        assert_eq!(ErrorCode::MalformedTree.code(), 3003);
        assert_eq!(ErrorCode::RoleNameExists.code(), 4002);
        assert_eq!(ErrorCode::NoPrivilegeCatalog.code(), 5001);
        assert_eq!(ErrorCode::SessionClosed.code(), 9201);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::NotFound.is_success());
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(0), Ok(ErrorCode::Success));
        assert_eq!(ErrorCode::try_from(3004), Ok(ErrorCode::InvalidHierarchy));
        assert_eq!(ErrorCode::try_from(4003), Ok(ErrorCode::ModuleNotAssigned));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(7777), Err(InvalidErrorCode(7777)));
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&ErrorCode::ModuleNameExists).unwrap();
        assert_eq!(json, "3002");
    }

    #[test]
    fn test_deserialize() {
        let code: ErrorCode = serde_json::from_str("4001").unwrap();
        assert_eq!(code, ErrorCode::RoleNotFound);

        let invalid: Result<ErrorCode, _> = serde_json::from_str("12345");
        assert!(invalid.is_err());
    }

    #[test]
    fn test_roundtrip_every_code() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::OperationInProgress,
            ErrorCode::TokenInvalid,
            ErrorCode::PermissionDenied,
            ErrorCode::MaxDepthExceeded,
            ErrorCode::ModuleNotAssigned,
            ErrorCode::PrivilegeSaveFailed,
            ErrorCode::TimeoutError,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::MalformedTree), "3003");
        assert_eq!(
            format!("{}", InvalidErrorCode(42)),
            "invalid error code: 42"
        );
    }
}
