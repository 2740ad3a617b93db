//! Unified error system for the access-control console
//!
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`ApiResponse`]: Backend response envelope, decoded by the client
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Module hierarchy errors
//! - 4xxx: Role errors
//! - 5xxx: Privilege errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{ApiResponse, ErrorCode};
//!
//! let body = r#"{"success":false,"code":4002,"message":"Role name already exists"}"#;
//! let response: ApiResponse<()> = serde_json::from_str(body).unwrap();
//! let err = response.to_error().unwrap();
//! assert_eq!(err.code, ErrorCode::RoleNameExists);
//! ```

mod codes;
mod types;

pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
