//! Shared types for the access-control console
//!
//! Module hierarchy, role and privilege models exchanged with the backend,
//! the unified error system, and serde helpers for the backend's loose
//! encodings.

pub mod error;
pub mod models;
pub mod serde_helpers;
pub mod types;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use types::{ModuleId, PrivilegeId, RoleId, UserId};
