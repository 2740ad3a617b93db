//! Data models
//!
//! Shared between the engine and the HTTP client (via API).
//! All IDs are `i64`.

pub mod module;
pub mod privilege;
pub mod role;

// Re-exports
pub use module::*;
pub use privilege::*;
pub use role::*;
