//! Common types for the shared crate
//!
//! Identifier aliases used across the workspace. All ids are `i64`
//! to match the backend's integer primary keys.

/// Module id
pub type ModuleId = i64;

/// Role id
pub type RoleId = i64;

/// Privilege catalog entry id
pub type PrivilegeId = i64;

/// User (person) id receiving roles
pub type UserId = i64;
