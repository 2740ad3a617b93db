//! Access-control editing engine
//!
//! Client-side state for administering role-based access: the module
//! hierarchy, which modules each role holds, and the per-module
//! create/list/edit/delete privilege flags.
//!
//! # Components
//!
//! - [`ModuleTree`]: arena tree built from flat or nested backend payloads
//! - selection propagation on [`ModuleTree`] (cascade down, OR up)
//! - [`privileges`]: matrix row aggregation and save-row building
//! - [`diff`]: unsaved-change detection
//! - [`HierarchyRepository`]: validated module CRUD
//! - [`SyncClient`]: optimistic and commit-then-confirm backend calls
//! - sessions: [`RoleAccessSession`], [`PrivilegeMatrixSession`],
//!   [`ModulePrivilegeEditor`]
//! - [`RoleDirectory`]: role list with duplicate-name checks
//! - [`RoleOverview`]: a role's top-level modules, entry to the root editors
//! - [`UserRoleEditor`]: roles held by one user
//!
//! The backend is reached only through the [`AccessBackend`] trait.

pub mod backend;
pub mod config;
pub mod diff;
pub mod error;
pub mod hierarchy;
pub mod logger;
pub mod overview;
pub mod privileges;
pub mod roles;
pub mod selection;
pub mod session;
pub mod sync;
pub mod tree;
pub mod user_roles;
pub mod validation;

// Re-exports
pub use backend::AccessBackend;
pub use config::EngineConfig;
pub use diff::FlagsSnapshot;
pub use error::{
    BackendError, BackendResult, EngineError, EngineResult, FailureKind, MalformedReason,
    MalformedTreeError, NotEditableReason, Operation,
};
pub use hierarchy::{DeletePlan, HierarchyRepository};
pub use overview::{RoleOverview, RootSummary};
pub use roles::{RoleDirectory, StatusFilter};
pub use session::{
    CloseDecision, ModulePrivilegeEditor, PrivilegeEntry, PrivilegeMatrixSession,
    RoleAccessSession, SessionContext,
};
pub use sync::{InFlight, InFlightGuard, OptimisticHandle, SyncClient};
pub use tree::{ModuleTree, Preorder, TreeNode};
pub use user_roles::UserRoleEditor;
