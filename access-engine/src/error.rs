//! Engine error types
//!
//! Every failure the engine reports falls into one of four kinds, which
//! decides how a caller should react:
//!
//! | Kind         | Raised                          | Local state              |
//! |--------------|---------------------------------|--------------------------|
//! | `Structural` | before any network call         | untouched                |
//! | `Conflict`   | before any network call         | untouched                |
//! | `Transient`  | after a backend round trip      | rolled back or preserved |
//! | `Guard`      | on re-entry or after close      | untouched                |

use shared::ErrorCode;
use shared::models::ModuleLevel;
use shared::{ModuleId, RoleId};
use std::fmt;
use thiserror::Error;

/// Backend failure as seen through the [`AccessBackend`](crate::AccessBackend) seam
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Rejected by backend: {message}")]
    Rejected {
        code: Option<ErrorCode>,
        message: String,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            code: None,
            message: message.into(),
        }
    }

    /// Error code carried by (or implied by) this failure
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Transport(_) => ErrorCode::NetworkError,
            Self::Rejected { code, .. } => code.unwrap_or(ErrorCode::InternalError),
            Self::InvalidResponse(_) => ErrorCode::InvalidFormat,
        }
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Why a tree payload could not be turned into a [`ModuleTree`](crate::ModuleTree)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    /// The same id appears twice
    DuplicateId,
    /// A non-root node references a parent missing from the payload
    MissingParent(Option<ModuleId>),
    /// The node's level is not its parent's level plus one
    LevelMismatch {
        parent: ModuleLevel,
        child: ModuleLevel,
    },
    /// Nesting goes deeper than the three supported levels
    TooDeep,
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId => f.write_str("duplicate id"),
            Self::MissingParent(Some(parent)) => write!(f, "parent {parent} is missing"),
            Self::MissingParent(None) => f.write_str("non-root node without a parent"),
            Self::LevelMismatch { parent, child } => {
                write!(f, "level {child} cannot sit under level {parent}")
            }
            Self::TooDeep => f.write_str("nesting exceeds level 2"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Malformed tree at module {module_id}: {reason}")]
pub struct MalformedTreeError {
    pub module_id: ModuleId,
    pub reason: MalformedReason,
}

impl MalformedTreeError {
    pub fn new(module_id: ModuleId, reason: MalformedReason) -> Self {
        Self { module_id, reason }
    }
}

/// Operation names used by re-entry guards and log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Save,
    Toggle,
    CreateModule,
    UpdateModule,
    DeleteModule,
    CreateCatalog,
    RoleMutation,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Load => "load",
            Self::Save => "save",
            Self::Toggle => "toggle",
            Self::CreateModule => "create module",
            Self::UpdateModule => "update module",
            Self::DeleteModule => "delete module",
            Self::CreateCatalog => "create catalog",
            Self::RoleMutation => "role mutation",
        };
        f.write_str(name)
    }
}

/// Reason a module refuses privilege editing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotEditableReason {
    NotAssigned,
    NoCatalog,
}

impl fmt::Display for NotEditableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAssigned => f.write_str("module is not assigned to the role"),
            Self::NoCatalog => f.write_str("module has no privilege catalog"),
        }
    }
}

/// Coarse failure taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Structural,
    Conflict,
    Transient,
    Guard,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    MalformedTree(#[from] MalformedTreeError),

    #[error("Invalid hierarchy: {0}")]
    InvalidHierarchy(String),

    #[error("Module {0} not found")]
    UnknownModule(ModuleId),

    #[error("Role {0} not found")]
    UnknownRole(RoleId),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{entity} name '{name}' already exists")]
    Duplicate { entity: &'static str, name: String },

    #[error("A {0} is already in progress")]
    Busy(Operation),

    #[error("Session is closed")]
    SessionClosed,

    #[error("Module {module_id}: {reason}")]
    NotEditable {
        module_id: ModuleId,
        reason: NotEditableReason,
    },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl EngineError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::MalformedTree(_)
            | Self::InvalidHierarchy(_)
            | Self::UnknownModule(_)
            | Self::UnknownRole(_)
            | Self::Validation(_) => FailureKind::Structural,
            Self::Duplicate { .. } => FailureKind::Conflict,
            Self::Backend(_) => FailureKind::Transient,
            Self::Busy(_) | Self::SessionClosed | Self::NotEditable { .. } => FailureKind::Guard,
        }
    }

    /// Map to the shared error code space
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::MalformedTree(e) if e.reason == MalformedReason::TooDeep => {
                ErrorCode::MaxDepthExceeded
            }
            Self::MalformedTree(_) => ErrorCode::MalformedTree,
            Self::InvalidHierarchy(_) => ErrorCode::InvalidHierarchy,
            Self::UnknownModule(_) => ErrorCode::ModuleNotFound,
            Self::UnknownRole(_) => ErrorCode::RoleNotFound,
            Self::Validation(_) => ErrorCode::ValidationFailed,
            Self::Duplicate { entity, .. } if *entity == "role" => ErrorCode::RoleNameExists,
            Self::Duplicate { entity, .. } if *entity == "module" => ErrorCode::ModuleNameExists,
            Self::Duplicate { .. } => ErrorCode::AlreadyExists,
            Self::Busy(_) => ErrorCode::OperationInProgress,
            Self::SessionClosed => ErrorCode::SessionClosed,
            Self::NotEditable {
                reason: NotEditableReason::NotAssigned,
                ..
            } => ErrorCode::ModuleNotAssigned,
            Self::NotEditable {
                reason: NotEditableReason::NoCatalog,
                ..
            } => ErrorCode::NoPrivilegeCatalog,
            Self::Backend(e) => e.error_code(),
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind() == FailureKind::Transient
    }
}

impl From<EngineError> for shared::AppError {
    fn from(err: EngineError) -> Self {
        shared::AppError::with_message(err.error_code(), err.to_string())
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
