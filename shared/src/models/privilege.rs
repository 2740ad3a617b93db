//! Privilege Model
//!
//! CRUD-style capability bits assigned per module, plus the matrix rows
//! the backend returns for a hierarchy root.

use crate::serde_helpers::{default_true, loose_bool};
use crate::types::{ModuleId, PrivilegeId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// One of the four capability bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivilegeKind {
    Create,
    List,
    Edit,
    Delete,
}

impl PrivilegeKind {
    pub const ALL: [PrivilegeKind; 4] = [Self::Create, Self::List, Self::Edit, Self::Delete];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::List => "list",
            Self::Edit => "edit",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for PrivilegeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Four independent capability bits, always all present
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrivilegeFlags {
    #[serde(deserialize_with = "loose_bool", default)]
    pub create: bool,
    #[serde(deserialize_with = "loose_bool", default)]
    pub list: bool,
    #[serde(deserialize_with = "loose_bool", default)]
    pub edit: bool,
    #[serde(deserialize_with = "loose_bool", default)]
    pub delete: bool,
}

impl PrivilegeFlags {
    /// No capability granted
    pub const NONE: PrivilegeFlags = PrivilegeFlags {
        create: false,
        list: false,
        edit: false,
        delete: false,
    };

    /// Every capability granted
    pub const ALL: PrivilegeFlags = PrivilegeFlags {
        create: true,
        list: true,
        edit: true,
        delete: true,
    };

    pub fn get(&self, kind: PrivilegeKind) -> bool {
        match kind {
            PrivilegeKind::Create => self.create,
            PrivilegeKind::List => self.list,
            PrivilegeKind::Edit => self.edit,
            PrivilegeKind::Delete => self.delete,
        }
    }

    pub fn set(&mut self, kind: PrivilegeKind, value: bool) {
        match kind {
            PrivilegeKind::Create => self.create = value,
            PrivilegeKind::List => self.list = value,
            PrivilegeKind::Edit => self.edit = value,
            PrivilegeKind::Delete => self.delete = value,
        }
    }

    /// Copy with one bit replaced
    pub fn with(mut self, kind: PrivilegeKind, value: bool) -> Self {
        self.set(kind, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }

    /// Granted kinds, in canonical order
    pub fn granted(&self) -> impl Iterator<Item = PrivilegeKind> + '_ {
        PrivilegeKind::ALL.into_iter().filter(|k| self.get(*k))
    }
}

impl BitOr for PrivilegeFlags {
    type Output = PrivilegeFlags;

    fn bitor(self, rhs: PrivilegeFlags) -> PrivilegeFlags {
        PrivilegeFlags {
            create: self.create || rhs.create,
            list: self.list || rhs.list,
            edit: self.edit || rhs.edit,
            delete: self.delete || rhs.delete,
        }
    }
}

impl BitOrAssign for PrivilegeFlags {
    fn bitor_assign(&mut self, rhs: PrivilegeFlags) {
        *self = *self | rhs;
    }
}

/// One privilege catalog row under a module, as returned by the matrix endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivilegeMatrixRow {
    /// Catalog grouping name
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub flags: PrivilegeFlags,
}

impl PrivilegeMatrixRow {
    pub fn new(name: impl Into<String>, flags: PrivilegeFlags) -> Self {
        Self {
            name: name.into(),
            flags,
        }
    }
}

/// Matrix entry for one module under a hierarchy root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleMatrix {
    pub module_id: ModuleId,
    #[serde(default)]
    pub module_name: String,
    #[serde(default)]
    pub rows: Vec<PrivilegeMatrixRow>,
}

/// Per-module save row; the whole set replaces the stored flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivilegeSaveRow {
    pub module_id: ModuleId,
    #[serde(default)]
    pub module_name: String,
    #[serde(flatten)]
    pub flags: PrivilegeFlags,
}

/// Body of the matrix save request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivilegeMatrixSave {
    pub modules: Vec<PrivilegeSaveRow>,
}

/// Generic acknowledgement returned by save endpoints
///
/// An empty 2xx body decodes as accepted; only an explicit
/// `success: false` is a rejection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveAck {
    #[serde(deserialize_with = "loose_bool", default = "default_true")]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SaveAck {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

/// Body for provisioning a default CRUD catalog on a module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogCreate {
    pub name: String,
    pub actions: Vec<String>,
    #[serde(deserialize_with = "loose_bool", default)]
    pub active: bool,
}

/// Privilege catalog entry of a single module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivilegeItem {
    pub id: PrivilegeId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body for saving the privileges a role holds on one module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModulePrivilegesUpdate {
    pub privileges: Vec<PrivilegeId>,
}
