//! Role Model

use super::module::ModuleLevel;
use crate::serde_helpers::{default_true, loose_bool};
use crate::types::{ModuleId, RoleId, UserId};
use serde::{Deserialize, Serialize};

/// Role entity (RBAC subject receiving module access and privileges)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    #[serde(deserialize_with = "loose_bool", default)]
    pub active: bool,
}

/// Create role payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleCreate {
    pub name: String,
    #[serde(deserialize_with = "loose_bool", default)]
    pub active: bool,
}

/// Update role payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Role header attached to a role module tree response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(deserialize_with = "loose_bool", default)]
    pub active: bool,
}

/// Module node in a role's module tree, decorated with selection state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleModuleNode {
    pub id: ModuleId,
    pub name: String,
    /// Absent on some backends; inferred from depth when missing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<ModuleLevel>,
    #[serde(deserialize_with = "loose_bool", default)]
    pub checked: bool,
    #[serde(deserialize_with = "loose_bool", default)]
    pub has_privilege_catalog: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RoleModuleNode>,
}

impl RoleModuleNode {
    pub fn new(id: ModuleId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            level: None,
            checked: false,
            has_privilege_catalog: false,
            children: Vec::new(),
        }
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn with_catalog(mut self, has_catalog: bool) -> Self {
        self.has_privilege_catalog = has_catalog;
        self
    }

    pub fn with_children(mut self, children: Vec<RoleModuleNode>) -> Self {
        self.children = children;
        self
    }
}

/// Response of the role module tree endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleTreeResponse {
    #[serde(deserialize_with = "loose_bool", default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub role: Option<RoleInfo>,
    #[serde(default)]
    pub data: Vec<RoleModuleNode>,
}

/// Body replacing the modules a role holds under one root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleModulesUpdate {
    pub modules: Vec<ModuleId>,
}

/// Acknowledgement of a role module save; an empty body counts as accepted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentAck {
    #[serde(deserialize_with = "loose_bool", default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub count: Option<u64>,
}

/// One entry of a user's assigned-role list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedRole {
    #[serde(alias = "id")]
    pub role_id: RoleId,
}

/// Body replacing every role a user holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRolesUpdate {
    pub roles: Vec<RoleId>,
}

/// Roles held by one user, as last acknowledged by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserRoles {
    pub user_id: UserId,
    pub role_ids: Vec<RoleId>,
}

/// Persisted role/module assignment as the backend stores it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleModuleAssignment {
    pub role_id: RoleId,
    pub module_id: ModuleId,
    pub checked: bool,
    pub has_privilege_catalog: bool,
}

impl RoleModuleAssignment {
    /// Privilege editing is only reachable for assigned modules with a catalog
    pub fn privileges_editable(&self) -> bool {
        self.checked && self.has_privilege_catalog
    }
}
