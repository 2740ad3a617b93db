//! Role overview
//!
//! Entry screen for a role: its header and every top-level module with
//! whether the role holds it. A root is picked here before its subtree
//! editor ([`RoleAccessSession`]) is opened.

use crate::backend::AccessBackend;
use crate::error::{BackendError, EngineError, EngineResult};
use crate::session::RoleAccessSession;
use shared::models::RoleInfo;
use shared::{ModuleId, RoleId};
use std::sync::Arc;

/// One top-level module as seen from a role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootSummary {
    pub module_id: ModuleId,
    pub name: String,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoleOverview {
    role_id: RoleId,
    role: RoleInfo,
    roots: Vec<RootSummary>,
}

impl RoleOverview {
    pub async fn load<B: AccessBackend + ?Sized>(backend: &B, role_id: RoleId) -> EngineResult<Self> {
        let response = backend.fetch_role_overview(role_id).await.map_err(|e| {
            tracing::warn!(role_id, error = %e, "Role overview request failed");
            EngineError::from(e)
        })?;
        if !response.success {
            return Err(BackendError::rejected("role overview request failed").into());
        }

        let roots: Vec<RootSummary> = response
            .data
            .into_iter()
            .map(|node| RootSummary {
                module_id: node.id,
                name: node.name,
                checked: node.checked,
            })
            .collect();
        tracing::info!(role_id, roots = roots.len(), "Role overview loaded");
        Ok(Self {
            role_id,
            role: response.role.unwrap_or_default(),
            roots,
        })
    }

    pub fn role_id(&self) -> RoleId {
        self.role_id
    }

    pub fn role(&self) -> &RoleInfo {
        &self.role
    }

    /// Role name, or `Role #<id>` when the backend sent none
    pub fn display_name(&self) -> String {
        self.role
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map_or_else(|| format!("Role #{}", self.role_id), str::to_string)
    }

    pub fn roots(&self) -> &[RootSummary] {
        &self.roots
    }

    pub fn root(&self, module_id: ModuleId) -> Option<&RootSummary> {
        self.roots.iter().find(|r| r.module_id == module_id)
    }

    pub fn assigned_roots(&self) -> impl Iterator<Item = &RootSummary> {
        self.roots.iter().filter(|r| r.checked)
    }

    /// Open the module editor for one of the listed roots
    pub async fn open_root<B: AccessBackend + ?Sized>(
        &self,
        backend: Arc<B>,
        root_id: ModuleId,
    ) -> EngineResult<RoleAccessSession<B>> {
        if self.root(root_id).is_none() {
            return Err(EngineError::UnknownModule(root_id));
        }
        RoleAccessSession::open(backend, self.role_id, root_id).await
    }
}
