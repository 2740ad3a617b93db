//! Role module assignment editor

use super::SessionContext;
use super::module_privileges::ModulePrivilegeEditor;
use crate::backend::{AccessBackend, assignment_accepted};
use crate::error::{BackendError, EngineError, EngineResult, NotEditableReason, Operation};
use crate::tree::ModuleTree;
use parking_lot::Mutex;
use shared::models::{RoleInfo, RoleModuleAssignment};
use shared::{ModuleId, RoleId};
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
struct RoleAccessState {
    role: RoleInfo,
    tree: ModuleTree,
    /// Selection last acknowledged by the backend
    persisted: BTreeSet<ModuleId>,
}

/// Which modules under one root a role holds
pub struct RoleAccessSession<B: ?Sized> {
    backend: Arc<B>,
    role_id: RoleId,
    root_id: ModuleId,
    ctx: SessionContext,
    state: Mutex<RoleAccessState>,
}

impl<B: AccessBackend + ?Sized> RoleAccessSession<B> {
    /// Open the editor and load the role's tree under `root_id`
    pub async fn open(backend: Arc<B>, role_id: RoleId, root_id: ModuleId) -> EngineResult<Self> {
        let session = Self {
            backend,
            role_id,
            root_id,
            ctx: SessionContext::new(),
            state: Mutex::new(RoleAccessState::default()),
        };
        session.reload().await?;
        Ok(session)
    }

    /// Replace local state with the backend's current view
    pub async fn reload(&self) -> EngineResult<()> {
        let _loading = self.ctx.begin_load()?;
        let response = self
            .ctx
            .sync()
            .fetch(
                Operation::Load,
                self.backend.fetch_role_tree(self.role_id, self.root_id),
            )
            .await?;
        if !response.success {
            return Err(BackendError::rejected("role module tree request failed").into());
        }

        let tree = ModuleTree::from_role_tree(response.data, Some(self.root_id))?;
        let persisted = tree.collect_checked();
        tracing::info!(
            session_id = %self.ctx.session_id(),
            role_id = self.role_id,
            root_id = self.root_id,
            modules = tree.len(),
            checked = persisted.len(),
            "Role module tree loaded"
        );
        *self.state.lock() = RoleAccessState {
            role: response.role.unwrap_or_default(),
            tree,
            persisted,
        };
        Ok(())
    }

    pub fn role_id(&self) -> RoleId {
        self.role_id
    }

    pub fn root_id(&self) -> ModuleId {
        self.root_id
    }

    pub fn session_id(&self) -> Uuid {
        self.ctx.session_id()
    }

    pub fn role(&self) -> RoleInfo {
        self.state.lock().role.clone()
    }

    /// True while a save or a persisted toggle is outstanding
    pub fn is_saving(&self) -> bool {
        self.ctx.is_saving() || self.ctx.is_toggling()
    }

    /// Read access to the current tree
    pub fn with_tree<R>(&self, read: impl FnOnce(&ModuleTree) -> R) -> R {
        read(&self.state.lock().tree)
    }

    pub fn checked_ids(&self) -> BTreeSet<ModuleId> {
        self.state.lock().tree.collect_checked()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        let state = self.state.lock();
        state.tree.collect_checked() != state.persisted
    }

    /// Local toggle with cascade and bubble-up; nothing is sent
    pub fn toggle_local(&self, module_id: ModuleId, value: bool) -> EngineResult<()> {
        self.ctx.sync().ensure_open()?;
        self.state.lock().tree.toggle(module_id, value)
    }

    /// Check or uncheck everything locally
    pub fn check_all(&self, value: bool) -> EngineResult<()> {
        self.ctx.sync().ensure_open()?;
        self.state.lock().tree.check_all_roots(value);
        Ok(())
    }

    /// Toggle and persist immediately; the toggle is undone if the save fails
    pub async fn toggle(&self, module_id: ModuleId, value: bool) -> EngineResult<()> {
        let _toggling = self.ctx.begin_toggle()?;
        let backend = &self.backend;
        let (role_id, root_id) = (self.role_id, self.root_id);

        let sent = self
            .ctx
            .sync()
            .optimistic(
                Operation::Toggle,
                &self.state,
                |state| {
                    state.tree.toggle(module_id, value)?;
                    Ok(state.tree.collect_checked())
                },
                |selection| async move {
                    let ids: Vec<ModuleId> = selection.iter().copied().collect();
                    assignment_accepted(backend.save_role_modules(role_id, root_id, &ids).await?)?;
                    Ok::<_, BackendError>(selection)
                },
            )
            .await?;

        tracing::debug!(
            session_id = %self.ctx.session_id(),
            role_id,
            root_id,
            module_id,
            value,
            "Module assignment toggled"
        );
        self.state.lock().persisted = sent;
        Ok(())
    }

    /// Persist the current selection; on failure local edits stay for a retry
    pub async fn save(&self) -> EngineResult<u64> {
        let _saving = self.ctx.begin_save()?;
        let selection = self.checked_ids();
        let ids: Vec<ModuleId> = selection.iter().copied().collect();

        let call = async {
            assignment_accepted(
                self.backend
                    .save_role_modules(self.role_id, self.root_id, &ids)
                    .await?,
            )
        };
        let ack = self
            .ctx
            .sync()
            .commit_then_confirm(Operation::Save, call, |_| {
                self.state.lock().persisted = selection.clone();
            })
            .await?;

        let count = ack.count.unwrap_or(ids.len() as u64);
        tracing::info!(
            session_id = %self.ctx.session_id(),
            role_id = self.role_id,
            root_id = self.root_id,
            count,
            "Module assignment saved"
        );
        Ok(count)
    }

    /// Assignment state of one module
    pub fn assignment(&self, module_id: ModuleId) -> EngineResult<RoleModuleAssignment> {
        let state = self.state.lock();
        let node = state.tree.find(module_id)?;
        Ok(RoleModuleAssignment {
            role_id: self.role_id,
            module_id,
            checked: node.is_checked(),
            has_privilege_catalog: node.has_privilege_catalog,
        })
    }

    /// Every module in display order
    pub fn assignments(&self) -> Vec<RoleModuleAssignment> {
        let state = self.state.lock();
        state
            .tree
            .iter()
            .map(|node| RoleModuleAssignment {
                role_id: self.role_id,
                module_id: node.id,
                checked: node.is_checked(),
                has_privilege_catalog: node.has_privilege_catalog,
            })
            .collect()
    }

    /// Privilege editing is only offered for assigned modules with a catalog
    pub fn ensure_privileges_editable(&self, module_id: ModuleId) -> EngineResult<()> {
        let assignment = self.assignment(module_id)?;
        let reason = if !assignment.checked {
            NotEditableReason::NotAssigned
        } else if !assignment.has_privilege_catalog {
            NotEditableReason::NoCatalog
        } else {
            return Ok(());
        };
        Err(EngineError::NotEditable { module_id, reason })
    }

    /// Open the per-module privilege editor for this role
    pub async fn open_privileges(
        &self,
        module_id: ModuleId,
    ) -> EngineResult<ModulePrivilegeEditor<B>> {
        self.ctx.sync().ensure_open()?;
        self.ensure_privileges_editable(module_id)?;
        ModulePrivilegeEditor::open(Arc::clone(&self.backend), self.role_id, module_id).await
    }

    /// Drop a module deleted elsewhere, with its descendants
    ///
    /// Parents keep their state; nothing is recomputed.
    pub fn forget_module(&self, module_id: ModuleId) -> Vec<ModuleId> {
        let mut state = self.state.lock();
        let removed = state.tree.remove_subtree(module_id);
        for id in &removed {
            state.persisted.remove(id);
        }
        removed
    }

    /// Stop accepting calls; late results are discarded
    pub fn close(&self) {
        self.ctx.close();
    }

    pub fn is_closed(&self) -> bool {
        self.ctx.is_closed()
    }
}
