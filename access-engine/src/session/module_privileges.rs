//! Privileges a role holds on a single module

use super::SessionContext;
use crate::backend::{AccessBackend, accepted};
use crate::error::{EngineError, EngineResult, Operation};
use parking_lot::Mutex;
use shared::models::PrivilegeItem;
use shared::{ModuleId, PrivilegeId, RoleId};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Catalog entry plus whether the role holds it
#[derive(Debug, Clone, PartialEq)]
pub struct PrivilegeEntry {
    pub item: PrivilegeItem,
    pub checked: bool,
}

#[derive(Debug, Default)]
struct EditorState {
    entries: Vec<PrivilegeEntry>,
    persisted: BTreeSet<PrivilegeId>,
}

impl EditorState {
    fn selected(&self) -> Vec<PrivilegeId> {
        self.entries
            .iter()
            .filter(|e| e.checked)
            .map(|e| e.item.id)
            .collect()
    }
}

pub struct ModulePrivilegeEditor<B: ?Sized> {
    backend: Arc<B>,
    role_id: RoleId,
    module_id: ModuleId,
    ctx: SessionContext,
    state: Mutex<EditorState>,
}

impl<B: AccessBackend + ?Sized> ModulePrivilegeEditor<B> {
    /// Load the module's catalog and the role's current picks concurrently
    pub async fn open(backend: Arc<B>, role_id: RoleId, module_id: ModuleId) -> EngineResult<Self> {
        let editor = Self {
            backend,
            role_id,
            module_id,
            ctx: SessionContext::new(),
            state: Mutex::new(EditorState::default()),
        };
        editor.reload().await?;
        Ok(editor)
    }

    pub async fn reload(&self) -> EngineResult<()> {
        let _loading = self.ctx.begin_load()?;
        let reads = async {
            tokio::try_join!(
                self.backend.fetch_module_catalog(self.module_id),
                self.backend
                    .fetch_assigned_privileges(self.role_id, self.module_id),
            )
        };
        let (catalog, assigned) = self.ctx.sync().fetch(Operation::Load, reads).await?;

        let assigned: BTreeSet<PrivilegeId> = assigned.into_iter().collect();
        let entries: Vec<PrivilegeEntry> = catalog
            .into_iter()
            .map(|item| PrivilegeEntry {
                checked: assigned.contains(&item.id),
                item,
            })
            .collect();
        let persisted = entries
            .iter()
            .filter(|e| e.checked)
            .map(|e| e.item.id)
            .collect();

        tracing::debug!(
            session_id = %self.ctx.session_id(),
            role_id = self.role_id,
            module_id = self.module_id,
            catalog = entries.len(),
            "Module privileges loaded"
        );
        *self.state.lock() = EditorState { entries, persisted };
        Ok(())
    }

    pub fn role_id(&self) -> RoleId {
        self.role_id
    }

    pub fn module_id(&self) -> ModuleId {
        self.module_id
    }

    pub fn entries(&self) -> Vec<PrivilegeEntry> {
        self.state.lock().entries.clone()
    }

    /// Checked privilege ids in catalog order
    pub fn selected(&self) -> Vec<PrivilegeId> {
        self.state.lock().selected()
    }

    pub fn toggle(&self, privilege_id: PrivilegeId, value: bool) -> EngineResult<()> {
        self.ctx.sync().ensure_open()?;
        let mut state = self.state.lock();
        let entry = state
            .entries
            .iter_mut()
            .find(|e| e.item.id == privilege_id)
            .ok_or_else(|| {
                EngineError::Validation(format!(
                    "privilege {privilege_id} is not in the catalog of module {}",
                    self.module_id
                ))
            })?;
        entry.checked = value;
        Ok(())
    }

    pub fn toggle_all(&self, value: bool) -> EngineResult<()> {
        self.ctx.sync().ensure_open()?;
        for entry in self.state.lock().entries.iter_mut() {
            entry.checked = value;
        }
        Ok(())
    }

    /// Whether every catalog entry is checked (false for an empty catalog)
    pub fn all_checked(&self) -> bool {
        let state = self.state.lock();
        !state.entries.is_empty() && state.entries.iter().all(|e| e.checked)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        let state = self.state.lock();
        state.selected().into_iter().collect::<BTreeSet<_>>() != state.persisted
    }

    /// Replace the role's privileges on this module with the current picks
    pub async fn save(&self) -> EngineResult<()> {
        let _saving = self.ctx.begin_save()?;
        let selected = self.selected();

        let call = async {
            accepted(
                self.backend
                    .save_module_privileges(self.role_id, self.module_id, &selected)
                    .await?,
            )
        };
        self.ctx
            .sync()
            .commit_then_confirm(Operation::Save, call, |_| {
                self.state.lock().persisted = selected.iter().copied().collect();
            })
            .await?;

        tracing::info!(
            session_id = %self.ctx.session_id(),
            role_id = self.role_id,
            module_id = self.module_id,
            privileges = selected.len(),
            "Module privileges saved"
        );
        Ok(())
    }

    pub fn close(&self) {
        self.ctx.close();
    }
}
