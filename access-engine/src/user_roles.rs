//! User role assignment
//!
//! Which roles one user holds. The role catalog and the user's current roles
//! are read together; picks are local until [`UserRoleEditor::save`] sends
//! the whole set, commit-then-confirm.

use crate::backend::{AccessBackend, accepted};
use crate::error::{EngineError, EngineResult, Operation};
use crate::sync::{InFlight, SyncClient};
use crate::validation::normalize_name;
use parking_lot::Mutex;
use shared::models::{Role, UserRoles};
use shared::{RoleId, UserId};
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Debug, Default)]
struct UserRoleState {
    catalog: Vec<Role>,
    selected: BTreeSet<RoleId>,
    persisted: BTreeSet<RoleId>,
}

pub struct UserRoleEditor<B: ?Sized> {
    backend: Arc<B>,
    user_id: UserId,
    sync: SyncClient,
    loading: InFlight,
    saving: InFlight,
    state: Mutex<UserRoleState>,
}

impl<B: AccessBackend + ?Sized> UserRoleEditor<B> {
    pub async fn open(backend: Arc<B>, user_id: UserId) -> EngineResult<Self> {
        let editor = Self {
            backend,
            user_id,
            sync: SyncClient::new(),
            loading: InFlight::new(Operation::Load),
            saving: InFlight::new(Operation::Save),
            state: Mutex::new(UserRoleState::default()),
        };
        editor.reload().await?;
        Ok(editor)
    }

    /// Fetch the catalog and the user's roles; nothing changes if either fails
    pub async fn reload(&self) -> EngineResult<()> {
        let _loading = self.loading.try_begin()?;
        let reads = async {
            tokio::try_join!(
                self.backend.list_roles(),
                self.backend.fetch_user_roles(self.user_id),
            )
        };
        let (catalog, assigned) = self.sync.fetch(Operation::Load, reads).await?;

        let persisted: BTreeSet<RoleId> = assigned.into_iter().collect();
        tracing::info!(
            session_id = %self.sync.session_id(),
            user_id = self.user_id,
            roles = catalog.len(),
            assigned = persisted.len(),
            "User roles loaded"
        );
        *self.state.lock() = UserRoleState {
            catalog,
            selected: persisted.clone(),
            persisted,
        };
        Ok(())
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn roles(&self) -> Vec<Role> {
        self.state.lock().catalog.clone()
    }

    /// Catalog roles whose name contains `query` (case-insensitive)
    pub fn filtered(&self, query: &str) -> Vec<Role> {
        let needle = normalize_name(query);
        self.state
            .lock()
            .catalog
            .iter()
            .filter(|r| needle.is_empty() || normalize_name(&r.name).contains(&needle))
            .cloned()
            .collect()
    }

    pub fn is_selected(&self, role_id: RoleId) -> bool {
        self.state.lock().selected.contains(&role_id)
    }

    pub fn selected_ids(&self) -> BTreeSet<RoleId> {
        self.state.lock().selected.clone()
    }

    /// Pick or drop a catalog role locally
    pub fn toggle(&self, role_id: RoleId, checked: bool) -> EngineResult<()> {
        self.sync.ensure_open()?;
        let mut state = self.state.lock();
        if !state.catalog.iter().any(|r| r.id == role_id) {
            return Err(EngineError::UnknownRole(role_id));
        }
        if checked {
            state.selected.insert(role_id);
        } else {
            state.selected.remove(&role_id);
        }
        Ok(())
    }

    pub fn has_unsaved_changes(&self) -> bool {
        let state = self.state.lock();
        state.selected != state.persisted
    }

    pub fn is_saving(&self) -> bool {
        self.saving.is_busy()
    }

    /// Replace the user's roles with the current picks
    ///
    /// A failed save keeps the picks so it can be retried.
    pub async fn save(&self) -> EngineResult<UserRoles> {
        self.sync.ensure_open()?;
        let _saving = self.saving.try_begin()?;
        let selection = self.selected_ids();
        let ids: Vec<RoleId> = selection.iter().copied().collect();

        let call = async { accepted(self.backend.save_user_roles(self.user_id, &ids).await?) };
        self.sync
            .commit_then_confirm(Operation::Save, call, |_| {
                self.state.lock().persisted = selection.clone();
            })
            .await?;

        tracing::info!(
            session_id = %self.sync.session_id(),
            user_id = self.user_id,
            count = ids.len(),
            "User roles saved"
        );
        Ok(UserRoles {
            user_id: self.user_id,
            role_ids: ids,
        })
    }

    /// Stop accepting calls; late results are discarded
    pub fn close(&self) {
        self.sync.close();
    }

    pub fn is_closed(&self) -> bool {
        self.sync.is_closed()
    }
}
