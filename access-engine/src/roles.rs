//! Role directory
//!
//! Local list of roles with create/rename/status/delete. Names are unique
//! after normalization ("  Admin " and "admin" collide), checked before any
//! request is sent. Status toggles are optimistic.

use crate::backend::AccessBackend;
use crate::error::{EngineError, EngineResult, Operation};
use crate::sync::{InFlight, SyncClient};
use crate::validation::{MAX_NAME_LEN, ensure_unique_name, normalize_name, validate_required_text};
use parking_lot::Mutex;
use shared::RoleId;
use shared::models::{Role, RoleCreate, RoleUpdate};
use std::sync::Arc;

/// Status filter for [`RoleDirectory::filtered`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl StatusFilter {
    pub fn matches(&self, role: &Role) -> bool {
        match self {
            Self::All => true,
            Self::Active => role.active,
            Self::Inactive => !role.active,
        }
    }
}

pub struct RoleDirectory<B: ?Sized> {
    backend: Arc<B>,
    sync: SyncClient,
    loading: InFlight,
    mutating: InFlight,
    roles: Mutex<Vec<Role>>,
}

impl<B: AccessBackend + ?Sized> RoleDirectory<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            sync: SyncClient::new(),
            loading: InFlight::new(Operation::Load),
            mutating: InFlight::new(Operation::RoleMutation),
            roles: Mutex::new(Vec::new()),
        }
    }

    pub async fn load(&self) -> EngineResult<Vec<Role>> {
        let _loading = self.loading.try_begin()?;
        let roles = self
            .sync
            .fetch(Operation::Load, self.backend.list_roles())
            .await?;
        tracing::info!(count = roles.len(), "Roles loaded");
        *self.roles.lock() = roles.clone();
        Ok(roles)
    }

    pub fn roles(&self) -> Vec<Role> {
        self.roles.lock().clone()
    }

    pub fn get(&self, id: RoleId) -> Option<Role> {
        self.roles.lock().iter().find(|r| r.id == id).cloned()
    }

    /// Roles matching `status` whose name contains `query` (case-insensitive)
    pub fn filtered(&self, status: StatusFilter, query: &str) -> Vec<Role> {
        let needle = normalize_name(query);
        self.roles
            .lock()
            .iter()
            .filter(|r| status.matches(r))
            .filter(|r| needle.is_empty() || normalize_name(&r.name).contains(&needle))
            .cloned()
            .collect()
    }

    fn ensure_unique(&self, name: &str, exclude: Option<RoleId>) -> EngineResult<()> {
        let roles = self.roles.lock();
        let names = roles
            .iter()
            .filter(|r| Some(r.id) != exclude)
            .map(|r| r.name.as_str());
        ensure_unique_name("role", name, names)
    }

    pub async fn create(&self, name: &str, active: bool) -> EngineResult<Role> {
        validate_required_text(name, "role name", MAX_NAME_LEN)?;
        self.ensure_unique(name, None)?;

        let _mutating = self.mutating.try_begin()?;
        let payload = RoleCreate {
            name: name.trim().to_string(),
            active,
        };
        let role = self
            .sync
            .fetch(Operation::RoleMutation, self.backend.create_role(&payload))
            .await?;

        tracing::info!(role_id = role.id, name = %role.name, "Role created");
        self.roles.lock().push(role.clone());
        Ok(role)
    }

    pub async fn rename(&self, id: RoleId, name: &str) -> EngineResult<Role> {
        validate_required_text(name, "role name", MAX_NAME_LEN)?;
        if self.get(id).is_none() {
            return Err(EngineError::UnknownRole(id));
        }
        self.ensure_unique(name, Some(id))?;

        let _mutating = self.mutating.try_begin()?;
        let update = RoleUpdate {
            name: Some(name.trim().to_string()),
            active: None,
        };
        let role = self
            .sync
            .fetch(
                Operation::RoleMutation,
                self.backend.update_role(id, &update),
            )
            .await?;

        tracing::info!(role_id = id, name = %role.name, "Role renamed");
        self.replace(role.clone());
        Ok(role)
    }

    /// Flip a role's status immediately; restored if the backend refuses
    pub async fn toggle_status(&self, id: RoleId) -> EngineResult<Role> {
        let _mutating = self.mutating.try_begin()?;
        let backend = &self.backend;

        let role = self
            .sync
            .optimistic(
                Operation::RoleMutation,
                &self.roles,
                |roles| {
                    let role = roles
                        .iter_mut()
                        .find(|r| r.id == id)
                        .ok_or(EngineError::UnknownRole(id))?;
                    role.active = !role.active;
                    Ok(role.active)
                },
                |active| backend.set_role_status(id, active),
            )
            .await?;

        tracing::info!(role_id = id, active = role.active, "Role status changed");
        self.replace(role.clone());
        Ok(role)
    }

    pub async fn delete(&self, id: RoleId) -> EngineResult<()> {
        if self.get(id).is_none() {
            return Err(EngineError::UnknownRole(id));
        }
        let _mutating = self.mutating.try_begin()?;
        self.sync
            .fetch(Operation::RoleMutation, self.backend.delete_role(id))
            .await?;

        tracing::info!(role_id = id, "Role deleted");
        self.roles.lock().retain(|r| r.id != id);
        Ok(())
    }

    fn replace(&self, role: Role) {
        let mut roles = self.roles.lock();
        match roles.iter_mut().find(|r| r.id == role.id) {
            Some(slot) => *slot = role,
            None => roles.push(role),
        }
    }
}
