//! Backend seam
//!
//! Everything the engine needs from the remote access-control service.
//! `access-client` implements it over HTTP; tests use an in-memory fake.

use crate::error::{BackendError, BackendResult};
use async_trait::async_trait;
use shared::models::{
    AssignmentAck, CatalogCreate, ModuleMatrix, ModuleNode, ModulePatch, NewModule,
    PrivilegeItem, PrivilegeSaveRow, Role, RoleCreate, RoleTreeResponse, RoleUpdate, SaveAck,
};
use shared::{ModuleId, PrivilegeId, RoleId, UserId};

#[async_trait]
pub trait AccessBackend: Send + Sync {
    // ========== Module hierarchy ==========

    /// Whole forest, or the subtree below `root_id`
    async fn fetch_tree(
        &self,
        root_id: Option<ModuleId>,
        include_inactive: bool,
    ) -> BackendResult<Vec<ModuleNode>>;

    async fn create_node(&self, node: &NewModule) -> BackendResult<ModuleNode>;

    async fn update_node(&self, id: ModuleId, patch: &ModulePatch) -> BackendResult<ModuleNode>;

    /// Removes the module and everything below it
    async fn delete_node(&self, id: ModuleId) -> BackendResult<()>;

    // ========== Privilege matrix ==========

    async fn fetch_privilege_matrix(&self, root_id: ModuleId) -> BackendResult<Vec<ModuleMatrix>>;

    /// Full replacement of the flags stored under `root_id`
    async fn save_privilege_matrix(
        &self,
        root_id: ModuleId,
        rows: &[PrivilegeSaveRow],
    ) -> BackendResult<SaveAck>;

    async fn create_privilege_catalog(
        &self,
        module_id: ModuleId,
        catalog: &CatalogCreate,
    ) -> BackendResult<SaveAck>;

    // ========== Role module assignment ==========

    /// Top-level modules with the role's checked state, for choosing a root
    async fn fetch_role_overview(&self, role_id: RoleId) -> BackendResult<RoleTreeResponse>;

    async fn fetch_role_tree(
        &self,
        role_id: RoleId,
        root_id: ModuleId,
    ) -> BackendResult<RoleTreeResponse>;

    /// Full replacement of the modules `role_id` holds under `root_id`
    async fn save_role_modules(
        &self,
        role_id: RoleId,
        root_id: ModuleId,
        module_ids: &[ModuleId],
    ) -> BackendResult<AssignmentAck>;

    // ========== Per-module role privileges ==========

    async fn fetch_module_catalog(&self, module_id: ModuleId) -> BackendResult<Vec<PrivilegeItem>>;

    async fn fetch_assigned_privileges(
        &self,
        role_id: RoleId,
        module_id: ModuleId,
    ) -> BackendResult<Vec<PrivilegeId>>;

    async fn save_module_privileges(
        &self,
        role_id: RoleId,
        module_id: ModuleId,
        privilege_ids: &[PrivilegeId],
    ) -> BackendResult<SaveAck>;

    // ========== Roles ==========

    async fn list_roles(&self) -> BackendResult<Vec<Role>>;

    async fn create_role(&self, role: &RoleCreate) -> BackendResult<Role>;

    async fn update_role(&self, id: RoleId, update: &RoleUpdate) -> BackendResult<Role>;

    async fn set_role_status(&self, id: RoleId, active: bool) -> BackendResult<Role>;

    async fn delete_role(&self, id: RoleId) -> BackendResult<()>;

    // ========== User roles ==========

    async fn fetch_user_roles(&self, user_id: UserId) -> BackendResult<Vec<RoleId>>;

    /// Full replacement of the roles `user_id` holds
    async fn save_user_roles(&self, user_id: UserId, role_ids: &[RoleId])
    -> BackendResult<SaveAck>;
}

/// Turn a `success: false` acknowledgement into an error
///
/// Acks decoded from an empty body default to accepted.
pub fn accepted(ack: SaveAck) -> BackendResult<SaveAck> {
    if ack.success {
        Ok(ack)
    } else {
        Err(BackendError::rejected(
            ack.message.unwrap_or_else(|| "save rejected".to_string()),
        ))
    }
}

/// Same as [`accepted`] for role module saves
pub fn assignment_accepted(ack: AssignmentAck) -> BackendResult<AssignmentAck> {
    if ack.success {
        Ok(ack)
    } else {
        Err(BackendError::rejected("module assignment rejected"))
    }
}
