//! [`AccessBackend`] over HTTP
//!
//! | Operation                 | Request                                              |
//! |---------------------------|------------------------------------------------------|
//! | module tree               | `GET /api/modules/tree?root_id=&include_inactive=`   |
//! | create / update / delete  | `POST /api/modules`, `PATCH` / `DELETE /api/modules/{id}` |
//! | privilege matrix          | `GET` / `POST /api/modules/{root}/privileges/matrix` |
//! | catalog provisioning      | `POST /api/modules/{id}/privileges/catalog`          |
//! | module catalog            | `GET /api/modules/{id}/privileges`                   |
//! | role overview             | `GET /api/roles/{role}/modules-tree`                 |
//! | role module tree          | `GET /api/roles/{role}/modules/{root}/tree`          |
//! | role module save          | `PUT /api/roles/{role}/modules/{root}`               |
//! | role module privileges    | `GET` / `PUT /api/roles/{role}/modules/{id}/privileges` |
//! | roles                     | `/api/roles`, `/api/roles/{id}`, `/api/roles/{id}/status` |
//! | user roles                | `GET` / `POST /api/users/{user}/roles`               |
//!
//! List and entity endpoints answer with the [`ApiResponse`] envelope; save
//! endpoints answer with their acknowledgement body directly. An empty 2xx
//! body on a save endpoint is an accepted ack.

use crate::HttpClient;
use crate::http::{into_data, into_unit};
use access_engine::{AccessBackend, BackendResult};
use async_trait::async_trait;
use serde::Serialize;
use shared::ApiResponse;
use shared::models::{
    AssignedRole, AssignmentAck, CatalogCreate, ModuleMatrix, ModuleNode, ModulePatch,
    ModulePrivilegesUpdate, NewModule, PrivilegeItem, PrivilegeMatrixSave, PrivilegeSaveRow, Role,
    RoleCreate, RoleModulesUpdate, RoleTreeResponse, RoleUpdate, SaveAck, UserRolesUpdate,
};
use shared::{ModuleId, PrivilegeId, RoleId, UserId};

#[derive(Debug, Serialize)]
struct TreeQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    root_id: Option<ModuleId>,
    include_inactive: bool,
}

#[async_trait]
impl AccessBackend for HttpClient {
    async fn fetch_tree(
        &self,
        root_id: Option<ModuleId>,
        include_inactive: bool,
    ) -> BackendResult<Vec<ModuleNode>> {
        let query = TreeQuery {
            root_id,
            include_inactive,
        };
        let response: ApiResponse<Vec<ModuleNode>> =
            self.get_with_query("/api/modules/tree", &query).await?;
        Ok(into_data(response, "module tree")?)
    }

    async fn create_node(&self, node: &NewModule) -> BackendResult<ModuleNode> {
        let response: ApiResponse<ModuleNode> = self.post("/api/modules", node).await?;
        Ok(into_data(response, "module")?)
    }

    async fn update_node(&self, id: ModuleId, patch: &ModulePatch) -> BackendResult<ModuleNode> {
        let response: ApiResponse<ModuleNode> =
            self.patch(&format!("/api/modules/{id}"), patch).await?;
        Ok(into_data(response, "module")?)
    }

    async fn delete_node(&self, id: ModuleId) -> BackendResult<()> {
        let response: ApiResponse<serde_json::Value> =
            self.delete(&format!("/api/modules/{id}")).await?;
        Ok(into_unit(response)?)
    }

    async fn fetch_privilege_matrix(&self, root_id: ModuleId) -> BackendResult<Vec<ModuleMatrix>> {
        let response: ApiResponse<Vec<ModuleMatrix>> = self
            .get(&format!("/api/modules/{root_id}/privileges/matrix"))
            .await?;
        Ok(into_data(response, "privilege matrix")?)
    }

    async fn save_privilege_matrix(
        &self,
        root_id: ModuleId,
        rows: &[PrivilegeSaveRow],
    ) -> BackendResult<SaveAck> {
        let body = PrivilegeMatrixSave {
            modules: rows.to_vec(),
        };
        Ok(self
            .post(&format!("/api/modules/{root_id}/privileges/matrix"), &body)
            .await?)
    }

    async fn create_privilege_catalog(
        &self,
        module_id: ModuleId,
        catalog: &CatalogCreate,
    ) -> BackendResult<SaveAck> {
        Ok(self
            .post(
                &format!("/api/modules/{module_id}/privileges/catalog"),
                catalog,
            )
            .await?)
    }

    async fn fetch_role_overview(&self, role_id: RoleId) -> BackendResult<RoleTreeResponse> {
        Ok(self.get(&format!("/api/roles/{role_id}/modules-tree")).await?)
    }

    async fn fetch_role_tree(
        &self,
        role_id: RoleId,
        root_id: ModuleId,
    ) -> BackendResult<RoleTreeResponse> {
        Ok(self
            .get(&format!("/api/roles/{role_id}/modules/{root_id}/tree"))
            .await?)
    }

    async fn save_role_modules(
        &self,
        role_id: RoleId,
        root_id: ModuleId,
        module_ids: &[ModuleId],
    ) -> BackendResult<AssignmentAck> {
        let body = RoleModulesUpdate {
            modules: module_ids.to_vec(),
        };
        tracing::debug!(role_id, root_id, count = module_ids.len(), "Saving role modules");
        Ok(self
            .put(&format!("/api/roles/{role_id}/modules/{root_id}"), &body)
            .await?)
    }

    async fn fetch_module_catalog(&self, module_id: ModuleId) -> BackendResult<Vec<PrivilegeItem>> {
        let response: ApiResponse<Vec<PrivilegeItem>> = self
            .get(&format!("/api/modules/{module_id}/privileges"))
            .await?;
        Ok(into_data(response, "privilege catalog")?)
    }

    async fn fetch_assigned_privileges(
        &self,
        role_id: RoleId,
        module_id: ModuleId,
    ) -> BackendResult<Vec<PrivilegeId>> {
        let response: ApiResponse<Vec<PrivilegeId>> = self
            .get(&format!("/api/roles/{role_id}/modules/{module_id}/privileges"))
            .await?;
        Ok(into_data(response, "assigned privileges")?)
    }

    async fn save_module_privileges(
        &self,
        role_id: RoleId,
        module_id: ModuleId,
        privilege_ids: &[PrivilegeId],
    ) -> BackendResult<SaveAck> {
        let body = ModulePrivilegesUpdate {
            privileges: privilege_ids.to_vec(),
        };
        Ok(self
            .put(
                &format!("/api/roles/{role_id}/modules/{module_id}/privileges"),
                &body,
            )
            .await?)
    }

    async fn list_roles(&self) -> BackendResult<Vec<Role>> {
        let response: ApiResponse<Vec<Role>> = self.get("/api/roles").await?;
        Ok(into_data(response, "role list")?)
    }

    async fn create_role(&self, role: &RoleCreate) -> BackendResult<Role> {
        let response: ApiResponse<Role> = self.post("/api/roles", role).await?;
        Ok(into_data(response, "role")?)
    }

    async fn update_role(&self, id: RoleId, update: &RoleUpdate) -> BackendResult<Role> {
        let response: ApiResponse<Role> = self.patch(&format!("/api/roles/{id}"), update).await?;
        Ok(into_data(response, "role")?)
    }

    async fn set_role_status(&self, id: RoleId, active: bool) -> BackendResult<Role> {
        let body = RoleUpdate {
            name: None,
            active: Some(active),
        };
        let response: ApiResponse<Role> =
            self.put(&format!("/api/roles/{id}/status"), &body).await?;
        Ok(into_data(response, "role")?)
    }

    async fn delete_role(&self, id: RoleId) -> BackendResult<()> {
        let response: ApiResponse<serde_json::Value> =
            self.delete(&format!("/api/roles/{id}")).await?;
        Ok(into_unit(response)?)
    }

    async fn fetch_user_roles(&self, user_id: UserId) -> BackendResult<Vec<RoleId>> {
        let response: ApiResponse<Vec<AssignedRole>> =
            self.get(&format!("/api/users/{user_id}/roles")).await?;
        let assigned = into_data(response, "user roles")?;
        Ok(assigned.into_iter().map(|r| r.role_id).collect())
    }

    async fn save_user_roles(
        &self,
        user_id: UserId,
        role_ids: &[RoleId],
    ) -> BackendResult<SaveAck> {
        let body = UserRolesUpdate {
            roles: role_ids.to_vec(),
        };
        tracing::debug!(user_id, count = role_ids.len(), "Saving user roles");
        Ok(self
            .post(&format!("/api/users/{user_id}/roles"), &body)
            .await?)
    }
}
