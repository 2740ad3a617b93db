//! In-memory backend for engine integration tests
#![allow(dead_code)]

use access_engine::{AccessBackend, BackendError, BackendResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared::models::{
    AssignmentAck, CatalogCreate, ModuleLevel, ModuleMatrix, ModuleNode, ModulePatch, NewModule,
    PrivilegeFlags, PrivilegeItem, PrivilegeMatrixRow, PrivilegeSaveRow, Role, RoleCreate,
    RoleInfo, RoleModuleNode, RoleTreeResponse, RoleUpdate, SaveAck,
};
use shared::{ModuleId, PrivilegeId, RoleId, UserId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;

#[derive(Debug, Default)]
pub struct FakeState {
    pub modules: Vec<ModuleNode>,
    pub matrix: Vec<ModuleMatrix>,
    pub role: Option<RoleInfo>,
    pub role_tree: Vec<RoleModuleNode>,
    /// Top-level modules returned by the role overview
    pub role_roots: Vec<RoleModuleNode>,
    pub user_roles: HashMap<UserId, Vec<RoleId>>,
    pub roles: Vec<Role>,
    pub module_catalog: Vec<PrivilegeItem>,
    pub assigned_privileges: Vec<PrivilegeId>,

    pub saved_role_modules: Vec<Vec<ModuleId>>,
    pub saved_matrix: Vec<Vec<PrivilegeSaveRow>>,
    pub saved_privileges: Vec<Vec<PrivilegeId>>,
    pub saved_user_roles: Vec<(UserId, Vec<RoleId>)>,
    pub catalogs: Vec<(ModuleId, CatalogCreate)>,
    pub deleted: Vec<ModuleId>,

    /// Methods that fail with a transport error
    pub failing: HashSet<&'static str>,
    /// Save methods that answer `success: false`
    pub rejecting: HashSet<&'static str>,
    pub next_id: i64,
}

#[derive(Default)]
pub struct FakeBackend {
    pub state: Mutex<FakeState>,
    gate: Mutex<Option<Arc<Semaphore>>>,
    reads_in_flight: AtomicUsize,
    max_reads_in_flight: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_state(state: FakeState) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(state),
            ..Default::default()
        })
    }

    pub fn fail(&self, method: &'static str) {
        self.state.lock().failing.insert(method);
    }

    pub fn recover(&self, method: &'static str) {
        self.state.lock().failing.remove(method);
    }

    pub fn reject(&self, method: &'static str) {
        self.state.lock().rejecting.insert(method);
    }

    /// Park save calls until [`FakeBackend::release_saves`]
    pub fn hold_saves(&self) {
        *self.gate.lock() = Some(Arc::new(Semaphore::new(0)));
    }

    /// Let every parked save through, one after another
    pub fn release_saves(&self) {
        if let Some(gate) = self.gate.lock().take() {
            gate.add_permits(1);
        }
    }

    pub fn max_concurrent_reads(&self) -> usize {
        self.max_reads_in_flight.load(Ordering::SeqCst)
    }

    fn check(&self, method: &'static str) -> BackendResult<()> {
        if self.state.lock().failing.contains(method) {
            return Err(BackendError::Transport(format!("{method}: connection reset")));
        }
        Ok(())
    }

    fn ack(&self, method: &'static str) -> SaveAck {
        if self.state.lock().rejecting.contains(method) {
            SaveAck::rejected(format!("{method} refused"))
        } else {
            SaveAck::ok()
        }
    }

    async fn wait_gate(&self) {
        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            // the permit goes back on drop so the next parked call proceeds
            let _permit = gate.acquire().await;
        }
    }

    /// Simulate network latency so concurrent reads overlap
    async fn read(&self) {
        let now = self.reads_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_reads_in_flight.fetch_max(now, Ordering::SeqCst);
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        self.reads_in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

fn subtree_ids(modules: &[ModuleNode], root: ModuleId) -> HashSet<ModuleId> {
    let mut ids = HashSet::from([root]);
    loop {
        let before = ids.len();
        for m in modules {
            if m.parent_id.is_some_and(|p| ids.contains(&p)) {
                ids.insert(m.id);
            }
        }
        if ids.len() == before {
            return ids;
        }
    }
}

#[async_trait]
impl AccessBackend for FakeBackend {
    async fn fetch_tree(
        &self,
        root_id: Option<ModuleId>,
        include_inactive: bool,
    ) -> BackendResult<Vec<ModuleNode>> {
        self.read().await;
        self.check("fetch_tree")?;
        let state = self.state.lock();
        let scope = root_id.map(|r| subtree_ids(&state.modules, r));
        Ok(state
            .modules
            .iter()
            .filter(|m| include_inactive || m.active)
            .filter(|m| match (&scope, root_id) {
                (Some(ids), Some(root)) => m.id != root && ids.contains(&m.id),
                _ => true,
            })
            .cloned()
            .collect())
    }

    async fn create_node(&self, node: &NewModule) -> BackendResult<ModuleNode> {
        self.check("create_node")?;
        let mut state = self.state.lock();
        let level = match node.parent_id {
            Some(parent_id) => state
                .modules
                .iter()
                .find(|m| m.id == parent_id)
                .and_then(|p| p.level.child())
                .ok_or_else(|| BackendError::rejected("invalid parent"))?,
            None => ModuleLevel::Root,
        };
        state.next_id += 1;
        let mut created = ModuleNode::new(
            1000 + state.next_id,
            node.parent_id,
            node.name.clone(),
            level,
        );
        created.url = node.url.clone();
        created.icon = node.icon.clone();
        created.active = node.active;
        state.modules.push(created.clone());
        Ok(created)
    }

    async fn update_node(&self, id: ModuleId, patch: &ModulePatch) -> BackendResult<ModuleNode> {
        self.check("update_node")?;
        let mut state = self.state.lock();
        let module = state
            .modules
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| BackendError::rejected("module not found"))?;
        if let Some(name) = &patch.name {
            module.name = name.clone();
        }
        if let Some(url) = &patch.url {
            module.url = url.clone();
        }
        if let Some(icon) = &patch.icon {
            module.icon = icon.clone();
        }
        if let Some(active) = patch.active {
            module.active = active;
        }
        if let Some(parent_id) = patch.parent_id {
            module.parent_id = parent_id;
        }
        Ok(module.clone())
    }

    async fn delete_node(&self, id: ModuleId) -> BackendResult<()> {
        self.check("delete_node")?;
        let mut state = self.state.lock();
        let doomed = subtree_ids(&state.modules, id);
        state.modules.retain(|m| !doomed.contains(&m.id));
        state.deleted.push(id);
        Ok(())
    }

    async fn fetch_privilege_matrix(&self, _root_id: ModuleId) -> BackendResult<Vec<ModuleMatrix>> {
        self.read().await;
        self.check("fetch_privilege_matrix")?;
        Ok(self.state.lock().matrix.clone())
    }

    async fn save_privilege_matrix(
        &self,
        _root_id: ModuleId,
        rows: &[PrivilegeSaveRow],
    ) -> BackendResult<SaveAck> {
        self.wait_gate().await;
        self.check("save_privilege_matrix")?;
        let ack = self.ack("save_privilege_matrix");
        if ack.success {
            self.state.lock().saved_matrix.push(rows.to_vec());
        }
        Ok(ack)
    }

    async fn create_privilege_catalog(
        &self,
        module_id: ModuleId,
        catalog: &CatalogCreate,
    ) -> BackendResult<SaveAck> {
        self.check("create_privilege_catalog")?;
        let mut state = self.state.lock();
        state.catalogs.push((module_id, catalog.clone()));
        state.matrix.push(ModuleMatrix {
            module_id,
            module_name: String::new(),
            rows: vec![PrivilegeMatrixRow::new(
                catalog.name.clone(),
                PrivilegeFlags::NONE,
            )],
        });
        Ok(SaveAck::ok())
    }

    async fn fetch_role_tree(
        &self,
        _role_id: RoleId,
        _root_id: ModuleId,
    ) -> BackendResult<RoleTreeResponse> {
        self.read().await;
        self.check("fetch_role_tree")?;
        let state = self.state.lock();
        Ok(RoleTreeResponse {
            success: true,
            role: state.role.clone(),
            data: state.role_tree.clone(),
        })
    }

    async fn fetch_role_overview(&self, _role_id: RoleId) -> BackendResult<RoleTreeResponse> {
        self.read().await;
        self.check("fetch_role_overview")?;
        let state = self.state.lock();
        Ok(RoleTreeResponse {
            success: true,
            role: state.role.clone(),
            data: state.role_roots.clone(),
        })
    }

    async fn save_role_modules(
        &self,
        _role_id: RoleId,
        _root_id: ModuleId,
        module_ids: &[ModuleId],
    ) -> BackendResult<AssignmentAck> {
        self.wait_gate().await;
        self.check("save_role_modules")?;
        if self.state.lock().rejecting.contains("save_role_modules") {
            return Ok(AssignmentAck {
                success: false,
                count: None,
            });
        }
        self.state.lock().saved_role_modules.push(module_ids.to_vec());
        Ok(AssignmentAck {
            success: true,
            count: Some(module_ids.len() as u64),
        })
    }

    async fn fetch_module_catalog(&self, _module_id: ModuleId) -> BackendResult<Vec<PrivilegeItem>> {
        self.read().await;
        self.check("fetch_module_catalog")?;
        Ok(self.state.lock().module_catalog.clone())
    }

    async fn fetch_assigned_privileges(
        &self,
        _role_id: RoleId,
        _module_id: ModuleId,
    ) -> BackendResult<Vec<PrivilegeId>> {
        self.read().await;
        self.check("fetch_assigned_privileges")?;
        Ok(self.state.lock().assigned_privileges.clone())
    }

    async fn save_module_privileges(
        &self,
        _role_id: RoleId,
        _module_id: ModuleId,
        privilege_ids: &[PrivilegeId],
    ) -> BackendResult<SaveAck> {
        self.wait_gate().await;
        self.check("save_module_privileges")?;
        let ack = self.ack("save_module_privileges");
        if ack.success {
            self.state
                .lock()
                .saved_privileges
                .push(privilege_ids.to_vec());
        }
        Ok(ack)
    }

    async fn list_roles(&self) -> BackendResult<Vec<Role>> {
        self.read().await;
        self.check("list_roles")?;
        Ok(self.state.lock().roles.clone())
    }

    async fn create_role(&self, role: &RoleCreate) -> BackendResult<Role> {
        self.check("create_role")?;
        let mut state = self.state.lock();
        state.next_id += 1;
        let created = Role {
            id: state.next_id,
            name: role.name.clone(),
            active: role.active,
        };
        state.roles.push(created.clone());
        Ok(created)
    }

    async fn update_role(&self, id: RoleId, update: &RoleUpdate) -> BackendResult<Role> {
        self.check("update_role")?;
        let mut state = self.state.lock();
        let role = state
            .roles
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| BackendError::rejected("role not found"))?;
        if let Some(name) = &update.name {
            role.name = name.clone();
        }
        if let Some(active) = update.active {
            role.active = active;
        }
        Ok(role.clone())
    }

    async fn set_role_status(&self, id: RoleId, active: bool) -> BackendResult<Role> {
        self.wait_gate().await;
        self.check("set_role_status")?;
        let mut state = self.state.lock();
        let role = state
            .roles
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| BackendError::rejected("role not found"))?;
        role.active = active;
        Ok(role.clone())
    }

    async fn delete_role(&self, id: RoleId) -> BackendResult<()> {
        self.check("delete_role")?;
        self.state.lock().roles.retain(|r| r.id != id);
        Ok(())
    }

    async fn fetch_user_roles(&self, user_id: UserId) -> BackendResult<Vec<RoleId>> {
        self.read().await;
        self.check("fetch_user_roles")?;
        Ok(self
            .state
            .lock()
            .user_roles
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_user_roles(
        &self,
        user_id: UserId,
        role_ids: &[RoleId],
    ) -> BackendResult<SaveAck> {
        self.wait_gate().await;
        self.check("save_user_roles")?;
        let ack = self.ack("save_user_roles");
        if ack.success {
            let mut state = self.state.lock();
            state.user_roles.insert(user_id, role_ids.to_vec());
            state.saved_user_roles.push((user_id, role_ids.to_vec()));
        }
        Ok(ack)
    }
}

// ========== Fixtures ==========

/// Setup(1) > Roles(11) > {List(111), Edit(112)}, Setup(1) > Modules(12), Reports(2) > Sales(21)
pub fn sample_modules() -> Vec<ModuleNode> {
    use ModuleLevel::{Feature, Root, SubFeature};
    vec![
        ModuleNode::new(1, None, "Setup", Root),
        ModuleNode::new(11, Some(1), "Roles", Feature),
        ModuleNode::new(111, Some(11), "Role List", SubFeature),
        ModuleNode::new(112, Some(11), "Role Edit", SubFeature),
        ModuleNode::new(12, Some(1), "Modules", Feature),
        ModuleNode::new(2, None, "Reports", Root),
        ModuleNode::new(21, Some(2), "Sales", Feature),
    ]
}

/// Role tree below root 1 as the role endpoint returns it (no levels)
pub fn sample_role_tree() -> Vec<RoleModuleNode> {
    vec![
        RoleModuleNode::new(11, "Roles")
            .with_catalog(true)
            .with_children(vec![
                RoleModuleNode::new(111, "Role List"),
                RoleModuleNode::new(112, "Role Edit"),
            ]),
        RoleModuleNode::new(12, "Modules"),
    ]
}

pub fn role(id: RoleId, name: &str, active: bool) -> Role {
    Role {
        id,
        name: name.to_string(),
        active,
    }
}

pub fn flags(create: bool, list: bool, edit: bool, delete: bool) -> PrivilegeFlags {
    PrivilegeFlags {
        create,
        list,
        edit,
        delete,
    }
}
