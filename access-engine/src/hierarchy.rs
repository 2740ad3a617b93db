//! Module hierarchy repository
//!
//! CRUD over module nodes. Every mutation is validated against the last
//! listed tree (level pairing, depth, sibling name uniqueness) before it is
//! dispatched, and the cached tree is patched once the backend succeeds.
//!
//! Deletion cascades to descendants on the backend. It is a two-step call:
//! [`HierarchyRepository::plan_delete`] names everything that will go, and
//! only a plan can be passed to [`HierarchyRepository::delete`].

use crate::backend::AccessBackend;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult, Operation};
use crate::sync::{InFlight, SyncClient};
use crate::tree::ModuleTree;
use crate::validation::{
    MAX_NAME_LEN, MAX_URL_LEN, ensure_unique_name, validate_optional_text, validate_required_text,
};
use parking_lot::Mutex;
use shared::ModuleId;
use shared::models::{ModuleLevel, ModuleNode, ModulePatch, NewModule};
use std::sync::Arc;

/// Confirmed intent to delete a module and everything below it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePlan {
    module_id: ModuleId,
    name: String,
    dependents: Vec<ModuleId>,
}

impl DeletePlan {
    pub fn module_id(&self) -> ModuleId {
        self.module_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Descendants removed along with the module, in pre-order
    pub fn dependents(&self) -> &[ModuleId] {
        &self.dependents
    }

    pub fn has_dependents(&self) -> bool {
        !self.dependents.is_empty()
    }

    /// The module followed by its descendants
    pub fn affected(&self) -> Vec<ModuleId> {
        std::iter::once(self.module_id)
            .chain(self.dependents.iter().copied())
            .collect()
    }

    /// Operator-facing warning shown before confirming
    pub fn warning(&self) -> String {
        match self.dependents.len() {
            0 => format!("Delete module '{}'?", self.name),
            1 => format!(
                "Delete module '{}'? 1 sub-module will also be removed.",
                self.name
            ),
            n => format!(
                "Delete module '{}'? {n} sub-modules will also be removed.",
                self.name
            ),
        }
    }
}

pub struct HierarchyRepository<B: ?Sized> {
    backend: Arc<B>,
    config: EngineConfig,
    sync: SyncClient,
    loading: InFlight,
    creating: InFlight,
    updating: InFlight,
    deleting: InFlight,
    cache: Mutex<ModuleTree>,
}

impl<B: AccessBackend + ?Sized> HierarchyRepository<B> {
    pub fn new(backend: Arc<B>, config: EngineConfig) -> Self {
        Self {
            backend,
            config,
            sync: SyncClient::new(),
            loading: InFlight::new(Operation::Load),
            creating: InFlight::new(Operation::CreateModule),
            updating: InFlight::new(Operation::UpdateModule),
            deleting: InFlight::new(Operation::DeleteModule),
            cache: Mutex::new(ModuleTree::new()),
        }
    }

    /// Full forest, or the subtree below `root_id`
    pub async fn list(
        &self,
        root_id: Option<ModuleId>,
        include_inactive: bool,
    ) -> EngineResult<ModuleTree> {
        let _loading = self.loading.try_begin()?;
        let nodes = self
            .sync
            .fetch(
                Operation::Load,
                self.backend.fetch_tree(root_id, include_inactive),
            )
            .await?;

        let tree = match root_id {
            Some(anchor) => ModuleTree::build_anchored(nodes, anchor)?,
            None => ModuleTree::build(nodes)?,
        };
        tracing::info!(
            root_id = ?root_id,
            include_inactive,
            modules = tree.len(),
            "Module hierarchy listed"
        );
        *self.cache.lock() = tree.clone();
        Ok(tree)
    }

    /// List using the configured inactive-module policy
    pub async fn refresh(&self, root_id: Option<ModuleId>) -> EngineResult<ModuleTree> {
        self.list(root_id, self.config.include_inactive).await
    }

    pub fn tree(&self) -> ModuleTree {
        self.cache.lock().clone()
    }

    pub fn with_tree<R>(&self, read: impl FnOnce(&ModuleTree) -> R) -> R {
        read(&*self.cache.lock())
    }

    /// Level a new child of `parent_id` gets
    pub fn level_for_parent(&self, parent_id: Option<ModuleId>) -> EngineResult<ModuleLevel> {
        let Some(parent_id) = parent_id else {
            return Ok(ModuleLevel::Root);
        };
        let cache = self.cache.lock();
        let parent = cache.find(parent_id)?;
        parent.level.child().ok_or_else(|| {
            EngineError::InvalidHierarchy(format!(
                "module {parent_id} is at level {} and cannot have children",
                parent.level
            ))
        })
    }

    fn ensure_unique_sibling(
        &self,
        parent_id: Option<ModuleId>,
        name: &str,
        exclude: Option<ModuleId>,
    ) -> EngineResult<()> {
        let cache = self.cache.lock();
        let siblings = cache
            .siblings_under(parent_id)
            .iter()
            .filter(|id| Some(**id) != exclude)
            .filter_map(|id| cache.get(*id))
            .map(|node| node.name.as_str());
        ensure_unique_name("module", name, siblings)
    }

    pub async fn create(&self, new: NewModule) -> EngineResult<ModuleNode> {
        validate_required_text(&new.name, "name", MAX_NAME_LEN)?;
        validate_optional_text(&new.url, "url", MAX_URL_LEN)?;
        validate_optional_text(&new.icon, "icon", MAX_URL_LEN)?;
        let level = self.level_for_parent(new.parent_id)?;
        self.ensure_unique_sibling(new.parent_id, &new.name, None)?;

        let _creating = self.creating.try_begin()?;
        let mut created = self
            .sync
            .fetch(Operation::CreateModule, self.backend.create_node(&new))
            .await?;
        if created.parent_id.is_none() {
            created.parent_id = new.parent_id;
        }
        if created.level != level {
            tracing::warn!(
                module_id = created.id,
                expected = %level,
                actual = %created.level,
                "Backend assigned an unexpected level"
            );
        }

        if let Err(e) = self.cache.lock().insert(&created) {
            tracing::warn!(module_id = created.id, error = %e, "Created module not cached");
        }
        tracing::info!(
            module_id = created.id,
            parent_id = ?created.parent_id,
            level = %created.level,
            "Module created"
        );
        Ok(created)
    }

    /// Partial update; a parent change is re-validated against the hierarchy
    pub async fn update(&self, id: ModuleId, patch: ModulePatch) -> EngineResult<ModuleNode> {
        if patch.is_empty() {
            return Err(EngineError::Validation("nothing to update".to_string()));
        }
        if let Some(name) = &patch.name {
            validate_required_text(name, "name", MAX_NAME_LEN)?;
        }
        validate_optional_text(&patch.url.clone().flatten(), "url", MAX_URL_LEN)?;
        validate_optional_text(&patch.icon.clone().flatten(), "icon", MAX_URL_LEN)?;

        let (current_parent, current_name) = {
            let cache = self.cache.lock();
            let node = cache.find(id)?;
            (cache.parent_of(id), node.name.clone())
        };
        let target_parent = patch.parent_id.unwrap_or(current_parent);
        if let Some(new_parent) = patch.parent_id {
            self.cache.lock().check_reparent(id, new_parent)?;
        }
        if patch.name.is_some() || target_parent != current_parent {
            let name = patch.name.as_deref().unwrap_or(&current_name);
            self.ensure_unique_sibling(target_parent, name, Some(id))?;
        }

        let _updating = self.updating.try_begin()?;
        let updated = self
            .sync
            .fetch(Operation::UpdateModule, self.backend.update_node(id, &patch))
            .await?;

        {
            let mut cache = self.cache.lock();
            if target_parent != current_parent
                && let Err(e) = cache.reparent(id, target_parent)
            {
                tracing::warn!(module_id = id, error = %e, "Moved module not re-cached");
            }
            if let Err(e) = cache.apply_fields(&updated) {
                tracing::warn!(module_id = id, error = %e, "Updated module not re-cached");
            }
        }
        tracing::info!(module_id = id, "Module updated");
        Ok(updated)
    }

    /// Flip a module's active flag right away; restored if the backend refuses
    pub async fn set_active(&self, id: ModuleId, active: bool) -> EngineResult<ModuleNode> {
        let _updating = self.updating.try_begin()?;
        let backend = &self.backend;
        let patch = ModulePatch {
            active: Some(active),
            ..Default::default()
        };

        let updated = self
            .sync
            .optimistic(
                Operation::UpdateModule,
                &self.cache,
                |tree| {
                    tree.find_mut(id)?.active = active;
                    Ok(())
                },
                |()| backend.update_node(id, &patch),
            )
            .await?;
        tracing::info!(module_id = id, active, "Module status changed");
        Ok(updated)
    }

    /// Describe what deleting `id` removes; nothing is sent
    pub fn plan_delete(&self, id: ModuleId) -> EngineResult<DeletePlan> {
        let cache = self.cache.lock();
        let node = cache.find(id)?;
        Ok(DeletePlan {
            module_id: id,
            name: node.name.clone(),
            dependents: cache.descendants(id),
        })
    }

    /// Execute a confirmed plan; returns every id that no longer exists
    pub async fn delete(&self, plan: DeletePlan) -> EngineResult<Vec<ModuleId>> {
        let _deleting = self.deleting.try_begin()?;
        self.sync
            .fetch(
                Operation::DeleteModule,
                self.backend.delete_node(plan.module_id),
            )
            .await?;

        let mut removed = self.cache.lock().remove_subtree(plan.module_id);
        if removed.is_empty() {
            removed = plan.affected();
        }
        tracing::info!(
            module_id = plan.module_id,
            removed = removed.len(),
            "Module deleted"
        );
        Ok(removed)
    }
}
