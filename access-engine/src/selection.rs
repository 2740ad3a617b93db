//! Selection propagation
//!
//! Checking a node cascades the value to its whole subtree, then each
//! ancestor is recomputed as the OR of its direct children, one level at a
//! time up to the top. A parent's value is only derived from its children
//! when one of them changes; loading never recomputes.

use crate::error::EngineResult;
use crate::tree::ModuleTree;
use shared::ModuleId;
use std::collections::BTreeSet;

impl ModuleTree {
    /// Set `id` and every descendant to `value`; returns how many nodes changed
    pub fn set_subtree(&mut self, id: ModuleId, value: bool) -> EngineResult<usize> {
        self.find(id)?;
        Ok(self.fill(id, value))
    }

    fn fill(&mut self, id: ModuleId, value: bool) -> usize {
        let ids: Vec<ModuleId> = self.subtree(id).map(|n| n.id).collect();
        let mut changed = 0;
        for node_id in ids {
            if let Some(node) = self.get_mut(node_id)
                && node.checked != value
            {
                node.checked = value;
                changed += 1;
            }
        }
        changed
    }

    /// Recompute every ancestor of `id`, nearest first
    pub fn recompute_ancestors(&mut self, id: ModuleId) {
        for ancestor in self.ancestors(id) {
            let any_checked = self
                .children_of(ancestor)
                .iter()
                .any(|child| self.get(*child).is_some_and(|c| c.checked));
            if let Some(node) = self.get_mut(ancestor) {
                node.checked = any_checked;
            }
        }
    }

    /// Cascade `value` down from `id`, then bubble up
    pub fn toggle(&mut self, id: ModuleId, value: bool) -> EngineResult<()> {
        let changed = self.set_subtree(id, value)?;
        self.recompute_ancestors(id);
        tracing::trace!(module_id = id, value, changed, "Selection toggled");
        Ok(())
    }

    /// Apply `value` to every top-level subtree
    pub fn check_all_roots(&mut self, value: bool) {
        let roots = self.roots().to_vec();
        let changed: usize = roots.into_iter().map(|root| self.fill(root, value)).sum();
        tracing::trace!(value, changed, "All roots toggled");
    }

    /// Ids of all checked nodes, sorted
    pub fn collect_checked(&self) -> BTreeSet<ModuleId> {
        let mut checked = BTreeSet::new();
        self.walk(|node| {
            if node.checked {
                checked.insert(node.id);
            }
        });
        checked
    }

    pub fn is_checked(&self, id: ModuleId) -> bool {
        self.get(id).is_some_and(|n| n.checked)
    }
}
