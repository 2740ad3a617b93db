//! Unsaved-change detection for the privilege editor

use crate::tree::ModuleTree;
use shared::ModuleId;
use shared::models::PrivilegeFlags;

/// Flags of every module at one point in time, sorted by module id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagsSnapshot(Vec<(ModuleId, PrivilegeFlags)>);

impl FlagsSnapshot {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, id: ModuleId) -> Option<PrivilegeFlags> {
        self.0
            .binary_search_by_key(&id, |(module_id, _)| *module_id)
            .ok()
            .map(|idx| self.0[idx].1)
    }

    /// Modules whose flags differ between the two snapshots, including ones
    /// present in only one of them
    pub fn changed_since(&self, earlier: &FlagsSnapshot) -> Vec<ModuleId> {
        let (mut a, mut b) = (self.0.iter().peekable(), earlier.0.iter().peekable());
        let mut changed = Vec::new();
        loop {
            match (a.peek().map(|e| **e), b.peek().map(|e| **e)) {
                (Some((ia, fa)), Some((ib, fb))) if ia == ib => {
                    if fa != fb {
                        changed.push(ia);
                    }
                    a.next();
                    b.next();
                }
                (Some((ia, _)), Some((ib, _))) if ia < ib => {
                    changed.push(ia);
                    a.next();
                }
                (Some(_), Some((ib, _))) => {
                    changed.push(ib);
                    b.next();
                }
                (Some((ia, _)), None) => {
                    changed.push(ia);
                    a.next();
                }
                (None, Some((ib, _))) => {
                    changed.push(ib);
                    b.next();
                }
                (None, None) => break,
            }
        }
        changed
    }
}

/// Capture the current flags of every module
pub fn snapshot(tree: &ModuleTree) -> FlagsSnapshot {
    let mut entries = Vec::with_capacity(tree.len());
    tree.walk(|node| entries.push((node.id, node.flags())));
    entries.sort_unstable_by_key(|(id, _)| *id);
    FlagsSnapshot(entries)
}

/// Whether the tree differs from `baseline`
///
/// Toggling a flag and toggling it back counts as no change.
pub fn has_changes(tree: &ModuleTree, baseline: &FlagsSnapshot) -> bool {
    snapshot(tree) != *baseline
}
