//! Privilege aggregation
//!
//! The matrix endpoint returns several catalog rows per module; the editor
//! shows one set of four flags per module, granted when any row grants it.

use crate::error::EngineResult;
use crate::tree::ModuleTree;
use shared::ModuleId;
use shared::models::{
    ModuleMatrix, PrivilegeFlags, PrivilegeKind, PrivilegeMatrixRow, PrivilegeSaveRow,
};
use std::collections::HashMap;

/// OR all rows of one module together; no rows means no privileges
pub fn aggregate(module_id: ModuleId, rows: &[PrivilegeMatrixRow]) -> PrivilegeFlags {
    let flags = rows
        .iter()
        .fold(PrivilegeFlags::NONE, |acc, row| acc | row.flags);
    tracing::trace!(module_id, rows = rows.len(), ?flags, "Privilege rows aggregated");
    flags
}

/// Aggregate a whole matrix response into flags per module
pub fn flags_by_module(matrix: &[ModuleMatrix]) -> HashMap<ModuleId, PrivilegeFlags> {
    let mut out: HashMap<ModuleId, PrivilegeFlags> = HashMap::with_capacity(matrix.len());
    for entry in matrix {
        *out.entry(entry.module_id).or_default() |= aggregate(entry.module_id, &entry.rows);
    }
    out
}

/// Overwrite every node's flags; modules absent from `flags_by_id` get none
pub fn apply_to_tree(tree: &mut ModuleTree, flags_by_id: &HashMap<ModuleId, PrivilegeFlags>) {
    let ids: Vec<ModuleId> = tree.iter().map(|n| n.id).collect();
    for id in ids {
        if let Some(node) = tree.get_mut(id) {
            node.flags = flags_by_id.get(&id).copied().unwrap_or_default();
        }
    }
}

/// One save row per node in pre-order, including all-false ones
pub fn build_save_rows(tree: &ModuleTree) -> Vec<PrivilegeSaveRow> {
    let mut rows = Vec::with_capacity(tree.len());
    tree.walk(|node| {
        rows.push(PrivilegeSaveRow {
            module_id: node.id,
            module_name: node.name.clone(),
            flags: node.flags,
        });
    });
    rows
}

impl ModuleTree {
    /// Flip a single flag on one module
    pub fn set_flag(&mut self, id: ModuleId, kind: PrivilegeKind, value: bool) -> EngineResult<()> {
        self.find_mut(id)?.flags.set(kind, value);
        Ok(())
    }

    pub fn set_flags(&mut self, id: ModuleId, flags: PrivilegeFlags) -> EngineResult<()> {
        self.find_mut(id)?.flags = flags;
        Ok(())
    }
}
