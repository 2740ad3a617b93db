//! Module tree store
//!
//! Arena of module nodes keyed by id. Parent links live in a side map so the
//! tree can be walked downward (children lists) and upward (parent map)
//! without shared ownership. Children keep the order they arrived in.

use crate::error::{EngineError, EngineResult, MalformedReason, MalformedTreeError};
use shared::ModuleId;
use shared::models::{ModuleLevel, ModuleNode, PrivilegeFlags, RoleModuleNode};
use std::collections::HashMap;

/// One module plus its per-editor state
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub id: ModuleId,
    pub name: String,
    pub level: ModuleLevel,
    pub url: Option<String>,
    pub icon: Option<String>,
    pub active: bool,
    pub has_privilege_catalog: bool,
    pub(crate) checked: bool,
    pub(crate) flags: PrivilegeFlags,
    children: Vec<ModuleId>,
}

impl TreeNode {
    fn from_module(node: &ModuleNode) -> Self {
        Self {
            id: node.id,
            name: node.name.clone(),
            level: node.level,
            url: node.url.clone(),
            icon: node.icon.clone(),
            active: node.active,
            has_privilege_catalog: false,
            checked: false,
            flags: PrivilegeFlags::NONE,
            children: Vec::new(),
        }
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub fn flags(&self) -> PrivilegeFlags {
        self.flags
    }

    pub fn children(&self) -> &[ModuleId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleTree {
    nodes: HashMap<ModuleId, TreeNode>,
    roots: Vec<ModuleId>,
    parents: HashMap<ModuleId, ModuleId>,
}

impl ModuleTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a forest from a flat or nested node list
    ///
    /// Nested `children` win over `parent_id` when both are present.
    pub fn build(nodes: Vec<ModuleNode>) -> Result<Self, MalformedTreeError> {
        Self::build_inner(nodes, None)
    }

    /// Build a subtree fetched for `anchor`
    ///
    /// Nodes whose parent is `anchor` become top-level entries even when the
    /// anchor itself is not part of the payload.
    pub fn build_anchored(
        nodes: Vec<ModuleNode>,
        anchor: ModuleId,
    ) -> Result<Self, MalformedTreeError> {
        Self::build_inner(nodes, Some(anchor))
    }

    fn build_inner(
        nodes: Vec<ModuleNode>,
        anchor: Option<ModuleId>,
    ) -> Result<Self, MalformedTreeError> {
        let flat = flatten(nodes);

        let mut tree = ModuleTree::new();
        for (node, _) in &flat {
            if tree.nodes.insert(node.id, TreeNode::from_module(node)).is_some() {
                return Err(MalformedTreeError::new(node.id, MalformedReason::DuplicateId));
            }
        }

        for (node, nested_parent) in &flat {
            match nested_parent.or(node.parent_id) {
                Some(parent_id) if tree.nodes.contains_key(&parent_id) => {
                    tree.link(node.id, node.level, parent_id)?;
                }
                Some(parent_id) if anchor == Some(parent_id) => tree.roots.push(node.id),
                _ if node.level.is_root() => tree.roots.push(node.id),
                parent => {
                    return Err(MalformedTreeError::new(
                        node.id,
                        MalformedReason::MissingParent(parent),
                    ));
                }
            }
        }

        tracing::debug!(
            nodes = tree.nodes.len(),
            roots = tree.roots.len(),
            anchor = ?anchor,
            "Module tree built"
        );
        Ok(tree)
    }

    fn link(
        &mut self,
        id: ModuleId,
        level: ModuleLevel,
        parent_id: ModuleId,
    ) -> Result<(), MalformedTreeError> {
        let Some(parent) = self.nodes.get_mut(&parent_id) else {
            return Err(MalformedTreeError::new(
                id,
                MalformedReason::MissingParent(Some(parent_id)),
            ));
        };
        if parent.level.child() != Some(level) {
            return Err(MalformedTreeError::new(
                id,
                MalformedReason::LevelMismatch {
                    parent: parent.level,
                    child: level,
                },
            ));
        }
        parent.children.push(id);
        self.parents.insert(id, parent_id);
        Ok(())
    }

    /// Build from a role's decorated module tree
    ///
    /// Levels missing from the payload are inferred from nesting depth:
    /// top-level entries are level 0, except entries below `anchor` which
    /// start at level 1.
    pub fn from_role_tree(
        data: Vec<RoleModuleNode>,
        anchor: Option<ModuleId>,
    ) -> Result<Self, MalformedTreeError> {
        let mut modules = Vec::new();
        let mut decorations = Vec::new();
        let mut stack: Vec<(RoleModuleNode, Option<ModuleId>, u8)> = data
            .into_iter()
            .rev()
            .map(|n| match anchor {
                Some(anchor_id) if anchor_id != n.id => (n, anchor, ModuleLevel::Feature.as_u8()),
                _ => (n, None, ModuleLevel::Root.as_u8()),
            })
            .collect();

        while let Some((mut node, parent_id, depth)) = stack.pop() {
            let level = match node.level {
                Some(level) => level,
                None => ModuleLevel::from_u8(depth)
                    .ok_or_else(|| MalformedTreeError::new(node.id, MalformedReason::TooDeep))?,
            };
            for child in std::mem::take(&mut node.children).into_iter().rev() {
                stack.push((child, Some(node.id), level.as_u8() + 1));
            }
            decorations.push((node.id, node.checked, node.has_privilege_catalog));
            modules.push(ModuleNode::new(node.id, parent_id, node.name, level));
        }

        let mut tree = Self::build_inner(modules, anchor)?;
        for (id, checked, has_catalog) in decorations {
            if let Some(node) = tree.nodes.get_mut(&id) {
                node.checked = checked;
                node.has_privilege_catalog = has_catalog;
            }
        }
        Ok(tree)
    }

    // ========== Lookup ==========

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: ModuleId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: ModuleId) -> Option<&TreeNode> {
        self.nodes.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ModuleId) -> Option<&mut TreeNode> {
        self.nodes.get_mut(&id)
    }

    /// Lookup that reports unknown ids as an engine error
    pub fn find(&self, id: ModuleId) -> EngineResult<&TreeNode> {
        self.nodes.get(&id).ok_or(EngineError::UnknownModule(id))
    }

    pub(crate) fn find_mut(&mut self, id: ModuleId) -> EngineResult<&mut TreeNode> {
        self.nodes.get_mut(&id).ok_or(EngineError::UnknownModule(id))
    }

    pub fn roots(&self) -> &[ModuleId] {
        &self.roots
    }

    pub fn parent_of(&self, id: ModuleId) -> Option<ModuleId> {
        self.parents.get(&id).copied()
    }

    /// Direct children in display order (empty for unknown ids)
    pub fn children_of(&self, id: ModuleId) -> &[ModuleId] {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Sibling ids of `id`, or the top-level ids when `parent` is `None`
    pub fn siblings_under(&self, parent: Option<ModuleId>) -> &[ModuleId] {
        match parent {
            Some(parent_id) => self.children_of(parent_id),
            None => &self.roots,
        }
    }

    /// Ancestors from the direct parent up to the top level
    pub fn ancestors(&self, id: ModuleId) -> Vec<ModuleId> {
        let mut chain = Vec::new();
        let mut current = self.parent_of(id);
        while let Some(parent) = current {
            chain.push(parent);
            current = self.parent_of(parent);
        }
        chain
    }

    /// Every node below `id` in pre-order, excluding `id` itself
    pub fn descendants(&self, id: ModuleId) -> Vec<ModuleId> {
        let mut ids: Vec<ModuleId> = self.subtree(id).map(|n| n.id).collect();
        if !ids.is_empty() {
            ids.remove(0);
        }
        ids
    }

    /// Number of in-tree ancestors, `None` for unknown ids
    pub fn depth_of(&self, id: ModuleId) -> Option<usize> {
        self.contains(id).then(|| self.ancestors(id).len())
    }

    /// Height of the subtree rooted at `id` (0 for a leaf)
    pub fn height_of(&self, id: ModuleId) -> u8 {
        let Some(node) = self.nodes.get(&id) else {
            return 0;
        };
        self.subtree(id)
            .map(|n| n.level.as_u8().saturating_sub(node.level.as_u8()))
            .max()
            .unwrap_or(0)
    }

    // ========== Traversal ==========

    /// Pre-order iterator over the whole forest
    pub fn iter(&self) -> Preorder<'_> {
        Preorder::new(self, self.roots.iter().rev().copied().collect())
    }

    /// Pre-order iterator over the subtree rooted at `id` (inclusive)
    pub fn subtree(&self, id: ModuleId) -> Preorder<'_> {
        let start = if self.nodes.contains_key(&id) {
            vec![id]
        } else {
            Vec::new()
        };
        Preorder::new(self, start)
    }

    /// Visit every node in pre-order
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(&TreeNode),
    {
        for node in self.iter() {
            visit(node);
        }
    }

    // ========== Structural edits ==========

    /// Insert a single node under its declared parent
    pub fn insert(&mut self, node: &ModuleNode) -> EngineResult<()> {
        if self.nodes.contains_key(&node.id) {
            return Err(MalformedTreeError::new(node.id, MalformedReason::DuplicateId).into());
        }
        match node.parent_id {
            Some(parent_id) => {
                let parent = self.find(parent_id)?;
                if parent.level.child() != Some(node.level) {
                    return Err(MalformedTreeError::new(
                        node.id,
                        MalformedReason::LevelMismatch {
                            parent: parent.level,
                            child: node.level,
                        },
                    )
                    .into());
                }
                self.nodes.insert(node.id, TreeNode::from_module(node));
                self.link(node.id, node.level, parent_id)?;
            }
            None if node.level.is_root() => {
                self.nodes.insert(node.id, TreeNode::from_module(node));
                self.roots.push(node.id);
            }
            None => {
                return Err(
                    MalformedTreeError::new(node.id, MalformedReason::MissingParent(None)).into(),
                );
            }
        }
        Ok(())
    }

    /// Copy display fields of `node` onto the stored entry
    pub(crate) fn apply_fields(&mut self, node: &ModuleNode) -> EngineResult<()> {
        let entry = self.find_mut(node.id)?;
        entry.name = node.name.clone();
        entry.url = node.url.clone();
        entry.icon = node.icon.clone();
        entry.active = node.active;
        Ok(())
    }

    /// Detach and drop the subtree rooted at `id`; returns removed ids in pre-order
    pub fn remove_subtree(&mut self, id: ModuleId) -> Vec<ModuleId> {
        let removed: Vec<ModuleId> = self.subtree(id).map(|n| n.id).collect();
        if removed.is_empty() {
            return removed;
        }

        match self.parents.remove(&id) {
            Some(parent_id) => {
                if let Some(parent) = self.nodes.get_mut(&parent_id) {
                    parent.children.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|r| *r != id),
        }
        for removed_id in &removed {
            self.nodes.remove(removed_id);
            self.parents.remove(removed_id);
        }
        removed
    }

    /// Level `id` would get under `new_parent`, after checking the move keeps
    /// the hierarchy acyclic and no deeper than level 2
    pub fn check_reparent(
        &self,
        id: ModuleId,
        new_parent: Option<ModuleId>,
    ) -> EngineResult<ModuleLevel> {
        self.find(id)?;
        let new_level = match new_parent {
            None => ModuleLevel::Root,
            Some(parent_id) => {
                if parent_id == id {
                    return Err(EngineError::InvalidHierarchy(format!(
                        "module {id} cannot be its own parent"
                    )));
                }
                let parent = self.find(parent_id)?;
                if self.ancestors(parent_id).contains(&id) {
                    return Err(EngineError::InvalidHierarchy(format!(
                        "module {parent_id} is a descendant of module {id}"
                    )));
                }
                parent.level.child().ok_or_else(|| {
                    EngineError::InvalidHierarchy(format!(
                        "module {parent_id} is at level {} and cannot have children",
                        parent.level
                    ))
                })?
            }
        };

        let deepest = new_level.as_u8() + self.height_of(id);
        if ModuleLevel::from_u8(deepest).is_none() {
            return Err(EngineError::InvalidHierarchy(format!(
                "moving module {id} would place descendants at level {deepest}"
            )));
        }
        Ok(new_level)
    }

    /// Move `id` (with its subtree) under `new_parent`, re-leveling the subtree
    pub fn reparent(&mut self, id: ModuleId, new_parent: Option<ModuleId>) -> EngineResult<()> {
        let new_level = self.check_reparent(id, new_parent)?;
        let old_level = self.find(id)?.level;

        match self.parents.remove(&id) {
            Some(old_parent) => {
                if let Some(parent) = self.nodes.get_mut(&old_parent) {
                    parent.children.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|r| *r != id),
        }
        match new_parent {
            Some(parent_id) => {
                self.find_mut(parent_id)?.children.push(id);
                self.parents.insert(id, parent_id);
            }
            None => self.roots.push(id),
        }

        let moved: Vec<ModuleId> = self.subtree(id).map(|n| n.id).collect();
        for moved_id in moved {
            if let Some(node) = self.nodes.get_mut(&moved_id) {
                let depth = node.level.as_u8() - old_level.as_u8();
                if let Some(level) = ModuleLevel::from_u8(new_level.as_u8() + depth) {
                    node.level = level;
                }
            }
        }
        Ok(())
    }
}

/// Flatten nested input into pre-order `(node, nesting parent)` pairs
fn flatten(nodes: Vec<ModuleNode>) -> Vec<(ModuleNode, Option<ModuleId>)> {
    let mut out = Vec::new();
    let mut stack: Vec<(ModuleNode, Option<ModuleId>)> =
        nodes.into_iter().rev().map(|n| (n, None)).collect();
    while let Some((mut node, nested_parent)) = stack.pop() {
        for child in std::mem::take(&mut node.children).into_iter().rev() {
            stack.push((child, Some(node.id)));
        }
        out.push((node, nested_parent));
    }
    out
}

/// Depth-first pre-order traversal
pub struct Preorder<'a> {
    tree: &'a ModuleTree,
    stack: Vec<ModuleId>,
}

impl<'a> Preorder<'a> {
    fn new(tree: &'a ModuleTree, stack: Vec<ModuleId>) -> Self {
        Self { tree, stack }
    }
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            if let Some(node) = self.tree.nodes.get(&id) {
                self.stack.extend(node.children.iter().rev().copied());
                return Some(node);
            }
        }
        None
    }
}

impl<'a> IntoIterator for &'a ModuleTree {
    type Item = &'a TreeNode;
    type IntoIter = Preorder<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
