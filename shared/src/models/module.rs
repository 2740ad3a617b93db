//! Module Model

use crate::serde_helpers::{loose_bool, nullable, parent_id, LooseInt};
use crate::types::ModuleId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Depth of a module in the three-level hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModuleLevel {
    /// Application root (level 0), never has a parent
    Root = 0,
    /// Feature under a root (level 1)
    Feature = 1,
    /// Sub-feature under a feature (level 2), cannot have children
    SubFeature = 2,
}

impl ModuleLevel {
    /// All levels, outermost first
    pub const ALL: [ModuleLevel; 3] = [Self::Root, Self::Feature, Self::SubFeature];

    /// Numeric level (0, 1 or 2)
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(level: u8) -> Option<Self> {
        match level {
            0 => Some(Self::Root),
            1 => Some(Self::Feature),
            2 => Some(Self::SubFeature),
            _ => None,
        }
    }

    /// Level a child of this level must have, `None` for the deepest level
    pub fn child(self) -> Option<Self> {
        Self::from_u8(self.as_u8() + 1)
    }

    /// Level this level's parent must have, `None` for roots
    pub fn parent(self) -> Option<Self> {
        self.as_u8().checked_sub(1).and_then(Self::from_u8)
    }

    pub fn is_root(self) -> bool {
        self == Self::Root
    }
}

impl fmt::Display for ModuleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

impl Serialize for ModuleLevel {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for ModuleLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let LooseInt(raw) = LooseInt::deserialize(deserializer)?;
        u8::try_from(raw)
            .ok()
            .and_then(Self::from_u8)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid module level: {raw}")))
    }
}

/// Module node as exchanged with the backend
///
/// The tree endpoint may return either a flat list (children empty,
/// edges given by `parent_id`) or a nested one (edges given by `children`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleNode {
    pub id: ModuleId,
    #[serde(with = "parent_id", default)]
    pub parent_id: Option<ModuleId>,
    pub name: String,
    pub level: ModuleLevel,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(deserialize_with = "loose_bool", default = "default_active")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ModuleNode>,
}

fn default_active() -> bool {
    true
}

impl ModuleNode {
    /// Leaf node without children, convenient for fixtures and flat lists
    pub fn new(
        id: ModuleId,
        parent_id: Option<ModuleId>,
        name: impl Into<String>,
        level: ModuleLevel,
    ) -> Self {
        Self {
            id,
            parent_id,
            name: name.into(),
            level,
            url: None,
            icon: None,
            active: true,
            children: Vec::new(),
        }
    }

    /// Attach nested children (builder style)
    pub fn with_children(mut self, children: Vec<ModuleNode>) -> Self {
        self.children = children;
        self
    }
}

/// Create module payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewModule {
    #[serde(with = "parent_id", default)]
    pub parent_id: Option<ModuleId>,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(deserialize_with = "loose_bool", default = "default_active")]
    pub active: bool,
}

/// Partial update payload; `None` leaves a field unchanged
///
/// `url`/`icon` set to `Some(None)` are sent as `null` and clear the value.
/// `parent_id: Some(None)` moves the module to the top level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModulePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "nullable")]
    pub url: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "nullable")]
    pub icon: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_reparent",
        deserialize_with = "deserialize_reparent"
    )]
    pub parent_id: Option<Option<ModuleId>>,
}

impl ModulePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.url.is_none()
            && self.icon.is_none()
            && self.active.is_none()
            && self.parent_id.is_none()
    }
}

fn serialize_reparent<S: Serializer>(
    value: &Option<Option<ModuleId>>,
    s: S,
) -> Result<S::Ok, S::Error> {
    s.serialize_i64(value.flatten().unwrap_or(0))
}

fn deserialize_reparent<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Option<ModuleId>>, D::Error> {
    parent_id::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_navigation() {
        assert_eq!(ModuleLevel::Root.child(), Some(ModuleLevel::Feature));
        assert_eq!(ModuleLevel::Feature.child(), Some(ModuleLevel::SubFeature));
        assert_eq!(ModuleLevel::SubFeature.child(), None);
        assert_eq!(ModuleLevel::Root.parent(), None);
        assert_eq!(ModuleLevel::SubFeature.parent(), Some(ModuleLevel::Feature));
    }

    #[test]
    fn test_level_accepts_numeric_string() {
        let level: ModuleLevel = serde_json::from_str("\"1\"").unwrap();
        assert_eq!(level, ModuleLevel::Feature);
        let level: ModuleLevel = serde_json::from_str("2").unwrap();
        assert_eq!(level, ModuleLevel::SubFeature);
        assert!(serde_json::from_str::<ModuleLevel>("3").is_err());
    }

    #[test]
    fn test_module_node_loose_payload() {
        let json = r#"{
            "id": 10, "parent_id": 0, "name": "Setup", "level": "0",
            "url": null, "active": "1",
            "children": [
                {"id": 11, "parent_id": 10, "name": "Roles", "level": 1, "active": 0}
            ]
        }"#;
        let node: ModuleNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.parent_id, None);
        assert_eq!(node.level, ModuleLevel::Root);
        assert!(node.active);
        assert_eq!(node.children.len(), 1);
        assert!(!node.children[0].active);
        assert_eq!(node.children[0].parent_id, Some(10));
    }

    #[test]
    fn test_patch_serializes_only_present_fields() {
        let patch = ModulePatch {
            name: Some("Reports".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"name": "Reports"}));
    }

    #[test]
    fn test_patch_clears_url_and_icon() {
        let patch = ModulePatch {
            url: Some(None),
            icon: Some(Some("fa-users".into())),
            ..Default::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"url": null, "icon": "fa-users"}));

        let back: ModulePatch = serde_json::from_value(json).unwrap();
        assert_eq!(back, patch);
        assert!(!back.is_empty());
    }

    #[test]
    fn test_patch_reparent_to_top_level() {
        let patch = ModulePatch {
            parent_id: Some(None),
            ..Default::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"parent_id": 0}));

        let back: ModulePatch = serde_json::from_value(json).unwrap();
        assert_eq!(back.parent_id, Some(None));
        assert!(ModulePatch::default().is_empty());
    }
}
