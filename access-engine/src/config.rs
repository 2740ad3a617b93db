//! Engine configuration
//!
//! | Variable                 | Default                   | Meaning                                   |
//! |--------------------------|---------------------------|-------------------------------------------|
//! | `ACCESS_INCLUDE_INACTIVE`| `true`                    | Show inactive modules in editors          |
//! | `ACCESS_CATALOG_ACTIONS` | `create,list,edit,delete` | Actions provisioned on a new catalog      |
//! | `ACCESS_CATALOG_ACTIVE`  | `true`                    | Whether a provisioned catalog starts on   |

use shared::models::PrivilegeKind;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Pass `include_inactive` to tree fetches
    ///
    /// Matrix saves replace every row under a root, so a matrix opened
    /// without inactive modules drops their flags on save.
    pub include_inactive: bool,
    /// Actions posted when provisioning a privilege catalog
    pub catalog_actions: Vec<String>,
    pub catalog_active: bool,
}

impl EngineConfig {
    /// Load from the environment (a `.env` file is honored if present)
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self {
            include_inactive: std::env::var("ACCESS_INCLUDE_INACTIVE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            catalog_actions: std::env::var("ACCESS_CATALOG_ACTIONS")
                .ok()
                .map(|v| parse_actions(&v))
                .filter(|actions| !actions.is_empty())
                .unwrap_or_else(default_actions),
            catalog_active: std::env::var("ACCESS_CATALOG_ACTIVE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }

    pub fn with_include_inactive(mut self, include_inactive: bool) -> Self {
        self.include_inactive = include_inactive;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            include_inactive: true,
            catalog_actions: default_actions(),
            catalog_active: true,
        }
    }
}

fn default_actions() -> Vec<String> {
    PrivilegeKind::ALL
        .iter()
        .map(|k| k.name().to_string())
        .collect()
}

fn parse_actions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|a| a.trim().to_lowercase())
        .filter(|a| !a.is_empty())
        .collect()
}
