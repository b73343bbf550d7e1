//! Registry settings
//!
//! Hosts usually embed these in their own configuration file; the serde
//! derives keep the field names stable for that.

use serde::{Deserialize, Serialize};

/// Settings that control how the registry wires phase dependencies
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RegistrySettings {
    /// Wire PostBuild roots to their Build roots
    #[serde(default)]
    pub build_all_dependencies: bool,

    /// Target scope used when a target name is empty
    #[serde(default = "default_target")]
    pub default_target: String,
}

fn default_target() -> String {
    "All".to_string()
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            build_all_dependencies: false,
            default_target: default_target(),
        }
    }
}
