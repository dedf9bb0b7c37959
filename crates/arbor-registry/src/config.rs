//! Registry configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Modules that must keep working while the core itself is mid-upgrade.
///
/// A module whose lowercased name contains one of these needles is treated
/// as available even in the upgraded or inactive states.
pub const INFRASTRUCTURE_ALLOWLIST: &[&str] = &[
    "modules",
    "admin",
    "theme",
    "block",
    "groups",
    "permissions",
    "users",
];

/// Configuration for a [`crate::ModuleRegistry`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// When true, metadata reads bypass the cache and variable preloading is
    /// skipped. Set for the duration of module install/upgrade runs.
    #[serde(default)]
    pub installing: bool,

    /// Deployment-level variable overrides, keyed by variable name. An
    /// override shadows the persisted value of that variable in every module
    /// that has a row for it.
    #[serde(default)]
    pub system_overrides: BTreeMap<String, serde_json::Value>,

    /// Needles for the infrastructure-module availability exception.
    #[serde(default = "default_allowlist")]
    pub infrastructure_allowlist: Vec<String>,
}

fn default_allowlist() -> Vec<String> {
    INFRASTRUCTURE_ALLOWLIST
        .iter()
        .map(|s| (*s).to_owned())
        .collect()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            installing: false,
            system_overrides: BTreeMap::new(),
            infrastructure_allowlist: default_allowlist(),
        }
    }
}

impl RegistryConfig {
    pub fn is_infrastructure(&self, module: &str) -> bool {
        let lowered = module.to_ascii_lowercase();
        self.infrastructure_allowlist
            .iter()
            .any(|needle| lowered.contains(needle.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infrastructure_match_is_substring_and_case_insensitive() {
        let config = RegistryConfig::default();
        assert!(config.is_infrastructure("Groups"));
        assert!(config.is_infrastructure("ZAuthUsers"));
        assert!(!config.is_infrastructure("News"));
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: RegistryConfig = serde_json::from_str("{}").unwrap();
        assert!(!config.installing);
        assert!(config.system_overrides.is_empty());
        assert_eq!(
            config.infrastructure_allowlist.len(),
            INFRASTRUCTURE_ALLOWLIST.len()
        );
    }
}
