//! Module records: identity, kind, lifecycle state and capabilities

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Numeric identity of an installed module.
///
/// Id 0 is reserved for the synthetic core pseudo-module, which exists even
/// when the backing store has no row for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(pub u32);

impl ModuleId {
    /// The synthetic core pseudo-module.
    pub const CORE: ModuleId = ModuleId(0);

    pub fn is_core(&self) -> bool {
        *self == Self::CORE
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a module comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    /// Third-party module installed under the modules directory
    Module,
    /// Module shipped with the core under the system directory
    System,
    /// The synthetic core pseudo-module
    Core,
}

/// Lifecycle state of an installed module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleState {
    /// Present on disk but never initialised
    Uninitialised,
    /// Initialised but switched off
    Inactive,
    /// Initialised and running
    Active,
    /// Registered but no longer present on disk
    Missing,
    /// Files upgraded, database upgrade pending
    Upgraded,
    /// Blocked by the site administrator
    NotAllowed,
    /// Metadata could not be read
    Invalid,
}

/// Capability metadata keyed by capability name.
pub type CapabilityMap = BTreeMap<String, serde_json::Value>;

/// One installed module as seen by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleRecord {
    pub id: ModuleId,

    /// Canonical name, unique case-insensitively
    pub name: String,

    /// Human-readable name shown in listings
    pub display_name: String,

    /// Optional short name used in URLs; empty means "use the display name"
    #[serde(default)]
    pub url_alias: String,

    /// Directory the module lives in, relative to its kind's root
    pub directory: String,

    pub kind: ModuleKind,

    pub state: ModuleState,

    /// Capabilities this module declares, with per-capability metadata
    #[serde(default)]
    pub capabilities: CapabilityMap,
}

impl ModuleRecord {
    /// The synthetic core record returned for [`ModuleId::CORE`].
    pub fn core() -> Self {
        ModuleRecord {
            id: ModuleId::CORE,
            name: "core".to_owned(),
            display_name: "Arbor Core".to_owned(),
            url_alias: String::new(),
            directory: String::new(),
            kind: ModuleKind::Core,
            state: ModuleState::Active,
            capabilities: CapabilityMap::new(),
        }
    }

    /// URL alias with the display-name fallback applied.
    pub fn url_alias(&self) -> &str {
        if self.url_alias.is_empty() {
            &self.display_name
        } else {
            &self.url_alias
        }
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.contains_key(capability)
    }
}

/// Validates a module name: non-empty, ASCII alphanumeric or underscore.
///
/// Names failing this pattern are rejected before any store access.
pub fn valid_module_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Validates a module-variable name: non-empty and free of control characters.
pub fn valid_var_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(|c| c.is_control())
}
