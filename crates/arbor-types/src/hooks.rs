//! Hook registrations and hook chain outcomes

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Extra information threaded through dispatch calls and hook chains.
pub type ExtraInfo = serde_json::Map<String, serde_json::Value>;

/// Which surface a hook targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookArea {
    /// Produces markup collected into the caller's page
    Gui,
    /// Transforms the extra-info payload for the next hook in the chain
    Api,
}

/// A cross-module callback registration.
///
/// Fired when `source_module` performs `action` on `object`; the call is
/// routed to `target_func` of `target_module`. Registrations within one
/// source module are ordered by ascending `sequence`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookRegistration {
    /// What kind of thing the action applies to ("item", "category", "module")
    pub object: String,

    /// The action being performed ("create", "display", "updateconfig", ...)
    pub action: String,

    pub area: HookArea,

    /// Module performing the action
    pub source_module: String,

    /// Module receiving the callback
    pub target_module: String,

    /// Handler type of the target ("user", "admin", ...)
    pub target_type: String,

    /// Function invoked on the target
    pub target_func: String,

    pub sequence: u32,
}

impl HookRegistration {
    pub fn matches(&self, object: &str, action: &str) -> bool {
        self.object == object && self.action == action
    }
}

/// Result of running a hook chain.
///
/// GUI-classified actions yield rendered output; everything else yields the
/// accumulated extra-info map. The tag tells callers which mode ran, so they
/// never have to know it in advance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HookOutcome {
    /// GUI outputs joined with newlines
    Rendered(String),

    /// Raw per-target-module GUI output, kept when the caller asked not to
    /// implode and at least one hook produced output
    Fragments(BTreeMap<String, String>),

    /// Accumulated extra-info payload from an API-area chain
    DataMerged(ExtraInfo),
}

impl HookOutcome {
    /// Rendered text, flattening fragments; `None` for data outcomes.
    pub fn rendered(&self) -> Option<String> {
        match self {
            HookOutcome::Rendered(s) => Some(s.clone()),
            HookOutcome::Fragments(map) => {
                Some(map.values().cloned().collect::<Vec<_>>().join("\n"))
            }
            HookOutcome::DataMerged(_) => None,
        }
    }

    /// Accumulated data payload; `None` for GUI outcomes.
    pub fn data(&self) -> Option<&ExtraInfo> {
        match self {
            HookOutcome::DataMerged(info) => Some(info),
            _ => None,
        }
    }
}
