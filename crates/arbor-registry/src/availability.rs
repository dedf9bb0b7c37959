//! Availability: is a module usable right now?

use crate::registry::ModuleRegistry;
use arbor_types::{valid_module_name, ModuleState};
use tracing::debug;

impl ModuleRegistry {
    /// Whether a module can be loaded and dispatched to.
    ///
    /// True iff the module is active, or it is an infrastructure module
    /// (per the configured allowlist) in the upgraded or inactive states -
    /// those must keep working while the core itself is mid-upgrade.
    ///
    /// `force` pins the cached state to active: this call and every later
    /// non-forced call answer true. The per-module state cache is otherwise
    /// refreshed only by `force`.
    pub fn available(&self, module: &str, force: bool) -> bool {
        if !valid_module_name(module) {
            return false;
        }
        let key = module.to_ascii_lowercase();

        if force || !self.state_cache.contains_key(&key) {
            if let Ok(info) = self.info_from_name(module) {
                self.state_cache.insert(key.clone(), info.state);
            }
        }
        if force {
            debug!(module, "availability forced, pinning state to active");
            self.state_cache.insert(key.clone(), ModuleState::Active);
        }

        match self.state_cache.get(&key).map(|state| *state) {
            Some(ModuleState::Active) => true,
            Some(ModuleState::Upgraded) | Some(ModuleState::Inactive) => {
                self.config.is_infrastructure(module)
            }
            _ => false,
        }
    }
}
