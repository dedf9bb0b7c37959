//! Hook registrations: the wiring between source and target modules

use crate::error::{RegistryError, Result};
use crate::registry::ModuleRegistry;
use arbor_types::{valid_module_name, HookRegistration};
use tracing::debug;

impl ModuleRegistry {
    /// Registrations whose source is `module`, ascending by sequence.
    /// Cached per source module.
    pub fn hooks_for(&self, module: &str) -> Result<Vec<HookRegistration>> {
        let key = module.to_ascii_lowercase();
        if let Some(cached) = self.hook_cache.get(&key) {
            return Ok(cached.clone());
        }
        let hooks = self.hook_store.hooks_for_source(module)?;
        debug!(module, count = hooks.len(), "hook registrations loaded");
        self.hook_cache.insert(key, hooks.clone());
        Ok(hooks)
    }

    pub fn register_hook(&self, hook: HookRegistration) -> Result<()> {
        if !valid_module_name(&hook.target_module) {
            return Err(RegistryError::InvalidName(hook.target_module));
        }
        if !valid_module_name(&hook.source_module) {
            return Err(RegistryError::InvalidName(hook.source_module));
        }
        self.invalidate_hooks(&hook.source_module, &hook.target_module);
        self.hook_store.insert_hook(hook)
    }

    /// Removes matching registrations (sequence ignored). Returns the number
    /// of rows removed.
    pub fn unregister_hook(&self, hook: &HookRegistration) -> Result<u64> {
        if !valid_module_name(&hook.target_module) {
            return Err(RegistryError::InvalidName(hook.target_module.clone()));
        }
        self.invalidate_hooks(&hook.source_module, &hook.target_module);
        self.hook_store.delete_hook(hook)
    }

    /// Whether any registration wires `source` to `target`. Cached per pair.
    pub fn is_hooked(&self, target: &str, source: &str) -> Result<bool> {
        if !valid_module_name(target) {
            return Err(RegistryError::InvalidName(target.to_owned()));
        }
        if !valid_module_name(source) {
            return Err(RegistryError::InvalidName(source.to_owned()));
        }
        let key = (target.to_ascii_lowercase(), source.to_ascii_lowercase());
        if let Some(cached) = self.hooked_cache.get(&key) {
            return Ok(*cached);
        }
        let hooked = self.hook_store.count_hooks(source, target)? > 0;
        self.hooked_cache.insert(key, hooked);
        Ok(hooked)
    }

    fn invalidate_hooks(&self, source: &str, target: &str) {
        self.hook_cache.remove(&source.to_ascii_lowercase());
        self.hooked_cache
            .remove(&(target.to_ascii_lowercase(), source.to_ascii_lowercase()));
    }
}
