//! In-memory implementations of the persistence ports
//!
//! Suitable for development and testing. Production deployments back the
//! same traits with a relational store.

use crate::error::Result;
use crate::persist::{HookStore, ModuleStore, VarStore};
use arbor_types::{HookRegistration, ModuleRecord, ModuleState};
use dashmap::DashMap;
use parking_lot::RwLock;

/// In-memory modules table.
#[derive(Default)]
pub struct InMemoryModuleStore {
    modules: RwLock<Vec<ModuleRecord>>,
}

impl InMemoryModuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a module row, keyed by id.
    pub fn insert(&self, record: ModuleRecord) {
        let mut modules = self.modules.write();
        modules.retain(|m| m.id != record.id);
        modules.push(record);
    }

    /// Updates the persisted state of a module, if present.
    pub fn set_state(&self, name: &str, state: ModuleState) {
        let mut modules = self.modules.write();
        if let Some(record) = modules.iter_mut().find(|m| m.name.eq_ignore_ascii_case(name)) {
            record.state = state;
        }
    }
}

impl ModuleStore for InMemoryModuleStore {
    fn load_modules(&self) -> Result<Vec<ModuleRecord>> {
        Ok(self.modules.read().clone())
    }
}

/// In-memory module-variables table.
#[derive(Default)]
pub struct InMemoryVarStore {
    // (module, name) -> raw value
    rows: DashMap<(String, String), String>,
}

impl InMemoryVarStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VarStore for InMemoryVarStore {
    fn load_vars(&self, module: &str) -> Result<Vec<(String, String)>> {
        let mut vars: Vec<(String, String)> = self
            .rows
            .iter()
            .filter(|entry| entry.key().0 == module)
            .map(|entry| (entry.key().1.clone(), entry.value().clone()))
            .collect();
        vars.sort();
        Ok(vars)
    }

    fn upsert_var(&self, module: &str, name: &str, raw: &str) -> Result<()> {
        self.rows
            .insert((module.to_owned(), name.to_owned()), raw.to_owned());
        Ok(())
    }

    fn delete_vars(&self, module: &str, name: Option<&str>) -> Result<u64> {
        let before = self.rows.len();
        match name {
            Some(name) => {
                self.rows.remove(&(module.to_owned(), name.to_owned()));
            }
            None => {
                self.rows.retain(|key, _| key.0 != module);
            }
        }
        Ok((before - self.rows.len()) as u64)
    }
}

/// In-memory hook-registrations table.
#[derive(Default)]
pub struct InMemoryHookStore {
    hooks: RwLock<Vec<HookRegistration>>,
}

impl InMemoryHookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn same_wiring(a: &HookRegistration, b: &HookRegistration) -> bool {
    a.object == b.object
        && a.action == b.action
        && a.area == b.area
        && a.source_module == b.source_module
        && a.target_module == b.target_module
        && a.target_type == b.target_type
        && a.target_func == b.target_func
}

impl HookStore for InMemoryHookStore {
    fn hooks_for_source(&self, module: &str) -> Result<Vec<HookRegistration>> {
        let mut hooks: Vec<HookRegistration> = self
            .hooks
            .read()
            .iter()
            .filter(|h| h.source_module.eq_ignore_ascii_case(module))
            .cloned()
            .collect();
        hooks.sort_by_key(|h| h.sequence);
        Ok(hooks)
    }

    fn insert_hook(&self, hook: HookRegistration) -> Result<()> {
        self.hooks.write().push(hook);
        Ok(())
    }

    fn delete_hook(&self, hook: &HookRegistration) -> Result<u64> {
        let mut hooks = self.hooks.write();
        let before = hooks.len();
        hooks.retain(|h| !same_wiring(h, hook));
        Ok((before - hooks.len()) as u64)
    }

    fn count_hooks(&self, source: &str, target: &str) -> Result<u64> {
        Ok(self
            .hooks
            .read()
            .iter()
            .filter(|h| {
                h.source_module.eq_ignore_ascii_case(source)
                    && h.target_module.eq_ignore_ascii_case(target)
            })
            .count() as u64)
    }
}
