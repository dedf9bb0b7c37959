//! Module metadata: records, name resolution, capability listings

use crate::error::{RegistryError, Result};
use crate::registry::ModuleRegistry;
use arbor_types::{valid_module_name, CapabilityMap, ModuleId, ModuleRecord, ModuleState};
use std::collections::BTreeMap;
use tracing::debug;

impl ModuleRegistry {
    fn refresh_modules(&self) -> Result<()> {
        let loaded = self.module_store.load_modules()?;
        debug!(count = loaded.len(), "module table loaded");

        let mut table: BTreeMap<ModuleId, ModuleRecord> = BTreeMap::new();
        for record in loaded {
            table.insert(record.id, record);
        }
        // Id 0 is always the synthetic core record, whatever the store says.
        table.insert(ModuleId::CORE, ModuleRecord::core());

        let mut index = self.ids_by_name.write();
        index.clear();
        for record in table.values() {
            index.insert(record.name.to_ascii_lowercase(), record.id);
            index.insert(record.url_alias().to_ascii_lowercase(), record.id);
        }
        drop(index);

        self.capability_cache.clear();
        *self.modules.write() = Some(table);
        Ok(())
    }

    fn ensure_modules(&self) -> Result<()> {
        if self.installing() || self.modules.read().is_none() {
            self.refresh_modules()?;
        }
        Ok(())
    }

    /// Record for a module id. Id 0 always resolves to the synthetic core
    /// record regardless of the backing store.
    pub fn info(&self, id: ModuleId) -> Result<ModuleRecord> {
        self.ensure_modules()?;
        self.modules
            .read()
            .as_ref()
            .and_then(|table| table.get(&id).cloned())
            .ok_or(RegistryError::IdNotFound(id))
    }

    /// Resolves a name or url alias, case-insensitively, to a module id.
    pub fn id_from_name(&self, name: &str) -> Result<ModuleId> {
        if !valid_module_name(name) {
            return Err(RegistryError::InvalidName(name.to_owned()));
        }
        self.ensure_modules()?;
        self.ids_by_name
            .read()
            .get(&name.to_ascii_lowercase())
            .copied()
            .ok_or_else(|| RegistryError::ModuleNotFound(name.to_owned()))
    }

    pub fn info_from_name(&self, name: &str) -> Result<ModuleRecord> {
        let id = self.id_from_name(name)?;
        self.info(id)
    }

    /// Active modules plus the module-administration module, ordered by
    /// display name. The synthetic core record is not listed.
    pub fn all_modules(&self) -> Result<Vec<ModuleRecord>> {
        self.ensure_modules()?;
        let mut modules: Vec<ModuleRecord> = self
            .modules
            .read()
            .as_ref()
            .map(|table| {
                table
                    .values()
                    .filter(|m| !m.id.is_core())
                    .filter(|m| {
                        m.state == ModuleState::Active || m.name.eq_ignore_ascii_case("modules")
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        modules.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        Ok(modules)
    }

    /// Modules in the given state, ordered by display name.
    pub fn modules_by_state(&self, state: ModuleState) -> Result<Vec<ModuleRecord>> {
        self.ensure_modules()?;
        let mut modules: Vec<ModuleRecord> = self
            .modules
            .read()
            .as_ref()
            .map(|table| {
                table
                    .values()
                    .filter(|m| !m.id.is_core() && m.state == state)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        modules.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        Ok(modules)
    }

    /// Modules declaring the given capability. Cached per capability.
    pub fn modules_capable_of(&self, capability: &str) -> Result<Vec<ModuleRecord>> {
        if let Some(cached) = self.capability_cache.get(capability) {
            return Ok(cached.clone());
        }
        let capable: Vec<ModuleRecord> = self
            .all_modules()?
            .into_iter()
            .filter(|m| m.has_capability(capability))
            .collect();
        self.capability_cache
            .insert(capability.to_owned(), capable.clone());
        Ok(capable)
    }

    pub fn is_capable(&self, module: &str, capability: &str) -> Result<bool> {
        Ok(self.info_from_name(module)?.has_capability(capability))
    }

    pub fn capabilities_of(&self, module: &str) -> Result<CapabilityMap> {
        Ok(self.info_from_name(module)?.capabilities)
    }
}
