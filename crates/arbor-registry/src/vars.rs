//! Module variables: lazily loaded, write-through cached settings

use crate::error::{RegistryError, Result};
use crate::registry::ModuleRegistry;
use arbor_types::{decode_var, encode_var, valid_module_name, valid_var_name};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

impl ModuleRegistry {
    fn ensure_vars(&self, module: &str) -> Result<()> {
        if self.var_cache.contains_key(module) {
            return Ok(());
        }
        let rows = self.var_store.load_vars(module)?;
        debug!(module, count = rows.len(), "module variables loaded");
        let mut vars = BTreeMap::new();
        for (name, raw) in rows {
            let value = decode_var(module, &name, &raw);
            vars.insert(name, value);
        }
        self.var_cache.insert(module.to_owned(), vars);
        Ok(())
    }

    fn validate_pair(&self, module: &str, name: &str) -> Result<()> {
        if !valid_module_name(module) {
            return Err(RegistryError::InvalidName(module.to_owned()));
        }
        if !valid_var_name(name) {
            return Err(RegistryError::InvalidVarName(name.to_owned()));
        }
        Ok(())
    }

    /// Value of one variable, or `default` when the module has no such row.
    ///
    /// A system override for the variable name shadows the persisted value
    /// whenever the module actually has the row.
    pub fn get_var(&self, module: &str, name: &str, default: Value) -> Result<Value> {
        self.validate_pair(module, name)?;
        self.ensure_vars(module)?;
        match self.var_cache.get(module).and_then(|vars| vars.get(name).cloned()) {
            Some(value) => {
                if let Some(overridden) = self.config.system_overrides.get(name) {
                    return Ok(overridden.clone());
                }
                Ok(value)
            }
            None => Ok(default),
        }
    }

    /// Every variable of the module, overrides applied.
    pub fn get_vars(&self, module: &str) -> Result<BTreeMap<String, Value>> {
        if !valid_module_name(module) {
            return Err(RegistryError::InvalidName(module.to_owned()));
        }
        self.ensure_vars(module)?;
        let mut out = self
            .var_cache
            .get(module)
            .map(|vars| vars.clone())
            .unwrap_or_default();
        for (name, value) in out.iter_mut() {
            if let Some(overridden) = self.config.system_overrides.get(name) {
                *value = overridden.clone();
            }
        }
        Ok(out)
    }

    pub fn has_var(&self, module: &str, name: &str) -> Result<bool> {
        self.validate_pair(module, name)?;
        self.ensure_vars(module)?;
        Ok(self
            .var_cache
            .get(module)
            .map(|vars| vars.contains_key(name))
            .unwrap_or(false))
    }

    /// Sets a variable, persisting first. The cache is only touched when
    /// persistence succeeded.
    ///
    /// The integers 0 and 1 share a persisted form with the strings "0" and
    /// "1" and come back as strings after a cache-cold read; store boolean
    /// flags as `true`/`false` when the type matters.
    pub fn set_var(&self, module: &str, name: &str, value: Value) -> Result<()> {
        self.validate_pair(module, name)?;
        let raw = encode_var(&value);
        self.var_store.upsert_var(module, name, &raw)?;
        self.ensure_vars(module)?;
        if let Some(mut vars) = self.var_cache.get_mut(module) {
            vars.insert(name.to_owned(), value);
        }
        Ok(())
    }

    pub fn set_vars(&self, module: &str, vars: BTreeMap<String, Value>) -> Result<()> {
        for (name, value) in vars {
            self.set_var(module, &name, value)?;
        }
        Ok(())
    }

    /// Deletes one variable, or all variables of the module when `name` is
    /// `None`. Returns the number of rows removed.
    pub fn del_var(&self, module: &str, name: Option<&str>) -> Result<u64> {
        if !valid_module_name(module) {
            return Err(RegistryError::InvalidName(module.to_owned()));
        }
        let removed = self.var_store.delete_vars(module, name)?;
        match name {
            Some(name) => {
                if let Some(mut vars) = self.var_cache.get_mut(module) {
                    vars.remove(name);
                }
            }
            None => {
                self.var_cache.remove(module);
            }
        }
        Ok(removed)
    }

    /// Primes the variable cache for a set of core modules in one pass.
    /// Skipped entirely while installing.
    pub fn preload_vars(&self, modules: &[&str]) -> Result<()> {
        if self.installing() {
            return Ok(());
        }
        for module in modules {
            self.ensure_vars(module)?;
        }
        Ok(())
    }
}
