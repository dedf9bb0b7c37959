//! The registry object owning every process-wide cache

use crate::config::RegistryConfig;
use crate::persist::{HookStore, ModuleStore, VarStore};
use arbor_types::{HookRegistration, ModuleId, ModuleRecord, ModuleState};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Process-wide module directory.
///
/// Owns the cached view of the modules, module-variables and hook tables.
/// Constructed once per process with explicit persistence ports; dispatch
/// call sites receive it by reference instead of reaching for ambient
/// statics.
pub struct ModuleRegistry {
    pub(crate) config: RegistryConfig,
    installing: AtomicBool,

    pub(crate) module_store: Arc<dyn ModuleStore>,
    pub(crate) var_store: Arc<dyn VarStore>,
    pub(crate) hook_store: Arc<dyn HookStore>,

    // Metadata: full table keyed by id, plus the lowercased name/alias index
    pub(crate) modules: RwLock<Option<BTreeMap<ModuleId, ModuleRecord>>>,
    pub(crate) ids_by_name: RwLock<HashMap<String, ModuleId>>,
    pub(crate) capability_cache: DashMap<String, Vec<ModuleRecord>>,

    // Variables, lazily loaded per module
    pub(crate) var_cache: DashMap<String, BTreeMap<String, serde_json::Value>>,

    // Availability, keyed by lowercased module name
    pub(crate) state_cache: DashMap<String, ModuleState>,

    // Hook registrations per lowercased source module, and hooked-pair flags
    pub(crate) hook_cache: DashMap<String, Vec<HookRegistration>>,
    pub(crate) hooked_cache: DashMap<(String, String), bool>,
}

impl ModuleRegistry {
    pub fn new(
        config: RegistryConfig,
        module_store: Arc<dyn ModuleStore>,
        var_store: Arc<dyn VarStore>,
        hook_store: Arc<dyn HookStore>,
    ) -> Self {
        let installing = AtomicBool::new(config.installing);
        ModuleRegistry {
            config,
            installing,
            module_store,
            var_store,
            hook_store,
            modules: RwLock::new(None),
            ids_by_name: RwLock::new(HashMap::new()),
            capability_cache: DashMap::new(),
            var_cache: DashMap::new(),
            state_cache: DashMap::new(),
            hook_cache: DashMap::new(),
            hooked_cache: DashMap::new(),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Whether metadata reads currently bypass the cache.
    pub fn installing(&self) -> bool {
        self.installing.load(Ordering::Relaxed)
    }

    /// Toggles installing mode. Leaving installing mode drops the cached
    /// metadata so the next read sees the post-install table.
    pub fn set_installing(&self, installing: bool) {
        self.installing.store(installing, Ordering::Relaxed);
        if !installing {
            self.invalidate_metadata();
        }
    }

    /// Drops every metadata-derived cache. Needed after module
    /// install/upgrade/uninstall under a persistent worker.
    pub fn invalidate_metadata(&self) {
        *self.modules.write() = None;
        self.ids_by_name.write().clear();
        self.capability_cache.clear();
        self.state_cache.clear();
    }
}
