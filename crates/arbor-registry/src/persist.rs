//! Persistence ports
//!
//! One trait per logical table. Implementations map these onto whatever
//! storage the deployment uses; the registry never sees column names or SQL.

use crate::error::Result;
use arbor_types::{HookRegistration, ModuleRecord};

/// Backing store for the modules table.
pub trait ModuleStore: Send + Sync {
    /// Every installed module. The registry caches the result; in installing
    /// mode it is re-fetched on each metadata read.
    fn load_modules(&self) -> Result<Vec<ModuleRecord>>;
}

/// Backing store for the module-variables table.
///
/// Values are the persisted string form (see `arbor_types::vars`).
pub trait VarStore: Send + Sync {
    /// All variables of one module as (name, raw value) pairs.
    fn load_vars(&self, module: &str) -> Result<Vec<(String, String)>>;

    /// Insert the row when absent, update it otherwise.
    fn upsert_var(&self, module: &str, name: &str, raw: &str) -> Result<()>;

    /// Delete one variable, or every variable of the module when `name` is
    /// `None`. Returns the number of rows removed.
    fn delete_vars(&self, module: &str, name: Option<&str>) -> Result<u64>;
}

/// Backing store for the hook-registrations table.
pub trait HookStore: Send + Sync {
    /// Registrations whose source is `module`, ordered by ascending sequence.
    fn hooks_for_source(&self, module: &str) -> Result<Vec<HookRegistration>>;

    fn insert_hook(&self, hook: HookRegistration) -> Result<()>;

    /// Removes registrations equal to `hook` (sequence ignored). Returns the
    /// number of rows removed.
    fn delete_hook(&self, hook: &HookRegistration) -> Result<u64>;

    /// Number of registrations from `source` targeting `target`.
    fn count_hooks(&self, source: &str, target: &str) -> Result<u64>;
}
