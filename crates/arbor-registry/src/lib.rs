//! Arbor Registry - the process-wide module directory
//!
//! The [`ModuleRegistry`] owns the cached view of the three persisted tables
//! (modules, module variables, hook registrations) and answers the questions
//! the dispatch core asks: what modules exist, what state they are in, what
//! they are capable of, what their settings are, and which hooks they have
//! wired up.
//!
//! Persistence is reached through port traits ([`ModuleStore`], [`VarStore`],
//! [`HookStore`]); in-memory implementations are provided for development and
//! testing. Production deployments back the same traits with a relational
//! store.
//!
//! All caches live for the registry's lifetime. The "installing" flag makes
//! metadata reads bypass the cache while modules are being installed or
//! upgraded.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod availability;
pub mod config;
pub mod error;
pub mod hooks;
pub mod memory;
pub mod metadata;
pub mod persist;
pub mod registry;
pub mod vars;

// Re-exports
pub use config::RegistryConfig;
pub use error::{RegistryError, Result};
pub use memory::{InMemoryHookStore, InMemoryModuleStore, InMemoryVarStore};
pub use persist::{HookStore, ModuleStore, VarStore};
pub use registry::ModuleRegistry;
