//! Arbor Types - Core data model for the module registry and dispatch core
//!
//! Arbor manages pluggable modules for a modular CMS: their lifecycle state,
//! capability sets, per-module variables, and the cross-module hook chains
//! fired when one module acts on another's objects.
//!
//! ## Key Concepts
//!
//! - **ModuleRecord**: One installed module - name, directory, kind, state,
//!   capabilities
//! - **Module variables**: Per-module key/value settings with a persisted
//!   string encoding
//! - **HookRegistration**: A cross-module callback wired to an
//!   (object, action) pair
//! - **HookOutcome**: Tagged result of a hook chain - rendered GUI output or
//!   merged API data
//! - **ModuleEvent**: Mutable envelope for dispatch lifecycle notifications

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod events;
pub mod hooks;
pub mod module;
pub mod vars;

// Re-export main types
pub use events::{event_names, ModuleEvent};
pub use hooks::{ExtraInfo, HookArea, HookOutcome, HookRegistration};
pub use module::{
    valid_module_name, valid_var_name, CapabilityMap, ModuleId, ModuleKind, ModuleRecord,
    ModuleState,
};
pub use vars::{decode_var, encode_var};
