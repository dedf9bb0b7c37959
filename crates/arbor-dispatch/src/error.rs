//! Dispatch error types

use arbor_registry::RegistryError;
use thiserror::Error;

/// Dispatch errors.
///
/// "The module name is malformed", "the module does not exist", "the module
/// exists but is switched off" and "the function is not there" are four
/// different answers, and callers get to tell them apart.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid module name: {0:?}")]
    InvalidName(String),

    #[error("unknown module: {0}")]
    UnknownModule(String),

    #[error("module not available: {0}")]
    Unavailable(String),

    #[error("no handler for {module}::{func}")]
    NotFound { module: String, func: String },

    #[error("handler for {module} has contract {actual:?}, expected {expected:?}")]
    ContractViolation {
        module: String,
        expected: String,
        actual: String,
    },

    #[error("no acting module: none named in the call and no current-module context set")]
    NoCurrentModule,

    #[error("handler error: {0}")]
    Handler(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Result type for dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;
