//! Registry error types

use arbor_types::ModuleId;
use thiserror::Error;

/// Registry errors.
///
/// Callers can tell a validation failure from a legitimate miss and from a
/// persistence problem; none of them are folded into a boolean.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid module name: {0:?}")]
    InvalidName(String),

    #[error("invalid variable name: {0:?}")]
    InvalidVarName(String),

    #[error("module not found: {0}")]
    ModuleNotFound(String),

    #[error("module id not found: {0}")]
    IdNotFound(ModuleId),

    #[error("persistence error: {0}")]
    Persistence(String),
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
