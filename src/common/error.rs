//! Error types: configuration loading and rejected gameplay operations.

use thiserror::Error;

/// Errors that can occur when loading tunables from disk.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be found.
    #[error("Tunables file not found: {0}")]
    NotFound(String),

    /// File could not be read.
    #[error("Failed to read tunables '{path}': {details}")]
    Read { path: String, details: String },

    /// RON parsing failed.
    #[error("Parse error in tunables '{path}': {details}")]
    Parse { path: String, details: String },
}

/// Why a projectile refused to be reflected. Logged at debug level, never fatal.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ReflectError {
    #[error("projectile was already parried")]
    AlreadyParried,

    #[error("projectile cannot be parried")]
    NotParryable,
}
