//! Runtime error types.

use std::path::PathBuf;

use thiserror::Error;

use strait_core::BusError;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The requested configuration file does not exist.
    #[error("configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// The configuration could not be parsed or extracted.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// The configuration was loaded but is not usable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors that can occur during runtime operations.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Configuration failure.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Message bus failure.
    #[error(transparent)]
    Bus(#[from] BusError),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
