//! Error types for pf-core

use thiserror::Error;

/// Core error type for Pmoflow
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Failed to parse configuration file
    #[error("[C002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// C003: Invalid configuration value
    #[error("[C003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C004: Row width does not match the table header
    #[error("[C004] Row has {found} values but table '{table}' has {expected} columns")]
    RowWidthMismatch {
        table: String,
        expected: usize,
        found: usize,
    },

    /// C005: Required environment variable is not set
    #[error("[C005] Environment variable '{name}' is not set")]
    MissingEnvVar { name: String },

    /// C006: IO error with file path context
    #[error("[C006] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<serde_yaml::Error> for CoreError {
    fn from(err: serde_yaml::Error) -> Self {
        CoreError::ConfigParseError {
            message: err.to_string(),
        }
    }
}
