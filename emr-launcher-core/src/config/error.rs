//! Settings error types

use thiserror::Error;

/// Errors raised while reading process settings
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Environment variable '{var}' not found")]
    EnvVarNotFound { var: String },

    #[error("Invalid value '{value}' for environment variable '{var}': {message}")]
    InvalidVar {
        var: String,
        value: String,
        message: String,
    },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Result type for settings operations
pub type ConfigResult<T> = Result<T, ConfigError>;
