//! Configuration error types.

use std::io;

use thiserror::Error;

/// Errors raised while loading a build manifest or install descriptor.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("Failed to read config file at {path}")]
    ReadError {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to parse YAML.
    #[error("Failed to parse config file at {path}")]
    ParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Underlying YAML parse error.
        #[source]
        source: serde_yaml::Error,
    },

    /// A required key is absent.
    #[error("Missing field '{field}' in {path}")]
    MissingField {
        /// Path to the file missing the key.
        path: String,
        /// Name of the missing key.
        field: String,
    },

    /// Configuration validation failed.
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// Field that failed validation.
        field: String,
        /// Validation failure description.
        message: String,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
