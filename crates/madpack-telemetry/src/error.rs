//! Telemetry error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::TryInitError;

/// Errors that can occur while setting up logging.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The requested log format is not known.
    #[error("unknown log format '{0}'; expected one of: pretty, compact, json, full")]
    UnknownFormat(String),

    /// A level or directive could not be parsed.
    #[error("invalid log filter '{directive}'")]
    InvalidFilter {
        /// The offending level or directive text.
        directive: String,
        /// Parser error.
        #[source]
        source: ParseError,
    },

    /// The log file directory could not be created.
    #[error("cannot create log directory {}", path.display())]
    LogDirectory {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A global subscriber is already installed.
    #[error("failed to install the global subscriber")]
    InitError(#[from] TryInitError),
}

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
