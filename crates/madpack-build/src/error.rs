//! Build error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::tool::ToolStatus;

/// Errors that stop a build run.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A method's source directory is absent or inaccessible.
    #[error("directory {} does not exist", path.display())]
    DirectoryNotFound {
        /// Directory that could not be entered.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A generated config file was left behind by an earlier run.
    #[error("old {} found; must be manually deleted", path.display())]
    AlreadyExists {
        /// Path of the leftover file.
        path: PathBuf,
    },

    /// The template could not be read.
    #[error("cannot read {}", path.display())]
    ReadError {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The generated config file could not be created or removed.
    #[error("cannot write {}", path.display())]
    WriteError {
        /// Path that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A method's install descriptor is missing or malformed.
    #[error("method {method} misconfigured: {reason}")]
    MisconfiguredMethod {
        /// Method name from the manifest.
        method: String,
        /// What is wrong with the descriptor.
        reason: Misconfiguration,
    },

    /// The build tool could not run, or failed under a fail-fast policy.
    #[error("build tool failed for method {method}")]
    BuildTool {
        /// Method name from the manifest.
        method: String,
        /// How the tool failed.
        #[source]
        failure: ToolFailure,
    },
}

/// Why an install descriptor was rejected.
#[derive(Debug, Error)]
pub enum Misconfiguration {
    /// The descriptor file is missing or does not parse; holds the cause.
    #[error("missing install descriptor ({0})")]
    MissingDescriptor(String),

    /// The descriptor has no `module` key.
    #[error("missing module field")]
    MissingModuleField,

    /// The `module` value is neither a string nor null.
    #[error("invalid module field: {0}")]
    InvalidModuleField(String),
}

/// How the build tool failed.
#[derive(Debug, Error)]
pub enum ToolFailure {
    /// The process could not be started.
    #[error("could not run {program}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The process ran and reported failure.
    #[error("{0}")]
    Exit(ToolStatus),
}

/// Result type for build operations.
pub type BuildResult<T> = Result<T, BuildError>;

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    /// Display text of every error in the `source()` chain.
    fn chain(err: &dyn std::error::Error) -> Vec<String> {
        let mut messages = vec![err.to_string()];
        let mut source = err.source();
        while let Some(cause) = source {
            messages.push(cause.to_string());
            source = cause.source();
        }
        messages
    }

    #[test]
    fn test_io_cause_appears_once_in_chain() {
        let err = BuildError::ReadError {
            path: PathBuf::from("/srv/config/config.mk"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };

        assert_eq!(
            chain(&err),
            ["cannot read /srv/config/config.mk", "permission denied"]
        );
    }

    #[test]
    fn test_spawn_failure_chain() {
        let err = BuildError::BuildTool {
            method: "sketch".to_owned(),
            failure: ToolFailure::Spawn {
                program: "make".to_owned(),
                source: io::Error::new(io::ErrorKind::NotFound, "not found"),
            },
        };

        assert_eq!(
            chain(&err),
            [
                "build tool failed for method sketch",
                "could not run make",
                "not found"
            ]
        );
    }

    #[test]
    fn test_exit_failure_chain() {
        let err = BuildError::BuildTool {
            method: "sketch".to_owned(),
            failure: ToolFailure::Exit(ToolStatus::from_code(2)),
        };

        assert_eq!(
            chain(&err),
            ["build tool failed for method sketch", "exit code 2"]
        );
        assert!(err.source().is_some());
    }
}
