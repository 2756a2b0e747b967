//! External build tool invocation.

use std::fmt;
use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use tracing::debug;

/// Default build tool program.
pub const DEFAULT_BUILD_PROGRAM: &str = "make";

/// Exit status of a build tool run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolStatus {
    code: Option<i32>,
}

impl ToolStatus {
    /// A run that exited with `code`.
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    /// A run terminated without an exit code (by a signal, on Unix).
    #[must_use]
    pub const fn terminated() -> Self {
        Self { code: None }
    }

    /// Whether the run succeeded.
    #[must_use]
    pub const fn success(self) -> bool {
        matches!(self.code, Some(0))
    }

    /// The exit code, if the process exited normally.
    #[must_use]
    pub const fn code(self) -> Option<i32> {
        self.code
    }
}

impl From<ExitStatus> for ToolStatus {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

impl fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {code}"),
            None => f.write_str("terminated by signal"),
        }
    }
}

/// Runs one build command in a directory.
pub trait BuildTool {
    /// Program name, for diagnostics.
    fn program(&self) -> &str;

    /// Run the tool with `command` as its sole argument inside `dir`.
    ///
    /// When `verbose` is set the tool's stdout and stderr pass through to the
    /// caller's console; otherwise both are discarded. Blocks until the tool
    /// exits; there is no timeout.
    ///
    /// # Errors
    ///
    /// Returns an error only if the process could not be started or waited
    /// on. A tool that runs and fails is reported through [`ToolStatus`].
    fn invoke(&self, dir: &Path, command: &str, verbose: bool) -> io::Result<ToolStatus>;
}

/// `make`, or a compatible program, run as a subprocess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Make {
    program: String,
}

impl Make {
    /// Use `program` instead of `make`.
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for Make {
    fn default() -> Self {
        Self::with_program(DEFAULT_BUILD_PROGRAM)
    }
}

impl BuildTool for Make {
    fn program(&self) -> &str {
        &self.program
    }

    fn invoke(&self, dir: &Path, command: &str, verbose: bool) -> io::Result<ToolStatus> {
        let output = || if verbose { Stdio::inherit() } else { Stdio::null() };

        debug!(program = %self.program, command, dir = %dir.display(), "running build tool");
        let status = Command::new(&self.program)
            .arg(command)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(output())
            .stderr(output())
            .status()?;

        Ok(status.into())
    }
}
