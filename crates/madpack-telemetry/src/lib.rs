//! madpack Telemetry - logging setup for the madpack build orchestrator.
//!
//! This crate wires the `tracing` ecosystem for the binary: a level filter
//! with per-target directives, a choice of output format, and an output
//! target (stderr or daily-rotated files).
//!
//! # Example
//!
//! ```rust,no_run
//! use madpack_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), madpack_telemetry::TelemetryError> {
//! let config = LogConfig::new("debug")
//!     .with_format(LogFormat::Pretty)
//!     .with_directive("madpack_build=trace");
//!
//! setup_logging(&config)?;
//! tracing::info!("Processing methods");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{LogConfig, LogFormat, LogTarget, setup_logging};
