//! madpack Build - per-method build orchestration.
//!
//! For every method in a build manifest this crate renders a transient
//! `config.mk` from a shared template into the method's source directory,
//! runs the build tool there, and removes the generated file again.
//!
//! # Key Concepts
//!
//! - **Working context**: the directory build steps run in, held as an
//!   explicit value and switched only through a restoring scope
//! - **Generated config**: a file that must not pre-exist and never outlives
//!   one build cycle
//! - **Build tool**: an opaque subprocess reporting success or failure
//!
//! # Example
//!
//! ```rust,no_run
//! use madpack_build::{BuildLayout, Make, MethodBuilder, WorkingContext};
//! use madpack_config::BuildConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BuildConfig::load_file(std::path::Path::new("config/Config.yml"))?;
//! let builder = MethodBuilder::new(BuildLayout::from_root(std::path::Path::new(".")), Make::default());
//!
//! let mut ctx = WorkingContext::from_process()?;
//! let report = builder.run_all(&mut ctx, "install", &config, false)?;
//! for failed in report.failures() {
//!     eprintln!("{} failed", failed.name);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod driver;
pub mod error;
pub mod scope;
pub mod template;
pub mod tool;

pub use driver::{BuildLayout, BuildReport, ExitPolicy, MethodBuilder, MethodOutcome};
pub use error::{BuildError, BuildResult, Misconfiguration, ToolFailure};
pub use scope::WorkingContext;
pub use template::{GENERATED_FILE_NAME, TemplateVariables, render, render_bytes, render_file};
pub use tool::{BuildTool, DEFAULT_BUILD_PROGRAM, Make, ToolStatus};
