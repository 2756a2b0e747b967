#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Build manifest and install descriptor types for madpack.
//!
//! The manifest (`Config.yml`) carries the global variables rendered into
//! every method's generated build configuration plus the ordered list of
//! methods. Each method port carries an `Install.yml` naming the module it
//! installs, or null when there is nothing to install.
//!
//! # Usage
//!
//! ```rust,no_run
//! use madpack_config::BuildConfig;
//!
//! let config = BuildConfig::load_file(std::path::Path::new("config/Config.yml")).unwrap();
//! for method in &config.methods {
//!     println!("{} ({})", method.name, method.port);
//! }
//! ```
//!
//! # Design
//!
//! This crate has **no dependencies on other internal madpack crates**. It
//! only depends on `serde`, `serde_yaml`, `thiserror`, and `tracing`.

/// Configuration error types.
pub mod error;
/// Manifest and descriptor file loading.
pub mod loader;
/// Configuration struct definitions.
pub mod types;
/// Manifest validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use types::*;

impl BuildConfig {
    /// Load and validate a manifest file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_manifest(path)
    }
}

impl InstallDescriptor {
    /// Load the descriptor at `path`.
    ///
    /// # Errors
    ///
    /// See [`loader::load_descriptor`].
    pub fn load(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_descriptor(path)
    }
}
