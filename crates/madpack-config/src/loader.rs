//! Manifest and install descriptor loading.

use std::path::Path;

use serde_yaml::Value;
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::types::{BuildConfig, InstallDescriptor};
use crate::validate;

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Load and validate a build manifest.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read or parsed, or if the
/// manifest fails validation.
pub fn load_manifest(path: &Path) -> ConfigResult<BuildConfig> {
    let content = read_bounded(path)?;
    let config: BuildConfig =
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            source: e,
        })?;

    validate::validate(&config)?;
    debug!(
        path = %path.display(),
        methods = config.methods.len(),
        "loaded build manifest"
    );
    Ok(config)
}

/// Load an install descriptor.
///
/// The `module` key must be present. A document that is not a mapping (an
/// empty file, for instance) has no `module` key either.
///
/// # Errors
///
/// Returns [`ConfigError::ReadError`] or [`ConfigError::ParseError`] when the
/// file is missing or malformed, [`ConfigError::MissingField`] when `module`
/// is absent, and [`ConfigError::ValidationError`] when `module` is neither a
/// string nor null.
pub fn load_descriptor(path: &Path) -> ConfigResult<InstallDescriptor> {
    let content = read_bounded(path)?;
    let document: Value = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;

    let Some(module) = document.get("module") else {
        return Err(ConfigError::MissingField {
            path: path.display().to_string(),
            field: "module".to_owned(),
        });
    };

    let module = match module {
        Value::Null => None,
        Value::String(name) => Some(name.clone()),
        other => {
            return Err(ConfigError::ValidationError {
                field: "module".to_owned(),
                message: format!("expected a string or null, found {other:?}"),
            });
        },
    };

    Ok(InstallDescriptor { module })
}

/// Read a file, rejecting anything over [`MAX_CONFIG_FILE_SIZE`].
///
/// The size is checked after reading so there is no window between a stat
/// and the read.
fn read_bounded(path: &Path) -> ConfigResult<String> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {} byte limit",
                content.len(),
                MAX_CONFIG_FILE_SIZE
            ),
        });
    }

    Ok(content)
}
