//! Manifest validation.
//!
//! Method names and ports are joined into filesystem paths, so each must be
//! a single plain path component.

use std::collections::HashSet;

use tracing::warn;

use crate::error::{ConfigError, ConfigResult};
use crate::types::{BuildConfig, MethodSpec};

/// Validate a deserialized manifest.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &BuildConfig) -> ConfigResult<()> {
    if config.target_schema.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "target_schema".to_owned(),
            message: "target_schema must not be empty".to_owned(),
        });
    }

    let mut seen = HashSet::new();
    for (index, method) in config.methods.iter().enumerate() {
        validate_method(index, method)?;
        if !seen.insert(method.name.as_str()) {
            warn!(method = %method.name, "method listed more than once in manifest");
        }
    }

    Ok(())
}

fn validate_method(index: usize, method: &MethodSpec) -> ConfigResult<()> {
    validate_component(&format!("methods[{index}].name"), &method.name)?;
    validate_component(&format!("methods[{index}].port"), &method.port)
}

fn validate_component(field: &str, value: &str) -> ConfigResult<()> {
    let message = if value.is_empty() {
        Some("must not be empty".to_owned())
    } else if value == "." || value == ".." {
        Some(format!("'{value}' is not a directory name"))
    } else if value.contains(['/', '\\']) {
        Some(format!("'{value}' must not contain path separators"))
    } else {
        None
    };

    match message {
        Some(message) => Err(ConfigError::ValidationError {
            field: field.to_owned(),
            message,
        }),
        None => Ok(()),
    }
}
