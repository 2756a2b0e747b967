//! Generated build configuration.
//!
//! A shared template is rendered per method by literal placeholder
//! substitution and written into the method's source directory as
//! [`GENERATED_FILE_NAME`]. The file lives for exactly one build cycle.

use std::io::{self, Write};
use std::path::Path;

use madpack_config::BuildConfig;
use tracing::debug;

use crate::error::{BuildError, BuildResult};

/// Name of the generated file in each method's source directory.
pub const GENERATED_FILE_NAME: &str = "config.mk";

/// Target schema placeholder.
pub const SCHEMA_PLACEHOLDER: &str = "SCHEMA_PLACEHOLDER";
/// Scripting runtime library directory placeholder.
pub const PLPYTHON_LIBDIR: &str = "PLPYTHON_LIBDIR";
/// Preprocessor definitions placeholder.
pub const CONFDEFS: &str = "CONFDEFS";
/// Database driver placeholder.
pub const DBAPI2_PLACEHOLDER: &str = "DBAPI2_PLACEHOLDER";

/// Placeholder values, held in substitution order.
///
/// Order matters: [`CONFDEFS`] expands to text containing the
/// [`PLPYTHON_LIBDIR`] token, which must not be substituted again, so
/// [`PLPYTHON_LIBDIR`] is replaced first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateVariables {
    substitutions: [(&'static str, String); 4],
}

impl TemplateVariables {
    /// Derive the substitutions from a manifest.
    #[must_use]
    pub fn from_config(config: &BuildConfig) -> Self {
        let confdefs = format!(
            "{} -DPLPYTHON_LIBDIR={}",
            config.prep_flags, config.plpython_libdir
        );
        Self {
            substitutions: [
                (SCHEMA_PLACEHOLDER, config.target_schema.clone()),
                (PLPYTHON_LIBDIR, config.plpython_libdir.clone()),
                (CONFDEFS, confdefs),
                (DBAPI2_PLACEHOLDER, config.dbapi2.clone()),
            ],
        }
    }

    /// `(token, value)` pairs in substitution order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.substitutions
            .iter()
            .map(|(token, value)| (*token, value.as_str()))
    }
}

/// Substitute every placeholder in `template`, line by line.
///
/// Line endings are preserved byte for byte.
#[must_use]
pub fn render(template: &str, variables: &TemplateVariables) -> String {
    // UTF-8 values substituted into UTF-8 text stay valid, so nothing is lost.
    String::from_utf8_lossy(&render_bytes(template.as_bytes(), variables)).into_owned()
}

/// Substitute every placeholder in raw template bytes, line by line.
///
/// Bytes outside the placeholders pass through untouched, whatever their
/// encoding.
#[must_use]
pub fn render_bytes(template: &[u8], variables: &TemplateVariables) -> Vec<u8> {
    let mut rendered = Vec::with_capacity(template.len());
    for line in template.split_inclusive(|&b| b == b'\n') {
        let mut line = line.to_vec();
        for (token, value) in variables.iter() {
            line = replace_all(&line, token.as_bytes(), value.as_bytes());
        }
        rendered.extend_from_slice(&line);
    }
    rendered
}

fn replace_all(haystack: &[u8], token: &[u8], value: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(haystack.len());
    let mut rest = haystack;
    while let Some(pos) = rest.windows(token.len()).position(|w| w == token) {
        let (before, after) = rest.split_at(pos);
        out.extend_from_slice(before);
        out.extend_from_slice(value);
        rest = after.get(token.len()..).unwrap_or_default();
    }
    out.extend_from_slice(rest);
    out
}

/// Read the template at `path` and render it.
///
/// # Errors
///
/// Returns [`BuildError::ReadError`] if the template cannot be read.
pub fn render_file(path: &Path, variables: &TemplateVariables) -> BuildResult<Vec<u8>> {
    let template = std::fs::read(path).map_err(|source| BuildError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(render_bytes(&template, variables))
}

/// Write rendered text to `dest`, refusing to replace an existing file.
///
/// The text is staged in a temporary file next to `dest` and moved into
/// place without clobbering, so a failed write leaves nothing at `dest`.
///
/// # Errors
///
/// Returns [`BuildError::AlreadyExists`] if `dest` exists (the existing file
/// is not touched) and [`BuildError::WriteError`] on any I/O failure.
pub fn write_rendered(contents: impl AsRef<[u8]>, dest: &Path) -> BuildResult<()> {
    if std::fs::symlink_metadata(dest).is_ok() {
        return Err(BuildError::AlreadyExists {
            path: dest.to_path_buf(),
        });
    }

    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut staged = tempfile::Builder::new()
        .prefix(".madpack-")
        .tempfile_in(dir)
        .map_err(|e| write_error(dest, e))?;
    staged
        .write_all(contents.as_ref())
        .and_then(|()| staged.flush())
        .map_err(|e| write_error(dest, e))?;

    staged.persist_noclobber(dest).map_err(|e| {
        if e.error.kind() == io::ErrorKind::AlreadyExists {
            BuildError::AlreadyExists {
                path: dest.to_path_buf(),
            }
        } else {
            write_error(dest, e.error)
        }
    })?;

    debug!(path = %dest.display(), "wrote generated config");
    Ok(())
}

/// Remove a generated file.
///
/// # Errors
///
/// Returns [`BuildError::WriteError`] if the file cannot be removed.
pub fn remove_rendered(path: &Path) -> BuildResult<()> {
    std::fs::remove_file(path).map_err(|e| write_error(path, e))?;
    debug!(path = %path.display(), "removed generated config");
    Ok(())
}

fn write_error(path: &Path, source: io::Error) -> BuildError {
    BuildError::WriteError {
        path: path.to_path_buf(),
        source,
    }
}
