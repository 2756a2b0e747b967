//! Manifest and descriptor struct definitions.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File name of the per-method install descriptor.
pub const INSTALL_DESCRIPTOR_FILE: &str = "Install.yml";

/// The parsed build manifest (`Config.yml`).
///
/// Global variables feed the generated build configuration of every method;
/// `methods` is processed in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Database schema the methods are installed into.
    pub target_schema: String,
    /// Library directory of the embedded scripting runtime.
    pub plpython_libdir: String,
    /// Preprocessor flags passed to the SQL preprocessing step.
    pub prep_flags: String,
    /// Database driver identifier.
    pub dbapi2: String,
    /// Methods to build, in manifest order.
    pub methods: Vec<MethodSpec>,
}

/// One method entry of the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSpec {
    /// Method name; also the method's directory under the methods root.
    pub name: String,
    /// Backend port to build, a subdirectory of the method's `src/`.
    pub port: String,
}

impl MethodSpec {
    /// Create a method entry.
    #[must_use]
    pub fn new(name: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            port: port.into(),
        }
    }

    /// Source directory of this method's port: `<base>/<name>/src/<port>`.
    #[must_use]
    pub fn source_dir(&self, base: &Path) -> PathBuf {
        base.join(&self.name).join("src").join(&self.port)
    }
}

/// Per-method install metadata read from [`INSTALL_DESCRIPTOR_FILE`].
///
/// The `module` key is mandatory, but its value may be null, which means the
/// port has nothing to install.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallDescriptor {
    /// Installable module name, if any.
    pub module: Option<String>,
}

impl InstallDescriptor {
    /// Whether this port installs anything.
    #[must_use]
    pub fn has_module(&self) -> bool {
        self.module.is_some()
    }
}
