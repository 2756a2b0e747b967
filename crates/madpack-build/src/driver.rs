//! Method build driver.
//!
//! For each manifest method, in order: enter its source directory, check
//! its install descriptor, render the generated config file, run the build
//! tool when there is a module to build, then remove the generated file.
//! Directory, descriptor and render errors stop the whole run.

use std::path::{Path, PathBuf};

use madpack_config::{
    BuildConfig, ConfigError, INSTALL_DESCRIPTOR_FILE, InstallDescriptor, MethodSpec,
};
use tracing::{debug, info, info_span, warn};

use crate::error::{BuildError, BuildResult, Misconfiguration, ToolFailure};
use crate::scope::WorkingContext;
use crate::template::{self, GENERATED_FILE_NAME, TemplateVariables};
use crate::tool::{BuildTool, ToolStatus};

/// Where method sources and the shared template live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLayout {
    /// Directory holding one subdirectory per method.
    pub methods_root: PathBuf,
    /// Template rendered into every method's generated config file.
    pub template: PathBuf,
}

impl BuildLayout {
    /// Explicit layout.
    #[must_use]
    pub fn new(methods_root: impl Into<PathBuf>, template: impl Into<PathBuf>) -> Self {
        Self {
            methods_root: methods_root.into(),
            template: template.into(),
        }
    }

    /// Standard layout under an installation root: `<root>/methods` and
    /// `<root>/config/config.mk`.
    #[must_use]
    pub fn from_root(root: &Path) -> Self {
        Self::new(
            root.join("methods"),
            root.join("config").join(GENERATED_FILE_NAME),
        )
    }

    fn resolved(&self, ctx: &WorkingContext) -> Self {
        Self::new(ctx.resolve(&self.methods_root), ctx.resolve(&self.template))
    }
}

/// What to do when the build tool exits unsuccessfully.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExitPolicy {
    /// Log a warning, record the status, and continue with the next method.
    #[default]
    Report,
    /// Stop the run with [`BuildError::BuildTool`].
    FailFast,
}

/// Result of processing one method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodOutcome {
    /// Method name.
    pub name: String,
    /// Module named by the install descriptor.
    pub module: Option<String>,
    /// Build tool status, if the tool ran.
    pub status: Option<ToolStatus>,
}

impl MethodOutcome {
    /// Whether the build tool ran for this method.
    #[must_use]
    pub fn invoked(&self) -> bool {
        self.status.is_some()
    }

    /// Whether the build tool ran and failed.
    #[must_use]
    pub fn failed(&self) -> bool {
        self.status.is_some_and(|s| !s.success())
    }
}

/// Outcomes of a completed run, in manifest order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// One entry per method.
    pub methods: Vec<MethodOutcome>,
}

impl BuildReport {
    /// Methods whose build tool run failed.
    pub fn failures(&self) -> impl Iterator<Item = &MethodOutcome> {
        self.methods.iter().filter(|m| m.failed())
    }

    /// Whether every build tool run succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Drives the build tool over every method of a manifest.
#[derive(Debug)]
pub struct MethodBuilder<T> {
    layout: BuildLayout,
    tool: T,
    policy: ExitPolicy,
}

impl<T: BuildTool> MethodBuilder<T> {
    /// Create a builder with the default [`ExitPolicy::Report`].
    #[must_use]
    pub fn new(layout: BuildLayout, tool: T) -> Self {
        Self {
            layout,
            tool,
            policy: ExitPolicy::default(),
        }
    }

    /// Set the exit policy.
    #[must_use]
    pub fn with_policy(mut self, policy: ExitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The build tool.
    #[must_use]
    pub fn tool(&self) -> &T {
        &self.tool
    }

    /// Run `command` for every method in `config`.
    ///
    /// `ctx` is the working context the run starts from; it is restored
    /// before this returns, on success and on error.
    ///
    /// # Errors
    ///
    /// Stops at the first method whose directory cannot be entered, whose
    /// install descriptor is missing or malformed, or whose generated config
    /// file cannot be written or removed. A build tool that cannot be started
    /// is also fatal and leaves that method's generated file in place. A tool
    /// that runs and fails is fatal only under [`ExitPolicy::FailFast`].
    pub fn run_all(
        &self,
        ctx: &mut WorkingContext,
        command: &str,
        config: &BuildConfig,
        verbose: bool,
    ) -> BuildResult<BuildReport> {
        info!("Processing methods: {command}");
        let layout = self.layout.resolved(ctx);
        let variables = TemplateVariables::from_config(config);
        let mut report = BuildReport::default();

        for method in &config.methods {
            let span = info_span!("method", name = %method.name, port = %method.port);
            let _guard = span.enter();

            let source_dir = method.source_dir(&layout.methods_root);
            let outcome = ctx.with_directory(&source_dir, |scope| {
                self.build_method(scope, method, &layout, &variables, command, verbose)
            })?;
            report.methods.push(outcome);
        }

        Ok(report)
    }

    fn build_method(
        &self,
        ctx: &WorkingContext,
        method: &MethodSpec,
        layout: &BuildLayout,
        variables: &TemplateVariables,
        command: &str,
        verbose: bool,
    ) -> BuildResult<MethodOutcome> {
        let dir = ctx.current();
        let descriptor = load_descriptor(method, &dir.join(INSTALL_DESCRIPTOR_FILE))?;

        // Generated even when there is no module to build.
        let generated = dir.join(GENERATED_FILE_NAME);
        let rendered = template::render_file(&layout.template, variables)?;
        template::write_rendered(&rendered, &generated)?;

        let status = match descriptor.module.as_deref() {
            Some(module) => {
                info!("- {module}");
                // On spawn failure the generated file stays behind.
                let status = self.tool.invoke(dir, command, verbose).map_err(|source| {
                    BuildError::BuildTool {
                        method: method.name.clone(),
                        failure: ToolFailure::Spawn {
                            program: self.tool.program().to_owned(),
                            source,
                        },
                    }
                })?;
                Some(status)
            },
            None => {
                debug!("no module to install; skipping build tool");
                None
            },
        };

        template::remove_rendered(&generated)?;

        if let Some(status) = status.filter(|s| !s.success()) {
            match self.policy {
                ExitPolicy::Report => {
                    warn!(%status, "{} {command} failed", self.tool.program());
                },
                ExitPolicy::FailFast => {
                    return Err(BuildError::BuildTool {
                        method: method.name.clone(),
                        failure: ToolFailure::Exit(status),
                    });
                },
            }
        }

        Ok(MethodOutcome {
            name: method.name.clone(),
            module: descriptor.module,
            status,
        })
    }
}

fn load_descriptor(method: &MethodSpec, path: &Path) -> BuildResult<InstallDescriptor> {
    InstallDescriptor::load(path).map_err(|err| {
        debug!(error = %err, "rejected install descriptor");
        let reason = match err {
            ConfigError::MissingField { .. } => Misconfiguration::MissingModuleField,
            ConfigError::ValidationError { field, message } if field == "module" => {
                Misconfiguration::InvalidModuleField(message)
            },
            ConfigError::ReadError { source, .. } => {
                Misconfiguration::MissingDescriptor(source.to_string())
            },
            ConfigError::ParseError { source, .. } => {
                Misconfiguration::MissingDescriptor(source.to_string())
            },
            other => Misconfiguration::MissingDescriptor(other.to_string()),
        };
        BuildError::MisconfiguredMethod {
            method: method.name.clone(),
            reason,
        }
    })
}
