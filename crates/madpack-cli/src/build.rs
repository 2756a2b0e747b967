use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use madpack_build::{BuildLayout, BuildReport, ExitPolicy, Make, MethodBuilder, WorkingContext};
use madpack_config::BuildConfig;
use tracing::{info, warn};

/// Inputs for one build pass.
#[derive(Debug, Clone)]
pub(crate) struct BuildOptions {
    pub(crate) root: PathBuf,
    pub(crate) manifest: PathBuf,
    pub(crate) program: String,
    pub(crate) strict: bool,
    pub(crate) verbose: bool,
}

pub(crate) fn default_manifest_path(root: &Path) -> PathBuf {
    root.join("config").join("Config.yml")
}

/// Load the manifest, resolve the build tool, and build every method.
pub(crate) fn run_build(options: &BuildOptions, target: &str) -> Result<()> {
    let config = BuildConfig::load_file(&options.manifest)
        .with_context(|| format!("Failed to load manifest {}", options.manifest.display()))?;

    let program = which::which(&options.program).with_context(|| {
        format!(
            "`{}` is not installed or not in PATH; cannot build methods",
            options.program
        )
    })?;

    let policy = if options.strict {
        ExitPolicy::FailFast
    } else {
        ExitPolicy::Report
    };
    let builder = MethodBuilder::new(
        BuildLayout::from_root(&options.root),
        Make::with_program(program.to_string_lossy()),
    )
    .with_policy(policy);

    let mut ctx = WorkingContext::from_process().context("Failed to read current directory")?;
    let report = builder.run_all(&mut ctx, target, &config, options.verbose)?;
    summarize(&report, target);
    Ok(())
}

fn summarize(report: &BuildReport, target: &str) {
    let built = report.methods.iter().filter(|m| m.invoked()).count();
    let skipped = report.methods.len().saturating_sub(built);
    for failed in report.failures() {
        warn!(method = %failed.name, "{target} failed; rerun with --verbose for build output");
    }
    info!(
        built,
        skipped,
        failed = report.failures().count(),
        "Finished {target} for {} methods",
        report.methods.len()
    );
}
