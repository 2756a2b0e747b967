//! madpack CLI - builds every method port listed in a build manifest.
//!
//! Each subcommand names the build tool target run in every method's source
//! directory (`install`, `clean`, or any other target via `make`).

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use madpack_build::DEFAULT_BUILD_PROGRAM;
use madpack_telemetry::{LogConfig, LogFormat};

mod build;

/// Exit status for a run stopped by a fatal error.
const FATAL_EXIT_CODE: u8 = 2;

/// madpack - per-method build orchestrator
#[derive(Parser)]
#[command(name = "madpack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Show build tool output and enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Installation root containing `methods/` and `config/`
    #[arg(long, global = true, env = "MADPACK_ROOT", default_value = ".")]
    root: PathBuf,

    /// Build manifest (defaults to `<root>/config/Config.yml`)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Build tool program
    #[arg(long, global = true, default_value = DEFAULT_BUILD_PROGRAM)]
    make: String,

    /// Stop at the first method whose build tool run fails
    #[arg(long, global = true)]
    strict: bool,

    /// Log format: pretty, compact (default), json or full
    #[arg(long, global = true, default_value = "compact")]
    log_format: LogFormat,

    /// Write logs to daily files in this directory instead of stderr
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Extra log filter directive, e.g. `madpack_build=trace` (repeatable)
    #[arg(long = "log-filter", global = true, value_name = "DIRECTIVE")]
    log_filters: Vec<String>,

    /// Disable colored log output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Build and install every method
    Install,

    /// Clean every method's build output
    Clean,

    /// Run an arbitrary build tool target for every method
    Make {
        /// Target passed to the build tool
        target: String,
    },
}

impl Commands {
    /// Build tool argument for this subcommand.
    fn target(&self) -> &str {
        match self {
            Self::Install => "install",
            Self::Clean => "clean",
            Self::Make { target } => target,
        }
    }
}

impl Cli {
    fn log_config(&self) -> LogConfig {
        let level = if self.verbose { "debug" } else { "info" };
        let mut config = LogConfig::new(level).with_format(self.log_format);
        for directive in &self.log_filters {
            config = config.with_directive(directive);
        }
        if self.no_color {
            config = config.without_ansi();
        }
        match &self.log_dir {
            Some(dir) => config.with_file_logging(dir),
            None => config,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = madpack_telemetry::setup_logging(&cli.log_config()) {
        eprintln!("Failed to initialize logging: {e}");
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(FATAL_EXIT_CODE)
        },
    }
}

fn run(cli: &Cli) -> Result<()> {
    let manifest = cli
        .config
        .clone()
        .unwrap_or_else(|| build::default_manifest_path(&cli.root));

    let options = build::BuildOptions {
        root: cli.root.clone(),
        manifest,
        program: cli.make.clone(),
        strict: cli.strict,
        verbose: cli.verbose,
    };
    build::run_build(&options, cli.command.target())
}
