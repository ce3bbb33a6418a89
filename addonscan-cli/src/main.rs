// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! addonscan CLI - discovers and catalogs Meteor Client addons on GitHub.
//!
//! # Examples
//!
//! ```bash
//! # Scan with the default config, writing addons.json
//! addonscan scan addons.json
//!
//! # Explicit config and an invalid-repository log
//! addonscan scan --config config.json addons.json invalid.txt
//!
//! # JSON run report
//! addonscan --format json --pretty scan addons.json
//!
//! # Show the resolved configuration
//! addonscan config show
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use addonscan_scanner::ScanError;
use addonscan_store::StoreError;
use commands::{config, scan};

// ============================================================================
// CLI Definition
// ============================================================================

/// addonscan CLI - Meteor addon discovery.
#[derive(Parser)]
#[command(name = "addonscan")]
#[command(about = "Discovers and catalogs Meteor Client addons hosted on GitHub")]
#[command(long_about = r"
addonscan searches GitHub for Meteor Client addons, parses each candidate
repository, and writes the resulting addon list as JSON.

Candidates come from:
  • Code search for fabric.mod.json files with a meteor entrypoint
  • Code search for classes extending MeteorAddon
  • Forks of MeteorDevelopment/meteor-addon-template

Examples:
  addonscan scan addons.json                       # Default config
  addonscan scan -c config.json addons.json bad.txt
  addonscan --format json scan addons.json         # JSON run report
")]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format for reports (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (no logging).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Locate, parse, and validate addons, then write the results.
    #[command(visible_alias = "s")]
    Scan(scan::ScanArgs),

    /// Inspect configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// Bad arguments, such as an output path that already exists.
    Usage = 2,
    /// Discovery could not complete, so no results were written.
    DiscoveryFailed = 3,
}

impl ExitCode {
    fn for_error(err: &anyhow::Error) -> Self {
        if err
            .downcast_ref::<StoreError>()
            .is_some_and(StoreError::is_usage)
        {
            Self::Usage
        } else if err.downcast_ref::<ScanError>().is_some_and(ScanError::is_fatal) {
            Self::DiscoveryFailed
        } else {
            Self::Error
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("addonscan=debug,info")
        } else {
            EnvFilter::new("addonscan=info,warn")
        }
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Scan(args) => scan::run(args, &cli).await,
        Commands::Config(args) => config::run(args, &cli),
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(ExitCode::for_error(&e) as i32);
    }

    std::process::exit(ExitCode::Success as i32);
}
