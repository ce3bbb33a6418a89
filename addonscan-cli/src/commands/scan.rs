//! Scan command - the full discovery run.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use addonscan_core::ScanStats;
use addonscan_fetch::{GitHubApi, GitHubTransport};
use addonscan_scanner::{
    AddonParser, ParseDriver, RepositoryLocator, ScannerSettings, detect_suspicious,
    enforce_minimum_version, remove_blacklisted_developers, remove_blacklisted_repos,
    validate_forked_verified,
};
use addonscan_store::{InvalidRepoLog, load_config, validate_output_path, write_results};
use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use tracing::{info, warn};

use crate::output::{JsonFormatter, ScanReport, TextFormatter};
use crate::{Cli, OutputFormat};

/// Environment variable the token was read from before `GITHUB_TOKEN`.
const LEGACY_TOKEN_VAR: &str = "KEY";

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Where to write the addon list. Must end in .json and must not exist.
    pub output: PathBuf,

    /// Newline-separated list of repositories to skip, updated after the run.
    pub invalid_log: Option<PathBuf>,

    /// Configuration file (defaults to the user config directory).
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// GitHub API token.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Repositories parsed at once.
    #[arg(long, short, default_value_t = 8)]
    pub workers: usize,

    /// Last search page requested per discovery source.
    #[arg(long, default_value_t = 10)]
    pub max_pages: u32,
}

impl ScanArgs {
    fn token(&self) -> Option<String> {
        self.token
            .clone()
            .or_else(|| std::env::var(LEGACY_TOKEN_VAR).ok())
            .filter(|t| !t.trim().is_empty())
    }

    fn settings(&self) -> ScannerSettings {
        ScannerSettings::default()
            .with_workers(self.workers)
            .with_max_pages(self.max_pages)
    }
}

/// Runs the scan command.
pub async fn run(args: &ScanArgs, cli: &Cli) -> Result<()> {
    let started = Instant::now();

    validate_output_path(&args.output)?;
    let config = Arc::new(load_config(args.config.as_deref())?);

    let mut invalid_log = match &args.invalid_log {
        Some(path) => Some(InvalidRepoLog::load_or_empty(path).await),
        None => None,
    };

    let token = args.token();
    if token.is_none() {
        warn!("No GitHub token set, search quota will run out quickly");
    }
    let transport = GitHubTransport::new(token).context("Failed to build HTTP client")?;
    let api = GitHubApi::new(Arc::new(transport));
    let settings = args.settings();

    // Locate
    let mut candidates = RepositoryLocator::new(api.clone(), settings.clone())
        .locate(&config.verified_addons.verified)
        .await?;
    let located = candidates.len();

    let removed_repos = remove_blacklisted_repos(&mut candidates, &config.repo_blacklist);
    let removed_developers =
        remove_blacklisted_developers(&mut candidates, &config.developer_blacklist);
    info!(
        removed_repos,
        removed_developers,
        remaining = candidates.len(),
        "Applied blacklists"
    );

    // Parse
    let parser = Arc::new(
        AddonParser::new(api.clone(), Arc::clone(&config)).with_settings(settings.clone()),
    );
    let mut driver = ParseDriver::new(parser, Arc::clone(&config), settings.workers);
    if let Some(log) = &invalid_log {
        driver = driver.with_known_invalid(log.ids());
    }
    let outcome = driver.run(candidates.into_vec()).await;

    let mut addons = outcome.addons;
    addons.sort_by_key(|a| a.id().to_lowercase());

    // Validate
    let fork_checks = if config.verified_addons.validate_forks {
        validate_forked_verified(&api, &mut addons, Utc::now()).await
    } else {
        Default::default()
    };

    let minimum_version = config.verified_addons.minimum_mc_version.trim().to_string();
    let below_minimum = enforce_minimum_version(&mut addons, &minimum_version);
    let suspicious = detect_suspicious(&addons, &config.suspicion_triggers);

    // Persist
    if let Some(log) = invalid_log.as_mut() {
        let added = log.record(&outcome.invalid);
        match log.save().await {
            Ok(()) if log.is_read_only() => {}
            Ok(()) => info!(added, "Updated invalid repo log"),
            Err(e) => {
                warn!(path = %log.path().display(), error = %e, "Failed to save invalid repo log");
            }
        }
    }

    let invalid_output = write_results(&args.output, &addons, &outcome.invalid).await?;

    let stats = ScanStats::from_results(
        &addons,
        &outcome.invalid,
        outcome.excluded.len(),
        started.elapsed(),
    );

    let report = ScanReport {
        output: args.output.clone(),
        invalid_output,
        located,
        removed_repos,
        removed_developers,
        skipped: outcome.skipped,
        stats,
        fork_checks,
        minimum_version,
        below_minimum,
        suspicious,
        invalid: outcome.invalid,
    };

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_report(&report));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&report)?);
        }
    }

    Ok(())
}
