//! Config command - inspect configuration.

use std::path::PathBuf;

use addonscan_store::{default_config_path, load_config};
use anyhow::Result;
use clap::{Args, Subcommand};

use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the resolved configuration.
    Show {
        /// Configuration file (defaults to the user config directory).
        #[arg(long, short)]
        config: Option<PathBuf>,
    },

    /// Show the default configuration path.
    Path,
}

/// Runs the config command.
pub fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show { config } => show_config(config.as_ref(), cli),
        ConfigAction::Path => show_path(cli),
    }
}

fn show_config(path: Option<&PathBuf>, cli: &Cli) -> Result<()> {
    let config = load_config(path.map(PathBuf::as_path))?;

    match cli.format {
        OutputFormat::Text => {
            let verified = &config.verified_addons;
            let descriptions = &config.module_descriptions;
            let triggers = &config.suspicion_triggers;

            println!("addonscan Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("Verified addons:      {}", verified.verified.len());
            println!(
                "Minimum MC version:   {}",
                if verified.minimum_mc_version.is_empty() {
                    "none"
                } else {
                    verified.minimum_mc_version.as_str()
                }
            );
            println!("Validate forks:       {}", verified.validate_forks);
            println!("Repo blacklist:       {}", config.repo_blacklist.len());
            println!("Developer blacklist:  {}", config.developer_blacklist.len());
            println!("Require MC version:   {}", config.require_mc_version);
            println!("Ignore archived:      {}", config.ignore_archived);
            println!("Ignore forks:         {}", config.ignore_forks);
            println!();
            println!("Feature descriptions:");
            println!("  Fetch:              {}", descriptions.fetch);
            println!("  Only verified:      {}", descriptions.only_verified);
            println!("  Minimum stars:      {}", descriptions.minimum_star_count);
            println!();
            println!("Suspicion triggers:");
            println!("  Name length:        {}", triggers.name_length);
            println!("  Description length: {}", triggers.description_length);
            println!("  Feature count:      {}", triggers.feature_count);
            println!("  Supported versions: {}", triggers.supported_versions);
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&config)?);
        }
    }

    Ok(())
}

fn show_path(cli: &Cli) -> Result<()> {
    let path = default_config_path();

    match cli.format {
        OutputFormat::Text => println!("{}", path.display()),
        OutputFormat::Json => {
            let paths = serde_json::json!({ "config_file": path.display().to_string() });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}
