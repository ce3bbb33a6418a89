//! Configuration loading.

use std::path::{Path, PathBuf};

use addonscan_core::ScanConfig;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::persistence::ensure_json_extension;

/// Returns the default configuration file path.
///
/// - Linux: `~/.config/addonscan/config.json`
/// - macOS: `~/Library/Application Support/addonscan/config.json`
/// - Windows: `%APPDATA%\addonscan\config.json`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("addonscan")
        .join("config.json")
}

/// Loads configuration from `path`, or from [`default_config_path`] when
/// none is given.
pub fn load_config(path: Option<&Path>) -> Result<ScanConfig, StoreError> {
    match path {
        Some(path) => load_from(path),
        None => load_from(&default_config_path()),
    }
}

/// Loads and validates configuration from a specific path.
///
/// A missing file yields the defaults. The path must end in `.json` either
/// way.
pub fn load_from(path: &Path) -> Result<ScanConfig, StoreError> {
    ensure_json_extension(path)?;

    if !path.exists() {
        debug!(path = %path.display(), "Config file not found, using defaults");
        return Ok(ScanConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: ScanConfig = serde_json::from_str(&content)?;
    config.validate()?;

    info!(
        path = %path.display(),
        verified = config.verified_addons.verified.len(),
        blacklisted = config.repo_blacklist.len() + config.developer_blacklist.len(),
        "Loaded configuration"
    );
    Ok(config)
}
