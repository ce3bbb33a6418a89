//! The end-of-run report.

use std::collections::BTreeMap;
use std::path::PathBuf;

use addonscan_core::{InvalidAddon, ScanStats};
use serde::Serialize;

/// Everything a scan run has to say once it is done.
#[derive(Debug, Default, Serialize)]
pub struct ScanReport {
    /// Addon list path.
    pub output: PathBuf,
    /// Invalid addon list path.
    pub invalid_output: PathBuf,
    /// Candidates found before filtering.
    pub located: usize,
    /// Candidates removed by the repository blacklist.
    pub removed_repos: usize,
    /// Candidates removed by the developer blacklist.
    pub removed_developers: usize,
    /// Candidates skipped because the invalid log lists them.
    pub skipped: usize,
    /// Result counters.
    pub stats: ScanStats,
    /// Fork validation result per verified fork.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fork_checks: BTreeMap<String, String>,
    /// Configured minimum version, empty if none.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub minimum_version: String,
    /// Addons that lost verification to the minimum version, with the
    /// version compared.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub below_minimum: BTreeMap<String, String>,
    /// Suspicion reasons per addon.
    pub suspicious: BTreeMap<String, Vec<String>>,
    /// Rejected candidates.
    pub invalid: Vec<InvalidAddon>,
}
