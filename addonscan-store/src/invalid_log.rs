//! The invalid-repository log.
//!
//! A newline-separated list of repositories that failed to parse on earlier
//! runs. Listed repositories are skipped, and new failures are appended
//! before the file is rewritten.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use addonscan_core::InvalidAddon;
use tracing::{debug, info, warn};

use crate::error::StoreError;

/// Repositories known to be invalid, keyed case-insensitively.
#[derive(Debug, Clone)]
pub struct InvalidRepoLog {
    path: PathBuf,
    entries: BTreeMap<String, String>,
    /// Set when the file on disk could not be read; saving would drop it.
    read_only: bool,
}

impl InvalidRepoLog {
    /// Creates an empty log that will be saved to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
            read_only: false,
        }
    }

    /// Loads the log at `path`. A missing file yields an empty log.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let mut log = Self::new(path);
        if !log.path.exists() {
            debug!(path = %log.path.display(), "Invalid repo log not found, starting empty");
            return Ok(log);
        }

        let content = tokio::fs::read_to_string(&log.path).await?;
        log.extend_ids(content.lines());

        info!(path = %log.path.display(), entries = log.len(), "Loaded invalid repo log");
        Ok(log)
    }

    /// Loads the log at `path`, or starts an empty one if the file cannot be
    /// read. An unreadable file is never overwritten by [`save`](Self::save).
    pub async fn load_or_empty(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::load(path.clone()).await {
            Ok(log) => log,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load invalid repo log, it will not be updated");
                Self {
                    read_only: true,
                    ..Self::new(path)
                }
            }
        }
    }

    /// Returns true if the log was not readable and will not be saved.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Where the log is saved.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if `id` is listed, ignoring case.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(&id.trim().to_lowercase())
    }

    /// Listed identifiers, sorted case-insensitively.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(String::as_str)
    }

    /// Number of listed identifiers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is listed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds identifiers, skipping blanks and ones already listed. Returns how
    /// many were new.
    pub fn extend_ids<I, S>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let before = self.entries.len();
        for id in ids {
            let id = id.as_ref().trim();
            if !id.is_empty() {
                self.entries
                    .entry(id.to_lowercase())
                    .or_insert_with(|| id.to_string());
            }
        }
        self.entries.len() - before
    }

    /// Appends the identifiers of a run's invalid addons.
    pub fn record(&mut self, invalid: &[InvalidAddon]) -> usize {
        self.extend_ids(invalid.iter().map(|a| a.id.as_str()))
    }

    /// Rewrites the file with every listed identifier, one per line.
    ///
    /// Does nothing for a log that failed to load.
    pub async fn save(&self) -> Result<(), StoreError> {
        if self.read_only {
            warn!(path = %self.path.display(), "Invalid repo log was unreadable, leaving it untouched");
            return Ok(());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut content = String::new();
        for id in self.ids() {
            content.push_str(id);
            content.push('\n');
        }
        tokio::fs::write(&self.path, content).await?;

        info!(path = %self.path.display(), entries = self.len(), "Updated invalid repo log");
        Ok(())
    }
}
