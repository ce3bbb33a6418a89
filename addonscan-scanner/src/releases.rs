//! Release asset resolution.

use std::cmp::Ordering;
use std::sync::LazyLock;

use addonscan_core::ReleaseFacts;
use addonscan_core::version::compare_mc_versions;
use addonscan_fetch::{AssetDocument, GitHubApi, ReleaseDocument};
use regex::Regex;
use tracing::debug;

use crate::error::ScanError;

/// Jar suffixes that are never the distributable build.
const EXCLUDED_SUFFIXES: [&str; 4] = ["-dev.jar", "-sources.jar", "-all.jar", "-javadoc.jar"];

static FILENAME_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[_\-.])(?:mc)?[_\-.]?(1\.\d+(?:\.\d+)?)(?:[_\-.]|\.jar$)")
        .expect("Invalid regex")
});

/// Returns true if an asset name is a distributable jar.
pub fn is_eligible_asset(name: &str) -> bool {
    let name = name.to_lowercase();
    name.ends_with(".jar") && !EXCLUDED_SUFFIXES.iter().any(|s| name.ends_with(s))
}

/// Minecraft version embedded in an asset name, e.g. `addon-1.20.1.jar`.
pub fn filename_version(name: &str) -> Option<&str> {
    FILENAME_VERSION_RE
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

// ============================================================================
// Accumulator
// ============================================================================

/// Folds release pages into [`ReleaseFacts`].
///
/// Every eligible asset of every non-draft release adds to the download
/// count. Only the first stable and the first prerelease release that carry
/// eligible assets contribute download links.
#[derive(Debug, Default)]
pub struct ReleaseAccumulator {
    stable: Option<Vec<AssetDocument>>,
    prerelease: Option<Vec<AssetDocument>>,
    download_count: u64,
}

impl ReleaseAccumulator {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one release.
    pub fn add(&mut self, release: &ReleaseDocument) {
        if release.draft {
            return;
        }

        let eligible: Vec<AssetDocument> = release
            .assets
            .iter()
            .filter(|a| is_eligible_asset(&a.name))
            .cloned()
            .collect();
        if eligible.is_empty() {
            return;
        }

        self.download_count += eligible.iter().map(|a| a.download_count).sum::<u64>();

        let slot = if release.prerelease {
            &mut self.prerelease
        } else {
            &mut self.stable
        };
        if slot.is_none() {
            *slot = Some(eligible);
        }
    }

    /// Finishes into the facts recorded on an addon.
    pub fn finish(self) -> ReleaseFacts {
        let assets: Vec<AssetDocument> = self
            .stable
            .into_iter()
            .chain(self.prerelease)
            .flatten()
            .collect();

        let latest = pick_latest(&assets)
            .map(|a| a.url.clone())
            .unwrap_or_default();

        ReleaseFacts {
            downloads: assets.into_iter().map(|a| a.url).collect(),
            latest,
            download_count: self.download_count,
        }
    }
}

/// Highest filename version wins; the first asset if none carries one.
fn pick_latest(assets: &[AssetDocument]) -> Option<&AssetDocument> {
    let mut best: Option<(&AssetDocument, &str)> = None;
    for asset in assets {
        let Some(version) = filename_version(&asset.name) else {
            continue;
        };
        let newer = best.is_none_or(|(_, current)| {
            compare_mc_versions(version, current) == Ordering::Greater
        });
        if newer {
            best = Some((asset, version));
        }
    }

    best.map(|(asset, _)| asset).or_else(|| assets.first())
}

// ============================================================================
// Fetching
// ============================================================================

/// Pages through a repository's releases.
///
/// Stops at the first empty page or at `max_pages`. A repository without
/// releases yields empty facts.
pub async fn fetch_releases(
    api: &GitHubApi,
    id: &str,
    page_size: u32,
    max_pages: u32,
) -> Result<ReleaseFacts, ScanError> {
    let mut accumulator = ReleaseAccumulator::new();

    for page in 1..=max_pages {
        let releases = api.releases(id, page_size, page).await?;
        if releases.is_empty() {
            break;
        }
        for release in &releases {
            accumulator.add(release);
        }
    }

    let facts = accumulator.finish();
    debug!(
        repo = %id,
        downloads = facts.downloads.len(),
        download_count = facts.download_count,
        "Releases resolved"
    );
    Ok(facts)
}
