//! `meteor-addon-list.json`, the optional document addon authors publish
//! to override what the scanner infers.

use addonscan_core::version::{is_mc_version, sort_newest_first};
use addonscan_core::{CustomProperties, FeatureDirectories, Tag};
use addonscan_fetch::GitHubApi;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ScanError;

/// Custom document location relative to the repository root.
pub const CUSTOM_PATH: &str = "meteor-addon-list.json";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CustomDocument {
    description: String,
    tags: Vec<String>,
    supported_versions: Vec<String>,
    icon: String,
    discord: String,
    homepage: String,
    feature_directories: FeatureDirectories,
}

impl From<CustomDocument> for CustomProperties {
    fn from(doc: CustomDocument) -> Self {
        let mut tags: Vec<Tag> = Vec::new();
        for tag in doc.tags.iter().filter_map(|t| Tag::parse(t)) {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        let mut supported_versions: Vec<String> = doc
            .supported_versions
            .iter()
            .map(|v| v.trim().to_string())
            .filter(|v| is_mc_version(v))
            .collect();
        sort_newest_first(&mut supported_versions);
        supported_versions.dedup();

        CustomProperties {
            description: doc.description,
            tags,
            supported_versions,
            icon: doc.icon,
            discord: doc.discord,
            homepage: doc.homepage,
            feature_directories: doc.feature_directories,
        }
    }
}

/// Decodes and normalizes a custom document body.
pub fn parse_custom(body: &str) -> Result<CustomProperties, serde_json::Error> {
    let doc: CustomDocument = serde_json::from_str(body)?;
    Ok(doc.into())
}

/// Fetches a repository's custom document.
///
/// A missing or undecodable document yields defaults. Transport errors are
/// returned.
pub async fn fetch_custom(
    api: &GitHubApi,
    id: &str,
    branch: &str,
) -> Result<CustomProperties, ScanError> {
    let Some(body) = api.raw(id, branch, CUSTOM_PATH).await? else {
        return Ok(CustomProperties::default());
    };

    match parse_custom(&body) {
        Ok(custom) => {
            debug!(repo = %id, tags = custom.tags.len(), "Custom properties loaded");
            Ok(custom)
        }
        Err(e) => {
            warn!(repo = %id, error = %e, "Ignoring malformed {CUSTOM_PATH}");
            Ok(CustomProperties::default())
        }
    }
}
