//! Per-repository parsing.
//!
//! [`AddonParser`] turns one candidate into an [`Addon`]. Its steps run in a
//! fixed order because later ones read what earlier ones fetched: the
//! repository record names the branch, the manifest names the entrypoint,
//! and the entrypoint source yields the features the template check needs.

use std::sync::Arc;

use addonscan_core::{
    Addon, Candidate, Features, Links, RepoInfo, ScanConfig, TEMPLATE_MANIFEST_ID,
    TEMPLATE_REPOSITORY,
};
use addonscan_fetch::GitHubApi;
use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::custom::fetch_custom;
use crate::descriptions::fetch_descriptions;
use crate::discord::{find_discord, is_invite};
use crate::error::ScanError;
use crate::features::fetch_features;
use crate::gradle::resolve_mc_version;
use crate::manifest::fetch_manifest;
use crate::releases::fetch_releases;
use crate::settings::ScannerSettings;

// ============================================================================
// Parser Trait
// ============================================================================

/// Turns a candidate into an addon.
///
/// `Ok(None)` means the repository was recognized and deliberately left
/// out, which is not a failure.
#[async_trait]
pub trait CandidateParser: Send + Sync {
    /// Parses one candidate.
    async fn parse(&self, candidate: &Candidate) -> Result<Option<Addon>, ScanError>;
}

// ============================================================================
// Addon Parser
// ============================================================================

/// The GitHub-backed parser.
#[derive(Debug, Clone)]
pub struct AddonParser {
    api: GitHubApi,
    config: Arc<ScanConfig>,
    settings: ScannerSettings,
}

impl AddonParser {
    /// Creates a parser with default settings.
    pub fn new(api: GitHubApi, config: Arc<ScanConfig>) -> Self {
        Self {
            api,
            config,
            settings: ScannerSettings::default(),
        }
    }

    /// Sets the scanner settings.
    pub fn with_settings(mut self, settings: ScannerSettings) -> Self {
        self.settings = settings;
        self
    }

    #[instrument(skip(self, candidate), fields(repo = %candidate.id))]
    async fn parse_candidate(&self, candidate: &Candidate) -> Result<Option<Addon>, ScanError> {
        let api = &self.api;
        info!("Parsing repository");

        let (repo, repo_body) = api.repository(&candidate.id).await?;
        let id = repo.full_name.clone();
        let branch = repo.default_branch.clone();

        if self.config.ignore_archived && repo.archived {
            return Err(ScanError::Ignored("Repository is archived".to_string()));
        }
        if self.config.ignore_forks && repo.fork && !candidate.verified {
            return Err(ScanError::Ignored("Repository is a fork".to_string()));
        }

        let (manifest, manifest_body) = fetch_manifest(api, &id, &branch).await?;

        let description = if repo.description.is_empty() {
            manifest.description.clone()
        } else {
            repo.description.clone()
        };
        if description.is_empty() {
            debug!("Missing description");
        }

        let authors = if manifest.authors.is_empty() {
            vec![repo.owner.login.clone()]
        } else {
            manifest.authors.clone()
        };

        let releases = fetch_releases(
            api,
            &id,
            self.settings.release_page_size,
            self.settings.max_release_pages,
        )
        .await?;
        if releases.is_empty() {
            debug!("Missing release");
        }

        let icon = self.fetch_icon(&id, &branch, &manifest.icon).await?;
        let discord = find_discord(api, &id, &branch, &manifest_body, &repo_body).await;

        let entrypoint = manifest.entrypoint_path();
        let features = fetch_features(api, &id, &branch, &entrypoint).await?;

        if is_template_copy(&manifest.id, &features, &id) {
            info!("Unmodified addon template, excluding");
            return Ok(None);
        }

        let mc_version = resolve_mc_version(api, &id, &branch).await;
        if mc_version.is_empty() && self.config.require_mc_version {
            return Err(ScanError::MissingVersion);
        }

        let homepage = if is_invite(&repo.homepage) {
            String::new()
        } else {
            repo.homepage.clone()
        };

        let custom = fetch_custom(api, &id, &branch).await?;

        let mut addon = Addon {
            name: manifest.name,
            description,
            mc_version,
            authors,
            features,
            verified: false,
            repo: RepoInfo {
                id: id.clone(),
                owner: repo.owner.login,
                name: repo.name,
                archived: repo.archived,
                fork: repo.fork,
                stars: repo.stars,
                downloads: releases.download_count,
                last_update: repo.pushed_at,
                creation_date: repo.created_at,
            },
            links: Links {
                github: repo.html_url,
                downloads: releases.downloads,
                latest_release: releases.latest,
                discord,
                homepage,
                icon,
            },
            custom,
            default_branch: branch,
            entrypoint,
        };

        if self
            .config
            .module_descriptions
            .should_fetch(candidate.verified, addon.repo.stars)
        {
            fetch_descriptions(api, &mut addon).await;
        }

        info!(features = addon.features.count(), "Finished parsing");
        Ok(Some(addon))
    }

    /// Raw URL of the manifest icon, or empty if it is not declared or
    /// missing.
    async fn fetch_icon(&self, id: &str, branch: &str, icon: &str) -> Result<String, ScanError> {
        let icon = icon.trim();
        if icon.is_empty() {
            return Ok(String::new());
        }

        let url = self
            .api
            .raw_url(id, branch, &format!("src/main/resources/{icon}"));
        match self.api.raw_at(&url).await? {
            Some(_) => Ok(url),
            None => {
                debug!("Missing icon");
                Ok(String::new())
            }
        }
    }
}

#[async_trait]
impl CandidateParser for AddonParser {
    async fn parse(&self, candidate: &Candidate) -> Result<Option<Addon>, ScanError> {
        self.parse_candidate(candidate).await
    }
}

/// A copy of the addon template nobody changed: the template's manifest id
/// and only example features. The template repository itself is kept.
pub fn is_template_copy(manifest_id: &str, features: &Features, id: &str) -> bool {
    manifest_id == TEMPLATE_MANIFEST_ID
        && !id.eq_ignore_ascii_case(TEMPLATE_REPOSITORY)
        && features
            .names()
            .all(|name| name.to_lowercase().contains("example"))
}
