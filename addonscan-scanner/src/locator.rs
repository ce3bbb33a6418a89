//! Candidate discovery.
//!
//! GitHub has no addon registry, so candidates come from three independent
//! sources: code search for the manifest's meteor entrypoint, code search
//! for classes extending `MeteorAddon`, and the fork list of the addon
//! template. Each source is paged with its own retry budget. Running out of
//! budget on any page aborts discovery, since a partial candidate list
//! would silently drop addons from the published list.

use addonscan_core::{CandidateSet, TEMPLATE_REPOSITORY};
use addonscan_fetch::{FetchError, GitHubApi, RepositoryRef};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::error::ScanError;
use crate::settings::ScannerSettings;

/// Code search for manifests declaring a meteor entrypoint.
pub const MANIFEST_QUERY: &str =
    "entrypoints+meteor+extension:json+filename:fabric.mod.json+fork:true+in:file";

/// Code search for classes extending `MeteorAddon`.
pub const ADDON_CLASS_QUERY: &str = "extends+MeteorAddon+language:java+in:file";

// ============================================================================
// Strategies
// ============================================================================

/// One paged source of candidate repositories.
#[async_trait]
pub trait DiscoveryStrategy: Send + Sync {
    /// Name used in logs and errors.
    fn id(&self) -> &str;

    /// Fetches one page.
    async fn page(
        &self,
        api: &GitHubApi,
        per_page: u32,
        page: u32,
    ) -> Result<Vec<RepositoryRef>, FetchError>;
}

/// Code search with a fixed query.
#[derive(Debug, Clone)]
pub struct CodeSearch {
    id: String,
    query: String,
}

impl CodeSearch {
    /// Creates a search strategy.
    pub fn new(id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            query: query.into(),
        }
    }

    /// Search for `fabric.mod.json` files with a meteor entrypoint.
    pub fn manifests() -> Self {
        Self::new("fabric.mod.json", MANIFEST_QUERY)
    }

    /// Search for `extends MeteorAddon`.
    pub fn addon_classes() -> Self {
        Self::new("extends MeteorAddon", ADDON_CLASS_QUERY)
    }
}

#[async_trait]
impl DiscoveryStrategy for CodeSearch {
    fn id(&self) -> &str {
        &self.id
    }

    async fn page(
        &self,
        api: &GitHubApi,
        per_page: u32,
        page: u32,
    ) -> Result<Vec<RepositoryRef>, FetchError> {
        api.code_search(&self.query, per_page, page).await
    }
}

/// Forks of a repository.
#[derive(Debug, Clone)]
pub struct ForksOf {
    repository: String,
}

impl ForksOf {
    /// Creates a fork-list strategy.
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
        }
    }

    /// Forks of the addon template.
    pub fn template() -> Self {
        Self::new(TEMPLATE_REPOSITORY)
    }
}

#[async_trait]
impl DiscoveryStrategy for ForksOf {
    fn id(&self) -> &str {
        "template forks"
    }

    async fn page(
        &self,
        api: &GitHubApi,
        per_page: u32,
        page: u32,
    ) -> Result<Vec<RepositoryRef>, FetchError> {
        api.forks(&self.repository, per_page, page).await
    }
}

// ============================================================================
// Locator
// ============================================================================

/// Runs every discovery strategy and merges the results.
pub struct RepositoryLocator {
    api: GitHubApi,
    settings: ScannerSettings,
    strategies: Vec<Box<dyn DiscoveryStrategy>>,
}

impl RepositoryLocator {
    /// Creates a locator with the three standard strategies.
    pub fn new(api: GitHubApi, settings: ScannerSettings) -> Self {
        Self {
            api,
            settings,
            strategies: vec![
                Box::new(CodeSearch::manifests()),
                Box::new(CodeSearch::addon_classes()),
                Box::new(ForksOf::template()),
            ],
        }
    }

    /// Replaces the strategies.
    pub fn with_strategies(mut self, strategies: Vec<Box<dyn DiscoveryStrategy>>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Discovers candidates, seeding the set with `verified` first.
    #[instrument(skip_all, fields(strategies = self.strategies.len()))]
    pub async fn locate<I, S>(&self, verified: I) -> Result<CandidateSet, ScanError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut candidates = CandidateSet::seeded(verified);
        let seeded = candidates.len();

        for strategy in &self.strategies {
            let found = self.collect(strategy.as_ref()).await?;
            let total = found.len();
            let added = found
                .iter()
                .filter(|id| candidates.insert_discovered(id))
                .count();
            info!(strategy = strategy.id(), total, added, "Discovery finished");
        }

        info!(
            candidates = candidates.len(),
            verified = seeded,
            "Located repositories"
        );
        Ok(candidates)
    }

    /// Pages through one strategy, returning public repository identifiers.
    async fn collect(&self, strategy: &dyn DiscoveryStrategy) -> Result<Vec<String>, ScanError> {
        let per_page = self.settings.per_page;
        let mut found = Vec::new();

        for page in 1..=self.settings.max_pages {
            let label = format!("{} page {page}", strategy.id());
            let refs = self
                .settings
                .retry
                .run(&label, |_| strategy.page(&self.api, per_page, page))
                .await
                .map_err(|e| match e {
                    FetchError::Json(source) => ScanError::MalformedDiscovery {
                        strategy: strategy.id().to_string(),
                        source,
                    },
                    source => ScanError::LocatorExhausted {
                        strategy: strategy.id().to_string(),
                        source,
                    },
                })?;

            let on_page = refs.len();
            debug!(strategy = strategy.id(), page, on_page, "Fetched discovery page");
            found.extend(
                refs.into_iter()
                    .filter(|r| !r.private)
                    .map(|r| r.full_name),
            );

            if on_page != per_page as usize {
                break;
            }
        }

        Ok(found)
    }
}
