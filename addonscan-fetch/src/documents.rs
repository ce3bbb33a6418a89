//! Typed GitHub document fetchers.
//!
//! [`GitHubApi`] builds REST and raw-content URLs and decodes the platform's
//! own documents. Addon-authored documents (the manifest, the custom
//! properties file) are fetched as text through [`GitHubApi::raw`] and
//! decoded by their owners.

use std::sync::Arc;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::FetchError;
use crate::transport::Transport;

/// REST API origin.
pub const API_BASE: &str = "https://api.github.com";

/// Raw content origin.
pub const RAW_BASE: &str = "https://raw.githubusercontent.com";

/// Body raw.githubusercontent.com serves for a missing file.
pub const ABSENT_BODY: &str = "404: Not Found";

/// Suffix of the body GitHub sends for its secondary rate limit.
const SECONDARY_LIMIT_SUFFIX: &str = "\"status\":\"403\"}";

// ============================================================================
// Platform Documents
// ============================================================================

/// Owner of a repository.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OwnerDocument {
    /// Account login.
    pub login: String,
}

/// The upstream of a fork.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ParentDocument {
    /// `owner/name` of the upstream.
    pub full_name: String,
    /// Last push to the upstream.
    pub pushed_at: String,
}

/// `GET /repos/{owner}/{name}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RepositoryDocument {
    /// `owner/name`.
    pub full_name: String,
    /// Repository name.
    pub name: String,
    /// Description, absent when null.
    #[serde(deserialize_with = "null_as_empty")]
    pub description: String,
    /// Star count.
    #[serde(rename = "stargazers_count")]
    pub stars: u64,
    /// Default branch.
    pub default_branch: String,
    /// Repository page.
    pub html_url: String,
    /// Last push.
    pub pushed_at: String,
    /// Creation time.
    pub created_at: String,
    /// Whether this is a fork.
    pub fork: bool,
    /// Whether this is archived.
    pub archived: bool,
    /// Homepage, absent when null.
    #[serde(deserialize_with = "null_as_empty")]
    pub homepage: String,
    /// Owner account.
    pub owner: OwnerDocument,
    /// Upstream, only present on forks.
    pub parent: Option<ParentDocument>,
}

/// A release asset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AssetDocument {
    /// File name.
    pub name: String,
    /// Download URL.
    #[serde(rename = "browser_download_url")]
    pub url: String,
    /// Download count.
    pub download_count: u64,
}

/// An entry of `GET /repos/{owner}/{name}/releases`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReleaseDocument {
    /// Unpublished draft.
    pub draft: bool,
    /// Marked as prerelease.
    pub prerelease: bool,
    /// Attached files.
    pub assets: Vec<AssetDocument>,
}

/// A repository reference inside search results and fork lists.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RepositoryRef {
    /// `owner/name`.
    pub full_name: String,
    /// Private repositories cannot be parsed.
    pub private: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchItem {
    repository: RepositoryRef,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchPage {
    items: Vec<SearchItem>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// GitHub API
// ============================================================================

/// URL builder and typed fetchers over a [`Transport`].
#[derive(Clone)]
pub struct GitHubApi {
    transport: Arc<dyn Transport>,
    api_base: String,
    raw_base: String,
}

impl std::fmt::Debug for GitHubApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubApi")
            .field("api_base", &self.api_base)
            .field("raw_base", &self.raw_base)
            .finish_non_exhaustive()
    }
}

impl GitHubApi {
    /// Creates an API over the public GitHub origins.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            api_base: API_BASE.to_string(),
            raw_base: RAW_BASE.to_string(),
        }
    }

    /// Points the API at other origins.
    pub fn with_bases(mut self, api_base: impl Into<String>, raw_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self.raw_base = raw_base.into().trim_end_matches('/').to_string();
        self
    }

    /// REST URL for a path such as `/repos/a/b`.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// Raw content URL of a file on a branch.
    pub fn raw_url(&self, id: &str, branch: &str, path: &str) -> String {
        format!("{}/{}/{}/{}", self.raw_base, id, branch, path)
    }

    /// Fetches a raw file; `None` if GitHub reports it missing.
    pub async fn raw(&self, id: &str, branch: &str, path: &str) -> Result<Option<String>, FetchError> {
        self.raw_at(&self.raw_url(id, branch, path)).await
    }

    /// Fetches a raw file by URL; `None` if GitHub reports it missing.
    pub async fn raw_at(&self, url: &str) -> Result<Option<String>, FetchError> {
        let body = self.transport.fetch(url).await?;
        if body == ABSENT_BODY {
            debug!(url = %url, "File not found");
            return Ok(None);
        }
        Ok(Some(body))
    }

    /// Fetches and decodes a JSON document, returning it with its raw body.
    pub async fn json<T: DeserializeOwned>(&self, url: &str) -> Result<(T, String), FetchError> {
        let body = self.transport.fetch(url).await?;
        let value = serde_json::from_str(&body)?;
        Ok((value, body))
    }

    /// Fetches a repository record and its raw body.
    pub async fn repository(&self, id: &str) -> Result<(RepositoryDocument, String), FetchError> {
        let (repo, body): (RepositoryDocument, String) =
            self.json(&self.api_url(&format!("/repos/{id}"))).await?;
        if repo.full_name.is_empty() {
            return Err(FetchError::InvalidResponse(format!(
                "repository {id} not found"
            )));
        }
        Ok((repo, body))
    }

    /// Fetches one page of a repository's releases.
    pub async fn releases(
        &self,
        id: &str,
        per_page: u32,
        page: u32,
    ) -> Result<Vec<ReleaseDocument>, FetchError> {
        let url = self.api_url(&format!(
            "/repos/{id}/releases?per_page={per_page}&page={page}"
        ));
        let (releases, _) = self.json(&url).await?;
        Ok(releases)
    }

    /// Fetches one page of code search results.
    ///
    /// `query` is the raw `q` value with `+` separators.
    pub async fn code_search(
        &self,
        query: &str,
        per_page: u32,
        page: u32,
    ) -> Result<Vec<RepositoryRef>, FetchError> {
        let url = self.api_url(&format!(
            "/search/code?q={query}&per_page={per_page}&page={page}"
        ));
        let body = self.transport.fetch(&url).await?;
        check_secondary_limit(&body)?;
        let page: SearchPage = serde_json::from_str(&body)?;
        Ok(page.items.into_iter().map(|item| item.repository).collect())
    }

    /// Fetches one page of a repository's forks.
    pub async fn forks(
        &self,
        id: &str,
        per_page: u32,
        page: u32,
    ) -> Result<Vec<RepositoryRef>, FetchError> {
        let url = self.api_url(&format!("/repos/{id}/forks?per_page={per_page}&page={page}"));
        let body = self.transport.fetch(&url).await?;
        check_secondary_limit(&body)?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Probes a link outside GitHub.
    pub async fn probe(&self, url: &str) -> Result<u16, FetchError> {
        self.transport.probe(url).await
    }
}

fn check_secondary_limit(body: &str) -> Result<(), FetchError> {
    if body.trim_end().ends_with(SECONDARY_LIMIT_SUFFIX) {
        return Err(FetchError::SecondaryRateLimited);
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::GitHubTransport;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    async fn api(server: &MockServer) -> GitHubApi {
        let transport = GitHubTransport::new(None).unwrap();
        GitHubApi::new(Arc::new(transport)).with_bases(server.uri(), server.uri())
    }

    #[test]
    fn test_url_building() {
        let transport = GitHubTransport::new(None).unwrap();
        let api = GitHubApi::new(Arc::new(transport));
        assert_eq!(
            api.raw_url("a/b", "main", "README.md"),
            "https://raw.githubusercontent.com/a/b/main/README.md"
        );
        assert_eq!(api.api_url("/repos/a/b"), "https://api.github.com/repos/a/b");
    }

    #[tokio::test]
    async fn test_raw_absent_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a/b/main/icon.png"))
            .respond_with(ResponseTemplate::new(404).set_body_string(ABSENT_BODY))
            .mount(&server)
            .await;

        let api = api(&server).await;
        assert!(api.raw("a/b", "main", "icon.png").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_repository_decodes_nulls_and_parent() {
        let server = MockServer::start().await;
        let body = r#"{
            "full_name": "a/b", "name": "b", "description": null,
            "stargazers_count": 12, "default_branch": "master",
            "html_url": "https://github.com/a/b", "pushed_at": "2024-01-01T00:00:00Z",
            "created_at": "2023-01-01T00:00:00Z", "fork": true, "archived": false,
            "homepage": null, "owner": { "login": "a" },
            "parent": { "full_name": "up/b", "pushed_at": "2022-01-01T00:00:00Z" }
        }"#;
        Mock::given(method("GET"))
            .and(path("/repos/a/b"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let (repo, raw) = api(&server).await.repository("a/b").await.unwrap();
        assert_eq!(repo.stars, 12);
        assert_eq!(repo.description, "");
        assert_eq!(repo.homepage, "");
        assert_eq!(repo.owner.login, "a");
        assert_eq!(repo.parent.unwrap().full_name, "up/b");
        assert!(raw.contains("stargazers_count"));
    }

    #[tokio::test]
    async fn test_missing_repository_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/a/gone"))
            .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"message":"Not Found"}"#))
            .mount(&server)
            .await;

        let err = api(&server).await.repository("a/gone").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_code_search_maps_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/code"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"items":[{"repository":{"full_name":"a/b","private":false}},
                            {"repository":{"full_name":"c/d","private":true}}]}"#,
            ))
            .mount(&server)
            .await;

        let refs = api(&server).await.code_search("x", 100, 2).await.unwrap();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].full_name, "a/b");
        assert!(refs[1].private);
    }

    #[tokio::test]
    async fn test_secondary_limit_detected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/t/t/forks"))
            .respond_with(ResponseTemplate::new(403).set_body_string(
                r#"{"message":"You have exceeded a secondary rate limit","status":"403"}"#,
            ))
            .mount(&server)
            .await;

        let err = api(&server).await.forks("t/t", 100, 0).await.unwrap_err();
        assert!(matches!(err, FetchError::SecondaryRateLimited));
    }

    #[tokio::test]
    async fn test_releases_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/a/b/releases"))
            .and(query_param("per_page", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"draft":false,"prerelease":true,"assets":[
                    {"name":"x.jar","browser_download_url":"u","download_count":5}]}]"#,
            ))
            .mount(&server)
            .await;

        let releases = api(&server).await.releases("a/b", 100, 1).await.unwrap();
        assert_eq!(releases.len(), 1);
        assert!(releases[0].prerelease);
        assert_eq!(releases[0].assets[0].download_count, 5);
    }
}
