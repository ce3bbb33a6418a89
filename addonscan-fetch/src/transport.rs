//! The quota-aware HTTP transport.
//!
//! Every GitHub request goes through [`Transport::fetch`]. The GitHub
//! implementation waits out an exhausted quota before sending, then records
//! the quota the response reports. Response bodies are returned whatever the
//! status, so callers can recognize GitHub's "not found" body themselves.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::error::FetchError;
use crate::quota::{QuotaTracker, ResourceClass};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent string for addonscan.
const USER_AGENT: &str = concat!("addonscan/", env!("CARGO_PKG_VERSION"));

/// Accept header for the v3 REST API.
const ACCEPT: &str = "application/vnd.github.v3+json";

const HEADER_RESOURCE: &str = "x-ratelimit-resource";
const HEADER_REMAINING: &str = "x-ratelimit-remaining";
const HEADER_RESET: &str = "x-ratelimit-reset";

// ============================================================================
// Transport Trait
// ============================================================================

/// Fetches bodies and probes links.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches a URL and returns its body.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;

    /// Sends a HEAD request and returns the status code.
    ///
    /// Used for links outside GitHub, so no quota bookkeeping happens.
    async fn probe(&self, url: &str) -> Result<u16, FetchError>;
}

// ============================================================================
// GitHub Transport
// ============================================================================

/// [`Transport`] backed by reqwest and a shared [`QuotaTracker`].
#[derive(Debug, Clone)]
pub struct GitHubTransport {
    client: Client,
    token: Option<String>,
    quota: Arc<QuotaTracker>,
    timeout_secs: u64,
}

impl GitHubTransport {
    /// Creates a transport with the default timeout.
    pub fn new(token: Option<String>) -> Result<Self, FetchError> {
        Self::with_timeout(token, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a transport with a custom timeout.
    pub fn with_timeout(token: Option<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            token: token.filter(|t| !t.trim().is_empty()),
            quota: Arc::new(QuotaTracker::new()),
            timeout_secs: timeout.as_secs(),
        })
    }

    /// Shares an existing quota tracker.
    pub fn with_quota(mut self, quota: Arc<QuotaTracker>) -> Self {
        self.quota = quota;
        self
    }

    /// The quota tracker this transport updates.
    pub fn quota(&self) -> &Arc<QuotaTracker> {
        &self.quota
    }

    fn map_send_error(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout_secs)
        } else {
            FetchError::Http(err)
        }
    }
}

fn header_str<'a>(headers: &'a header::HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl Transport for GitHubTransport {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        let guessed = ResourceClass::from_path(parsed.path());

        if let Some(wait) = self.quota.wait_before(guessed) {
            info!(
                class = %guessed,
                wait_secs = wait.as_secs(),
                "Rate limit reached, sleeping until reset"
            );
            tokio::time::sleep(wait).await;
        }

        let mut request = self.client.get(parsed).header(header::ACCEPT, ACCEPT);
        if let Some(token) = &self.token {
            request = request.header(header::AUTHORIZATION, format!("token {token}"));
        }

        let response = request.send().await.map_err(|e| self.map_send_error(e))?;
        let status = response.status();
        debug!(status = %status, "Response received");

        let headers = response.headers();
        let class = header_str(headers, HEADER_RESOURCE).map_or(guessed, ResourceClass::from_header);
        let remaining = header_str(headers, HEADER_REMAINING).and_then(|v| v.parse().ok());
        let reset = header_str(headers, HEADER_RESET).and_then(|v| v.parse().ok());
        let window = self.quota.record(class, remaining, reset);

        if status == StatusCode::FORBIDDEN && window.remaining == 0 {
            warn!(class = %class, "Rate limit exceeded");
            return Err(FetchError::QuotaExceeded { resource: class });
        }

        response.text().await.map_err(|e| self.map_send_error(e))
    }

    #[instrument(skip(self), fields(url = %url))]
    async fn probe(&self, url: &str) -> Result<u16, FetchError> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        debug!(status = %response.status(), "Probe answered");
        Ok(response.status().as_u16())
    }
}

// ============================================================================
// Tests
// ============================================================================
