//! Fetch error types.

use thiserror::Error;

use crate::quota::ResourceClass;

// ============================================================================
// Main Fetch Error
// ============================================================================

/// Error type for fetch operations.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// The primary rate limit for a resource class is spent.
    #[error("GitHub API rate limit exceeded for {resource}")]
    QuotaExceeded {
        /// The class whose quota ran out.
        resource: ResourceClass,
    },

    /// GitHub answered with its secondary (abuse) rate limit body.
    #[error("Secondary rate limit hit")]
    SecondaryRateLimited,

    /// Invalid response from GitHub.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FetchError {
    /// Returns true if retrying the same request later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::QuotaExceeded { .. } | Self::SecondaryRateLimited | Self::Timeout(_) => true,
            Self::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            Self::InvalidResponse(_) | Self::InvalidUrl(_) | Self::Json(_) => false,
        }
    }
}
