//! Scanner error types.

use addonscan_fetch::FetchError;
use thiserror::Error;

/// Errors raised while locating, parsing, or validating addons.
///
/// Everything except [`ScanError::LocatorExhausted`] and
/// [`ScanError::MalformedDiscovery`] only affects the candidate at hand.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The repository does not hold a Meteor addon.
    #[error("{0}")]
    NotAnAddon(String),

    /// The manifest declares no meteor entrypoint.
    #[error("No meteor entrypoint found in fabric.mod.json - not a Meteor addon")]
    MissingEntrypoint,

    /// No Minecraft version could be resolved and one is required.
    #[error("Could not resolve a Minecraft version")]
    MissingVersion,

    /// The repository was rejected by a configured filter.
    #[error("{0}")]
    Ignored(String),

    /// A required document could not be decoded.
    #[error("Invalid {document} structure: {source}")]
    InvalidDocument {
        /// File name of the document.
        document: &'static str,
        /// Decoder error.
        source: serde_json::Error,
    },

    /// A required fetch failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A timestamp on a record could not be parsed.
    #[error("Invalid timestamp '{value}': {source}")]
    InvalidTimestamp {
        /// The text that failed to parse.
        value: String,
        /// Parser error.
        source: chrono::ParseError,
    },

    /// A discovery strategy spent its whole retry budget.
    #[error("Discovery '{strategy}' failed after retries: {source}")]
    LocatorExhausted {
        /// Strategy name.
        strategy: String,
        /// The last error seen.
        source: FetchError,
    },

    /// A discovery response could not be decoded.
    #[error("Discovery '{strategy}' returned a malformed response: {source}")]
    MalformedDiscovery {
        /// Strategy name.
        strategy: String,
        /// Decoder error.
        source: serde_json::Error,
    },
}

impl ScanError {
    /// Returns true if the error must abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::LocatorExhausted { .. } | Self::MalformedDiscovery { .. }
        )
    }
}
