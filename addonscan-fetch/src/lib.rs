// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `AddonScan` Fetch
//!
//! Rate-limit aware access to GitHub for the `addonscan` pipeline.
//!
//! ## Transport
//!
//! - [`transport::Transport`] - Trait every fetch goes through
//! - [`transport::GitHubTransport`] - reqwest implementation with quota waits
//! - [`quota::QuotaTracker`] - Per-class quota state behind one lock
//!
//! ## Documents
//!
//! - [`documents::GitHubApi`] - URL builders and typed fetchers
//! - [`retry::RetryStrategy`] - Per-call attempt budget with backoff
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use addonscan_fetch::{GitHubApi, GitHubTransport};
//!
//! let transport = GitHubTransport::new(Some(token))?;
//! let api = GitHubApi::new(Arc::new(transport));
//! let (repo, _) = api.repository("owner/name").await?;
//! ```

pub mod documents;
pub mod error;
pub mod quota;
pub mod retry;
pub mod transport;

// Re-export key types at crate root
pub use documents::{
    ABSENT_BODY, AssetDocument, GitHubApi, OwnerDocument, ParentDocument, ReleaseDocument,
    RepositoryDocument, RepositoryRef,
};
pub use error::FetchError;
pub use quota::{Clock, QuotaTracker, QuotaWindow, ResourceClass, SystemClock};
pub use retry::RetryStrategy;
pub use transport::{GitHubTransport, Transport};
