//! Domain models for `AddonScan`.
//!
//! ## Submodules
//!
//! - [`candidate`] - Discovery output (Candidate, CandidateSet)
//! - [`addon`] - The addon record and its parts
//! - [`config`] - The resolved run configuration
//! - [`stats`] - Per-run counters

mod addon;
mod candidate;
mod config;
mod stats;

// Re-export everything at the models level
pub use addon::{
    Addon, CustomProperties, FeatureDirectories, FeatureKind, Features, InvalidAddon, Links,
    ReleaseFacts, RepoInfo, Tag,
};
pub use candidate::{Candidate, CandidateSet};
pub use config::{ModuleDescriptionConfig, ScanConfig, SuspicionTriggers, VerifiedAddonsConfig};
pub use stats::ScanStats;
