// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `AddonScan` Core
//!
//! Core records, configuration shape, and version helpers shared by every
//! `addonscan` crate.
//!
//! ## Key Types
//!
//! ### Discovery
//! - [`Candidate`] - A repository identifier plus its known-verified flag
//! - [`CandidateSet`] - Case-insensitive mapping of candidates
//!
//! ### Addon Records
//! - [`Addon`] - The terminal record produced for one repository
//! - [`Features`] - Extracted modules, commands, HUD elements, and screens
//! - [`ReleaseFacts`] - Download links and counts from releases
//! - [`CustomProperties`] - The addon-authored supplementary document
//! - [`InvalidAddon`] - A rejected repository and the reason
//!
//! ### Run Inputs & Outputs
//! - [`ScanConfig`] - Resolved configuration object
//! - [`ScanStats`] - Per-run counters for the summary

pub mod error;
pub mod models;
pub mod version;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Discovery
    Candidate,
    CandidateSet,
    // Addon records
    Addon,
    CustomProperties,
    FeatureDirectories,
    FeatureKind,
    Features,
    InvalidAddon,
    Links,
    ReleaseFacts,
    RepoInfo,
    Tag,
    // Configuration
    ModuleDescriptionConfig,
    ScanConfig,
    SuspicionTriggers,
    VerifiedAddonsConfig,
    // Statistics
    ScanStats,
};

/// Case-insensitive identifier of the canonical addon template repository.
pub const TEMPLATE_REPOSITORY: &str = "MeteorDevelopment/meteor-addon-template";

/// Manifest id the canonical template ships with.
pub const TEMPLATE_MANIFEST_ID: &str = "addon-template";

/// Identifier suffix used by unmodified template copies.
pub const TEMPLATE_SUFFIX: &str = "-addon-template";
