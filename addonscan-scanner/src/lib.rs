// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `AddonScan` Scanner
//!
//! Discovery, parsing, and validation of Meteor addon repositories.
//!
//! A run goes through four stages:
//!
//! - **Locate**: [`RepositoryLocator`] pages through code search and the
//!   template's fork list, merging results into a case-insensitive
//!   [`CandidateSet`](addonscan_core::CandidateSet)
//! - **Filter**: [`remove_blacklisted_repos`] and
//!   [`remove_blacklisted_developers`] drop configured candidates
//! - **Parse**: [`ParseDriver`] runs an [`AddonParser`] per candidate under a
//!   worker budget
//! - **Validate**: fork freshness, minimum version, and suspicion checks over
//!   the parsed addons
//!
//! ## Extractors
//!
//! | Module | Reads | Produces |
//! |--------|-------|----------|
//! | [`manifest`] | `fabric.mod.json` | name, authors, icon, entrypoints |
//! | [`features`] | entrypoint source | modules, commands, HUD elements, screens |
//! | [`gradle`] | version catalog, properties, build scripts | Minecraft version |
//! | [`releases`] | releases API | download links and counts |
//! | [`discord`] | readme, manifest, repository | live invite link |
//! | [`custom`] | `meteor-addon-list.json` | tags, supported versions, overrides |
//! | [`descriptions`] | feature sources | per-feature descriptions |
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use addonscan_scanner::{AddonParser, ParseDriver, RepositoryLocator, ScannerSettings};
//!
//! let settings = ScannerSettings::default();
//! let candidates = RepositoryLocator::new(api.clone(), settings.clone())
//!     .locate(&config.verified_addons.verified)
//!     .await?;
//!
//! let parser = Arc::new(AddonParser::new(api, config.clone()));
//! let outcome = ParseDriver::new(parser, config, settings.workers)
//!     .run(candidates.into_vec())
//!     .await;
//! ```

pub mod custom;
pub mod descriptions;
pub mod discord;
pub mod driver;
pub mod error;
pub mod features;
pub mod filter;
pub mod gradle;
pub mod locator;
pub mod manifest;
pub mod parser;
pub mod releases;
pub mod settings;
pub mod validate;

#[cfg(test)]
mod test_support;


// Re-export key types
pub use driver::{ParseDriver, ParseOutcome};
pub use error::ScanError;
pub use filter::{remove_blacklisted_developers, remove_blacklisted_repos};
pub use locator::{CodeSearch, DiscoveryStrategy, ForksOf, RepositoryLocator};
pub use manifest::Manifest;
pub use parser::{AddonParser, CandidateParser};
pub use settings::ScannerSettings;
pub use validate::{
    ForkCheck, check_fork_dates, detect_suspicious, enforce_minimum_version,
    validate_forked_verified,
};
