// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `AddonScan` Store
//!
//! Everything a scan run reads from or writes to disk.
//!
//! This crate provides:
//!
//! - **Config**: Loading and validating the JSON [`ScanConfig`](addonscan_core::ScanConfig)
//! - **InvalidRepoLog**: The newline-separated skip list, loaded, appended, and rewritten
//! - **Persistence**: Output path rules and the addon/invalid result files
//!
//! ## Usage
//!
//! ```ignore
//! use addonscan_store::{InvalidRepoLog, load_config, validate_output_path, write_results};
//!
//! validate_output_path(&output)?;
//! let config = load_config(Some(&config_path))?;
//! let mut log = InvalidRepoLog::load("invalid.txt").await?;
//!
//! // ... scan ...
//!
//! log.record(&invalid);
//! log.save().await?;
//! write_results(&output, &addons, &invalid).await?;
//! ```

pub mod config;
pub mod error;
pub mod invalid_log;
pub mod persistence;

pub use config::{default_config_path, load_config, load_from};
pub use error::StoreError;
pub use invalid_log::InvalidRepoLog;
pub use persistence::{
    ensure_json_extension, invalid_output_path, save_json, validate_output_path, write_results,
};
