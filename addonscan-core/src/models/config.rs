//! The resolved run configuration.
//!
//! Key names follow the `config.json` files already in use, which is why a
//! few keys are kebab-case while the rest are snake_case.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::version::is_mc_version;

// ============================================================================
// Scan Config
// ============================================================================

/// Everything a scan run needs to know besides the API token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Repositories that are never parsed (case-insensitive equality).
    #[serde(rename = "repo-blacklist")]
    pub repo_blacklist: Vec<String>,

    /// Owners whose repositories are never parsed (case-insensitive
    /// equality with the owner part of the identifier).
    #[serde(rename = "developer-blacklist")]
    pub developer_blacklist: Vec<String>,

    /// The known-verified list and its validators.
    pub verified_addons: VerifiedAddonsConfig,

    /// Feature description fetching.
    pub module_descriptions: ModuleDescriptionConfig,

    /// Reject addons whose Minecraft version cannot be resolved.
    pub require_mc_version: bool,

    /// Reject archived repositories.
    pub ignore_archived: bool,

    /// Reject forks that are not verified.
    pub ignore_forks: bool,

    /// Thresholds for the suspicion scorer.
    pub suspicion_triggers: SuspicionTriggers,
}

impl ScanConfig {
    /// Returns true if `id` is on the known-verified list, ignoring case.
    pub fn is_verified(&self, id: &str) -> bool {
        self.verified_addons
            .verified
            .iter()
            .any(|v| v.trim().eq_ignore_ascii_case(id.trim()))
    }

    /// Checks values serde cannot reject on its own.
    pub fn validate(&self) -> Result<(), CoreError> {
        let min = self.verified_addons.minimum_mc_version.trim();
        if !min.is_empty() && !is_mc_version(min) {
            return Err(CoreError::InvalidConfig(format!(
                "minimum_mc_version '{min}' is not a 1.N[.M] version"
            )));
        }
        Ok(())
    }
}

/// The known-verified list and the checks that may revoke it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifiedAddonsConfig {
    /// Verified repository identifiers.
    pub verified: Vec<String>,
    /// Verified addons below this version lose verification. Empty disables.
    pub minimum_mc_version: String,
    /// Run the fork freshness validator.
    pub validate_forks: bool,
}

/// Gating for feature description fetches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleDescriptionConfig {
    /// Master switch.
    pub fetch: bool,
    /// Only fetch for verified addons.
    pub only_verified: bool,
    /// Only fetch for addons with at least this many stars.
    pub minimum_star_count: u64,
}

impl ModuleDescriptionConfig {
    /// Returns true if descriptions should be fetched for an addon.
    pub fn should_fetch(&self, verified: bool, stars: u64) -> bool {
        self.fetch && (verified || !self.only_verified) && stars >= self.minimum_star_count
    }
}

/// Thresholds for the suspicion scorer. Zero disables a trigger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuspicionTriggers {
    /// Addon name length.
    #[serde(rename = "name_len")]
    pub name_length: usize,
    /// Description length, applied to both descriptions.
    #[serde(rename = "description_len")]
    pub description_length: usize,
    /// Total feature count.
    pub feature_count: usize,
    /// Number of declared supported versions.
    pub supported_versions: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_loads_with_defaults() {
        let json = r#"{ "repo-blacklist": ["a/b"], "verified_addons": { "verified": ["X/Y"] } }"#;
        let config: ScanConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.repo_blacklist, vec!["a/b"]);
        assert!(config.developer_blacklist.is_empty());
        assert!(!config.verified_addons.validate_forks);
        assert_eq!(config.suspicion_triggers, SuspicionTriggers::default());
    }

    #[test]
    fn test_full_config_keys() {
        let json = r#"{
            "repo-blacklist": [],
            "developer-blacklist": ["spammer"],
            "verified_addons": {
                "verified": ["Owner/Addon"],
                "minimum_mc_version": "1.21",
                "validate_forks": true
            },
            "module_descriptions": {
                "fetch": true,
                "only_verified": true,
                "minimum_star_count": 5
            },
            "require_mc_version": true,
            "ignore_archived": true,
            "ignore_forks": false,
            "suspicion_triggers": {
                "name_len": 40,
                "description_len": 300,
                "feature_count": 500,
                "supported_versions": 10
            }
        }"#;
        let config: ScanConfig = serde_json::from_str(json).unwrap();
        assert!(config.require_mc_version);
        assert_eq!(config.developer_blacklist, vec!["spammer"]);
        assert_eq!(config.verified_addons.minimum_mc_version, "1.21");
        assert_eq!(config.module_descriptions.minimum_star_count, 5);
        assert_eq!(config.suspicion_triggers.name_length, 40);
        assert_eq!(config.suspicion_triggers.description_length, 300);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_is_verified_ignores_case() {
        let mut config = ScanConfig::default();
        config.verified_addons.verified = vec!["Owner/Addon".to_string()];
        assert!(config.is_verified("owner/addon"));
        assert!(!config.is_verified("owner/other"));
    }

    #[test]
    fn test_validate_rejects_bad_minimum() {
        let mut config = ScanConfig::default();
        config.verified_addons.minimum_mc_version = "latest".to_string();
        assert!(matches!(
            config.validate(),
            Err(CoreError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_should_fetch_descriptions() {
        let gate = ModuleDescriptionConfig {
            fetch: true,
            only_verified: true,
            minimum_star_count: 10,
        };
        assert!(gate.should_fetch(true, 10));
        assert!(!gate.should_fetch(false, 100));
        assert!(!gate.should_fetch(true, 9));

        let off = ModuleDescriptionConfig::default();
        assert!(!off.should_fetch(true, 1000));
    }
}
