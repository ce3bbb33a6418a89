//! Checks run over parsed addons before they are published.
//!
//! Verification comes from a hand-kept list, so it goes stale. The fork and
//! minimum-version checks revoke it automatically. The suspicion scorer only
//! reports.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use addonscan_core::version::compare_mc_versions;
use addonscan_core::{Addon, SuspicionTriggers, TEMPLATE_REPOSITORY};
use addonscan_fetch::GitHubApi;
use chrono::{DateTime, Months, Utc};
use tracing::{info, warn};

use crate::error::ScanError;

/// How long a verified fork may go without a push, and how long its parent
/// must have been quiet.
const FORK_STALENESS: Months = Months::new(6);

// ============================================================================
// Fork Validation
// ============================================================================

/// Verdict on a verified fork.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForkCheck {
    /// Both dates are acceptable.
    Valid,
    /// A fork of the addon template, always acceptable.
    TemplateParent,
    /// The fork itself has not been pushed in six months.
    ChildTooOld,
    /// The parent was pushed within the last six months.
    ParentTooRecent,
}

impl ForkCheck {
    /// Returns true if the verdict revokes verification.
    pub fn revokes(self) -> bool {
        matches!(self, Self::ChildTooOld | Self::ParentTooRecent)
    }

    /// Log line for the verdict.
    pub fn message(self) -> &'static str {
        match self {
            Self::Valid => "Valid",
            Self::TemplateParent => "Parent repo is meteor-addon-template -> Valid",
            Self::ChildTooOld => "Repo has not been updated in 6 months -> no longer verified",
            Self::ParentTooRecent => {
                "Parent repo was updated within 6 months of the fork -> no longer verified"
            }
        }
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ScanError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|source| ScanError::InvalidTimestamp {
            value: value.to_string(),
            source,
        })
}

fn older_than_staleness(time: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    time.checked_add_months(FORK_STALENESS)
        .is_some_and(|limit| limit < now)
}

/// Compares a fork's last push and its parent's last push against `now`.
///
/// A stale fork is reported before the parent is looked at.
pub fn check_fork_dates(
    child_last_update: &str,
    parent_pushed_at: &str,
    now: DateTime<Utc>,
) -> Result<ForkCheck, ScanError> {
    let child = parse_timestamp(child_last_update)?;
    if older_than_staleness(child, now) {
        return Ok(ForkCheck::ChildTooOld);
    }

    let parent = parse_timestamp(parent_pushed_at)?;
    let parent_quiet_until = parent.checked_add_months(FORK_STALENESS);
    if parent_quiet_until.is_some_and(|limit| limit > now) {
        return Ok(ForkCheck::ParentTooRecent);
    }

    Ok(ForkCheck::Valid)
}

async fn check_fork(api: &GitHubApi, addon: &Addon, now: DateTime<Utc>) -> Result<ForkCheck, ScanError> {
    let (repo, _) = api.repository(addon.id()).await?;
    let parent = repo.parent.unwrap_or_default();

    if parent.full_name.eq_ignore_ascii_case(TEMPLATE_REPOSITORY) {
        return Ok(ForkCheck::TemplateParent);
    }

    check_fork_dates(&addon.repo.last_update, &parent.pushed_at, now)
}

/// Re-checks every verified fork, revoking verification where the dates say
/// so.
///
/// Returns a log line per checked addon. A failed check leaves the addon
/// verified.
pub async fn validate_forked_verified(
    api: &GitHubApi,
    addons: &mut [Addon],
    now: DateTime<Utc>,
) -> BTreeMap<String, String> {
    let mut log = BTreeMap::new();

    for addon in addons.iter_mut().filter(|a| a.verified && a.repo.fork) {
        let line = match check_fork(api, addon, now).await {
            Ok(verdict) => {
                if verdict.revokes() {
                    addon.verified = false;
                }
                verdict.message().to_string()
            }
            Err(e) => {
                warn!(repo = %addon.id(), error = %e, "Fork check failed");
                format!("Failed to check, {e}")
            }
        };
        info!(repo = %addon.id(), result = %line, "Fork validated");
        log.insert(addon.id().to_string(), line);
    }

    log
}

// ============================================================================
// Minimum Version
// ============================================================================

/// Revokes verification from addons targeting a version below `minimum`.
///
/// The resolved version is used, or the first supported version when none
/// was resolved. Returns the revoked identifiers with the version that was
/// compared.
pub fn enforce_minimum_version(addons: &mut [Addon], minimum: &str) -> BTreeMap<String, String> {
    let mut revoked = BTreeMap::new();
    if minimum.trim().is_empty() {
        return revoked;
    }

    for addon in addons.iter_mut().filter(|a| a.verified) {
        let version = if addon.mc_version.is_empty() {
            addon
                .custom
                .supported_versions
                .first()
                .cloned()
                .unwrap_or_default()
        } else {
            addon.mc_version.clone()
        };

        if compare_mc_versions(&version, minimum.trim()) == Ordering::Less {
            info!(repo = %addon.id(), version = %version, "Below minimum version, no longer verified");
            addon.verified = false;
            revoked.insert(addon.id().to_string(), version);
        }
    }

    revoked
}

// ============================================================================
// Suspicion
// ============================================================================

fn exceeds(value: usize, threshold: usize) -> bool {
    threshold > 0 && value >= threshold
}

/// Reasons an addon looks suspicious, empty if none.
pub fn suspicion_reasons(addon: &Addon, triggers: &SuspicionTriggers) -> Vec<String> {
    let mut reasons = Vec::new();

    let name = addon.name.chars().count();
    if exceeds(name, triggers.name_length) {
        reasons.push(format!("[Exceeding name length ({name})]"));
    }

    let description = addon.description.chars().count();
    if exceeds(description, triggers.description_length) {
        reasons.push(format!("[Exceeding github description length ({description})]"));
    }

    let custom = addon.custom.description.chars().count();
    if exceeds(custom, triggers.description_length) {
        reasons.push(format!("[Exceeding custom description length ({custom})]"));
    }

    let features = addon.features.count();
    if exceeds(features, triggers.feature_count) {
        reasons.push(format!("[Exceeding feature limit ({features})]"));
    }

    let versions = addon.custom.supported_versions.len();
    if exceeds(versions, triggers.supported_versions) {
        reasons.push(format!("[Exceeding supported version limit ({versions})]"));
    }

    reasons
}

/// Scores every addon. Only addons with at least one reason are listed.
pub fn detect_suspicious(
    addons: &[Addon],
    triggers: &SuspicionTriggers,
) -> BTreeMap<String, Vec<String>> {
    addons
        .iter()
        .filter_map(|addon| {
            let reasons = suspicion_reasons(addon, triggers);
            (!reasons.is_empty()).then(|| (addon.id().to_string(), reasons))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use addonscan_core::{FeatureKind, RepoInfo};
    use chrono::TimeZone;
    use crate::test_support::{FakeTransport, api};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn months_ago(months: u32) -> String {
        now()
            .checked_sub_months(Months::new(months))
            .unwrap()
            .to_rfc3339()
    }

    fn addon(id: &str) -> Addon {
        Addon {
            verified: true,
            repo: RepoInfo {
                id: id.to_string(),
                fork: true,
                ..RepoInfo::default()
            },
            ..Addon::default()
        }
    }

    #[test]
    fn test_stale_fork_revoked_regardless_of_parent() {
        let verdict = check_fork_dates(&months_ago(7), &months_ago(12), now()).unwrap();
        assert_eq!(verdict, ForkCheck::ChildTooOld);
        assert!(verdict.revokes());
    }

    #[test]
    fn test_recent_parent_revoked() {
        let verdict = check_fork_dates(&months_ago(1), &months_ago(2), now()).unwrap();
        assert_eq!(verdict, ForkCheck::ParentTooRecent);
    }

    #[test]
    fn test_quiet_parent_valid() {
        let verdict = check_fork_dates(&months_ago(1), &months_ago(8), now()).unwrap();
        assert_eq!(verdict, ForkCheck::Valid);
        assert!(!verdict.revokes());
    }

    #[test]
    fn test_bad_timestamp() {
        let err = check_fork_dates(&months_ago(1), "", now()).unwrap_err();
        assert!(matches!(err, ScanError::InvalidTimestamp { .. }));
    }

    #[tokio::test]
    async fn test_validate_forks() {
        let parent_of = |name: &str, pushed: &str| {
            format!(
                r#"{{"full_name":"{name}","parent":{{"full_name":"{}","pushed_at":"{pushed}"}}}}"#,
                if name == "t/fork" { TEMPLATE_REPOSITORY } else { "up/stream" }
            )
        };
        let (_, api) = FakeTransport::new()
            .with_body(api("/repos/t/fork"), parent_of("t/fork", &months_ago(1)))
            .with_body(api("/repos/a/stale"), parent_of("a/stale", &months_ago(12)))
            .with_body(api("/repos/b/kept"), parent_of("b/kept", &months_ago(9)))
            .into_api();

        let mut template_fork = addon("t/fork");
        template_fork.repo.last_update = months_ago(20);
        let mut stale = addon("a/stale");
        stale.repo.last_update = months_ago(7);
        let mut kept = addon("b/kept");
        kept.repo.last_update = months_ago(1);
        let mut missing = addon("c/missing");
        missing.repo.last_update = months_ago(1);
        let mut unverified = addon("d/skip");
        unverified.verified = false;

        let mut addons = vec![template_fork, stale, kept, missing, unverified];
        let log = validate_forked_verified(&api, &mut addons, now()).await;

        assert_eq!(log.len(), 4);
        assert_eq!(log["t/fork"], "Parent repo is meteor-addon-template -> Valid");
        assert_eq!(
            log["a/stale"],
            "Repo has not been updated in 6 months -> no longer verified"
        );
        assert_eq!(log["b/kept"], "Valid");
        assert!(log["c/missing"].starts_with("Failed to check, "));

        let verified: Vec<bool> = addons.iter().map(|a| a.verified).collect();
        assert_eq!(verified, vec![true, false, true, true, false]);
    }

    #[test]
    fn test_minimum_version() {
        let mut old = addon("a/old");
        old.mc_version = "1.19.4".to_string();
        let mut current = addon("b/current");
        current.mc_version = "1.21".to_string();
        let mut declared = addon("c/declared");
        declared.custom.supported_versions = vec!["1.20.1".to_string()];
        let mut unknown = addon("d/unknown");
        unknown.mc_version = String::new();

        let mut addons = vec![old, current, declared, unknown];
        let revoked = enforce_minimum_version(&mut addons, "1.20.4");

        assert_eq!(revoked.len(), 3);
        assert_eq!(revoked["a/old"], "1.19.4");
        assert_eq!(revoked["c/declared"], "1.20.1");
        assert_eq!(revoked["d/unknown"], "");
        assert!(addons[1].verified);
        assert!(!addons[0].verified);
    }

    #[test]
    fn test_minimum_version_disabled() {
        let mut addons = vec![addon("a/old")];
        assert!(enforce_minimum_version(&mut addons, "").is_empty());
        assert!(addons[0].verified);
    }

    #[test]
    fn test_suspicion_thresholds() {
        let triggers = SuspicionTriggers {
            name_length: 10,
            description_length: 20,
            feature_count: 2,
            supported_versions: 0,
        };

        let mut loud = addon("a/loud");
        loud.name = "Exactly 10".to_string();
        loud.description = "short".to_string();
        loud.custom.description = "x".repeat(25);
        loud.features.push(FeatureKind::Module, "One");
        loud.features.push(FeatureKind::Command, "Two");
        loud.custom.supported_versions = vec!["1.21".to_string(); 40];

        let mut quiet = addon("b/quiet");
        quiet.name = "Short".to_string();

        let suspicious = detect_suspicious(&[loud, quiet], &triggers);
        assert_eq!(suspicious.len(), 1);
        assert_eq!(
            suspicious["a/loud"],
            vec![
                "[Exceeding name length (10)]",
                "[Exceeding custom description length (25)]",
                "[Exceeding feature limit (2)]",
            ]
        );
    }
}
