//! Blacklist filtering of located candidates.

use addonscan_core::CandidateSet;
use tracing::debug;

/// Removes candidates whose identifier equals a blacklist entry, ignoring
/// case. Returns how many were removed.
pub fn remove_blacklisted_repos(candidates: &mut CandidateSet, blacklist: &[String]) -> usize {
    let mut removed = 0;
    for entry in blacklist {
        if candidates.remove(entry).is_some() {
            debug!(repo = %entry.trim(), "Removed blacklisted repository");
            removed += 1;
        }
    }
    removed
}

/// Removes candidates owned by a blacklisted account, ignoring case.
/// Returns how many were removed.
pub fn remove_blacklisted_developers(candidates: &mut CandidateSet, blacklist: &[String]) -> usize {
    let developers: Vec<String> = blacklist
        .iter()
        .map(|d| d.trim().to_lowercase())
        .filter(|d| !d.is_empty())
        .collect();
    if developers.is_empty() {
        return 0;
    }

    candidates.retain(|c| {
        let owner = c.owner().to_lowercase();
        !developers.contains(&owner)
    })
}
