//! Discord invite discovery.

use std::sync::LazyLock;

use addonscan_fetch::GitHubApi;
use regex::Regex;
use tracing::{debug, warn};

static INVITE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"((?:https?://)?(?:www\.)?(?:discord\.(?:gg|io|me|li|com)|discordapp\.com/invite|dsc\.gg)/[a-zA-Z0-9\-/]+)",
    )
    .expect("Invalid regex")
});

const README_PATH: &str = "README.md";

/// Returns true if `text` contains something shaped like an invite.
pub fn is_invite(text: &str) -> bool {
    INVITE_RE.is_match(text)
}

/// Invite-shaped substrings of each text, in order, with `https://` added
/// where missing and duplicates dropped.
pub fn invite_candidates(texts: &[&str]) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::new();
    for text in texts {
        for m in INVITE_RE.find_iter(text) {
            let raw = m.as_str();
            let invite = if raw.starts_with("http://") || raw.starts_with("https://") {
                raw.to_string()
            } else {
                format!("https://{raw}")
            };
            if !candidates.contains(&invite) {
                candidates.push(invite);
            }
        }
    }
    candidates
}

/// Looks for a live invite in the readme, then the manifest body, then the
/// repository record.
///
/// The first candidate whose probe succeeds with anything but 404 wins.
/// Returns an empty string if none does.
pub async fn find_discord(
    api: &GitHubApi,
    id: &str,
    branch: &str,
    manifest_body: &str,
    repository_body: &str,
) -> String {
    let readme = match api.raw(id, branch, README_PATH).await {
        Ok(readme) => readme.unwrap_or_default(),
        Err(e) => {
            warn!(repo = %id, error = %e, "Failed to fetch readme");
            String::new()
        }
    };

    for invite in invite_candidates(&[readme.as_str(), manifest_body, repository_body]) {
        match api.probe(&invite).await {
            Ok(status) if status != 404 => {
                debug!(repo = %id, invite = %invite, "Discord invite found");
                return invite;
            }
            Ok(status) => debug!(invite = %invite, status, "Dead invite"),
            Err(e) => debug!(invite = %invite, error = %e, "Invite probe failed"),
        }
    }

    String::new()
}
