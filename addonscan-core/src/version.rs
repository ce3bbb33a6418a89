//! Minecraft version string helpers.
//!
//! Versions in this domain always look like `1.N` or `1.N.M`. Anything else
//! found in build files, release names, or custom documents is rejected by
//! [`is_mc_version`] before it reaches an [`Addon`](crate::Addon).

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

/// Pattern for `1.N` and `1.N.M`
static MC_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^1\.\d+(\.\d+)?$").expect("Invalid regex"));

/// Returns true if `value` has the strict `1.N[.M]` shape.
pub fn is_mc_version(value: &str) -> bool {
    MC_VERSION_RE.is_match(value)
}

/// Compares two dotted version strings numerically, component by component.
///
/// Missing components count as zero, so `1.21` equals `1.21.0`. Components
/// that are not numbers also count as zero. An empty string orders below any
/// non-empty one.
pub fn compare_mc_versions(a: &str, b: &str) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (false, false) => {}
    }

    let left = components(a);
    let right = components(b);
    let len = left.len().max(right.len());

    for i in 0..len {
        let l = left.get(i).copied().unwrap_or(0);
        let r = right.get(i).copied().unwrap_or(0);
        match l.cmp(&r) {
            Ordering::Equal => {}
            other => return other,
        }
    }

    Ordering::Equal
}

/// Sorts versions from newest to oldest.
pub fn sort_newest_first(versions: &mut [String]) {
    versions.sort_by(|a, b| compare_mc_versions(b, a));
}

fn components(version: &str) -> Vec<u64> {
    version
        .split('.')
        .map(|part| part.trim().parse::<u64>().unwrap_or(0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_accepts_minor_and_patch() {
        assert!(is_mc_version("1.20"));
        assert!(is_mc_version("1.20.4"));
        assert!(is_mc_version("1.8.9"));
    }

    #[test]
    fn test_shape_rejects_everything_else() {
        assert!(!is_mc_version(""));
        assert!(!is_mc_version("2.0"));
        assert!(!is_mc_version("1"));
        assert!(!is_mc_version("1.20.4.1"));
        assert!(!is_mc_version("1.20-pre1"));
        assert!(!is_mc_version(" 1.20"));
        assert!(!is_mc_version("${minecraft_version}"));
    }

    #[test]
    fn test_compare_is_numeric() {
        assert_eq!(compare_mc_versions("1.9", "1.10"), Ordering::Less);
        assert_eq!(compare_mc_versions("1.21.1", "1.21"), Ordering::Greater);
        assert_eq!(compare_mc_versions("1.21", "1.21.0"), Ordering::Equal);
    }

    #[test]
    fn test_compare_empty_is_lowest() {
        assert_eq!(compare_mc_versions("", "1.8"), Ordering::Less);
        assert_eq!(compare_mc_versions("1.8", ""), Ordering::Greater);
        assert_eq!(compare_mc_versions("", ""), Ordering::Equal);
    }

    #[test]
    fn test_sort_newest_first() {
        let mut versions = vec![
            "1.20.1".to_string(),
            "1.21.4".to_string(),
            "1.19".to_string(),
            "1.21".to_string(),
        ];
        sort_newest_first(&mut versions);
        assert_eq!(versions, vec!["1.21.4", "1.21", "1.20.1", "1.19"]);
    }
}
