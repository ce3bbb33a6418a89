//! Per-run counters for the end-of-run summary.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::addon::{Addon, InvalidAddon};

/// Counters accumulated over one scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Addons produced.
    pub valid: usize,
    /// Produced addons whose repository is archived.
    pub archived: usize,
    /// Candidates rejected with a reason.
    pub invalid: usize,
    /// Candidates silently dropped as unmodified templates.
    pub excluded: usize,
    /// Wall-clock time of the run.
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
}

impl ScanStats {
    /// Derives counters from the run's results.
    pub fn from_results(
        addons: &[Addon],
        invalid: &[InvalidAddon],
        excluded: usize,
        elapsed: Duration,
    ) -> Self {
        Self {
            valid: addons.len(),
            archived: addons.iter().filter(|a| a.repo.archived).count(),
            invalid: invalid.len(),
            excluded,
            elapsed,
        }
    }

    /// Elapsed time as `minutes:seconds`.
    pub fn elapsed_display(&self) -> String {
        let secs = self.elapsed.as_secs();
        format!("{}:{:02}", secs / 60, secs % 60)
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_results_counts_archived() {
        let mut archived = Addon::default();
        archived.repo.archived = true;
        let addons = vec![Addon::default(), archived];
        let invalid = vec![InvalidAddon::new("a/b", "nope")];

        let stats = ScanStats::from_results(&addons, &invalid, 3, Duration::from_secs(125));
        assert_eq!(stats.valid, 2);
        assert_eq!(stats.archived, 1);
        assert_eq!(stats.invalid, 1);
        assert_eq!(stats.excluded, 3);
        assert_eq!(stats.elapsed_display(), "2:05");
    }

    #[test]
    fn test_elapsed_serializes_as_seconds() {
        let stats = ScanStats {
            elapsed: Duration::from_millis(1500),
            ..ScanStats::default()
        };
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["elapsed"], 1.5);
    }
}
