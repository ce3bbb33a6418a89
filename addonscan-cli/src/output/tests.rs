//! CLI output formatting tests.
//!
//! These tests verify that the run report is correctly formatted for both
//! text and JSON output modes.

#[cfg(test)]
mod text_formatter_tests {
    use super::super::report::ScanReport;
    use super::super::text::TextFormatter;
    use addonscan_core::{InvalidAddon, ScanStats};
    use std::path::PathBuf;
    use std::time::Duration;

    fn report() -> ScanReport {
        let mut report = ScanReport {
            output: PathBuf::from("addons.json"),
            invalid_output: PathBuf::from("addons.invalid.json"),
            located: 42,
            removed_repos: 1,
            removed_developers: 2,
            stats: ScanStats {
                valid: 30,
                archived: 3,
                invalid: 1,
                excluded: 4,
                elapsed: Duration::from_secs(125),
            },
            invalid: vec![InvalidAddon::new("bad/repo", "Repository is archived")],
            ..ScanReport::default()
        };
        report
            .fork_checks
            .insert("a/fork".to_string(), "Valid".to_string());
        report
    }

    #[test]
    fn test_plain_report() {
        let text = TextFormatter::new(false).format_report(&report());

        assert!(text.starts_with("Scan Results\n"));
        assert!(text.contains("Located:      42 repositories"));
        assert!(text.contains("Blacklisted:  1 repos, 2 from developers"));
        assert!(!text.contains("Skipped:"));
        assert!(text.contains("  a/fork: Valid"));
        assert!(text.contains("  Found no suspicious addons"));
        assert!(text.contains("  bad/repo: Repository is archived"));
        assert!(text.contains("  Valid Addons:   30"));
        assert!(text.contains("  Execution Time: 2:05"));
        assert!(text.ends_with("Wrote addons.json and addons.invalid.json"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn test_minimum_version_section() {
        let mut report = report();
        report.minimum_version = "1.21".to_string();
        report
            .below_minimum
            .insert("old/addon".to_string(), "1.20.1".to_string());
        report.below_minimum.insert("new/addon".to_string(), String::new());

        let text = TextFormatter::new(false).format_report(&report);
        assert!(text.contains("Minimum version 1.21"));
        assert!(text.contains(
            "  old/addon: Supports 1.20.1 which is below the required 1.21 version -> no longer verified"
        ));
        assert!(text.contains("  new/addon: Supports unknown which"));
    }

    #[test]
    fn test_suspicious_reasons_joined() {
        let mut report = report();
        report.suspicious.insert(
            "loud/addon".to_string(),
            vec![
                "[Exceeding name length (80)]".to_string(),
                "[Exceeding feature limit (900)]".to_string(),
            ],
        );

        let text = TextFormatter::new(false).format_report(&report);
        assert!(text.contains(
            "  loud/addon: [Exceeding name length (80)], [Exceeding feature limit (900)]"
        ));
        assert!(!text.contains("Found no suspicious addons"));
    }

    #[test]
    fn test_colors() {
        let text = TextFormatter::new(true).format_report(&report());
        assert!(text.contains("\x1b[1mScan Results\x1b[0m"));
        assert!(text.contains("\x1b[32mValid\x1b[0m"));
    }
}

#[cfg(test)]
mod json_formatter_tests {
    use super::super::json::JsonFormatter;
    use super::super::report::ScanReport;
    use addonscan_core::ScanStats;
    use std::time::Duration;

    #[test]
    fn test_compact_report() {
        let report = ScanReport {
            located: 3,
            stats: ScanStats {
                valid: 2,
                elapsed: Duration::from_millis(1500),
                ..ScanStats::default()
            },
            ..ScanReport::default()
        };

        let json = JsonFormatter::new(false).format(&report).unwrap();
        assert!(!json.contains('\n'));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["located"], 3);
        assert_eq!(value["stats"]["valid"], 2);
        assert_eq!(value["stats"]["elapsed"], 1.5);
        assert!(value.get("fork_checks").is_none());
        assert!(value.get("minimum_version").is_none());
        assert_eq!(value["suspicious"], serde_json::json!({}));
    }

    #[test]
    fn test_pretty() {
        let json = JsonFormatter::new(true)
            .format(&serde_json::json!({"a": 1}))
            .unwrap();
        assert_eq!(json, "{\n  \"a\": 1\n}");
    }
}
