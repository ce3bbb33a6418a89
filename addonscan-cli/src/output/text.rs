//! Text output formatting with colors.

use super::report::ScanReport;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formats the end-of-run report.
    pub fn format_report(&self, report: &ScanReport) -> String {
        let mut lines = Vec::new();

        lines.push(self.bold("Scan Results"));
        lines.push("─".repeat(40));
        lines.push(format!("Located:      {} repositories", report.located));
        lines.push(format!(
            "Blacklisted:  {} repos, {} from developers",
            report.removed_repos, report.removed_developers
        ));
        if report.skipped > 0 {
            lines.push(format!("Skipped:      {} listed as invalid", report.skipped));
        }

        if !report.fork_checks.is_empty() {
            lines.push(String::new());
            lines.push(self.bold("Fork validation"));
            for (repo, status) in &report.fork_checks {
                let status = if status.ends_with("no longer verified") {
                    self.yellow(status)
                } else if status.starts_with("Failed") {
                    self.red(status)
                } else {
                    self.green(status)
                };
                lines.push(format!("  {repo}: {status}"));
            }
        }

        if !report.below_minimum.is_empty() {
            lines.push(String::new());
            lines.push(self.bold(&format!("Minimum version {}", report.minimum_version)));
            for (repo, version) in &report.below_minimum {
                let supports = if version.is_empty() { "unknown" } else { version };
                lines.push(format!(
                    "  {repo}: Supports {supports} which is below the required {} version {}",
                    report.minimum_version,
                    self.yellow("-> no longer verified")
                ));
            }
        }

        lines.push(String::new());
        lines.push(self.bold("Suspicious addons"));
        if report.suspicious.is_empty() {
            lines.push(self.green("  Found no suspicious addons"));
        } else {
            for (repo, reasons) in &report.suspicious {
                lines.push(format!("  {repo}: {}", self.yellow(&reasons.join(", "))));
            }
        }

        if !report.invalid.is_empty() {
            lines.push(String::new());
            lines.push(self.bold(&format!("Invalid ({})", report.invalid.len())));
            for invalid in &report.invalid {
                lines.push(format!("  {}: {}", invalid.id, self.dim(&invalid.reason)));
            }
        }

        let stats = &report.stats;
        lines.push(String::new());
        lines.push(self.bold("Statistics"));
        lines.push(format!("  Valid Addons:   {}", self.green(&stats.valid.to_string())));
        lines.push(format!("  Archived:       {}", stats.archived));
        lines.push(format!("  Invalid:        {}", stats.invalid));
        lines.push(format!("  Excluded:       {}", stats.excluded));
        lines.push(format!("  Execution Time: {}", stats.elapsed_display()));

        lines.push(String::new());
        lines.push(self.dim(&format!(
            "Wrote {} and {}",
            report.output.display(),
            report.invalid_output.display()
        )));

        lines.join("\n")
    }

    // ========================================================================
    // Color Helpers
    // ========================================================================

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }
}
