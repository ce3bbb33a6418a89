//! Output formatting for CLI.

mod json;
mod report;
mod text;

pub use json::JsonFormatter;
pub use report::ScanReport;
pub use text::TextFormatter;
#[cfg(test)]
mod tests;
