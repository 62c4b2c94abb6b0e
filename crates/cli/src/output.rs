//! Terminal output utilities
//!
//! Provides consistent formatting for CLI output.

use buildspec_core::validation::{Severity, ValidationResult};
use owo_colors::OwoColorize;

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(message.chars().count()));
    }
}

/// Print every finding of a validation result, errors first
pub fn print_findings(result: &ValidationResult) {
    for (severity, finding) in result.findings() {
        let code = format!("[{}]", finding.code);
        let line = format!("{} {} {}", code.dimmed(), finding.field.bold(), finding.message);
        match severity {
            Severity::Error => Status::error(&line),
            Severity::Warning => Status::warning(&line),
        }
        if let Some(expected) = &finding.expected {
            eprintln!("    expected: {}", expected);
        }
        if let Some(actual) = &finding.actual {
            eprintln!("    actual:   {}", actual);
        }
    }
}

/// One-line summary such as `2 errors, 1 warning`
pub fn summary(result: &ValidationResult) -> String {
    format!(
        "{}, {}",
        format_count(result.errors().len(), "error", "errors"),
        format_count(result.warnings().len(), "warning", "warnings")
    )
}

/// Format a duration for display
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs % 60.0;
        format!("{}m {:.0}s", mins, remaining_secs)
    }
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildspec_core::validation::Validator;
    use std::time::Duration;

    #[test]
    fn test_format_duration_ms() {
        let d = Duration::from_millis(500);
        assert_eq!(format_duration(d), "500ms");
    }

    #[test]
    fn test_format_duration_secs() {
        let d = Duration::from_secs_f32(5.5);
        assert_eq!(format_duration(d), "5.5s");
    }

    #[test]
    fn test_format_count_singular() {
        assert_eq!(format_count(1, "error", "errors"), "1 error");
    }

    #[test]
    fn test_format_count_plural() {
        assert_eq!(format_count(0, "warning", "warnings"), "0 warnings");
    }

    #[test]
    fn test_summary() {
        let result = Validator::new()
            .required("namespace", "")
            .warn_if("signingConfig", "NON_PRODUCTION_SIGNING", true, "debug")
            .validate();
        assert_eq!(summary(&result), "1 error, 1 warning");
    }
}
