//! Validation findings and a fluent validator
//!
//! Findings carry a stable code so tooling can filter on them. Errors make a
//! result invalid; warnings never do.
//!
//! # Example
//!
//! ```rust
//! use buildspec_core::validation::Validator;
//!
//! let result = Validator::new()
//!     .required("namespace", "com.example.app")
//!     .ordered("sdk", ("minSdk", 21), ("targetSdk", 34))
//!     .validate();
//!
//! assert!(result.is_valid());
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// How serious a finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field that failed validation
    pub field: String,
    /// Error message
    pub message: String,
    /// Stable finding code, e.g. `SDK_ORDER`
    pub code: String,
    /// Expected value (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// Actual value (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl ValidationError {
    /// Create a finding without expected/actual values
    pub fn new(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.into(),
            expected: None,
            actual: None,
        }
    }

    /// Attach the expected value
    pub fn expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Attach the actual value
    pub fn actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = Some(actual.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationError>,
}

impl ValidationResult {
    /// Create a new empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Valid and free of warnings
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// Get all errors
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Get all warnings
    pub fn warnings(&self) -> &[ValidationError] {
        &self.warnings
    }

    /// Iterate over every finding with its severity
    pub fn findings(&self) -> impl Iterator<Item = (Severity, &ValidationError)> {
        self.errors
            .iter()
            .map(|e| (Severity::Error, e))
            .chain(self.warnings.iter().map(|w| (Severity::Warning, w)))
    }

    /// Whether any finding carries the given code
    pub fn has_code(&self, code: &str) -> bool {
        self.findings().any(|(_, f)| f.code == code)
    }

    /// Add an error
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: ValidationError) {
        self.warnings.push(warning);
    }

    /// Merge another result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Promote every warning to an error
    pub fn into_strict(mut self) -> Self {
        let warnings = std::mem::take(&mut self.warnings);
        self.errors.extend(warnings);
        self
    }
}

/// Fluent validator builder
pub struct Validator {
    result: ValidationResult,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self {
            result: ValidationResult::new(),
        }
    }

    /// Validate that a field is not empty
    pub fn required(mut self, field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.result.add_error(
                ValidationError::new(field, "REQUIRED", "Field is required")
                    .expected("non-empty value")
                    .actual("empty"),
            );
        }
        self
    }

    /// Validate that an optional field is present
    pub fn present<T>(mut self, field: &str, value: Option<&T>) -> Self {
        if value.is_none() {
            self.result.add_error(
                ValidationError::new(field, "REQUIRED", "Field is required").actual("missing"),
            );
        }
        self
    }

    /// Validate against a precompiled regex
    pub fn matches(
        mut self,
        field: &str,
        code: &str,
        value: &str,
        re: &Regex,
        description: &str,
    ) -> Self {
        if !value.is_empty() && !re.is_match(value) {
            self.result.add_error(
                ValidationError::new(field, code, format!("Must match {}", description))
                    .expected(description)
                    .actual(value),
            );
        }
        self
    }

    /// Validate a numeric range
    pub fn range<T: PartialOrd + fmt::Display>(
        mut self,
        field: &str,
        code: &str,
        value: T,
        min: T,
        max: T,
    ) -> Self {
        if value < min || value > max {
            self.result.add_error(
                ValidationError::new(field, code, format!("Must be between {} and {}", min, max))
                    .expected(format!("{} - {}", min, max))
                    .actual(value.to_string()),
            );
        }
        self
    }

    /// Validate that `lower <= upper`
    pub fn ordered<T: PartialOrd + fmt::Display>(
        mut self,
        code: &str,
        lower: (&str, T),
        upper: (&str, T),
    ) -> Self {
        let (lower_name, lower_value) = lower;
        let (upper_name, upper_value) = upper;
        if lower_value > upper_value {
            self.result.add_error(
                ValidationError::new(
                    lower_name,
                    code,
                    format!(
                        "{} ({}) must not exceed {} ({})",
                        lower_name, lower_value, upper_name, upper_value
                    ),
                )
                .expected(format!("{} <= {}", lower_name, upper_name))
                .actual(format!("{} > {}", lower_value, upper_value)),
            );
        }
        self
    }

    /// Add a warning (non-blocking)
    pub fn warn_if(mut self, field: &str, code: &str, condition: bool, message: &str) -> Self {
        if condition {
            self.result.add_warning(ValidationError::new(field, code, message));
        }
        self
    }

    /// Complete validation and return result
    pub fn validate(self) -> ValidationResult {
        self.result
    }
}

/// Warn when a path that should be relative is absolute
pub fn validate_relative_path(field: &str, code: &str, path: &Path) -> ValidationResult {
    let mut result = ValidationResult::new();
    let path_str = path.to_string_lossy();

    if path.is_absolute() {
        result.add_warning(
            ValidationError::new(field, code, "Absolute path detected")
                .expected("path relative to the module")
                .actual(path_str.to_string()),
        );
    }

    result
}
