//! Core domain models for style violations and evaluation results
//!
//! Architecture: Rich Domain Models - Violations are values with behavior, not just data
//! - Violations are created by evaluators and owned by whoever asked for the evaluation
//! - EvaluationReport is the aggregate for one input source
//! - CheckReport aggregates many sources for batch runs

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Ordinal classification of a violation's importance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational notes about style drift
    Info,
    /// Convention breaches that should be fixed but do not fail a run
    #[serde(alias = "warning")]
    Warn,
    /// Convention breaches that fail a run
    Error,
}

impl Severity {
    /// Whether this severity level should cause a run to fail
    pub fn is_blocking(self) -> bool {
        matches!(self, Self::Error)
    }

    /// Convert to string for display
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One instance where a rule's pattern matched input text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Identifier of the rule that produced this violation
    pub rule_id: String,
    /// Severity copied from the rule at evaluation time
    pub severity: Severity,
    /// Line number (1-indexed); absent for synthetic violations
    pub line_number: Option<u32>,
    /// Column (1-indexed, in characters) where the snippet starts
    pub column_number: Option<u32>,
    /// The offending text, not the whole line
    pub snippet: String,
    /// Human-readable description
    pub message: String,
}

impl Violation {
    /// Message carried by violations synthesized from evaluator failures
    pub const EVALUATOR_FAILURE: &'static str = "evaluator failure";

    /// Create a new violation
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        snippet: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            line_number: None,
            column_number: None,
            snippet: snippet.into(),
            message: message.into(),
        }
    }

    /// Synthetic ERROR violation standing in for a rule whose evaluation failed
    pub fn evaluator_failure(rule_id: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(rule_id, Severity::Error, detail, Self::EVALUATOR_FAILURE)
    }

    /// Set line and column position
    pub fn with_position(mut self, line: u32, column: u32) -> Self {
        self.line_number = Some(line);
        self.column_number = Some(column);
        self
    }

    /// Whether this violation is blocking (fails the run)
    pub fn is_blocking(&self) -> bool {
        self.severity.is_blocking()
    }

    /// Whether this violation was synthesized from an evaluator failure
    pub fn is_synthetic(&self) -> bool {
        self.line_number.is_none() && self.message == Self::EVALUATOR_FAILURE
    }

    /// Format violation for display, prefixed by an optional source path
    pub fn format_display(&self, source: Option<&Path>) -> String {
        let location = match (self.line_number, self.column_number) {
            (Some(line), Some(col)) => format!(":{line}:{col}"),
            (Some(line), None) => format!(":{line}"),
            _ => String::new(),
        };
        let source =
            source.map(|p| p.display().to_string()).unwrap_or_else(|| "<input>".to_string());

        format!(
            "{}{} {} [{}] {}",
            source,
            location,
            self.rule_id,
            self.severity.as_str(),
            self.message
        )
    }
}

/// Count of violations by severity level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub error: usize,
    pub warn: usize,
    pub info: usize,
}

impl SeverityCounts {
    /// Total number of violations across all severities
    pub fn total(&self) -> usize {
        self.error + self.warn + self.info
    }

    /// Whether there are any blocking violations
    pub fn has_blocking(&self) -> bool {
        self.error > 0
    }

    /// Count of a single severity
    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Error => self.error,
            Severity::Warn => self.warn,
            Severity::Info => self.info,
        }
    }

    /// Add a violation to the counts
    pub fn add(&mut self, severity: Severity) {
        match severity {
            Severity::Error => self.error += 1,
            Severity::Warn => self.warn += 1,
            Severity::Info => self.info += 1,
        }
    }

    /// Fold another set of counts into this one
    pub fn absorb(&mut self, other: &SeverityCounts) {
        self.error += other.error;
        self.warn += other.warn;
        self.info += other.info;
    }
}

/// Ordered violations for one input source plus counts per severity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Path of the evaluated source, when it came from a file
    pub source: Option<PathBuf>,
    /// Violations in (rule load order, line order)
    pub violations: Vec<Violation>,
    /// Counts per severity
    pub counts: SeverityCounts,
}

impl EvaluationReport {
    /// Create a new empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty report attributed to a source path
    pub fn for_source(path: impl Into<PathBuf>) -> Self {
        Self { source: Some(path.into()), ..Self::default() }
    }

    /// Append a violation, keeping counts in step
    pub fn add_violation(&mut self, violation: Violation) {
        self.counts.add(violation.severity);
        self.violations.push(violation);
    }

    /// Whether the report contains any violations
    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    /// Whether the report contains blocking violations (errors)
    pub fn has_errors(&self) -> bool {
        self.counts.has_blocking()
    }

    /// Get violations of a specific severity
    pub fn violations_by_severity(&self, severity: Severity) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.severity == severity)
    }
}

/// An input that could not be evaluated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Aggregated result of checking many sources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    /// Per-source reports, in sorted path order
    pub reports: Vec<EvaluationReport>,
    /// Inputs that failed to decode or read
    pub failures: Vec<InputFailure>,
    /// Counts over every report
    pub counts: SeverityCounts,
    /// Number of sources evaluated successfully
    pub files_checked: usize,
}

impl CheckReport {
    /// Create a new empty check report
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one source's report
    pub fn add_report(&mut self, report: EvaluationReport) {
        self.counts.absorb(&report.counts);
        self.files_checked += 1;
        self.reports.push(report);
    }

    /// Record an input that could not be evaluated
    pub fn add_failure(&mut self, path: impl Into<PathBuf>, message: impl Into<String>) {
        self.failures.push(InputFailure { path: path.into(), message: message.into() });
    }

    /// Whether any report contains violations
    pub fn has_violations(&self) -> bool {
        self.counts.total() > 0
    }

    /// Whether any report contains blocking violations
    pub fn has_errors(&self) -> bool {
        self.counts.has_blocking()
    }

    /// Whether any input failed to decode or read
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Iterate all violations with their source path
    pub fn violations(&self) -> impl Iterator<Item = (Option<&Path>, &Violation)> {
        self.reports
            .iter()
            .flat_map(|r| r.violations.iter().map(move |v| (r.source.as_deref(), v)))
    }
}

/// Error types produced by the library
#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    /// Two rule specifications share an identifier
    #[error("Duplicate rule id '{id}'")]
    DuplicateRule { id: String },

    /// Lookup of an unknown rule id
    #[error("Rule '{id}' not found")]
    NotFound { id: String },

    /// Source text could not be read as lines
    #[error("Cannot decode input '{path}': {message}")]
    InputDecode { path: String, message: String },

    /// Configuration file could not be loaded or parsed
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Rule pattern could not be compiled
    #[error("Pattern error in rule '{rule_id}': {message}")]
    Pattern { rule_id: String, message: String },

    /// File could not be read or accessed
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl StyleError {
    /// Create a duplicate rule error
    pub fn duplicate_rule(id: impl Into<String>) -> Self {
        Self::DuplicateRule { id: id.into() }
    }

    /// Create a not-found error
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create an input decode error
    pub fn input_decode(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InputDecode { path: path.into(), message: message.into() }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Create a pattern error
    pub fn pattern(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Pattern { rule_id: rule_id.into(), message: message.into() }
    }
}

/// Result type for library operations
pub type StyleResult<T> = Result<T, StyleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_creation() {
        let violation = Violation::new("naming.class", Severity::Error, "class foo", "Bad name")
            .with_position(3, 1);

        assert_eq!(violation.rule_id, "naming.class");
        assert_eq!(violation.line_number, Some(3));
        assert_eq!(violation.column_number, Some(1));
        assert!(violation.is_blocking());
        assert!(!violation.is_synthetic());
    }

    #[test]
    fn test_synthetic_violation() {
        let violation = Violation::evaluator_failure("R2", "boom");

        assert_eq!(violation.severity, Severity::Error);
        assert_eq!(violation.message, "evaluator failure");
        assert_eq!(violation.line_number, None);
        assert!(violation.is_synthetic());
    }

    #[test]
    fn test_format_display() {
        let violation =
            Violation::new("r", Severity::Warn, "x", "msg").with_position(4, 2);
        assert_eq!(
            violation.format_display(Some(Path::new("src/A.java"))),
            "src/A.java:4:2 r [warn] msg"
        );
        assert_eq!(violation.format_display(None), "<input>:4:2 r [warn] msg");
    }

    #[test]
    fn test_evaluation_report_counts() {
        let mut report = EvaluationReport::new();
        report.add_violation(Violation::new("a", Severity::Error, "", ""));
        report.add_violation(Violation::new("b", Severity::Warn, "", ""));
        report.add_violation(Violation::new("c", Severity::Warn, "", ""));

        assert!(report.has_errors());
        assert_eq!(report.counts.total(), 3);
        assert_eq!(report.counts.get(Severity::Warn), 2);
        assert_eq!(report.violations_by_severity(Severity::Warn).count(), 2);
    }

    #[test]
    fn test_check_report_aggregation() {
        let mut first = EvaluationReport::for_source("A.java");
        first.add_violation(Violation::new("a", Severity::Info, "", ""));
        let mut second = EvaluationReport::for_source("B.java");
        second.add_violation(Violation::new("b", Severity::Error, "", ""));

        let mut check = CheckReport::new();
        check.add_report(first);
        check.add_report(second);
        check.add_failure("C.java", "invalid utf-8");

        assert_eq!(check.files_checked, 2);
        assert_eq!(check.counts.info, 1);
        assert_eq!(check.counts.error, 1);
        assert!(check.has_errors());
        assert!(check.has_failures());
        let sources: Vec<_> = check.violations().map(|(p, _)| p.unwrap().to_path_buf()).collect();
        assert_eq!(sources, vec![PathBuf::from("A.java"), PathBuf::from("B.java")]);
    }

    #[test]
    fn test_severity_ordering_and_serde() {
        assert!(Severity::Error > Severity::Warn);
        assert!(Severity::Warn > Severity::Info);

        let parsed: Severity = serde_yaml::from_str("warning").unwrap();
        assert_eq!(parsed, Severity::Warn);
        let parsed: Severity = serde_yaml::from_str("warn").unwrap();
        assert_eq!(parsed, Severity::Warn);
        assert_eq!(serde_json::to_string(&Severity::Error).unwrap(), "\"error\"");
    }

    #[test]
    fn test_error_messages_carry_identifier() {
        assert!(StyleError::duplicate_rule("dup").to_string().contains("dup"));
        assert!(StyleError::input_decode("A.java", "bad").to_string().contains("A.java"));
        assert!(StyleError::pattern("r1", "bad regex").to_string().contains("r1"));
    }
}
