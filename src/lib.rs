//! Java Style Guard - pattern-level enforcement of Java coding conventions
//!
//! Architecture: Clean Architecture - Library interface serves as the application layer
//! - Rule specs are loaded into an immutable Registry and evaluated line by line
//! - The Runner isolates rule failures so every report is complete
//! - Formatting and CLI concerns stay outside the domain

pub mod analyzer;
pub mod config;
pub mod domain;
pub mod evaluator;
pub mod registry;
pub mod report;
pub mod runner;
pub mod source;

// Re-export main types for convenient access
pub use domain::violations::{
    CheckReport, EvaluationReport, InputFailure, Severity, SeverityCounts, StyleError,
    StyleResult, Violation,
};

pub use config::{ConfigBuilder, PathConfig, RuleSpec, RuleType, StyleConfig};

pub use analyzer::{AnalysisOptions, Analyzer, PathFilter};

pub use evaluator::{Evaluator, PatternEvaluator};

pub use registry::{Registry, RuleDefinition, RulePattern};

pub use report::{OutputFormat, ReportFormatter, ReportOptions};

pub use runner::Runner;

pub use source::Source;

use std::path::Path;

/// High-level checker combining analysis and report formatting
pub struct StyleChecker {
    analyzer: Analyzer,
    report_formatter: ReportFormatter,
}

impl StyleChecker {
    /// Create a checker with the given configuration
    pub fn new_with_config(config: StyleConfig) -> StyleResult<Self> {
        Ok(Self {
            analyzer: Analyzer::new(config)?,
            report_formatter: ReportFormatter::default(),
        })
    }

    /// Create a checker with the built-in Java convention rules
    pub fn new() -> StyleResult<Self> {
        Self::new_with_config(StyleConfig::default())
    }

    /// Create a checker loading configuration from file
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> StyleResult<Self> {
        Self::new_with_config(StyleConfig::load_from_file(path)?)
    }

    /// Set custom report formatter
    pub fn with_report_formatter(mut self, formatter: ReportFormatter) -> Self {
        self.report_formatter = formatter;
        self
    }

    /// The loaded rules
    pub fn registry(&self) -> &Registry {
        self.analyzer.registry()
    }

    /// Check in-memory lines
    pub fn check_lines<S: AsRef<str>>(&self, lines: &[S]) -> EvaluationReport {
        let source = Source::from_lines(lines.iter().map(AsRef::as_ref));
        self.analyzer.analyze_source(&source)
    }

    /// Check a single file
    pub fn check_file<P: AsRef<Path>>(&self, file_path: P) -> StyleResult<EvaluationReport> {
        self.analyzer.analyze_file(file_path)
    }

    /// Check files and directory trees
    pub fn check_paths<P: AsRef<Path>>(
        &self,
        paths: &[P],
        options: &AnalysisOptions,
    ) -> StyleResult<CheckReport> {
        self.analyzer.analyze_paths(paths, options)
    }

    /// Format a report for output
    pub fn format_report(&self, report: &CheckReport, format: OutputFormat) -> StyleResult<String> {
        self.report_formatter.format_report(report, format)
    }
}

/// Convenience function to check a directory with the built-in rules
pub fn check_directory<P: AsRef<Path>>(directory: P) -> StyleResult<CheckReport> {
    let checker = StyleChecker::new()?;
    checker.check_paths(&[directory.as_ref()], &AnalysisOptions::default())
}
