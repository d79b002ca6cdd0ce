//! Report generation with multiple output formats
//!
//! CDD Principle: Anti-Corruption Layer - Formatters translate domain reports to external formats
//! - CheckReport (domain) is converted to human, JSON, SARIF or GitHub Actions text
//! - Each formatter encapsulates the rules for its specific output format
//! - Output carries no timestamps, so identical runs render identical bytes
//! - Headings and totals describe the violations shown after filtering

use crate::domain::violations::{
    CheckReport, Severity, SeverityCounts, StyleError, StyleResult, Violation,
};
use serde_json::Value as JsonValue;
use std::io::Write;
use std::path::Path;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable format with optional colors
    Human,
    /// JSON format for programmatic consumption
    Json,
    /// SARIF format for code scanning tools
    Sarif,
    /// GitHub Actions workflow commands
    GitHub,
}

impl OutputFormat {
    /// Parse format from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "human" => Some(Self::Human),
            "json" => Some(Self::Json),
            "sarif" => Some(Self::Sarif),
            "github" => Some(Self::GitHub),
            _ => None,
        }
    }

    /// Get all available format names
    pub fn all_formats() -> &'static [&'static str] {
        &["human", "json", "sarif", "github"]
    }
}

/// Options for customizing report output
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Whether to use colored output (human format)
    pub use_colors: bool,
    /// Whether to print the offending snippet under each violation
    pub show_snippets: bool,
    /// Maximum number of violations to include
    pub max_violations: Option<usize>,
    /// Minimum severity level to include
    pub min_severity: Option<Severity>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self { use_colors: true, show_snippets: true, max_violations: None, min_severity: None }
    }
}

#[derive(Debug, Clone, Copy)]
enum Tone {
    Error,
    Warn,
    Info,
    Dim,
    Good,
    Bold,
}

impl From<Severity> for Tone {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Error => Tone::Error,
            Severity::Warn => Tone::Warn,
            Severity::Info => Tone::Info,
        }
    }
}

/// Main report formatter that dispatches to specific formatters
#[derive(Debug, Clone, Default)]
pub struct ReportFormatter {
    options: ReportOptions,
}

type Located<'a> = (Option<&'a Path>, &'a Violation);

/// The violations that survive filtering, with their totals
struct Shown<'a> {
    violations: Vec<Located<'a>>,
    counts: SeverityCounts,
    hidden: usize,
}

impl<'a> Shown<'a> {
    fn new(report: &CheckReport, violations: Vec<Located<'a>>) -> Self {
        let mut counts = SeverityCounts::default();
        for (_, violation) in &violations {
            counts.add(violation.severity);
        }
        let hidden = report.counts.total().saturating_sub(violations.len());
        Self { violations, counts, hidden }
    }
}

impl ReportFormatter {
    /// Create a new report formatter with options
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ReportOptions {
        &self.options
    }

    /// Format a report in the specified format
    pub fn format_report(&self, report: &CheckReport, format: OutputFormat) -> StyleResult<String> {
        let shown = Shown::new(report, self.filter_violations(report));

        match format {
            OutputFormat::Human => Ok(self.format_human(report, &shown)),
            OutputFormat::Json => self.format_json(report, &shown),
            OutputFormat::Sarif => self.format_sarif(&shown.violations),
            OutputFormat::GitHub => Ok(self.format_github(report, &shown.violations)),
        }
    }

    /// Write a formatted report to a writer
    pub fn write_report<W: Write>(
        &self,
        report: &CheckReport,
        format: OutputFormat,
        mut writer: W,
    ) -> StyleResult<()> {
        let formatted = self.format_report(report, format)?;
        writer.write_all(formatted.as_bytes())?;
        Ok(())
    }

    /// Filter violations based on report options
    fn filter_violations<'a>(&self, report: &'a CheckReport) -> Vec<Located<'a>> {
        let mut filtered: Vec<Located<'a>> = report
            .violations()
            .filter(|(_, v)| self.options.min_severity.map_or(true, |min| v.severity >= min))
            .collect();

        if let Some(max) = self.options.max_violations {
            filtered.truncate(max);
        }

        filtered
    }

    fn format_human(&self, report: &CheckReport, shown: &Shown<'_>) -> String {
        let mut output = String::new();

        if shown.violations.is_empty() {
            let heading = if shown.hidden == 0 {
                "No style violations found"
            } else {
                "No style violations shown"
            };
            output.push_str(&self.paint(heading, Tone::Good));
            output.push('\n');
        } else {
            let tone = if shown.counts.error > 0 { Tone::Error } else { Tone::Warn };
            output.push_str(&self.paint("Style Violations Found", tone));
            output.push_str("\n\n");

            let mut current: Option<Option<&Path>> = None;
            for (source, violation) in &shown.violations {
                if current != Some(*source) {
                    let name = source
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "<input>".to_string());
                    output.push_str(&self.paint(&name, Tone::Bold));
                    output.push('\n');
                    current = Some(*source);
                }

                let position = match (violation.line_number, violation.column_number) {
                    (Some(line), Some(col)) => format!("{line}:{col}"),
                    (Some(line), None) => line.to_string(),
                    _ => "-".to_string(),
                };
                output.push_str(&format!(
                    "  {} {} [{}] {}\n",
                    self.paint(&position, Tone::Dim),
                    violation.rule_id,
                    self.paint(violation.severity.as_str(), violation.severity.into()),
                    violation.message
                ));

                if self.options.show_snippets && !violation.snippet.is_empty() {
                    output.push_str(&format!(
                        "    {}\n",
                        self.paint(&format!("| {}", violation.snippet), Tone::Dim)
                    ));
                }
            }
            output.push('\n');
        }

        if report.has_failures() {
            output.push_str(&self.paint("Inputs that could not be checked:", Tone::Error));
            output.push('\n');
            for failure in &report.failures {
                output.push_str(&format!("  {}: {}\n", failure.path.display(), failure.message));
            }
            output.push('\n');
        }

        if shown.hidden > 0 {
            let noun = if shown.hidden == 1 { "violation" } else { "violations" };
            let text = format!("{} {} hidden by filters", shown.hidden, noun);
            output.push_str(&self.paint(&text, Tone::Dim));
            output.push('\n');
        }

        output.push_str(&self.format_summary(&shown.counts, report.files_checked));
        output
    }

    fn format_json(&self, report: &CheckReport, shown: &Shown<'_>) -> StyleResult<String> {
        let json_violations: Vec<JsonValue> = shown
            .violations
            .iter()
            .map(|(source, v)| {
                serde_json::json!({
                    "file_path": source.map(|p| p.display().to_string()),
                    "rule_id": v.rule_id,
                    "severity": v.severity.as_str(),
                    "line_number": v.line_number,
                    "column_number": v.column_number,
                    "snippet": v.snippet,
                    "message": v.message,
                })
            })
            .collect();

        let failures: Vec<JsonValue> = report
            .failures
            .iter()
            .map(|f| {
                serde_json::json!({ "path": f.path.display().to_string(), "message": f.message })
            })
            .collect();

        let json_report = serde_json::json!({
            "violations": json_violations,
            "failures": failures,
            "summary": {
                "files_checked": report.files_checked,
                "violations_by_severity": {
                    "error": shown.counts.error,
                    "warn": shown.counts.warn,
                    "info": shown.counts.info
                },
                "hidden_by_filters": shown.hidden
            }
        });

        serde_json::to_string_pretty(&json_report)
            .map_err(|e| StyleError::config(format!("JSON serialization failed: {e}")))
    }

    fn format_sarif(&self, violations: &[Located<'_>]) -> StyleResult<String> {
        let results: Vec<JsonValue> = violations
            .iter()
            .map(|(source, v)| {
                let level = match v.severity {
                    Severity::Error => "error",
                    Severity::Warn => "warning",
                    Severity::Info => "note",
                };

                serde_json::json!({
                    "ruleId": v.rule_id,
                    "level": level,
                    "message": { "text": v.message },
                    "locations": [{
                        "physicalLocation": {
                            "artifactLocation": {
                                "uri": source.map(|p| p.display().to_string()).unwrap_or_default()
                            },
                            "region": {
                                "startLine": v.line_number.unwrap_or(1),
                                "startColumn": v.column_number.unwrap_or(1),
                                "snippet": { "text": v.snippet }
                            }
                        }
                    }]
                })
            })
            .collect();

        let sarif_report = serde_json::json!({
            "version": "2.1.0",
            "$schema": "https://json.schemastore.org/sarif-2.1.0.json",
            "runs": [{
                "tool": {
                    "driver": {
                        "name": env!("CARGO_PKG_NAME"),
                        "version": env!("CARGO_PKG_VERSION")
                    }
                },
                "results": results
            }]
        });

        serde_json::to_string_pretty(&sarif_report)
            .map_err(|e| StyleError::config(format!("SARIF serialization failed: {e}")))
    }

    fn format_github(&self, report: &CheckReport, violations: &[Located<'_>]) -> String {
        let mut output = String::new();

        for (source, violation) in violations {
            let level = match violation.severity {
                Severity::Error => "error",
                Severity::Warn => "warning",
                Severity::Info => "notice",
            };

            let mut properties = Vec::new();
            if let Some(path) = source {
                properties.push(format!("file={}", escape_property(&path.display().to_string())));
            }
            if let Some(line) = violation.line_number {
                properties.push(format!("line={line}"));
            }
            if let Some(col) = violation.column_number {
                properties.push(format!("col={col}"));
            }
            properties.push(format!("title={}", escape_property(&violation.rule_id)));

            output.push_str(&format!(
                "::{} {}::{}\n",
                level,
                properties.join(","),
                escape_data(&violation.message)
            ));
        }

        for failure in &report.failures {
            output.push_str(&format!(
                "::error file={}::{}\n",
                escape_property(&failure.path.display().to_string()),
                escape_data(&failure.message)
            ));
        }

        output
    }

    /// Format the summary line
    fn format_summary(&self, counts: &SeverityCounts, files_checked: usize) -> String {
        let files = format!("{} file{}", files_checked, plural(files_checked));

        if counts.total() == 0 {
            return format!(
                "{} {} in {}\n",
                self.paint("Summary:", Tone::Bold),
                self.paint("0 violations", Tone::Good),
                files
            );
        }

        let mut parts = Vec::new();
        if counts.error > 0 {
            let text = format!("{} error{}", counts.error, plural(counts.error));
            parts.push(self.paint(&text, Tone::Error));
        }
        if counts.warn > 0 {
            let text = format!("{} warning{}", counts.warn, plural(counts.warn));
            parts.push(self.paint(&text, Tone::Warn));
        }
        if counts.info > 0 {
            parts.push(self.paint(&format!("{} info", counts.info), Tone::Info));
        }

        format!("{} {} in {}\n", self.paint("Summary:", Tone::Bold), parts.join(", "), files)
    }

    #[cfg(feature = "colors")]
    fn paint(&self, text: &str, tone: Tone) -> String {
        use colored::Colorize;

        if !self.options.use_colors {
            return text.to_string();
        }
        match tone {
            Tone::Error => text.red().to_string(),
            Tone::Warn => text.yellow().to_string(),
            Tone::Info => text.cyan().to_string(),
            Tone::Dim => text.dimmed().to_string(),
            Tone::Good => text.green().to_string(),
            Tone::Bold => text.bold().to_string(),
        }
    }

    #[cfg(not(feature = "colors"))]
    fn paint(&self, text: &str, _tone: Tone) -> String {
        text.to_string()
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Escape a workflow command message
fn escape_data(value: &str) -> String {
    value.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

/// Escape a workflow command property value
fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::violations::EvaluationReport;

    fn plain() -> ReportFormatter {
        ReportFormatter::new(ReportOptions { use_colors: false, ..Default::default() })
    }

    fn create_test_report() -> CheckReport {
        let mut file_report = EvaluationReport::for_source("src/main/App.java");
        file_report.add_violation(
            Violation::new(
                "logging.system-out",
                Severity::Error,
                "System.out.println(",
                "Use a logger",
            )
            .with_position(42, 9),
        );
        file_report.add_violation(
            Violation::new("comments.todo-marker", Severity::Info, "TODO", "Unresolved marker")
                .with_position(50, 4),
        );

        let mut report = CheckReport::new();
        report.add_report(file_report);
        report.add_report(EvaluationReport::for_source("src/main/Clean.java"));
        report
    }

    #[test]
    fn test_human_format() {
        let output = plain().format_report(&create_test_report(), OutputFormat::Human).unwrap();

        assert!(output.contains("Style Violations Found"));
        assert!(output.contains("src/main/App.java"));
        assert!(output.contains("  42:9 logging.system-out [error] Use a logger"));
        assert!(output.contains("| System.out.println("));
        assert!(output.contains("Summary: 1 error, 1 info in 2 files"));
        assert!(!output.contains("Clean.java"));
    }

    #[test]
    fn test_json_format() {
        let output = plain().format_report(&create_test_report(), OutputFormat::Json).unwrap();

        let json: JsonValue = serde_json::from_str(&output).unwrap();
        assert_eq!(json["violations"].as_array().unwrap().len(), 2);
        assert_eq!(json["violations"][0]["rule_id"], "logging.system-out");
        assert_eq!(json["violations"][0]["file_path"], "src/main/App.java");
        assert_eq!(json["violations"][0]["snippet"], "System.out.println(");
        assert_eq!(json["summary"]["files_checked"], 2);
        assert_eq!(json["summary"]["violations_by_severity"]["error"], 1);
    }

    #[test]
    fn test_sarif_format() {
        let output = plain().format_report(&create_test_report(), OutputFormat::Sarif).unwrap();

        let json: JsonValue = serde_json::from_str(&output).unwrap();
        assert_eq!(json["version"], "2.1.0");
        let results = json["runs"][0]["results"].as_array().unwrap();
        assert_eq!(results[0]["level"], "error");
        assert_eq!(results[1]["level"], "note");
        assert_eq!(
            results[0]["locations"][0]["physicalLocation"]["region"]["startLine"],
            42
        );
    }

    #[test]
    fn test_github_format() {
        let mut report = create_test_report();
        report.add_failure("Bad.java", "invalid UTF-8");
        let output = plain().format_report(&report, OutputFormat::GitHub).unwrap();

        assert!(output.contains(
            "::error file=src/main/App.java,line=42,col=9,title=logging.system-out::Use a logger"
        ));
        assert!(output.contains("::notice "));
        assert!(output.contains("::error file=Bad.java::invalid UTF-8"));
    }

    #[test]
    fn test_empty_report() {
        let output = plain().format_report(&CheckReport::new(), OutputFormat::Human).unwrap();

        assert!(output.contains("No style violations found"));
        assert!(output.contains("Summary: 0 violations in 0 files"));
    }

    #[test]
    fn test_severity_filtering_and_limit() {
        let formatter = ReportFormatter::new(ReportOptions {
            min_severity: Some(Severity::Warn),
            ..Default::default()
        });
        let output = formatter.format_report(&create_test_report(), OutputFormat::Json).unwrap();
        let json: JsonValue = serde_json::from_str(&output).unwrap();
        assert_eq!(json["violations"].as_array().unwrap().len(), 1);
        assert_eq!(json["summary"]["violations_by_severity"]["info"], 0);
        assert_eq!(json["summary"]["hidden_by_filters"], 1);

        let limited =
            ReportFormatter::new(ReportOptions { max_violations: Some(1), ..Default::default() });
        let output = limited.format_report(&create_test_report(), OutputFormat::Json).unwrap();
        let json: JsonValue = serde_json::from_str(&output).unwrap();
        assert_eq!(json["violations"][0]["rule_id"], "logging.system-out");
        assert_eq!(json["violations"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_filter_hiding_everything() {
        let mut file_report = EvaluationReport::for_source("App.java");
        file_report.add_violation(
            Violation::new("comments.todo-marker", Severity::Info, "TODO", "Unresolved marker")
                .with_position(1, 4),
        );
        let mut report = CheckReport::new();
        report.add_report(file_report);

        let formatter = ReportFormatter::new(ReportOptions {
            use_colors: false,
            min_severity: Some(Severity::Error),
            ..Default::default()
        });
        let output = formatter.format_report(&report, OutputFormat::Human).unwrap();

        assert!(output.contains("No style violations shown"));
        assert!(output.contains("1 violation hidden by filters"));
        assert!(output.contains("Summary: 0 violations in 1 file"));
        assert!(!output.contains("1 info"));
    }

    #[test]
    fn test_github_values_are_escaped() {
        let mut file_report = EvaluationReport::for_source("src/a,b/App.java");
        file_report.add_violation(
            Violation::new("r1", Severity::Warn, "x", "100% wrong\nsecond line")
                .with_position(3, 1),
        );
        let mut report = CheckReport::new();
        report.add_report(file_report);
        report.add_failure("C:/odd,name.java", "bad\r\ninput");

        let output = plain().format_report(&report, OutputFormat::GitHub).unwrap();

        assert!(output.contains(
            "::warning file=src/a%2Cb/App.java,line=3,col=1,title=r1::100%25 wrong%0Asecond line\n"
        ));
        assert!(output.contains("::error file=C%3A/odd%2Cname.java::bad%0D%0Ainput\n"));
        assert_eq!(output.lines().count(), 2);
    }

    #[test]
    fn test_write_report_to_writer() {
        let formatter = plain();
        assert!(!formatter.options().use_colors);

        let mut buffer = Vec::new();
        formatter
            .write_report(&create_test_report(), OutputFormat::GitHub, &mut buffer)
            .unwrap();

        let written = String::from_utf8(buffer).unwrap();
        let expected =
            formatter.format_report(&create_test_report(), OutputFormat::GitHub).unwrap();
        assert_eq!(written, expected);
    }

    #[test]
    fn test_output_is_deterministic() {
        let report = create_test_report();
        let formats =
            [OutputFormat::Human, OutputFormat::Json, OutputFormat::Sarif, OutputFormat::GitHub];
        for format in formats {
            assert_eq!(
                plain().format_report(&report, format).unwrap(),
                plain().format_report(&report, format).unwrap()
            );
        }
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(OutputFormat::parse("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("junit"), None);
        assert_eq!(OutputFormat::all_formats().len(), 4);
    }
}
