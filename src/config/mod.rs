//! Configuration loading and management for Java Style Guard
//!
//! Architecture: Anti-Corruption Layer - Configuration translates external YAML formats
//! - Raw YAML rule records are validated before they reach the registry
//! - The built-in Java convention rule set lives here, not in infrastructure
//! - Configuration acts as the repository for rule specifications and path filters

use crate::domain::violations::{Severity, StyleError, StyleResult};
use crate::registry::RulePattern;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Configuration versions this build understands
pub const SUPPORTED_VERSIONS: &[&str] = &["1.0"];

/// File names probed in the working directory when no config is given
pub const DEFAULT_CONFIG_FILES: &[&str] =
    &["java_style.yaml", "java_style.yml", ".java_style.yaml"];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleConfig {
    /// Configuration format version
    pub version: String,
    /// Path filtering configuration
    #[serde(default)]
    pub paths: PathConfig,
    /// Rule specifications in load order
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

/// Path filtering configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathConfig {
    /// Glob patterns a discovered file must match
    #[serde(default = "default_include")]
    pub include: Vec<String>,
    /// Glob patterns that exclude a file
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            include: default_include(),
            exclude: vec![
                "**/target/**".to_string(),
                "**/build/**".to_string(),
                "**/.git/**".to_string(),
                "**/generated/**".to_string(),
            ],
        }
    }
}

/// Declarative rule record as written in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Unique identifier for this rule
    pub id: String,
    /// Optional grouping (naming, formatting, logging, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Human-readable description, used as the violation message
    pub description: String,
    /// How `pattern` is interpreted
    #[serde(rename = "type", default)]
    pub rule_type: RuleType,
    /// Regular expression or predicate expression
    pub pattern: String,
    /// Severity assigned to violations of this rule
    pub severity: Severity,
    /// Whether this rule is loaded
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Case sensitivity for regex patterns
    #[serde(default = "default_true")]
    pub case_sensitive: bool,
}

impl RuleSpec {
    /// Regex rule with default flags
    pub fn regex(
        id: impl Into<String>,
        description: impl Into<String>,
        pattern: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            id: id.into(),
            category: None,
            description: description.into(),
            rule_type: RuleType::Regex,
            pattern: pattern.into(),
            severity,
            enabled: true,
            case_sensitive: true,
        }
    }

    /// Predicate rule (`line_length_gt:N`, `trailing_whitespace`, `tab_indentation`)
    pub fn predicate(
        id: impl Into<String>,
        description: impl Into<String>,
        pattern: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self { rule_type: RuleType::Predicate, ..Self::regex(id, description, pattern, severity) }
    }

    /// Set the category
    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Make a regex rule case-insensitive
    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self
    }

    /// Disable the rule
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Types of pattern matching
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    /// Regular expression tested against each line
    #[default]
    Regex,
    /// Built-in line predicate
    Predicate,
}

impl StyleConfig {
    /// Load configuration from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> StyleResult<Self> {
        let contents = fs::read_to_string(&path).map_err(|e| {
            StyleError::config(format!(
                "Failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: Self = serde_yaml::from_str(&contents).map_err(|e| {
            StyleError::config(format!(
                "Failed to parse config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        config.validate()?;
        tracing::debug!(
            "Loaded {} rules from '{}'",
            config.rules.len(),
            path.as_ref().display()
        );
        Ok(config)
    }

    /// Load configuration from string content
    pub fn load_from_str(content: &str) -> StyleResult<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| StyleError::config(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Load the first default config file present in `dir`, else the built-in defaults
    pub fn discover<P: AsRef<Path>>(dir: P) -> StyleResult<Self> {
        for name in DEFAULT_CONFIG_FILES {
            let candidate = dir.as_ref().join(name);
            if candidate.is_file() {
                return Self::load_from_file(candidate);
            }
        }
        Ok(Self::with_defaults())
    }

    /// Default configuration with the built-in Java convention rules
    pub fn with_defaults() -> Self {
        Self {
            version: "1.0".to_string(),
            paths: PathConfig::default(),
            rules: default_rules(),
        }
    }

    /// Validate the configuration for consistency and correctness
    pub fn validate(&self) -> StyleResult<()> {
        if !SUPPORTED_VERSIONS.contains(&self.version.as_str()) {
            return Err(StyleError::config(format!(
                "Unsupported configuration version: {}. Supported versions: {}",
                self.version,
                SUPPORTED_VERSIONS.join(", ")
            )));
        }

        let mut seen = HashSet::new();
        for rule in &self.rules {
            if !seen.insert(rule.id.as_str()) {
                return Err(StyleError::duplicate_rule(&rule.id));
            }
            RulePattern::compile(rule)?;
        }

        for pattern in self.paths.include.iter().chain(&self.paths.exclude) {
            glob::Pattern::new(pattern).map_err(|e| {
                StyleError::config(format!("Invalid path pattern '{pattern}': {e}"))
            })?;
        }

        Ok(())
    }

    /// Enabled rules in declaration order
    pub fn enabled_rules(&self) -> impl Iterator<Item = &RuleSpec> {
        self.rules.iter().filter(|rule| rule.enabled)
    }

    /// Distinct categories in first-seen order
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.rules
            .iter()
            .filter_map(|r| r.category.as_deref())
            .filter(|c| seen.insert(*c))
            .collect()
    }

    /// Convert to YAML for writing a starter config
    pub fn to_yaml(&self) -> StyleResult<String> {
        serde_yaml::to_string(self)
            .map_err(|e| StyleError::config(format!("Failed to serialize config: {e}")))
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn default_true() -> bool {
    true
}

fn default_include() -> Vec<String> {
    vec!["**/*.java".to_string()]
}

/// Built-in rules encoding the Java coding conventions
fn default_rules() -> Vec<RuleSpec> {
    vec![
        // Naming
        RuleSpec::regex(
            "naming.type-upper-camel",
            "Class, interface and enum names use UpperCamelCase",
            concat!(
                r"^\s*((public|protected|private|abstract|static|final)\s+)*",
                r"(class|interface|enum)\s+[a-z_$][\w$]*"
            ),
            Severity::Error,
        )
        .in_category("naming"),
        RuleSpec::regex(
            "naming.package-lowercase",
            "Package names are all lowercase",
            r"^\s*package\s+[\w.]*[A-Z][\w.]*\s*;",
            Severity::Error,
        )
        .in_category("naming"),
        RuleSpec::regex(
            "naming.constant-upper-snake",
            "Constants (static final fields) use UPPER_SNAKE_CASE",
            r"\bstatic\s+final\s+[\w<>\[\], ?]+?\s+[a-z][a-z0-9]*[A-Z]\w*\s*=",
            Severity::Warn,
        )
        .in_category("naming"),
        RuleSpec::regex(
            "naming.boolean-is-prefix",
            "Boolean fields are not prefixed with 'is'; serializers strip it",
            r"^\s*(private|protected|public)\s+boolean\s+is[A-Z]\w*\s*[;=]",
            Severity::Info,
        )
        .in_category("naming"),
        // Formatting
        RuleSpec::predicate(
            "formatting.line-length",
            "Lines are at most 120 characters",
            "line_length_gt:120",
            Severity::Warn,
        )
        .in_category("formatting"),
        RuleSpec::predicate(
            "formatting.tab-indentation",
            "Indent with 4 spaces, never tabs",
            "tab_indentation",
            Severity::Warn,
        )
        .in_category("formatting"),
        RuleSpec::predicate(
            "formatting.trailing-whitespace",
            "Lines carry no trailing whitespace",
            "trailing_whitespace",
            Severity::Info,
        )
        .in_category("formatting"),
        RuleSpec::regex(
            "formatting.brace-own-line",
            "Opening braces stay on the line of the declaration",
            r"^\s*\{\s*$",
            Severity::Info,
        )
        .in_category("formatting"),
        // Imports and constants
        RuleSpec::regex(
            "imports.wildcard",
            "Import classes explicitly, not with '*'",
            r"^\s*import\s+(static\s+)?[\w.]+\.\*\s*;",
            Severity::Warn,
        )
        .in_category("imports"),
        RuleSpec::regex(
            "constants.long-suffix-uppercase",
            "Long literals use an uppercase 'L' suffix",
            r"\b\d+l\b",
            Severity::Warn,
        )
        .in_category("constants"),
        // Comments
        RuleSpec::regex(
            "comments.todo-marker",
            "Unresolved TODO/FIXME marker",
            r"\b(TODO|FIXME|XXX)\b",
            Severity::Info,
        )
        .in_category("comments"),
        // Logging
        RuleSpec::regex(
            "logging.system-out",
            "Use a logger instead of System.out / System.err",
            r"\bSystem\.(out|err)\.print(ln|f)?\s*\(",
            Severity::Error,
        )
        .in_category("logging"),
        RuleSpec::regex(
            "logging.print-stack-trace",
            "Log exceptions through the logger instead of printStackTrace()",
            r"\.printStackTrace\s*\(\s*\)",
            Severity::Error,
        )
        .in_category("logging"),
        RuleSpec::regex(
            "logging.string-concatenation",
            "Use '{}' placeholders instead of string concatenation in log calls",
            r#"\b(log|logger)\.(trace|debug|info|warn|error)\s*\(\s*"[^"]*"\s*\+"#,
            Severity::Warn,
        )
        .in_category("logging")
        .case_insensitive(),
        // Exceptions
        RuleSpec::regex(
            "exceptions.empty-catch",
            "Catch blocks are never empty",
            r"catch\s*\([^)]*\)\s*\{\s*\}",
            Severity::Error,
        )
        .in_category("exceptions"),
        RuleSpec::regex(
            "exceptions.catch-throwable",
            "Do not catch Throwable",
            r"catch\s*\(\s*(final\s+)?Throwable\b",
            Severity::Warn,
        )
        .in_category("exceptions"),
        // Unit testing
        RuleSpec::regex(
            "testing.disabled-test",
            "Tests are fixed or deleted, not disabled",
            r"@(Ignore|Disabled)\b",
            Severity::Warn,
        )
        .in_category("testing"),
    ]
}

/// Configuration builder for programmatic construction
pub struct ConfigBuilder {
    config: StyleConfig,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self { config: StyleConfig::default() }
    }

    /// Create a builder with no rules
    pub fn empty() -> Self {
        Self { config: StyleConfig { rules: Vec::new(), ..StyleConfig::default() } }
    }

    /// Add an include pattern
    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.config.paths.include.push(pattern.into());
        self
    }

    /// Add an exclude pattern
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.config.paths.exclude.push(pattern.into());
        self
    }

    /// Append a rule
    pub fn add_rule(mut self, rule: RuleSpec) -> Self {
        self.config.rules.push(rule);
        self
    }

    /// Build the final configuration
    pub fn build(self) -> StyleResult<StyleConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
