//! Rule definition store
//!
//! Architectural Principle: Repository - the Registry owns every compiled rule for a run
//! - Rule specs are compiled once at load; malformed patterns never reach evaluation
//! - Load order is preserved so reports are reproducible
//! - A loaded Registry is immutable and safe to share across threads

use crate::config::{RuleSpec, RuleType};
use crate::domain::violations::{Severity, StyleError, StyleResult};
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;

/// A compiled rule pattern
#[derive(Debug, Clone)]
pub enum RulePattern {
    /// Regular expression tested per line
    Regex(Regex),
    /// Line longer than the given number of characters
    LineLengthGt(usize),
    /// Line ends with spaces or tabs
    TrailingWhitespace,
    /// Leading indentation contains a tab
    TabIndentation,
}

impl RulePattern {
    /// Compile the pattern of a rule spec
    pub fn compile(spec: &RuleSpec) -> StyleResult<Self> {
        match spec.rule_type {
            RuleType::Regex => {
                let regex = if spec.case_sensitive {
                    Regex::new(&spec.pattern)
                } else {
                    RegexBuilder::new(&spec.pattern).case_insensitive(true).build()
                }
                .map_err(|e| {
                    StyleError::pattern(&spec.id, format!("invalid regex '{}': {e}", spec.pattern))
                })?;
                Ok(Self::Regex(regex))
            }
            RuleType::Predicate => Self::parse_predicate(&spec.pattern, &spec.id),
        }
    }

    /// Parse predicate expression into typed pattern
    fn parse_predicate(pattern: &str, rule_id: &str) -> StyleResult<Self> {
        let pattern = pattern.trim();

        if let Some(param) = pattern.strip_prefix("line_length_gt:") {
            let limit = param.trim().parse::<usize>().map_err(|_| {
                StyleError::pattern(rule_id, format!("invalid line length limit: {param}"))
            })?;
            return Ok(Self::LineLengthGt(limit));
        }

        match pattern {
            "trailing_whitespace" => Ok(Self::TrailingWhitespace),
            "tab_indentation" => Ok(Self::TabIndentation),
            _ => Err(StyleError::pattern(rule_id, format!("unknown predicate: {pattern}"))),
        }
    }

    /// Short description of the pattern for listings
    pub fn describe(&self) -> String {
        match self {
            Self::Regex(regex) => regex.as_str().to_string(),
            Self::LineLengthGt(limit) => format!("line_length_gt:{limit}"),
            Self::TrailingWhitespace => "trailing_whitespace".to_string(),
            Self::TabIndentation => "tab_indentation".to_string(),
        }
    }
}

/// An immutable, compiled rule
#[derive(Debug, Clone)]
pub struct RuleDefinition {
    pub id: String,
    pub category: Option<String>,
    pub description: String,
    pub pattern: RulePattern,
    pub severity: Severity,
}

impl RuleDefinition {
    /// Compile a rule spec
    pub fn from_spec(spec: &RuleSpec) -> StyleResult<Self> {
        Ok(Self {
            id: spec.id.clone(),
            category: spec.category.clone(),
            description: spec.description.clone(),
            pattern: RulePattern::compile(spec)?,
            severity: spec.severity,
        })
    }
}

/// The loaded collection of rules used by a run
#[derive(Debug, Clone, Default)]
pub struct Registry {
    rules: Vec<RuleDefinition>,
    index: HashMap<String, usize>,
}

impl Registry {
    /// Compile and load rule specs in order
    ///
    /// Fails with [`StyleError::DuplicateRule`] when two specs share an id, and with
    /// [`StyleError::Pattern`] when a pattern does not compile.
    pub fn load<'a, I>(specs: I) -> StyleResult<Self>
    where
        I: IntoIterator<Item = &'a RuleSpec>,
    {
        let mut registry = Self::default();

        for spec in specs {
            if registry.index.contains_key(&spec.id) {
                return Err(StyleError::duplicate_rule(&spec.id));
            }
            let definition = RuleDefinition::from_spec(spec)?;
            tracing::debug!(
                "Loaded rule '{}' ({}) with severity {}",
                definition.id,
                definition.pattern.describe(),
                definition.severity
            );
            registry.index.insert(definition.id.clone(), registry.rules.len());
            registry.rules.push(definition);
        }

        Ok(registry)
    }

    /// Look up a rule by id
    pub fn get(&self, id: &str) -> StyleResult<&RuleDefinition> {
        self.index.get(id).map(|&i| &self.rules[i]).ok_or_else(|| StyleError::not_found(id))
    }

    /// All rules in load order
    pub fn all(&self) -> &[RuleDefinition] {
        &self.rules
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Rule ids in load order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
