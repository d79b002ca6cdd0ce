//! Rule evaluation against source lines
//!
//! Architectural Principle: Service Layer - evaluators turn one rule plus lines into violations
//! - Evaluators hold no mutable state and may run concurrently on distinct inputs
//! - The Evaluator trait is the seam the Runner dispatches through
//! - Pattern matches are translated to violations at this boundary

use crate::domain::violations::{StyleResult, Violation};
use crate::registry::{RuleDefinition, RulePattern};

/// Snippets longer than this many characters are truncated
pub const MAX_SNIPPET_CHARS: usize = 120;

/// Applies a single rule to a sequence of lines
pub trait Evaluator: Send + Sync {
    /// Evaluate `rule` against `lines`, returning violations in line order
    fn evaluate(&self, rule: &RuleDefinition, lines: &[String]) -> StyleResult<Vec<Violation>>;
}

/// Default evaluator: tests each line against the rule's compiled pattern
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternEvaluator;

impl PatternEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for PatternEvaluator {
    fn evaluate(&self, rule: &RuleDefinition, lines: &[String]) -> StyleResult<Vec<Violation>> {
        let violations: Vec<Violation> = lines
            .iter()
            .enumerate()
            .filter_map(|(index, line)| {
                let (start, snippet) = find_match(&rule.pattern, line)?;
                let line_number = u32::try_from(index + 1).unwrap_or(u32::MAX);
                let column = u32::try_from(line[..start].chars().count() + 1).unwrap_or(u32::MAX);

                Some(
                    Violation::new(
                        &rule.id,
                        rule.severity,
                        truncate_snippet(snippet),
                        &rule.description,
                    )
                    .with_position(line_number, column),
                )
            })
            .collect();

        tracing::debug!("Rule '{}' matched {} lines", rule.id, violations.len());
        Ok(violations)
    }
}

/// Byte offset and text of the first match on a line
fn find_match<'a>(pattern: &RulePattern, line: &'a str) -> Option<(usize, &'a str)> {
    match pattern {
        RulePattern::Regex(regex) => regex.find(line).map(|m| (m.start(), m.as_str())),
        RulePattern::LineLengthGt(limit) => {
            line.char_indices().nth(*limit).map(|(start, _)| (start, &line[start..]))
        }
        RulePattern::TrailingWhitespace => {
            let kept = line.trim_end_matches(is_blank).len();
            (kept < line.len()).then(|| (kept, &line[kept..]))
        }
        RulePattern::TabIndentation => {
            let indent = line.len() - line.trim_start_matches(is_blank).len();
            let leading = &line[..indent];
            leading.contains('\t').then_some((0, leading))
        }
    }
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn truncate_snippet(snippet: &str) -> String {
    match snippet.char_indices().nth(MAX_SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}...", &snippet[..cut]),
        None => snippet.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleSpec;
    use crate::domain::violations::Severity;

    fn rule(spec: RuleSpec) -> RuleDefinition {
        RuleDefinition::from_spec(&spec).unwrap()
    }

    fn lines(input: &[&str]) -> Vec<String> {
        input.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_matching_line() {
        let rule = rule(RuleSpec::regex("third", "d", "needle", Severity::Warn));
        let input = lines(&["a", "b", "the needle here", "d", "e"]);

        let violations = PatternEvaluator.evaluate(&rule, &input).unwrap();

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line_number, Some(3));
        assert_eq!(violations[0].column_number, Some(5));
        assert_eq!(violations[0].snippet, "needle");
        assert_eq!(violations[0].severity, Severity::Warn);
        assert_eq!(violations[0].message, "d");
    }

    #[test]
    fn test_snippet_is_match_not_whole_line() {
        let rule = rule(RuleSpec::regex("out", "d", r"System\.out\.println\(", Severity::Error));
        let input = lines(&["        System.out.println(\"hello\");"]);

        let violations = PatternEvaluator.evaluate(&rule, &input).unwrap();
        assert_eq!(violations[0].snippet, "System.out.println(");
        assert_eq!(violations[0].column_number, Some(9));
    }

    #[test]
    fn test_one_violation_per_line() {
        let rule = rule(RuleSpec::regex("todo", "d", "TODO", Severity::Info));
        let input = lines(&["TODO TODO TODO"]);
        assert_eq!(PatternEvaluator.evaluate(&rule, &input).unwrap().len(), 1);
    }

    #[test]
    fn test_line_length_predicate() {
        let rule = rule(RuleSpec::predicate("len", "d", "line_length_gt:5", Severity::Warn));
        let input = lines(&["12345", "123456789", "ééééééé"]);

        let violations = PatternEvaluator.evaluate(&rule, &input).unwrap();
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].line_number, Some(2));
        assert_eq!(violations[0].snippet, "6789");
        assert_eq!(violations[0].column_number, Some(6));
        assert_eq!(violations[1].snippet, "éé");
    }

    #[test]
    fn test_whitespace_predicates() {
        let trailing = rule(RuleSpec::predicate("tw", "d", "trailing_whitespace", Severity::Info));
        let tabs = rule(RuleSpec::predicate("tab", "d", "tab_indentation", Severity::Info));
        let input = lines(&["int a; \t", "    int b;", "\t  int c;", ""]);

        let trailing_hits = PatternEvaluator.evaluate(&trailing, &input).unwrap();
        assert_eq!(trailing_hits.len(), 1);
        assert_eq!(trailing_hits[0].snippet, " \t");
        assert_eq!(trailing_hits[0].column_number, Some(7));

        let tab_hits = PatternEvaluator.evaluate(&tabs, &input).unwrap();
        assert_eq!(tab_hits.len(), 1);
        assert_eq!(tab_hits[0].line_number, Some(3));
        assert_eq!(tab_hits[0].snippet, "\t  ");
    }

    #[test]
    fn test_long_snippets_are_truncated() {
        let rule = rule(RuleSpec::regex("all", "d", ".+", Severity::Info));
        let input = vec!["x".repeat(200)];

        let violations = PatternEvaluator.evaluate(&rule, &input).unwrap();
        assert_eq!(violations[0].snippet.len(), MAX_SNIPPET_CHARS + 3);
        assert!(violations[0].snippet.ends_with("..."));
    }

    #[test]
    fn test_empty_input() {
        let rule = rule(RuleSpec::regex("any", "d", "x", Severity::Info));
        assert!(PatternEvaluator.evaluate(&rule, &[]).unwrap().is_empty());
    }
}
