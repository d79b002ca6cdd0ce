//! Runs a whole registry against one input
//!
//! CDD Principle: Domain Services - the Runner orchestrates evaluation and aggregation
//! - Rules run in registry load order, violations keep (rule order, line order)
//! - A failing rule becomes a synthetic ERROR violation; the report is always complete
//! - No state survives a run, so a Runner can be shared across worker threads

use crate::domain::violations::{EvaluationReport, Violation};
use crate::evaluator::{Evaluator, PatternEvaluator};
use crate::registry::{Registry, RuleDefinition};
use crate::source::Source;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Applies every rule of a registry and aggregates the results
pub struct Runner {
    evaluator: Box<dyn Evaluator>,
}

impl Runner {
    /// Runner using the default pattern evaluator
    pub fn new() -> Self {
        Self::with_evaluator(PatternEvaluator::new())
    }

    /// Runner dispatching through a custom evaluator
    pub fn with_evaluator<E: Evaluator + 'static>(evaluator: E) -> Self {
        Self { evaluator: Box::new(evaluator) }
    }

    /// Evaluate every rule against `lines`
    pub fn run(&self, registry: &Registry, lines: &[String]) -> EvaluationReport {
        let mut report = EvaluationReport::new();

        for rule in registry.all() {
            match self.evaluate_isolated(rule, lines) {
                Ok(violations) => {
                    for violation in violations {
                        report.add_violation(violation);
                    }
                }
                Err(detail) => {
                    tracing::warn!("Evaluation of rule '{}' failed: {}", rule.id, detail);
                    report.add_violation(Violation::evaluator_failure(&rule.id, detail));
                }
            }
        }

        report
    }

    /// Evaluate every rule against a decoded source, attributing the report to its path
    pub fn run_source(&self, registry: &Registry, source: &Source) -> EvaluationReport {
        let mut report = self.run(registry, &source.lines);
        report.source = source.path.clone();
        report
    }

    /// Run one rule, turning errors and panics into a failure description
    fn evaluate_isolated(
        &self,
        rule: &RuleDefinition,
        lines: &[String],
    ) -> Result<Vec<Violation>, String> {
        let outcome =
            panic::catch_unwind(AssertUnwindSafe(|| self.evaluator.evaluate(rule, lines)));

        match outcome {
            Ok(Ok(violations)) => Ok(violations),
            Ok(Err(error)) => Err(error.to_string()),
            Err(payload) => Err(format!("panicked: {}", panic_message(payload.as_ref()))),
        }
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleSpec;
    use crate::domain::violations::{Severity, StyleError, StyleResult};

    fn lines(input: &[&str]) -> Vec<String> {
        input.iter().map(|s| s.to_string()).collect()
    }

    fn todo_fixme_registry() -> Registry {
        let specs = vec![
            RuleSpec::regex("R1", "todo marker", "TODO", Severity::Warn),
            RuleSpec::regex("R2", "fixme marker", "FIXME", Severity::Info),
        ];
        Registry::load(&specs).unwrap()
    }

    /// Delegates to the pattern evaluator except for one rule id
    struct FailingFor {
        rule_id: &'static str,
        panic: bool,
    }

    impl Evaluator for FailingFor {
        fn evaluate(
            &self,
            rule: &RuleDefinition,
            lines: &[String],
        ) -> StyleResult<Vec<Violation>> {
            if rule.id == self.rule_id {
                if self.panic {
                    panic!("pattern blew up");
                }
                return Err(StyleError::pattern(&rule.id, "matcher state corrupted"));
            }
            PatternEvaluator.evaluate(rule, lines)
        }
    }

    #[test]
    fn test_violations_ordered_by_rule_then_line() {
        let registry = todo_fixme_registry();
        let report = Runner::new().run(&registry, &lines(&["TODO: fix", "ok", "FIXME: bug"]));

        let found: Vec<_> = report
            .violations
            .iter()
            .map(|v| (v.rule_id.as_str(), v.line_number))
            .collect();
        assert_eq!(found, vec![("R1", Some(1)), ("R2", Some(3))]);
        assert_eq!(report.counts.warn, 1);
        assert_eq!(report.counts.info, 1);
        assert_eq!(report.counts.error, 0);
    }

    #[test]
    fn test_rule_order_dominates_line_order() {
        let registry = todo_fixme_registry();
        let report = Runner::new().run(&registry, &lines(&["FIXME first", "TODO later"]));

        let found: Vec<_> = report.violations.iter().map(|v| v.rule_id.as_str()).collect();
        assert_eq!(found, vec!["R1", "R2"]);
        assert_eq!(report.violations[0].line_number, Some(2));
    }

    #[test]
    fn test_empty_input_yields_empty_report() {
        let report = Runner::new().run(&todo_fixme_registry(), &[]);

        assert!(report.violations.is_empty());
        assert_eq!(report.counts.total(), 0);
    }

    #[test]
    fn test_failing_rule_becomes_synthetic_violation() {
        let runner = Runner::with_evaluator(FailingFor { rule_id: "R2", panic: false });
        let report = runner.run(&todo_fixme_registry(), &lines(&["TODO: fix", "ok", "FIXME: bug"]));

        assert_eq!(report.violations.len(), 2);
        assert_eq!(report.violations[0].rule_id, "R1");
        assert_eq!(report.violations[0].line_number, Some(1));

        let synthetic = &report.violations[1];
        assert_eq!(synthetic.rule_id, "R2");
        assert_eq!(synthetic.severity, Severity::Error);
        assert_eq!(synthetic.message, "evaluator failure");
        assert!(synthetic.snippet.contains("matcher state corrupted"));
        assert!(report.has_errors());
    }

    #[test]
    fn test_panicking_rule_does_not_abort_run() {
        let specs = vec![
            RuleSpec::regex("R1", "todo", "TODO", Severity::Warn),
            RuleSpec::regex("R2", "fixme", "FIXME", Severity::Warn),
            RuleSpec::regex("R3", "xxx", "XXX", Severity::Warn),
        ];
        let registry = Registry::load(&specs).unwrap();
        let runner = Runner::with_evaluator(FailingFor { rule_id: "R2", panic: true });

        let report = runner.run(&registry, &lines(&["TODO", "XXX"]));

        let found: Vec<_> = report.violations.iter().map(|v| v.rule_id.as_str()).collect();
        assert_eq!(found, vec!["R1", "R2", "R3"]);
        assert!(report.violations[1].is_synthetic());
        assert!(report.violations[1].snippet.contains("pattern blew up"));
    }

    #[test]
    fn test_runs_are_byte_identical() {
        let registry = todo_fixme_registry();
        let input = lines(&["TODO a", "FIXME b", "TODO FIXME c"]);
        let runner = Runner::new();

        let first = serde_json::to_string(&runner.run(&registry, &input)).unwrap();
        let second = serde_json::to_string(&runner.run(&registry, &input)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_run_source_attributes_path() {
        let source = Source::from_bytes("Main.java", b"// TODO\n").unwrap();
        let report = Runner::new().run_source(&todo_fixme_registry(), &source);

        assert_eq!(report.source.as_deref(), Some(std::path::Path::new("Main.java")));
        assert_eq!(report.violations.len(), 1);
    }
}
