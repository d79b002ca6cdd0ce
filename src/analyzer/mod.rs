//! Batch analysis orchestrator
//!
//! CDD Principle: Domain Services - Analyzer coordinates discovery, evaluation and aggregation
//! - Path filtering decides which files take part
//! - Each file is decoded and run independently; a bad input never stops the batch
//! - Results are collected in sorted path order so parallel runs stay deterministic

pub mod path_filter;

use crate::config::StyleConfig;
use crate::domain::violations::{CheckReport, EvaluationReport, StyleError, StyleResult};
use crate::registry::Registry;
use crate::runner::Runner;
use crate::source::Source;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

pub use path_filter::PathFilter;

/// Options for customizing analysis behavior
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Whether to check files in parallel
    pub parallel: bool,
    /// Maximum number of files to check
    pub max_files: Option<usize>,
    /// Additional exclude patterns for this run only
    pub exclude_patterns: Vec<String>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self { parallel: true, max_files: None, exclude_patterns: Vec::new() }
    }
}

/// Checks files and directory trees against a registry
pub struct Analyzer {
    config: StyleConfig,
    registry: Registry,
    runner: Runner,
    path_filter: PathFilter,
}

impl Analyzer {
    /// Create an analyzer loading the enabled rules of `config`
    pub fn new(config: StyleConfig) -> StyleResult<Self> {
        Self::with_runner(config, Runner::new())
    }

    /// Create an analyzer with a custom runner
    pub fn with_runner(config: StyleConfig, runner: Runner) -> StyleResult<Self> {
        let registry = Registry::load(config.enabled_rules())?;
        let path_filter = PathFilter::from_config(&config.paths)?;

        tracing::debug!("Registry loaded with {} rules", registry.len());
        Ok(Self { config, registry, runner, path_filter })
    }

    /// Create an analyzer with the built-in rules
    pub fn with_defaults() -> StyleResult<Self> {
        Self::new(StyleConfig::default())
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &StyleConfig {
        &self.config
    }

    /// Check a decoded source
    pub fn analyze_source(&self, source: &Source) -> EvaluationReport {
        self.runner.run_source(&self.registry, source)
    }

    /// Check a single file
    pub fn analyze_file<P: AsRef<Path>>(&self, file_path: P) -> StyleResult<EvaluationReport> {
        let source = Source::read(file_path.as_ref())?;
        tracing::debug!("Checking {} ({} lines)", file_path.as_ref().display(), source.len());
        Ok(self.analyze_source(&source))
    }

    /// Check files and directories, returning one aggregated report
    pub fn analyze_paths<P: AsRef<Path>>(
        &self,
        paths: &[P],
        options: &AnalysisOptions,
    ) -> StyleResult<CheckReport> {
        let mut report = CheckReport::new();

        let mut filter = self.path_filter.clone();
        for pattern in &options.exclude_patterns {
            filter.add_exclude(pattern)?;
        }

        // Keyed by resolved path so one file spelled two ways is checked once
        let mut files = BTreeMap::new();
        let mut insert = |file: &Path| {
            files.entry(dedupe_key(file)).or_insert_with(|| without_cur_dir(file));
        };
        for path in paths {
            let path = path.as_ref();
            if path.is_file() {
                // Named files skip the include list but still honor excludes
                if filter.is_excluded(path) {
                    tracing::debug!("Excluded {}", path.display());
                } else {
                    insert(path);
                }
            } else if path.is_dir() {
                filter.find_files(path).iter().for_each(|file| insert(file));
            } else {
                report.add_failure(path, "path does not exist");
            }
        }

        let mut files: Vec<PathBuf> = files.into_values().collect();
        if let Some(max_files) = options.max_files {
            files.truncate(max_files);
        }

        let outcomes: Vec<StyleResult<EvaluationReport>> = if options.parallel && files.len() > 1 {
            files.par_iter().map(|file| self.analyze_file(file)).collect()
        } else {
            files.iter().map(|file| self.analyze_file(file)).collect()
        };

        for (file, outcome) in files.iter().zip(outcomes) {
            match outcome {
                Ok(file_report) => report.add_report(file_report),
                Err(e) => {
                    tracing::warn!("Failed to check {}: {}", file.display(), e);
                    report.add_failure(file, failure_message(e));
                }
            }
        }

        Ok(report)
    }

    /// Check a directory tree
    pub fn analyze_directory<P: AsRef<Path>>(
        &self,
        root: P,
        options: &AnalysisOptions,
    ) -> StyleResult<CheckReport> {
        self.analyze_paths(&[root.as_ref()], options)
    }
}

fn dedupe_key(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| without_cur_dir(path))
}

/// Drops `.` components, so `./A.java` and `A.java` read the same
fn without_cur_dir(path: &Path) -> PathBuf {
    path.components().filter(|c| *c != Component::CurDir).collect()
}

fn failure_message(error: StyleError) -> String {
    match error {
        StyleError::InputDecode { message, .. } => message,
        other => other.to_string(),
    }
}
