//! Path filtering using include/exclude glob patterns
//!
//! Architectural Principle: Service Layer - PathFilter owns the rules for which files are checked
//! - Patterns containing '/' match the path relative to the walk root
//! - Patterns without '/' match the file name only
//! - A file is checked when some include pattern matches and no exclude pattern does
//! - Exclude patterns ending in `/**` prune whole directories during the walk

use crate::config::PathConfig;
use crate::domain::violations::{StyleError, StyleResult};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Decides which files take part in a check
#[derive(Debug, Clone)]
pub struct PathFilter {
    include: Vec<FilterPattern>,
    exclude: Vec<FilterPattern>,
}

/// A single compiled glob with its source text
#[derive(Debug, Clone)]
struct FilterPattern {
    pattern: glob::Pattern,
    /// `dir` of a `dir/**` pattern, matched against directory paths
    dir_pattern: Option<glob::Pattern>,
    original: String,
}

impl FilterPattern {
    fn new(original: &str) -> StyleResult<Self> {
        let compile = |text: &str| {
            glob::Pattern::new(text).map_err(|e| {
                StyleError::config(format!("Invalid path pattern '{original}': {e}"))
            })
        };
        let dir_pattern = match original.strip_suffix("/**") {
            Some(dir) if !dir.is_empty() => Some(compile(dir)?),
            _ => None,
        };

        Ok(Self { pattern: compile(original)?, dir_pattern, original: original.to_string() })
    }

    fn matches(&self, path: &Path) -> bool {
        if self.original.contains('/') {
            self.pattern.matches(&slash_path(path))
        } else {
            path.file_name()
                .map(|name| self.pattern.matches(&name.to_string_lossy()))
                .unwrap_or(false)
        }
    }

    fn matches_dir(&self, dir: &Path) -> bool {
        self.dir_pattern.as_ref().is_some_and(|p| p.matches(&slash_path(dir)))
    }
}

fn slash_path(path: &Path) -> String {
    let path_str = path.to_string_lossy().replace('\\', "/");
    path_str.trim_start_matches("./").to_string()
}

impl PathFilter {
    /// Create a filter from include and exclude glob lists
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> StyleResult<Self> {
        let compile_all = |patterns: &[S]| {
            patterns.iter().map(|p| FilterPattern::new(p.as_ref())).collect::<StyleResult<Vec<_>>>()
        };
        Ok(Self { include: compile_all(include)?, exclude: compile_all(exclude)? })
    }

    /// Create a filter from the `paths` section of a config
    pub fn from_config(config: &PathConfig) -> StyleResult<Self> {
        Self::new(&config.include, &config.exclude)
    }

    /// Add an exclude pattern
    pub fn add_exclude(&mut self, pattern: &str) -> StyleResult<()> {
        self.exclude.push(FilterPattern::new(pattern)?);
        Ok(())
    }

    /// Whether any exclude pattern matches
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.exclude.iter().any(|p| p.matches(path))
    }

    /// Whether a discovered file should be checked
    pub fn should_check(&self, relative: &Path) -> bool {
        self.include.iter().any(|p| p.matches(relative)) && !self.is_excluded(relative)
    }

    /// Whether a directory is excluded as a whole
    pub fn is_excluded_dir(&self, relative: &Path) -> bool {
        self.exclude.iter().any(|p| p.matches_dir(relative))
    }

    /// Files under `root` that should be checked, sorted
    pub fn find_files<P: AsRef<Path>>(&self, root: P) -> Vec<PathBuf> {
        let root = root.as_ref();
        let mut files = Vec::new();

        let walker = WalkDir::new(root).follow_links(false).into_iter().filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            let pruned = self.is_excluded_dir(relative);
            if pruned {
                tracing::debug!("Skipping excluded directory {}", entry.path().display());
            }
            !pruned
        });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let relative = path.strip_prefix(root).unwrap_or(path);
            if self.should_check(relative) {
                files.push(path.to_path_buf());
            } else {
                tracing::debug!("Filtered out {}", path.display());
            }
        }

        files.sort();
        files
    }
}
