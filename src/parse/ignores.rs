//! Ignore Engine
//!
//! Decides whether a root-relative path is excluded from scanning by the
//! built-in exclusion set (VCS, dependency and build directories, projmap's
//! own cache file) or a caller-supplied pattern. `.gitignore` semantics are
//! applied by the walker, see [`crate::parse::collect`].
//!
//! Patterns are `glob` patterns matched case-insensitively against every
//! path segment and against the whole relative path.
//!
//! @module parse/ignores

use glob::{MatchOptions, Pattern};
use tracing::debug;

use crate::core::config::CACHE_FILE_NAME;

/// Built-in exclusions, always applied
pub const DEFAULT_IGNORES: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    "node_modules",
    "bower_components",
    "dist",
    "build",
    "target",
    "coverage",
    ".next",
    "__pycache__",
    ".venv",
    "*.min.js",
    "*.map",
    CACHE_FILE_NAME,
];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Compiled ignore patterns
#[derive(Debug, Clone)]
pub struct IgnoreEngine {
    patterns: Vec<Pattern>,
}

impl IgnoreEngine {
    /// Built-in exclusions plus `extra` patterns
    pub fn new(extra: &[String]) -> Self {
        let patterns = DEFAULT_IGNORES
            .iter()
            .copied()
            .chain(extra.iter().map(String::as_str))
            .filter_map(compile)
            .collect();

        Self { patterns }
    }

    /// Check a root-relative, forward-slash path (files and directories
    /// match alike)
    pub fn is_ignored(&self, relative_path: &str, _is_dir: bool) -> bool {
        if relative_path.is_empty() {
            return false;
        }
        matches_any(&self.patterns, relative_path)
    }
}

/// Pure pattern check: built-in exclusions plus `patterns`
pub fn is_ignored(relative_path: &str, patterns: &[String]) -> bool {
    IgnoreEngine::new(patterns).is_ignored(relative_path, false)
}

fn matches_any(patterns: &[Pattern], relative_path: &str) -> bool {
    let normalized = relative_path.replace('\\', "/");
    let normalized = normalized.trim_matches('/');

    patterns.iter().any(|pattern| {
        pattern.matches_with(normalized, MATCH_OPTIONS)
            || normalized
                .split('/')
                .any(|segment| pattern.matches_with(segment, MATCH_OPTIONS))
    })
}

fn compile(pattern: &str) -> Option<Pattern> {
    let trimmed = pattern.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    match Pattern::new(trimmed) {
        Ok(p) => Some(p),
        Err(e) => {
            debug!(pattern = trimmed, error = %e, "Skipping invalid ignore pattern");
            None
        }
    }
}
