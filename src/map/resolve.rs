//! Path Resolver
//!
//! Maps a relative import specifier found in one file to the file record it
//! designates. Strategies are tried in a fixed order, first match wins:
//!
//! 1. exact joined path
//! 2. joined path + each source extension
//! 3. joined path + `/index.<ext>` (then Python's `/__init__.py`)
//! 4. Python importers only: the `__init__.py` of the target's package, for
//!    `from . import NAME` where `NAME` is defined in the package itself
//! 5. basename heuristic, see [`resolve_by_basename`]
//!
//! Steps 1-4 are deterministic. Step 5 trades precision for recall: it can
//! pick a wrong file when several share a name, so consumers must treat a
//! [`Strategy::Basename`] result as a guess.
//!
//! @module map/resolve

use std::collections::BTreeMap;

use serde::Serialize;

use super::types::{FileRecord, ProjectMap};

/// Extensions tried when a specifier omits one, in priority order
pub const RESOLVE_EXTENSIONS: &[&str] = &[
    "js", "jsx", "ts", "tsx", "mjs", "cjs", "mts", "cts", "vue", "svelte", "py", "pyi", "rs", "go",
];

// =============================================================================
// FILE INDEX
// =============================================================================

/// Ordered `path -> FileRecord` lookup over one map
#[derive(Debug, Clone, Default)]
pub struct FileIndex<'a> {
    by_path: BTreeMap<&'a str, &'a FileRecord>,
}

impl<'a> FileIndex<'a> {
    pub fn new(files: &'a [FileRecord]) -> Self {
        Self {
            by_path: files.iter().map(|f| (f.path.as_str(), f)).collect(),
        }
    }

    pub fn from_map(map: &'a ProjectMap) -> Self {
        Self::new(&map.files)
    }

    pub fn get(&self, path: &str) -> Option<&'a FileRecord> {
        self.by_path.get(path).copied()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.by_path.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.by_path.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Which step produced a resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    Exact,
    Extension,
    IndexFile,
    PackageInit,
    Basename,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub path: String,
    pub strategy: Strategy,
}

/// Resolve `specifier` as imported from `from`
pub fn resolve(from: &str, specifier: &str, index: &FileIndex<'_>) -> Option<String> {
    resolve_detailed(from, specifier, index).map(|r| r.path)
}

/// [`resolve`], also reporting the strategy that matched
pub fn resolve_detailed(from: &str, specifier: &str, index: &FileIndex<'_>) -> Option<Resolved> {
    if !specifier.starts_with('.') {
        return None;
    }

    let joined = join_specifier(from, specifier)?;
    let found = |path: String, strategy| index.contains(&path).then_some(Resolved { path, strategy });

    if !joined.is_empty() {
        if let Some(hit) = found(joined.clone(), Strategy::Exact) {
            return Some(hit);
        }

        for ext in RESOLVE_EXTENSIONS {
            if let Some(hit) = found(format!("{}.{}", joined, ext), Strategy::Extension) {
                return Some(hit);
            }
        }
    }

    let base = if joined.is_empty() {
        String::new()
    } else {
        format!("{}/", joined)
    };
    let index_files = RESOLVE_EXTENSIONS
        .iter()
        .map(|ext| format!("{}index.{}", base, ext))
        .chain(std::iter::once(format!("{}__init__.py", base)));
    for candidate in index_files {
        if let Some(hit) = found(candidate, Strategy::IndexFile) {
            return Some(hit);
        }
    }

    if is_python(from) {
        let package = parent_dir(&joined);
        let init = if package.is_empty() {
            "__init__.py".to_string()
        } else {
            format!("{}/__init__.py", package)
        };
        if let Some(hit) = found(init, Strategy::PackageInit) {
            return Some(hit);
        }
    }

    resolve_by_basename(from, &joined, index).map(|path| Resolved {
        path,
        strategy: Strategy::Basename,
    })
}

/// Heuristic fallback: a file whose stem equals the target's last segment.
/// Prefers one in the importing file's directory, then one in a directory
/// that suffix-matches the target directory, then the first by path.
/// Never the importing file itself.
pub fn resolve_by_basename(from: &str, joined: &str, index: &FileIndex<'_>) -> Option<String> {
    let wanted = file_name(joined);
    if wanted.is_empty() {
        return None;
    }
    let from_dir = parent_dir(from);
    let target_dir = parent_dir(joined);

    let candidates: Vec<&str> = index
        .paths()
        .filter(|path| *path != from)
        .filter(|path| {
            let name = file_name(path);
            name == wanted || stem(name) == wanted
        })
        .collect();

    candidates
        .iter()
        .find(|path| parent_dir(path) == from_dir)
        .or_else(|| {
            candidates
                .iter()
                .find(|path| dir_suffix_match(parent_dir(path), target_dir))
        })
        .or_else(|| candidates.first())
        .map(|path| path.to_string())
}

// =============================================================================
// PATH HELPERS
// =============================================================================

/// Directory of `from` joined with `specifier`, `.`/`..` collapsed.
/// `None` when the result would leave the root.
pub fn join_specifier(from: &str, specifier: &str) -> Option<String> {
    let dir = parent_dir(from);
    if dir.is_empty() {
        normalize_path(specifier)
    } else {
        normalize_path(&format!("{}/{}", dir, specifier))
    }
}

/// Collapse `.`, `..` and empty segments of a forward-slash path
pub fn normalize_path(path: &str) -> Option<String> {
    let path = path.replace('\\', "/");
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            s => parts.push(s),
        }
    }
    Some(parts.join("/"))
}

/// Normalize a caller-supplied path: forward slashes, no leading `./`
pub fn normalize_query_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let mut trimmed = path.as_str();
    while let Some(rest) = trimmed.strip_prefix("./") {
        trimmed = rest;
    }
    trimmed.to_string()
}

fn is_python(path: &str) -> bool {
    path.ends_with(".py") || path.ends_with(".pyi")
}

fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

fn file_name(path: &str) -> &str {
    path.rsplit_once('/').map(|(_, name)| name).unwrap_or(path)
}

fn stem(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

fn dir_suffix_match(dir: &str, target: &str) -> bool {
    if dir == target {
        return true;
    }
    if dir.is_empty() || target.is_empty() {
        return false;
    }
    dir.ends_with(&format!("/{}", target)) || target.ends_with(&format!("/{}", dir))
}

// =============================================================================
// TESTS
// =============================================================================
