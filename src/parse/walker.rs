//! File Collector
//!
//! Depth-first, name-sorted walk over a scanned root. Gitignore semantics
//! (nested `.gitignore` files, `.git/info/exclude`, the global excludes file)
//! come from `ignore::WalkBuilder`; built-in and caller patterns are applied
//! through the `ignore_fn` filter, which prunes whole directories.
//!
//! @module parse/walker

use std::path::{Path, PathBuf};

use ignore::{Walk, WalkBuilder};
use tracing::debug;

/// A file selected for scanning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedFile {
    pub absolute_path: PathBuf,
    /// Root-relative, forward-slash separated
    pub relative_path: String,
}

/// Configured walk shared by the collector and the tree builder.
///
/// `ignore_fn` receives the root-relative path and whether it is a directory;
/// ignored directories are not descended into.
pub(crate) fn walk<F>(root: &Path, ignore_fn: F, respect_gitignore: bool, max_depth: Option<usize>) -> Walk
where
    F: Fn(&str, bool) -> bool + Send + Sync + 'static,
{
    let base = root.to_path_buf();
    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(false)
        .ignore(false)
        .parents(respect_gitignore)
        .git_ignore(respect_gitignore)
        .git_global(respect_gitignore)
        .git_exclude(respect_gitignore)
        .require_git(false)
        .follow_links(false)
        .max_depth(max_depth)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            if entry.depth() == 0 {
                return true;
            }
            let is_dir = entry.file_type().map_or(false, |t| t.is_dir());
            !ignore_fn(&relative_path(&base, entry.path()), is_dir)
        });
    builder.build()
}

/// Walk `root` and return every allowed, non-ignored file in walk order.
///
/// Entries that cannot be read (including whole directories) are skipped
/// with a debug log.
pub fn collect<F>(
    root: &Path,
    ignore_fn: F,
    allowed_extensions: &[String],
    respect_gitignore: bool,
) -> Vec<CollectedFile>
where
    F: Fn(&str, bool) -> bool + Send + Sync + 'static,
{
    let mut files = Vec::new();

    for entry in walk(root, ignore_fn, respect_gitignore, None) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().map_or(false, |t| t.is_file()) {
            continue;
        }

        let path = entry.path();
        if !has_allowed_extension(path, allowed_extensions) {
            continue;
        }

        files.push(CollectedFile {
            absolute_path: path.to_path_buf(),
            relative_path: relative_path(root, path),
        });
    }

    files
}

/// Root-relative path with forward slashes
pub fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Case-insensitive extension check; entries may carry a leading dot
pub fn has_allowed_extension(path: &Path, allowed_extensions: &[String]) -> bool {
    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(e) => e.to_lowercase(),
        None => return false,
    };
    allowed_extensions
        .iter()
        .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(&ext))
}
