//! Folder tree construction for the project map
//!
//! @module parse/tree

use std::path::Path;

use tracing::debug;

use super::walker::{has_allowed_extension, walk};
use crate::map::types::TreeNode;

/// Build the folder tree under `root`.
///
/// Directories deeper than `max_depth` appear without children. Files are
/// listed only when their extension is allowed, mirroring the collector, and
/// the same ignore rules (including gitignore files) apply.
pub fn build_tree<F>(
    root: &Path,
    max_depth: usize,
    ignore_fn: F,
    allowed_extensions: &[String],
    respect_gitignore: bool,
) -> TreeNode
where
    F: Fn(&str, bool) -> bool + Send + Sync + 'static,
{
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| root.to_string_lossy().to_string());

    // open directories, root first; the walk is depth-first so a node is
    // complete once an entry at its depth or shallower shows up
    let mut open = vec![TreeNode {
        name,
        children: Vec::new(),
        is_leaf: false,
    }];

    for entry in walk(root, ignore_fn, respect_gitignore, Some(max_depth)) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        let depth = entry.depth();
        if depth == 0 {
            continue;
        }

        close_until(&mut open, depth);

        let file_type = match entry.file_type() {
            Some(t) => t,
            None => continue,
        };
        let name = entry.file_name().to_string_lossy().to_string();
        if file_type.is_dir() {
            open.push(TreeNode {
                name,
                children: Vec::new(),
                is_leaf: false,
            });
        } else if file_type.is_file() && has_allowed_extension(entry.path(), allowed_extensions) {
            if let Some(parent) = open.last_mut() {
                parent.children.push(TreeNode::leaf(name));
            }
        }
    }

    close_until(&mut open, 1);
    open.pop().unwrap_or_else(|| TreeNode {
        name: root.to_string_lossy().to_string(),
        children: Vec::new(),
        is_leaf: false,
    })
}

/// Pop open directories until `len` remain, attaching each to its parent
fn close_until(open: &mut Vec<TreeNode>, len: usize) {
    while open.len() > len.max(1) {
        if let Some(done) = open.pop() {
            if let Some(parent) = open.last_mut() {
                parent.children.push(done);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn names(node: &TreeNode) -> Vec<&str> {
        node.children.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_tree_depth_bound() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a/b/c")).unwrap();
        fs::write(root.join("a/top.js"), "").unwrap();
        fs::write(root.join("a/b/c/deep.js"), "").unwrap();
        fs::write(root.join("a/notes.txt"), "").unwrap();

        let exts = vec!["js".to_string()];
        let tree = build_tree(root, 2, |_: &str, _: bool| false, &exts, true);

        let a = &tree.children[0];
        assert_eq!(a.name, "a");
        assert!(!a.is_leaf);
        assert_eq!(names(a), vec!["b", "top.js"]);

        let b = &a.children[0];
        assert!(!b.is_leaf);
        assert!(b.children.is_empty(), "depth 2 must not be descended");
        assert!(a.children[1].is_leaf);
    }

    #[test]
    fn test_tree_siblings_after_deep_subtree() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::create_dir_all(root.join("c")).unwrap();
        fs::write(root.join("a/b/x.js"), "").unwrap();
        fs::write(root.join("c/y.js"), "").unwrap();
        fs::write(root.join("z.js"), "").unwrap();

        let exts = vec!["js".to_string()];
        let tree = build_tree(root, 8, |_: &str, _: bool| false, &exts, true);

        assert_eq!(names(&tree), vec!["a", "c", "z.js"]);
        assert_eq!(names(&tree.children[0]), vec!["b"]);
        assert_eq!(names(&tree.children[0].children[0]), vec!["x.js"]);
        assert_eq!(names(&tree.children[1]), vec!["y.js"]);
    }

    #[test]
    fn test_tree_skips_ignored() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("node_modules/x")).unwrap();
        fs::write(root.join("index.js"), "").unwrap();

        let exts = vec!["js".to_string()];
        let tree = build_tree(root, 4, |rel: &str, _: bool| rel == "node_modules", &exts, true);

        assert_eq!(names(&tree), vec!["index.js"]);
    }

    #[test]
    fn test_tree_honors_nested_gitignore() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/build")).unwrap();
        fs::write(root.join("src/.gitignore"), "build/\n").unwrap();
        fs::write(root.join("src/a.js"), "").unwrap();
        fs::write(root.join("src/build/out.js"), "").unwrap();

        let exts = vec!["js".to_string()];
        let tree = build_tree(root, 4, |_: &str, _: bool| false, &exts, true);
        assert_eq!(names(&tree.children[0]), vec!["a.js"]);

        let tree = build_tree(root, 4, |_: &str, _: bool| false, &exts, false);
        assert_eq!(names(&tree.children[0]), vec!["a.js", "build"]);
    }

    #[test]
    fn test_zero_depth_has_no_children() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.js"), "").unwrap();

        let exts = vec!["js".to_string()];
        let tree = build_tree(dir.path(), 0, |_: &str, _: bool| false, &exts, true);
        assert!(tree.children.is_empty());
        assert!(!tree.is_leaf);
    }
}
