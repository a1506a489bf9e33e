//! Project Map data model
//!
//! @module map/types

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One filesystem entry under the scanned root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub name: String,
    #[serde(default)]
    pub children: Vec<TreeNode>,
    pub is_leaf: bool,
}

impl TreeNode {
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            is_leaf: true,
        }
    }

    /// Number of entries in this subtree, including self
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::count).sum::<usize>()
    }
}

/// Exported names of one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exports {
    pub named: BTreeSet<String>,
    pub default: Option<String>,
}

impl Exports {
    pub fn is_empty(&self) -> bool {
        self.named.is_empty() && self.default.is_none()
    }
}

/// Structural data extracted from one scanned file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Root-relative, forward-slash path; unique within a map
    pub path: String,
    pub signatures: Vec<String>,
    /// Relative import specifiers only
    pub imports: Vec<String>,
    pub exports: Exports,
}

/// The aggregate artifact: folder tree, per-file records and a bounded
/// text rendering of both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMap {
    pub tree: TreeNode,
    pub files: Vec<FileRecord>,
    pub summary: String,
}

impl ProjectMap {
    pub fn file(&self, path: &str) -> Option<&FileRecord> {
        self.files.iter().find(|f| f.path == path)
    }
}

/// Persisted cache document, one per scanned root
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub hash: String,
    pub map: ProjectMap,
    /// Unix milliseconds at save time
    pub timestamp: i64,
    pub format_version: String,
}

/// Statistics about one build
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildStats {
    pub files: usize,
    pub signatures: usize,
    pub imports: usize,
    pub cache_hit: bool,
    pub elapsed_ms: f64,
}

impl BuildStats {
    pub fn from_map(map: &ProjectMap, cache_hit: bool, elapsed_ms: f64) -> Self {
        Self {
            files: map.files.len(),
            signatures: map.files.iter().map(|f| f.signatures.len()).sum(),
            imports: map.files.iter().map(|f| f.imports.len()).sum(),
            cache_hit,
            elapsed_ms,
        }
    }
}

impl std::fmt::Display for BuildStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} files, {} signatures, {} imports{} ({:.1}ms)",
            self.files,
            self.signatures,
            self.imports,
            if self.cache_hit { ", cached" } else { "" },
            self.elapsed_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_serialization() {
        let map = ProjectMap {
            tree: TreeNode {
                name: "root".into(),
                children: vec![TreeNode::leaf("a.js")],
                is_leaf: false,
            },
            files: vec![FileRecord {
                path: "a.js".into(),
                signatures: vec!["a".into()],
                imports: vec![],
                exports: Exports {
                    named: ["a".to_string()].into_iter().collect(),
                    default: None,
                },
            }],
            summary: String::new(),
        };

        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json["tree"]["isLeaf"], false);
        assert_eq!(json["tree"]["children"][0]["isLeaf"], true);
        assert_eq!(json["files"][0]["exports"]["named"][0], "a");
        assert!(json["files"][0]["exports"]["default"].is_null());
        assert_eq!(map.tree.count(), 2);
    }
}
