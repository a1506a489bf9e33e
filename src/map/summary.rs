//! Bounded text rendering of a project map
//!
//! The summary is handed to LLM prompts verbatim, so its size must not grow
//! with the repository: the structure section stops after a line budget and
//! only the first `max_files` records are listed.
//!
//! @module map/summary

use std::fmt::Write;

use super::types::{FileRecord, TreeNode};
use crate::core::config::{SummaryConfig, SUMMARY_MAX_FILES};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryOptions {
    pub max_files: usize,
    pub max_tree_lines: usize,
    pub include_signatures: bool,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            max_files: SUMMARY_MAX_FILES,
            max_tree_lines: 400,
            include_signatures: true,
        }
    }
}

impl From<&SummaryConfig> for SummaryOptions {
    fn from(config: &SummaryConfig) -> Self {
        Self {
            max_files: config.max_files,
            max_tree_lines: config.max_tree_lines,
            include_signatures: config.include_signatures,
        }
    }
}

/// Render structure, signatures and import edges
pub fn render_summary(tree: &TreeNode, files: &[FileRecord], options: &SummaryOptions) -> String {
    let mut out = String::new();

    out.push_str("## Project structure\n");
    let mut lines = Vec::new();
    for child in &tree.children {
        tree_lines(child, 0, &mut lines);
    }
    let total = lines.len();
    for line in lines.iter().take(options.max_tree_lines) {
        out.push_str(line);
        out.push('\n');
    }
    if total > options.max_tree_lines {
        let _ = writeln!(out, "... ({} more entries)", total - options.max_tree_lines);
    }

    let _ = writeln!(out, "\n## Files ({})", files.len());
    for file in files.iter().take(options.max_files) {
        let _ = writeln!(out, "- {}", file.path);
        if options.include_signatures && !file.signatures.is_empty() {
            let _ = writeln!(out, "  signatures: {}", file.signatures.join(", "));
        }
        if !file.imports.is_empty() {
            let _ = writeln!(out, "  imports: {}", file.imports.join(", "));
        }
        if !file.exports.is_empty() {
            let mut exports: Vec<&str> = file.exports.named.iter().map(String::as_str).collect();
            let default;
            if let Some(name) = &file.exports.default {
                default = format!("default={}", name);
                exports.push(&default);
            }
            let _ = writeln!(out, "  exports: {}", exports.join(", "));
        }
    }
    if files.len() > options.max_files {
        let _ = writeln!(out, "... and {} more files", files.len() - options.max_files);
    }

    out
}

fn tree_lines(node: &TreeNode, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    if node.is_leaf {
        lines.push(format!("{}{}", indent, node.name));
        return;
    }
    lines.push(format!("{}{}/", indent, node.name));
    for child in &node.children {
        tree_lines(child, depth + 1, lines);
    }
}
