//! Graph Query Layer
//!
//! Read-only views over the resolved import graph of a [`ProjectMap`]:
//! impact (`affected`), bounded context (`pinned_context`), import
//! verification (`verify`) and unimported exports (`dead_exports`).
//!
//! @module map/query

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use serde::Serialize;

use super::resolve::{normalize_query_path, resolve, FileIndex};
use super::types::{FileRecord, ProjectMap};

// =============================================================================
// RESULT TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Affected {
    /// Files the focus file imports
    pub dependencies: Vec<String>,
    /// Files importing the focus file
    pub dependents: Vec<String>,
    /// Focus, dependencies and dependents, deduplicated and sorted
    pub all: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PinnedContext {
    pub focus: String,
    pub files: Vec<FileRecord>,
    pub dependencies: Vec<String>,
    pub dependents: Vec<String>,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BrokenReason {
    /// No strategy found a target
    Unresolved,
    /// Resolved to a path that is not in the map
    MissingTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokenImport {
    pub from: String,
    pub import: String,
    pub reason: BrokenReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    pub ok: bool,
    pub broken_imports: Vec<BrokenImport>,
    /// Relative import specifiers checked across all files
    pub total_checked: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadExport {
    pub path: String,
    pub name: String,
}

// =============================================================================
// IMPORT GRAPH
// =============================================================================

/// Every import edge of a map, resolved once
pub struct ImportGraph<'a> {
    map: &'a ProjectMap,
    index: FileIndex<'a>,
    forward: BTreeMap<String, BTreeSet<String>>,
    reverse: BTreeMap<String, BTreeSet<String>>,
    broken: Vec<BrokenImport>,
    checked: usize,
}

impl<'a> ImportGraph<'a> {
    pub fn new(map: &'a ProjectMap) -> Self {
        let index = FileIndex::from_map(map);
        let mut forward: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut reverse: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut broken = Vec::new();
        let mut checked = 0;

        for file in &map.files {
            for specifier in file.imports.iter().filter(|s| s.starts_with('.')) {
                checked += 1;
                let reason = match resolve(&file.path, specifier, &index) {
                    Some(target) if index.contains(&target) => {
                        reverse.entry(target.clone()).or_default().insert(file.path.clone());
                        forward.entry(file.path.clone()).or_default().insert(target);
                        continue;
                    }
                    Some(_) => BrokenReason::MissingTarget,
                    None => BrokenReason::Unresolved,
                };
                broken.push(BrokenImport {
                    from: file.path.clone(),
                    import: specifier.clone(),
                    reason,
                });
            }
        }

        Self {
            map,
            index,
            forward,
            reverse,
            broken,
            checked,
        }
    }

    pub fn dependencies(&self, path: &str) -> Vec<String> {
        self.forward.get(path).map(|s| s.iter().cloned().collect()).unwrap_or_default()
    }

    pub fn dependents(&self, path: &str) -> Vec<String> {
        self.reverse.get(path).map(|s| s.iter().cloned().collect()).unwrap_or_default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains(path)
    }

    /// Direct impact of changing `path`
    pub fn affected(&self, path: &str) -> Affected {
        let focus = normalize_query_path(path);
        let dependencies = self.dependencies(&focus);
        let dependents = self.dependents(&focus);

        let mut all: BTreeSet<String> = BTreeSet::new();
        all.insert(focus);
        all.extend(dependencies.iter().cloned());
        all.extend(dependents.iter().cloned());

        Affected {
            dependencies,
            dependents,
            all: all.into_iter().collect(),
        }
    }

    /// Records relevant to `path`, widened by one hop when `levels >= 1`
    pub fn pinned_context(&self, path: &str, levels: usize) -> PinnedContext {
        let focus = normalize_query_path(path);
        let direct = self.affected(&focus);

        let mut selected: BTreeSet<String> = direct.all.iter().cloned().collect();
        if levels >= 1 {
            for neighbour in direct.dependencies.iter().chain(&direct.dependents) {
                selected.extend(self.affected(neighbour).all);
            }
        }

        let files = self
            .map
            .files
            .iter()
            .filter(|f| selected.contains(&f.path))
            .cloned()
            .collect();

        let summary = context_summary(&focus, &direct);
        PinnedContext {
            focus,
            files,
            dependencies: direct.dependencies,
            dependents: direct.dependents,
            summary,
        }
    }

    pub fn verify(&self) -> Verification {
        Verification {
            ok: self.broken.is_empty(),
            broken_imports: self.broken.clone(),
            total_checked: self.checked,
        }
    }

    /// Exports of files no other file imports, sorted by path then name
    pub fn dead_exports(&self) -> Vec<DeadExport> {
        let mut dead = Vec::new();
        for file in &self.map.files {
            if self.reverse.contains_key(&file.path) {
                continue;
            }
            for name in &file.exports.named {
                dead.push(DeadExport {
                    path: file.path.clone(),
                    name: name.clone(),
                });
            }
            if file.exports.default.is_some() {
                dead.push(DeadExport {
                    path: file.path.clone(),
                    name: "default".to_string(),
                });
            }
        }
        dead.sort_by(|a, b| (&a.path, &a.name).cmp(&(&b.path, &b.name)));
        dead
    }
}

fn context_summary(focus: &str, direct: &Affected) -> String {
    let list = |paths: &[String]| {
        if paths.is_empty() {
            "(none)".to_string()
        } else {
            paths.join(", ")
        }
    };

    let mut out = String::new();
    let _ = writeln!(out, "Focus: {}", focus);
    let _ = writeln!(out, "Dependencies: {}", list(&direct.dependencies));
    let _ = writeln!(out, "Dependents: {}", list(&direct.dependents));
    out
}

// =============================================================================
// FREE FUNCTIONS
// =============================================================================

pub fn affected(map: &ProjectMap, path: &str) -> Affected {
    ImportGraph::new(map).affected(path)
}

pub fn pinned_context(map: &ProjectMap, path: &str, levels: usize) -> PinnedContext {
    ImportGraph::new(map).pinned_context(path, levels)
}

pub fn verify(map: &ProjectMap) -> Verification {
    ImportGraph::new(map).verify()
}

pub fn dead_exports(map: &ProjectMap) -> Vec<DeadExport> {
    ImportGraph::new(map).dead_exports()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::types::{Exports, TreeNode};

    fn record(path: &str, imports: &[&str], exports: &[&str]) -> FileRecord {
        FileRecord {
            path: path.to_string(),
            signatures: vec![],
            imports: imports.iter().map(|s| s.to_string()).collect(),
            exports: Exports {
                named: exports.iter().map(|s| s.to_string()).collect(),
                default: None,
            },
        }
    }

    fn map(files: Vec<FileRecord>) -> ProjectMap {
        ProjectMap {
            tree: TreeNode {
                name: "root".into(),
                children: vec![],
                is_leaf: false,
            },
            files,
            summary: String::new(),
        }
    }

    /// app -> service -> repo -> db, plus util imported by app and repo
    fn chain() -> ProjectMap {
        map(vec![
            record("src/app.js", &["./service", "./util"], &[]),
            record("src/service.js", &["./repo"], &["serve"]),
            record("src/repo.js", &["./db", "./util"], &["find"]),
            record("src/db.js", &[], &["query"]),
            record("src/util.js", &[], &["helper"]),
        ])
    }

    #[test]
    fn test_affected_direct_edges() {
        let m = chain();
        let result = affected(&m, "src/repo.js");

        assert_eq!(result.dependencies, vec!["src/db.js", "src/util.js"]);
        assert_eq!(result.dependents, vec!["src/service.js"]);
        assert_eq!(
            result.all,
            vec!["src/db.js", "src/repo.js", "src/service.js", "src/util.js"]
        );
    }

    #[test]
    fn test_affected_missing_focus() {
        let m = chain();
        let result = affected(&m, "src/nope.js");
        assert!(result.dependencies.is_empty());
        assert!(result.dependents.is_empty());
        assert_eq!(result.all, vec!["src/nope.js"]);
    }

    #[test]
    fn test_focus_path_normalized() {
        let m = chain();
        assert_eq!(affected(&m, "./src/db.js").dependents, vec!["src/repo.js"]);
        assert_eq!(affected(&m, "src\\db.js").dependents, vec!["src/repo.js"]);
    }

    #[test]
    fn test_impact_symmetry() {
        let m = chain();
        let graph = ImportGraph::new(&m);
        for x in &m.files {
            for y in &m.files {
                let y_depends_on_x = graph.affected(&x.path).dependents.contains(&y.path);
                let x_in_y_deps = graph.affected(&y.path).dependencies.contains(&x.path);
                assert_eq!(y_depends_on_x, x_in_y_deps, "{} / {}", x.path, y.path);
            }
        }
    }

    #[test]
    fn test_pinned_context_levels() {
        let m = chain();

        let direct = pinned_context(&m, "src/service.js", 0);
        let paths: Vec<_> = direct.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["src/app.js", "src/service.js", "src/repo.js"]);

        let widened = pinned_context(&m, "src/service.js", 1);
        let paths: Vec<_> = widened.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["src/app.js", "src/service.js", "src/repo.js", "src/db.js", "src/util.js"]
        );
        assert_eq!(widened.dependencies, vec!["src/repo.js"]);
        assert_eq!(widened.dependents, vec!["src/app.js"]);
    }

    #[test]
    fn test_pinned_context_summary() {
        let m = chain();
        let context = pinned_context(&m, "src/db.js", 1);
        assert_eq!(context.focus, "src/db.js");
        assert!(context.summary.contains("Focus: src/db.js"));
        assert!(context.summary.contains("Dependencies: (none)"));
        assert!(context.summary.contains("Dependents: src/repo.js"));
    }

    #[test]
    fn test_verify_reports_broken_import() {
        let broken = map(vec![
            record("src/a.js", &["./b", "./missing"], &[]),
            record("src/b.js", &[], &["b"]),
        ]);
        let report = verify(&broken);
        assert!(!report.ok);
        assert_eq!(report.total_checked, 2);
        assert_eq!(
            report.broken_imports,
            vec![BrokenImport {
                from: "src/a.js".into(),
                import: "./missing".into(),
                reason: BrokenReason::Unresolved,
            }]
        );

        let fixed = map(vec![
            record("src/a.js", &["./b"], &[]),
            record("src/b.js", &[], &["b"]),
        ]);
        let report = verify(&fixed);
        assert!(report.ok);
        assert_eq!(report.total_checked, 1);
    }

    #[test]
    fn test_verify_serialization() {
        let m = map(vec![record("a.js", &["./gone"], &[])]);
        let json = serde_json::to_value(verify(&m)).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["totalChecked"], 1);
        assert_eq!(json["brokenImports"][0]["reason"], "unresolved");
    }

    #[test]
    fn test_dead_exports() {
        let mut m = chain();
        m.files[0].exports.default = Some("App".into());
        let dead = dead_exports(&m);

        // app.js is imported by nobody; everything else has a dependent
        assert_eq!(
            dead,
            vec![DeadExport {
                path: "src/app.js".into(),
                name: "default".into(),
            }]
        );
    }
}
