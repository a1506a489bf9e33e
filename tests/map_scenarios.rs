//! End-to-end scenarios: build a map from a real directory, then query it.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use projmap::map::extract::{Extraction, Extractor, RegexExtractor};
use projmap::map::{
    affected, build_project_map, dead_exports, pinned_context, verify, BrokenReason, BuildOptions,
    FileCacheStore, ImportGraph, MapBuilder, MemoryCacheStore,
};
use tempfile::{tempdir, TempDir};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn two_file_project() -> TempDir {
    let dir = tempdir().unwrap();
    write(dir.path(), "src/a.js", "import { b } from './b';\n");
    write(dir.path(), "src/b.js", "export function b() {}\n");
    dir
}

#[test]
fn test_two_file_scenario() {
    let dir = two_file_project();
    let map = build_project_map(dir.path(), &BuildOptions::default()).unwrap();

    assert_eq!(map.files.len(), 2);
    assert!(map.file("src/b.js").unwrap().exports.named.contains("b"));
    assert!(map.file("src/a.js").unwrap().imports.contains(&"./b".to_string()));
    assert_eq!(affected(&map, "src/b.js").dependents, vec!["src/a.js"]);
    assert!(verify(&map).ok);
}

#[test]
fn test_map_json_shape() {
    let dir = two_file_project();
    let map = MapBuilder::new()
        .without_cache()
        .build(dir.path(), &BuildOptions::default())
        .unwrap();

    let json = serde_json::to_value(&map).unwrap();
    assert_eq!(json["tree"]["isLeaf"], false);
    assert_eq!(json["files"][1]["path"], "src/b.js");
    assert_eq!(json["files"][1]["exports"]["named"][0], "b");
    assert!(json["summary"].as_str().unwrap().contains("src/a.js"));
}

#[test]
fn test_index_file_resolution_in_graph() {
    let dir = tempdir().unwrap();
    write(dir.path(), "src/a.js", "import { x } from './util';\n");
    write(dir.path(), "src/util/index.js", "export const x = 1;\n");

    let map = build_project_map(dir.path(), &BuildOptions::default()).unwrap();
    assert_eq!(affected(&map, "src/a.js").dependencies, vec!["src/util/index.js"]);
    assert!(verify(&map).ok);
}

#[test]
fn test_verify_broken_then_fixed() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "src/a.js",
        "import { b } from './b';\nimport { m } from './missing';\n",
    );
    write(dir.path(), "src/b.js", "export function b() {}\n");
    let builder = MapBuilder::new().with_store(Arc::new(MemoryCacheStore::new()));

    let broken = verify(&builder.build(dir.path(), &BuildOptions::default()).unwrap());
    assert!(!broken.ok);
    assert_eq!(broken.broken_imports.len(), 1);
    assert_eq!(broken.broken_imports[0].import, "./missing");
    assert_eq!(broken.broken_imports[0].reason, BrokenReason::Unresolved);

    write(dir.path(), "src/a.js", "import { b } from './b';\n");
    let fixed = verify(&builder.build(dir.path(), &BuildOptions::default()).unwrap());
    assert!(fixed.ok);
    assert_eq!(fixed.total_checked, broken.total_checked - 1);
}

#[test]
fn test_impact_symmetry_on_built_map() {
    let dir = tempdir().unwrap();
    write(dir.path(), "src/index.ts", "import { App } from './app';\nimport './styles';\n");
    write(dir.path(), "src/app.tsx", "import { api } from './lib/api';\nexport class App {}\n");
    write(dir.path(), "src/styles.ts", "export const theme = {};\n");
    write(dir.path(), "src/lib/api.ts", "import { theme } from '../styles';\nexport const api = 1;\n");
    write(dir.path(), "src/lib/unused.ts", "export function unused() {}\n");

    let map = build_project_map(dir.path(), &BuildOptions::default()).unwrap();
    let graph = ImportGraph::new(&map);
    for x in &map.files {
        for y in &map.files {
            assert_eq!(
                graph.affected(&x.path).dependents.contains(&y.path),
                graph.affected(&y.path).dependencies.contains(&x.path),
                "{} / {}",
                x.path,
                y.path
            );
        }
    }
    assert_eq!(
        graph.affected("src/styles.ts").dependents,
        vec!["src/index.ts", "src/lib/api.ts"]
    );
}

#[test]
fn test_pinned_context_and_dead_exports() {
    let dir = tempdir().unwrap();
    write(dir.path(), "main.py", "from .service import run\n");
    write(dir.path(), "service.py", "from .db import connect\n\ndef run():\n    pass\n");
    write(dir.path(), "db.py", "def connect():\n    pass\n");

    let map = build_project_map(dir.path(), &BuildOptions::default()).unwrap();

    let direct = pinned_context(&map, "db.py", 0);
    let paths: Vec<_> = direct.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["db.py", "service.py"]);

    let widened = pinned_context(&map, "db.py", 1);
    assert_eq!(widened.files.len(), 3);

    // nothing imports main.py, but it exports nothing either
    assert!(dead_exports(&map).is_empty());
}

#[derive(Default)]
struct CountingExtractor {
    calls: AtomicUsize,
}

impl Extractor for CountingExtractor {
    fn extract(&self, path: &str, content: &str) -> Extraction {
        self.calls.fetch_add(1, Ordering::SeqCst);
        RegexExtractor.extract(path, content)
    }
}

#[test]
fn test_file_cache_reused_across_builders() {
    let dir = two_file_project();
    let options = BuildOptions::default();

    let first = Arc::new(CountingExtractor::default());
    let map_a = MapBuilder::new()
        .with_extractor(first.clone())
        .build(dir.path(), &options)
        .unwrap();
    assert_eq!(first.calls.load(Ordering::SeqCst), 2);
    assert!(FileCacheStore::path(dir.path()).exists());

    let second = Arc::new(CountingExtractor::default());
    let map_b = MapBuilder::new()
        .with_extractor(second.clone())
        .build(dir.path(), &options)
        .unwrap();
    assert_eq!(second.calls.load(Ordering::SeqCst), 0);
    assert_eq!(map_a, map_b);

    write(dir.path(), "src/c.js", "export const c = 3;\n");
    let map_c = MapBuilder::new()
        .with_extractor(second.clone())
        .build(dir.path(), &options)
        .unwrap();
    assert_eq!(second.calls.load(Ordering::SeqCst), 3);
    assert_eq!(map_c.files.len(), 3);
}

#[test]
fn test_ignored_and_gitignored_paths() {
    let dir = tempdir().unwrap();
    write(dir.path(), ".gitignore", "generated/\n");
    write(dir.path(), "src/a.js", "export const a = 1;\n");
    write(dir.path(), "node_modules/pkg/index.js", "export const p = 1;\n");
    write(dir.path(), "generated/out.js", "export const g = 1;\n");
    write(dir.path(), "vendor/lib.min.js", "export const v = 1;\n");
    write(dir.path(), "fixtures/f.js", "export const f = 1;\n");

    let options = BuildOptions {
        ignore_patterns: vec!["fixtures".into()],
        ..Default::default()
    };
    let map = MapBuilder::new().without_cache().build(dir.path(), &options).unwrap();
    let paths: Vec<_> = map.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["src/a.js"]);

    let options = BuildOptions {
        respect_gitignore: false,
        ..Default::default()
    };
    let map = MapBuilder::new().without_cache().build(dir.path(), &options).unwrap();
    assert!(map.file("generated/out.js").is_some());
}

#[test]
fn test_nested_gitignore_scopes_to_subtree() {
    let dir = tempdir().unwrap();
    write(dir.path(), "app/.gitignore", "*.gen.js\n");
    write(dir.path(), "app/main.js", "import { t } from './types.gen';\n");
    write(dir.path(), "app/types.gen.js", "export const t = 1;\n");
    write(dir.path(), "lib/types.gen.js", "export const t = 2;\n");

    let map = MapBuilder::new()
        .without_cache()
        .build(dir.path(), &BuildOptions::default())
        .unwrap();
    let paths: Vec<_> = map.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["app/main.js", "lib/types.gen.js"]);
    assert!(map.summary.contains("app/main.js"));
    assert!(!map.summary.contains("app/types.gen.js"));
}
