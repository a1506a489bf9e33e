//! Project Map Builder
//!
//! Orchestrates collection, extraction and caching into a [`ProjectMap`].
//!
//! @module map/builder

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info};

use super::cache::{compute_hash, load_map, save_map, CacheStore, FileCacheStore};
use super::extract::{Extractor, RegexExtractor};
use super::summary::{render_summary, SummaryOptions};
use super::types::{BuildStats, FileRecord, ProjectMap};
use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::parse::{build_tree, collect, CollectedFile, IgnoreEngine};

// =============================================================================
// OPTIONS
// =============================================================================

#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Extra ignore patterns on top of the built-in set
    pub ignore_patterns: Vec<String>,
    /// Allowed file extensions
    pub extensions: Vec<String>,
    /// Bytes read per file for extraction (0 = whole file)
    pub max_file_size: u64,
    pub max_depth: usize,
    /// Skip the cache lookup (the result is still saved)
    pub force_rebuild: bool,
    pub respect_gitignore: bool,
    pub hash_prefix_bytes: usize,
    /// Extraction workers (None = rayon default)
    pub jobs: Option<usize>,
    pub summary: SummaryOptions,
}

impl BuildOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            ignore_patterns: config.map.ignore.clone(),
            extensions: config.map.extensions.clone(),
            max_file_size: config.map.max_file_size,
            max_depth: config.map.max_depth,
            force_rebuild: false,
            respect_gitignore: config.map.respect_gitignore,
            hash_prefix_bytes: config.map.hash_prefix_bytes,
            jobs: config.map.jobs,
            summary: SummaryOptions::from(&config.summary),
        }
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Builds project maps with an injectable extractor and cache store
#[derive(Clone)]
pub struct MapBuilder {
    extractor: Arc<dyn Extractor>,
    store: Option<Arc<dyn CacheStore>>,
}

impl Default for MapBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MapBuilder {
    /// Regex extraction, cache file alongside each root
    pub fn new() -> Self {
        Self {
            extractor: Arc::new(RegexExtractor),
            store: Some(Arc::new(FileCacheStore)),
        }
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Never load or save cached maps
    pub fn without_cache(mut self) -> Self {
        self.store = None;
        self
    }

    /// Build (or load) the project map for `root`
    pub fn build(&self, root: &Path, options: &BuildOptions) -> Result<ProjectMap> {
        self.build_with_stats(root, options).map(|(map, _)| map)
    }

    pub fn build_with_stats(&self, root: &Path, options: &BuildOptions) -> Result<(ProjectMap, BuildStats)> {
        if !root.exists() {
            return Err(Error::RootNotFound {
                path: root.to_path_buf(),
            });
        }
        if !root.is_dir() {
            return Err(Error::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        let start = Instant::now();
        let engine = Arc::new(IgnoreEngine::new(&options.ignore_patterns));
        let ignore_fn = move |rel: &str, is_dir: bool| engine.is_ignored(rel, is_dir);

        let files = collect(root, ignore_fn.clone(), &options.extensions, options.respect_gitignore);
        let hash = compute_hash(&files, options.hash_prefix_bytes);
        debug!(files = files.len(), %hash, "Collected files");

        if !options.force_rebuild {
            if let Some(store) = &self.store {
                if let Some(mut map) = load_map(store.as_ref(), root, &hash) {
                    map.summary = render_summary(&map.tree, &map.files, &options.summary);
                    let stats = BuildStats::from_map(&map, true, elapsed_ms(start));
                    info!(root = %root.display(), %stats, "Loaded cached project map");
                    return Ok((map, stats));
                }
            }
        }

        let tree = build_tree(
            root,
            options.max_depth,
            ignore_fn,
            &options.extensions,
            options.respect_gitignore,
        );
        let records = self.extract_all(&files, options)?;
        let summary = render_summary(&tree, &records, &options.summary);

        let map = ProjectMap {
            tree,
            files: records,
            summary,
        };

        if let Some(store) = &self.store {
            save_map(store.as_ref(), root, &map, &hash);
        }

        let stats = BuildStats::from_map(&map, false, elapsed_ms(start));
        info!(root = %root.display(), %stats, "Built project map");
        Ok((map, stats))
    }

    /// Read and extract every file; results keep collection order
    fn extract_all(&self, files: &[CollectedFile], options: &BuildOptions) -> Result<Vec<FileRecord>> {
        let max = options.max_file_size;
        let run = || {
            files
                .par_iter()
                .filter_map(|file| self.extract_one(file, max))
                .collect::<Vec<_>>()
        };

        match options.jobs {
            Some(n) if n > 0 => {
                let pool = rayon::ThreadPoolBuilder::new().num_threads(n).build()?;
                Ok(pool.install(run))
            }
            _ => Ok(run()),
        }
    }

    fn extract_one(&self, file: &CollectedFile, max_file_size: u64) -> Option<FileRecord> {
        let content = match read_prefix(&file.absolute_path, max_file_size) {
            Ok(c) => c,
            Err(e) => {
                debug!(path = %file.relative_path, error = %e, "Skipping unreadable file");
                return None;
            }
        };

        let data = self.extractor.extract(&file.relative_path, &content);
        Some(FileRecord {
            path: file.relative_path.clone(),
            signatures: data.signatures,
            imports: data.imports,
            exports: data.exports,
        })
    }
}

/// Build with the default extractor and the on-disk cache
pub fn build_project_map(root: &Path, options: &BuildOptions) -> Result<ProjectMap> {
    MapBuilder::new().build(root, options)
}

/// Up to `max` bytes of the file, lossily decoded (0 = whole file)
fn read_prefix(path: &Path, max: u64) -> std::io::Result<String> {
    let file = File::open(path)?;
    let mut buf = Vec::new();
    if max == 0 {
        (&file).read_to_end(&mut buf)?;
    } else {
        (&file).take(max).read_to_end(&mut buf)?;
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::cache::MemoryCacheStore;
    use crate::map::extract::Extraction;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

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

    fn project() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/a.js"), "import { b } from './b';\n").unwrap();
        fs::write(dir.path().join("src/b.js"), "export function b() {}\n").unwrap();
        dir
    }

    fn counting_builder() -> (MapBuilder, Arc<CountingExtractor>) {
        let extractor = Arc::new(CountingExtractor::default());
        let builder = MapBuilder::new()
            .with_extractor(extractor.clone())
            .with_store(Arc::new(MemoryCacheStore::new()));
        (builder, extractor)
    }

    #[test]
    fn test_build_basic() {
        let dir = project();
        let map = MapBuilder::new()
            .without_cache()
            .build(dir.path(), &BuildOptions::default())
            .unwrap();

        let paths: Vec<_> = map.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["src/a.js", "src/b.js"]);
        assert_eq!(map.file("src/a.js").unwrap().imports, vec!["./b"]);
        assert!(map.file("src/b.js").unwrap().exports.named.contains("b"));
        assert_eq!(map.tree.children[0].name, "src");
        assert!(map.summary.contains("## Files (2)"));
    }

    #[test]
    fn test_second_build_reuses_cache() {
        let dir = project();
        let (builder, extractor) = counting_builder();
        let options = BuildOptions::default();

        let (first, stats) = builder.build_with_stats(dir.path(), &options).unwrap();
        assert!(!stats.cache_hit);
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 2);

        let (second, stats) = builder.build_with_stats(dir.path(), &options).unwrap();
        assert!(stats.cache_hit);
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 2);
        assert_eq!(first.files, second.files);
    }

    #[test]
    fn test_content_change_forces_rebuild() {
        let dir = project();
        let (builder, extractor) = counting_builder();
        let options = BuildOptions::default();

        builder.build(dir.path(), &options).unwrap();
        fs::write(dir.path().join("src/b.js"), "export function c() {}\n").unwrap();
        let map = builder.build(dir.path(), &options).unwrap();

        assert_eq!(extractor.calls.load(Ordering::SeqCst), 4);
        assert!(map.file("src/b.js").unwrap().exports.named.contains("c"));
    }

    #[test]
    fn test_force_rebuild_skips_cache() {
        let dir = project();
        let (builder, extractor) = counting_builder();

        builder.build(dir.path(), &BuildOptions::default()).unwrap();
        let forced = BuildOptions {
            force_rebuild: true,
            ..Default::default()
        };
        builder.build(dir.path(), &forced).unwrap();

        assert_eq!(extractor.calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_cached_map_gets_fresh_summary() {
        let dir = project();
        let (builder, _) = counting_builder();

        builder.build(dir.path(), &BuildOptions::default()).unwrap();
        let terse = BuildOptions {
            summary: SummaryOptions {
                include_signatures: false,
                ..Default::default()
            },
            ..Default::default()
        };
        let map = builder.build(dir.path(), &terse).unwrap();

        assert!(!map.summary.contains("signatures:"));
    }

    #[test]
    fn test_max_file_size_truncates_content() {
        let dir = tempdir().unwrap();
        let padding = "/".repeat(64);
        fs::write(
            dir.path().join("late.js"),
            format!("{}\nexport function late() {{}}\n", padding),
        )
        .unwrap();

        let options = BuildOptions {
            max_file_size: 32,
            ..Default::default()
        };
        let map = MapBuilder::new().without_cache().build(dir.path(), &options).unwrap();

        assert_eq!(map.files.len(), 1);
        assert!(map.files[0].signatures.is_empty());
    }

    #[test]
    fn test_bounded_workers() {
        let dir = project();
        let options = BuildOptions {
            jobs: Some(1),
            ..Default::default()
        };
        let map = MapBuilder::new().without_cache().build(dir.path(), &options).unwrap();
        assert_eq!(map.files.len(), 2);
    }

    #[test]
    fn test_invalid_root() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");
        let err = MapBuilder::new().build(&missing, &BuildOptions::default()).unwrap_err();
        assert!(matches!(err, Error::RootNotFound { .. }));

        let file = dir.path().join("file.js");
        fs::write(&file, "").unwrap();
        let err = MapBuilder::new().build(&file, &BuildOptions::default()).unwrap_err();
        assert!(matches!(err, Error::NotADirectory { .. }));
    }

    #[test]
    fn test_default_store_writes_cache_file() {
        let dir = project();
        build_project_map(dir.path(), &BuildOptions::default()).unwrap();
        assert!(FileCacheStore::path(dir.path()).exists());

        // the cache file itself is never scanned
        let map = build_project_map(dir.path(), &BuildOptions::default()).unwrap();
        assert_eq!(map.files.len(), 2);
    }

    #[test]
    fn test_unreadable_file_is_skipped() {
        let dir = project();
        let files = vec![
            CollectedFile {
                absolute_path: dir.path().join("src/a.js"),
                relative_path: "src/a.js".into(),
            },
            CollectedFile {
                absolute_path: dir.path().join("src/vanished.js"),
                relative_path: "src/vanished.js".into(),
            },
            CollectedFile {
                absolute_path: dir.path().join("src/b.js"),
                relative_path: "src/b.js".into(),
            },
        ];

        let records = MapBuilder::new()
            .without_cache()
            .extract_all(&files, &BuildOptions::default())
            .unwrap();
        let paths: Vec<_> = records.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["src/a.js", "src/b.js"]);
    }

    #[test]
    fn test_non_utf8_content_is_decoded_lossily() {
        let dir = tempdir().unwrap();
        let mut bytes = b"export const ok = 1;\n".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, b'\n']);
        fs::write(dir.path().join("mixed.js"), bytes).unwrap();

        let map = MapBuilder::new()
            .without_cache()
            .build(dir.path(), &BuildOptions::default())
            .unwrap();
        assert!(map.file("mixed.js").unwrap().exports.named.contains("ok"));
    }
}
