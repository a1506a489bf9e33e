//! Content-Addressed Map Cache
//!
//! A built [`ProjectMap`] is persisted per scanned root together with the
//! hash of the file set it was built from. A stored entry is reused only when
//! both the hash and the format version match; anything else is a miss and
//! triggers a full rebuild.
//!
//! Hash input, per file sorted by relative path:
//! `relative_path:byte_size:xxh3(first N bytes)`, folded with SHA-256.
//!
//! @module map/cache

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use xxhash_rust::xxh3::xxh3_64;

use super::types::{CacheEntry, ProjectMap};
use crate::core::config::CACHE_FILE_NAME;
use crate::core::error::Result;
use crate::parse::CollectedFile;

/// Version stamped into every cache entry
pub const FORMAT_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// STORES
// =============================================================================

/// Persistence for one cache entry per scanned root.
///
/// Not designed for concurrent writers on the same root; a stale overwrite is
/// harmless because the hash check rejects it on the next load.
pub trait CacheStore: Send + Sync {
    fn load(&self, root: &Path) -> Result<Option<CacheEntry>>;
    fn save(&self, root: &Path, entry: &CacheEntry) -> Result<()>;
}

/// JSON document at `<root>/.projmap-cache.json`
#[derive(Debug, Clone, Copy, Default)]
pub struct FileCacheStore;

impl FileCacheStore {
    pub fn path(root: &Path) -> PathBuf {
        root.join(CACHE_FILE_NAME)
    }

    /// Delete the cache file for `root`, if any
    pub fn clear(root: &Path) -> Result<()> {
        let path = Self::path(root);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

impl CacheStore for FileCacheStore {
    fn load(&self, root: &Path) -> Result<Option<CacheEntry>> {
        let path = Self::path(root);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn save(&self, root: &Path, entry: &CacheEntry) -> Result<()> {
        let content = serde_json::to_vec(entry)?;
        fs::write(Self::path(root), content)?;
        Ok(())
    }
}

/// In-process store keyed by root
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<PathBuf, CacheEntry>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Replace the stored entry for `root` as-is
    pub fn insert(&self, root: &Path, entry: CacheEntry) {
        self.entries.lock().insert(root.to_path_buf(), entry);
    }
}

impl CacheStore for MemoryCacheStore {
    fn load(&self, root: &Path) -> Result<Option<CacheEntry>> {
        Ok(self.entries.lock().get(root).cloned())
    }

    fn save(&self, root: &Path, entry: &CacheEntry) -> Result<()> {
        self.insert(root, entry.clone());
        Ok(())
    }
}

// =============================================================================
// HASHING
// =============================================================================

/// Stable hash of a file set, independent of enumeration order.
///
/// `prefix_bytes` bounds how much of each file feeds its digest; `0` hashes
/// whole files. With a bound, two same-size versions differing only past
/// the prefix hash identically.
pub fn compute_hash(files: &[CollectedFile], prefix_bytes: usize) -> String {
    let mut sorted: Vec<&CollectedFile> = files.iter().collect();
    sorted.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    let mut hasher = Sha256::new();
    for file in sorted {
        let (size, digest) = match file_digest(&file.absolute_path, prefix_bytes) {
            Ok(v) => v,
            Err(e) => {
                debug!(path = %file.relative_path, error = %e, "Hashing unreadable file");
                (0, "-".to_string())
            }
        };
        hasher.update(format!("{}:{}:{}\n", file.relative_path, size, digest).as_bytes());
    }

    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn file_digest(path: &Path, prefix_bytes: usize) -> std::io::Result<(u64, String)> {
    let file = File::open(path)?;
    let size = file.metadata()?.len();

    let mut buf = Vec::new();
    if prefix_bytes == 0 {
        (&file).read_to_end(&mut buf)?;
    } else {
        (&file).take(prefix_bytes as u64).read_to_end(&mut buf)?;
    }

    Ok((size, format!("{:016x}", xxh3_64(&buf))))
}

// =============================================================================
// LOAD / SAVE
// =============================================================================

/// Load the stored map for `root` if it was built from `expected_hash` by
/// this version. Every other outcome is a miss.
pub fn load_map(store: &dyn CacheStore, root: &Path, expected_hash: &str) -> Option<ProjectMap> {
    let entry = match store.load(root) {
        Ok(Some(entry)) => entry,
        Ok(None) => {
            debug!(root = %root.display(), "No cached map");
            return None;
        }
        Err(e) => {
            debug!(root = %root.display(), error = %e, "Unreadable cached map");
            return None;
        }
    };

    if entry.format_version != FORMAT_VERSION {
        debug!(
            cached = %entry.format_version,
            current = FORMAT_VERSION,
            "Cached map from another version"
        );
        return None;
    }

    if entry.hash != expected_hash {
        debug!(root = %root.display(), "Cached map is stale");
        return None;
    }

    Some(entry.map)
}

/// Persist `map` for `root`. Best-effort: failures are logged and reported
/// as `false`.
pub fn save_map(store: &dyn CacheStore, root: &Path, map: &ProjectMap, hash: &str) -> bool {
    let entry = CacheEntry {
        hash: hash.to_string(),
        map: map.clone(),
        timestamp: chrono::Utc::now().timestamp_millis(),
        format_version: FORMAT_VERSION.to_string(),
    };

    match store.save(root, &entry) {
        Ok(()) => true,
        Err(e) => {
            warn!(root = %root.display(), error = %e, "Failed to save map cache");
            false
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
