//! Configuration management

use crate::core::error::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub map: MapConfig,
    pub summary: SummaryConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Extra ignore patterns, unioned with the built-in set
    pub ignore: Vec<String>,
    /// File extensions to scan (without the leading dot)
    pub extensions: Vec<String>,
    /// Maximum bytes read from each file for extraction
    pub max_file_size: u64,
    /// Maximum folder tree depth
    pub max_depth: usize,
    /// Honour the root's .gitignore
    pub respect_gitignore: bool,
    /// Bytes of each file folded into the cache hash (0 = whole file)
    pub hash_prefix_bytes: usize,
    /// Extraction worker count (None = one per core)
    pub jobs: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Files rendered verbatim before the rest collapse into a count
    pub max_files: usize,
    /// Lines of folder structure rendered
    pub max_tree_lines: usize,
    /// Include per-file signatures
    pub include_signatures: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Persist and reuse project maps
    pub enabled: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            ignore: vec![],
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            max_file_size: MAX_FILE_SIZE,
            max_depth: MAX_TREE_DEPTH,
            respect_gitignore: true,
            hash_prefix_bytes: HASH_PREFIX_BYTES,
            jobs: None,
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_files: SUMMARY_MAX_FILES,
            max_tree_lines: 400,
            include_signatures: true,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Config {
    /// Load configuration from default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = Self::projmap_home()?;
        Ok(home.join("config.toml"))
    }

    /// Get the projmap home directory
    pub fn projmap_home() -> Result<PathBuf> {
        // Check PROJMAP_HOME env var first
        if let Ok(home) = std::env::var("PROJMAP_HOME") {
            return Ok(PathBuf::from(home));
        }

        ProjectDirs::from("dev", "projmap", "projmap")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or_else(|| Error::ConfigError {
                message: "Could not determine projmap home directory".to_string(),
            })
    }
}

/// Extensions scanned when nothing else is configured
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "js", "jsx", "mjs", "cjs", "ts", "tsx", "mts", "cts", "vue", "svelte", "py", "rs", "go",
];

pub const MAX_FILE_SIZE: u64 = 262_144; // 256KB
pub const MAX_TREE_DEPTH: usize = 8;
pub const HASH_PREFIX_BYTES: usize = 1024;
pub const SUMMARY_MAX_FILES: usize = 200;
pub const MAX_SIGNATURES: usize = 30;

/// Name of the per-root cache file
pub const CACHE_FILE_NAME: &str = ".projmap-cache.json";
