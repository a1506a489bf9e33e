//! CLI command definitions and handlers

pub mod graph;
pub mod map;

use crate::core::config::Config;
use crate::core::error::Result;
use crate::map::{BuildOptions, FileCacheStore, MapBuilder, ProjectMap};
use crate::output;
use crate::parse::relative_path;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const LONG_ABOUT: &str = r#"
Static project map for LLM-assisted code audits.

Scans a repository into a folder tree plus per-file signatures, relative
imports and exports, caches the result next to the scanned root, and answers
import-graph questions over it. All output is JSON.

COMMANDS:
    projmap get-map [ROOT]              Build (or reuse) the project map
    projmap pin-context <FILE>          Records relevant to one file
    projmap affected <FILE>             Direct dependencies and dependents
    projmap verify [ROOT]               Check every relative import resolves
    projmap dead-exports [ROOT]         Exports no file imports

EXAMPLES:
    projmap get-map --pretty            Map the current directory
    projmap get-map ../app --force      Rebuild, ignoring the cache
    projmap affected src/db.js          Who breaks if src/db.js changes
    projmap verify --strict             Exit 1 on broken imports (CI)

Logging goes to stderr; set PROJMAP_LOG=debug for details.
"#;

/// Static project map builder
#[derive(Parser, Debug)]
#[command(name = "projmap")]
#[command(author, version)]
#[command(about = "Static project map: tree, symbols, imports and import-graph queries")]
#[command(long_about = LONG_ABOUT)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the project map (reusing the cache when nothing changed)
    #[command(visible_alias = "map")]
    GetMap(map::GetMapArgs),

    /// Map records for a file, its imports and its importers
    #[command(visible_alias = "pin")]
    PinContext(graph::PinContextArgs),

    /// Direct dependencies and dependents of a file
    Affected(graph::AffectedArgs),

    /// Verify that every relative import resolves to a scanned file
    Verify(graph::VerifyArgs),

    /// List exports of files that no other file imports
    DeadExports(graph::DeadExportsArgs),
}

// =============================================================================
// SHARED ARGUMENTS
// =============================================================================

/// Flags controlling how the map is built
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Delete the cached map and rebuild
    #[arg(short, long)]
    pub force: bool,

    /// Extra ignore pattern (repeatable)
    #[arg(long = "ignore", value_name = "PATTERN")]
    pub ignore: Vec<String>,

    /// Scanned extension (repeatable, replaces the configured list)
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Maximum folder tree depth
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Bytes read per file for extraction
    #[arg(long, value_name = "BYTES")]
    pub max_file_size: Option<u64>,

    /// Do not honour the root's .gitignore
    #[arg(long)]
    pub no_gitignore: bool,

    /// Neither read nor write the cache file
    #[arg(long)]
    pub no_cache: bool,

    /// Extraction worker threads
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,
}

impl BuildArgs {
    /// Apply command-line overrides on top of configured options
    pub fn apply(&self, options: &mut BuildOptions) {
        options.force_rebuild |= self.force;
        options.ignore_patterns.extend(self.ignore.iter().cloned());
        if !self.extensions.is_empty() {
            options.extensions = self
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_string())
                .collect();
        }
        if let Some(depth) = self.max_depth {
            options.max_depth = depth;
        }
        if let Some(size) = self.max_file_size {
            options.max_file_size = size;
        }
        if self.no_gitignore {
            options.respect_gitignore = false;
        }
        if self.jobs.is_some() {
            options.jobs = self.jobs;
        }
    }
}

/// JSON output destination and format
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Pretty-print JSON
    #[arg(long)]
    pub pretty: bool,

    /// Write JSON to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl OutputArgs {
    pub fn emit<T: Serialize>(&self, value: &T) -> Result<()> {
        output::write_json(value, self.pretty, self.output.as_deref())
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// The given root, or the current directory
pub fn root_or_cwd(root: Option<PathBuf>) -> Result<PathBuf> {
    match root {
        Some(root) => Ok(root),
        None => Ok(std::env::current_dir()?),
    }
}

/// Build the map for `root` from config plus command-line overrides
pub fn build_map(root: &Path, args: &BuildArgs) -> Result<ProjectMap> {
    build_map_with(root, args, &Config::load()?)
}

fn build_map_with(root: &Path, args: &BuildArgs, config: &Config) -> Result<ProjectMap> {
    let mut options = BuildOptions::from_config(config);
    args.apply(&mut options);

    let mut builder = MapBuilder::new();
    if args.no_cache || !config.cache.enabled {
        debug!("Cache disabled");
        builder = builder.without_cache();
    } else if args.force {
        // the rebuild below ignores the stale entry either way
        if let Err(e) = FileCacheStore::clear(root) {
            warn!(root = %root.display(), error = %e, "Failed to clear map cache");
        }
    }

    builder.build(root, &options)
}

/// Map a command-line file argument to a root-relative path
pub fn focus_path(root: &Path, file: &str) -> String {
    let path = Path::new(file);
    if path.is_absolute() && path.starts_with(root) {
        return relative_path(root, path);
    }
    file.to_string()
}
