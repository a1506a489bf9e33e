//! Project Map: per-file structural records, import graph and cache
//!
//! @module map

pub mod builder;
pub mod cache;
pub mod extract;
pub mod query;
pub mod resolve;
pub mod summary;
pub mod types;

pub use builder::{build_project_map, BuildOptions, MapBuilder};
pub use cache::{CacheStore, FileCacheStore, MemoryCacheStore};
pub use extract::{Extraction, Extractor, RegexExtractor};
pub use query::{
    affected, dead_exports, pinned_context, verify, Affected, BrokenImport, BrokenReason,
    DeadExport, ImportGraph, PinnedContext, Verification,
};
pub use resolve::{resolve, resolve_detailed, FileIndex, Strategy};
pub use summary::{render_summary, SummaryOptions};
pub use types::{BuildStats, CacheEntry, Exports, FileRecord, ProjectMap, TreeNode};
