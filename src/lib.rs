//! projmap - static project map for LLM-assisted code audits
//!
//! Scans a repository into a bounded folder tree plus per-file signatures,
//! relative imports and exports, caches the result per root, and answers
//! import-graph questions (impact, pinned context, verification) over it.

pub mod cli;
pub mod core;
pub mod map;
pub mod output;
pub mod parse;

pub use crate::core::config::Config;
pub use crate::core::error::{Error, Result};
pub use map::{
    affected, build_project_map, dead_exports, pinned_context, verify, BuildOptions, MapBuilder,
    ProjectMap,
};
