//! Import-graph commands: pin-context, affected, verify, dead-exports
//!
//! Each command builds (or loads) the map with the configured options and
//! serializes one query result.
//!
//! @module cli/graph

use super::{build_map, focus_path, root_or_cwd, BuildArgs, OutputArgs};
use crate::core::error::Result;
use crate::map::ImportGraph;
use clap::Args;
use std::path::PathBuf;
use tracing::warn;

#[derive(Args, Debug)]
pub struct PinContextArgs {
    /// Focus file, relative to the root
    pub file: String,

    /// Project root (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Extra hops of dependencies/dependents to include (0 or 1)
    #[arg(short, long, default_value_t = 1)]
    pub levels: usize,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct AffectedArgs {
    /// File whose impact to report, relative to the root
    pub file: String,

    /// Project root (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
#[command(after_help = "EXIT STATUS:
    0  report written (all imports resolve, or --strict not given)
    1  --strict and at least one import is broken")]
pub struct VerifyArgs {
    /// Project root (default: current directory)
    pub root: Option<PathBuf>,

    /// Exit with status 1 when any import is broken
    #[arg(long)]
    pub strict: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct DeadExportsArgs {
    /// Project root (default: current directory)
    pub root: Option<PathBuf>,

    #[command(flatten)]
    pub output: OutputArgs,
}

pub fn pin_context(args: PinContextArgs) -> Result<()> {
    let root = root_or_cwd(args.root)?;
    let map = build_map(&root, &BuildArgs::default())?;
    let focus = focus_path(&root, &args.file);

    let graph = ImportGraph::new(&map);
    if !graph.contains(&focus) {
        warn!(file = %focus, "File is not part of the project map");
    }
    args.output.emit(&graph.pinned_context(&focus, args.levels))
}

pub fn affected(args: AffectedArgs) -> Result<()> {
    let root = root_or_cwd(args.root)?;
    let map = build_map(&root, &BuildArgs::default())?;
    let focus = focus_path(&root, &args.file);

    let graph = ImportGraph::new(&map);
    if !graph.contains(&focus) {
        warn!(file = %focus, "File is not part of the project map");
    }
    args.output.emit(&graph.affected(&focus))
}

/// Returns whether the check passed (always true without `--strict`)
pub fn verify(args: VerifyArgs) -> Result<bool> {
    let root = root_or_cwd(args.root)?;
    let map = build_map(&root, &BuildArgs::default())?;

    let report = ImportGraph::new(&map).verify();
    args.output.emit(&report)?;

    if !report.ok {
        warn!(
            broken = report.broken_imports.len(),
            checked = report.total_checked,
            "Unresolved imports found"
        );
    }
    Ok(report.ok || !args.strict)
}

pub fn dead_exports(args: DeadExportsArgs) -> Result<()> {
    let root = root_or_cwd(args.root)?;
    let map = build_map(&root, &BuildArgs::default())?;
    args.output.emit(&ImportGraph::new(&map).dead_exports())
}
