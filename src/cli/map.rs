//! Get-map command implementation
//!
//! @module cli/map

use super::{build_map, root_or_cwd, BuildArgs, OutputArgs};
use crate::core::error::Result;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

/// Arguments for the get-map command
#[derive(Args, Debug)]
#[command(after_help = "EXAMPLES:
    projmap get-map                       Map the current directory
    projmap get-map ../app --pretty       Human-readable JSON
    projmap get-map --ext py --ignore tests
    projmap get-map --force -o map.json   Rebuild and write to a file")]
pub struct GetMapArgs {
    /// Project root (default: current directory)
    pub root: Option<PathBuf>,

    #[command(flatten)]
    pub build: BuildArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Run the get-map command
pub fn run(args: GetMapArgs) -> Result<()> {
    let root = root_or_cwd(args.root)?;
    let map = build_map(&root, &args.build)?;
    info!(root = %root.display(), files = map.files.len(), "Project map ready");
    args.output.emit(&map)
}
