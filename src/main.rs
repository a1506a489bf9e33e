//! projmap CLI entry point

use clap::Parser;
use projmap::cli::{graph, map, Cli, Commands};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the JSON result
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_env("PROJMAP_LOG"))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::GetMap(args) => map::run(args)?,
        Commands::PinContext(args) => graph::pin_context(args)?,
        Commands::Affected(args) => graph::affected(args)?,
        Commands::Verify(args) => {
            if !graph::verify(args)? {
                std::process::exit(1);
            }
        }
        Commands::DeadExports(args) => graph::dead_exports(args)?,
    }

    Ok(())
}
