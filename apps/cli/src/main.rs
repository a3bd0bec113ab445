//! docbuild CLI — builds a repository's Sphinx HTML documentation.
//!
//! Resolves the repository root, clears stale generated sources and build
//! output, runs `sphinx-build`, and propagates its exit status.

mod commands;

use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
