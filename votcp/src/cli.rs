//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use eyre::Result;
use std::path::PathBuf;

pub const DEFAULT_LOG_FILE: &str = "VOT-CP.log";

#[derive(Debug, Parser)]
#[command(name = "votcp")]
#[command(about = "Prepare stop tiers and measure Voice Onset Time with AutoVOT")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Plain-text log written alongside stderr output
    #[arg(long, global = true, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Process one wav/TextGrid pair
    Run(crate::run::Args),

    /// Process every wav/TextGrid pair in a directory
    Batch(crate::batch::Args),
}

/// Execute CLI command - separated for testing.
pub fn run_cli(cli: Cli) -> Result<()> {
    tracing::debug!(?cli, "parsed arguments");

    match cli.command {
        Commands::Run(args) => crate::run::execute(args.try_into()?),
        Commands::Batch(args) => crate::batch::execute(args.try_into()?),
    }
}
