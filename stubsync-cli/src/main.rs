//! stubsync: keep controller stubs in line with an OpenAPI contract.
//!
//! # Usage
//!
//! ```text
//! stubsync sync --src src/oapigen --dst src/controller --doc openapi.yaml [--dry-run]
//! stubsync diff --config stubsync.yaml
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{diff::DiffArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "stubsync",
    version,
    about = "Generate and update controller stubs from an OpenAPI contract",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge contract operations into controller files and rewrite aggregators.
    Sync(SyncArgs),

    /// Show unified diff of what sync would write.
    Diff(DiffArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Diff(args) => args.run(),
    }
}
