//! `stubsync sync`: merge contract operations into controller sources.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use stubsync_sync::{pipeline, WriteResult};

use super::ConfigArgs;

/// Arguments for `stubsync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Show what would be written without actually writing any files.
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let config = self.config.load()?;
        let report = pipeline::run(&config, self.dry_run).context("sync failed")?;
        print_results(&report.writes, self.dry_run);
        Ok(())
    }
}

fn print_results(writes: &[WriteResult], dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    let written = writes
        .iter()
        .filter(|r| matches!(r, WriteResult::Written { .. } | WriteResult::WouldWrite { .. }))
        .count();
    let unchanged = writes.len() - written;

    if written == 0 {
        println!("{prefix}{} nothing to do ({unchanged} unchanged)", "✓".green().bold());
        return;
    }

    println!(
        "{prefix}{} synced ({written} written, {unchanged} unchanged)",
        "✓".green().bold()
    );
    for r in writes {
        match r {
            WriteResult::Written { path } => println!("  ✎  {}", path.display()),
            WriteResult::WouldWrite { path } => println!("  ~  {}", path.display()),
            WriteResult::Unchanged { path } => println!("  ·  {}", path.display()),
        }
    }
}
