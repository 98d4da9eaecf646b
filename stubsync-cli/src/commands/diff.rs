//! `stubsync diff`: show unified diffs for what sync would write.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use stubsync_sync::diff_tree;

use super::ConfigArgs;

/// Arguments for `stubsync diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let config = self.config.load()?;
        let diffs = diff_tree(&config).context("diff failed")?;

        if diffs.is_empty() {
            println!("No differences.");
            return Ok(());
        }

        for diff in diffs {
            for line in diff.unified_diff.lines() {
                println!("{}", paint(line));
            }
        }
        Ok(())
    }
}

fn paint(line: &str) -> String {
    if line.starts_with("+++") || line.starts_with("---") {
        line.bold().to_string()
    } else if line.starts_with("@@") {
        line.cyan().to_string()
    } else if line.starts_with('+') {
        line.green().to_string()
    } else if line.starts_with('-') {
        line.red().to_string()
    } else {
        line.to_string()
    }
}
