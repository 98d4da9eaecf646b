//! Dry-run unified diff support for `stubsync diff`.

use std::path::PathBuf;

use similar::TextDiff;

use stubsync_core::SyncConfig;

use crate::pipeline::{plan, SyncPlan};
use crate::SyncError;

/// A single planned file diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: PathBuf,
    pub unified_diff: String,
}

/// Plan a sync and diff it against the tree. No files are written.
pub fn diff_tree(config: &SyncConfig) -> Result<Vec<FileDiff>, SyncError> {
    Ok(diff_plan(&plan(config)?))
}

/// Unified diffs for every changed file of `plan`; new files diff against empty.
pub fn diff_plan(plan: &SyncPlan) -> Vec<FileDiff> {
    plan.changed()
        .map(|file| {
            let existing = file.original.as_deref().unwrap_or("");
            let old_header = if file.is_new() {
                "/dev/null".to_string()
            } else {
                format!("a/{}", file.path.display())
            };
            let new_header = format!("b/{}", file.path.display());
            let unified_diff = TextDiff::from_lines(existing, file.content.as_str())
                .unified_diff()
                .header(&old_header, &new_header)
                .context_radius(3)
                .to_string();
            FileDiff {
                path: file.path.clone(),
                unified_diff,
            }
        })
        .collect()
}
