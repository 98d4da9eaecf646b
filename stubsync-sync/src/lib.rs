//! # stubsync-sync
//!
//! Reconciles controller sources against an API contract.
//!
//! [`pipeline::run`] loads the contract, scans the server trait and the
//! destination directories, binds and groups operations by tag, merges each
//! group into its controller file and emits one `mod.rs` aggregator per
//! destination directory. [`diff::diff_tree`] shows the same result as unified
//! diffs without writing.

pub mod aggregator;
pub mod diff;
pub mod error;
pub mod grouper;
pub mod interface;
pub mod merger;
pub mod patch;
pub mod pipeline;
pub mod scanner;
pub mod signature;
mod syntax;
pub mod writer;

pub use diff::{diff_plan, diff_tree, FileDiff};
pub use error::SyncError;
pub use pipeline::{commit, plan, run, FileKind, PlannedFile, SyncPlan, SyncReport};
pub use writer::WriteResult;
