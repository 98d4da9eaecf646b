//! Error types for stubsync-sync.

use std::path::PathBuf;

use thiserror::Error;

use stubsync_contract::ContractError;
use stubsync_core::ConfigError;
use stubsync_renderer::RenderError;

/// All errors that can arise from a sync run. Every variant aborts the run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("contract error: {0}")]
    Contract(#[from] ContractError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// A source file could not be parsed, or violates the doc-comment rule.
    #[error("{}:{line}: {message}", path.display())]
    SourceParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("trait `{name}` not found in {}", dir.display())]
    InterfaceNotFound { name: String, dir: PathBuf },

    /// Contract and server trait disagree about an operation.
    #[error("contract mismatch for `{identifier}`: {reason}")]
    ContractMismatch { identifier: String, reason: String },

    /// Two aggregator items would share a name.
    #[error("name collision in {}: `{name}` {reason}", dir.display())]
    NameCollision {
        dir: PathBuf,
        name: String,
        reason: String,
    },

    /// Two edits to the same file touch overlapping bytes.
    #[error("conflicting edits in {} at byte {offset}", path.display())]
    PatchConflict { path: PathBuf, offset: usize },

    #[error("Rust grammar unavailable: {0}")]
    Grammar(String),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
