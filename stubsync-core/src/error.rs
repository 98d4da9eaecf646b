//! Error types for stubsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while assembling a [`crate::SyncConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A mandatory input was supplied neither on the command line nor in the config file.
    #[error("missing required option `{field}` (see --help)")]
    Missing { field: &'static str },

    /// Underlying I/O failure reading the config file.
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load; serde_yaml's message carries the line.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
