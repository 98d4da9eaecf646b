//! Run configuration.
//!
//! A [`SyncConfig`] is built once per invocation and passed explicitly to every
//! stage. It is assembled from layers of [`PartialConfig`]: an optional YAML
//! file first, command-line flags on top.
//!
//! ```yaml
//! # stubsync.yaml
//! src: src/oapigen
//! dst: [src/controller, src/admin]
//! doc: openapi.yaml
//! prefix: app
//! tag_overrides:
//!   growth_topic: topic
//! ```
//!
//! Relative paths are resolved against the working directory of the process.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::naming::{self, TagOverrides};

/// Namespace prefixed to every generated module path.
pub const DEFAULT_BASE_NAMESPACE: &str = "crate";

/// Name of the server trait in the contract module.
pub const DEFAULT_INTERFACE_NAME: &str = "StrictServerInterface";

/// Fully resolved configuration for one sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    pub base_namespace: String,
    /// Directory of the contract-type module declaring the server trait.
    pub src_dir: PathBuf,
    /// Destination directories; the first one is the primary.
    pub dst_dirs: Vec<PathBuf>,
    /// OpenAPI document path.
    pub doc: PathBuf,
    pub prefix: String,
    pub debug: bool,
    pub interface_name: String,
    pub template_dir: Option<PathBuf>,
    /// Extra file-stem → tag entries on top of the built-in legacy table.
    pub tag_overrides: BTreeMap<String, String>,
}

impl SyncConfig {
    /// Directory that receives operations without a module hint.
    pub fn primary_dir(&self) -> &Path {
        self.dst_dirs
            .first()
            .map(PathBuf::as_path)
            .unwrap_or_else(|| Path::new("."))
    }

    /// `crate::oapigen` for `src_dir = src/oapigen`.
    pub fn contract_module_path(&self) -> String {
        naming::module_path_for_dir(&self.base_namespace, &self.src_dir)
    }

    /// Name under which controller files refer to contract types.
    pub fn namespace_alias(&self) -> String {
        naming::namespace_alias(&self.contract_module_path()).to_string()
    }

    pub fn overrides(&self) -> TagOverrides {
        TagOverrides::with_extra(&self.tag_overrides)
    }
}

/// One configuration layer; every field optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialConfig {
    pub base: Option<String>,
    pub src: Option<PathBuf>,
    pub dst: Vec<PathBuf>,
    pub doc: Option<PathBuf>,
    pub prefix: Option<String>,
    pub debug: Option<bool>,
    pub interface: Option<String>,
    pub templates: Option<PathBuf>,
    pub tag_overrides: BTreeMap<String, String>,
}

impl PartialConfig {
    /// Load a YAML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Layer `over` on top of `self`; set fields of `over` win.
    pub fn merge(self, over: PartialConfig) -> PartialConfig {
        let mut tag_overrides = self.tag_overrides;
        tag_overrides.extend(over.tag_overrides);
        PartialConfig {
            base: over.base.or(self.base),
            src: over.src.or(self.src),
            dst: if over.dst.is_empty() { self.dst } else { over.dst },
            doc: over.doc.or(self.doc),
            prefix: over.prefix.or(self.prefix),
            debug: over.debug.or(self.debug),
            interface: over.interface.or(self.interface),
            templates: over.templates.or(self.templates),
            tag_overrides,
        }
    }

    /// Validate mandatory inputs and fill defaults.
    pub fn resolve(self) -> Result<SyncConfig, ConfigError> {
        let src_dir = self.src.ok_or(ConfigError::Missing { field: "src" })?;
        let doc = self.doc.ok_or(ConfigError::Missing { field: "doc" })?;
        if self.dst.is_empty() {
            return Err(ConfigError::Missing { field: "dst" });
        }

        let mut dst_dirs: Vec<PathBuf> = Vec::with_capacity(self.dst.len());
        for dir in self.dst {
            if !dst_dirs.contains(&dir) {
                dst_dirs.push(dir);
            }
        }

        Ok(SyncConfig {
            base_namespace: self
                .base
                .filter(|b| !b.is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_NAMESPACE.to_string()),
            src_dir,
            dst_dirs,
            doc,
            prefix: self.prefix.unwrap_or_default(),
            debug: self.debug.unwrap_or(false),
            interface_name: self
                .interface
                .unwrap_or_else(|| DEFAULT_INTERFACE_NAME.to_string()),
            template_dir: self.templates,
            tag_overrides: self.tag_overrides,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> PartialConfig {
        PartialConfig {
            src: Some(PathBuf::from("src/oapigen")),
            dst: vec![PathBuf::from("src/controller")],
            doc: Some(PathBuf::from("openapi.yaml")),
            ..Default::default()
        }
    }

    #[test]
    fn resolve_fills_defaults() {
        let config = minimal().resolve().expect("resolve");
        assert_eq!(config.base_namespace, DEFAULT_BASE_NAMESPACE);
        assert_eq!(config.interface_name, DEFAULT_INTERFACE_NAME);
        assert_eq!(config.contract_module_path(), "crate::oapigen");
        assert_eq!(config.namespace_alias(), "oapigen");
        assert_eq!(config.primary_dir(), Path::new("src/controller"));
        assert!(!config.debug);
    }

    #[test]
    fn resolve_reports_first_missing_field() {
        let err = PartialConfig::default().resolve().unwrap_err();
        assert!(matches!(err, ConfigError::Missing { field: "src" }));

        let mut no_dst = minimal();
        no_dst.dst.clear();
        let err = no_dst.resolve().unwrap_err();
        assert!(matches!(err, ConfigError::Missing { field: "dst" }));
    }

    #[test]
    fn merge_prefers_upper_layer() {
        let file = PartialConfig {
            prefix: Some("file".into()),
            dst: vec![PathBuf::from("a"), PathBuf::from("b")],
            tag_overrides: BTreeMap::from([("x".to_string(), "y".to_string())]),
            ..minimal()
        };
        let flags = PartialConfig {
            prefix: Some("flag".into()),
            ..Default::default()
        };
        let merged = file.merge(flags).resolve().expect("resolve");
        assert_eq!(merged.prefix, "flag");
        assert_eq!(merged.dst_dirs, vec![PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(merged.tag_overrides.get("x").map(String::as_str), Some("y"));
    }

    #[test]
    fn duplicate_destinations_are_collapsed() {
        let mut partial = minimal();
        partial.dst.push(PathBuf::from("src/controller"));
        let config = partial.resolve().expect("resolve");
        assert_eq!(config.dst_dirs.len(), 1);
    }
}
