//! stubsync core library: the domain model shared by every stage.
//!
//! Public API surface:
//! - [`types`]: operations, declarations, source units, tag groups
//! - [`naming`]: pure tag/identifier casing transforms
//! - [`config`]: [`SyncConfig`] and its YAML/CLI layering
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod naming;
pub mod types;

pub use config::{PartialConfig, SyncConfig};
pub use error::ConfigError;
pub use types::{
    AggregatorMember, AggregatorSpec, BoundOperation, CrossReference, Declaration,
    DirectoryListing, DocComment, HttpMethod, ImplBlock, Interface, InterfaceMethod, ModuleEntry,
    Operation, Param, Parameter, SourceUnit, TagGroup,
};
pub use types::module_name_of;
