//! Domain types for the stub synchronizer.
//!
//! All path fields use `PathBuf`; byte spans are `Range<usize>` offsets into
//! the owning [`SourceUnit::content`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Operation extension naming the destination module an operation belongs to.
pub const MODULE_HINT_EXTENSION: &str = "x-rust-module";

/// Group name for operations that carry no tag.
pub const DEFAULT_TAG: &str = "notags";

// ---------------------------------------------------------------------------
// Contract side
// ---------------------------------------------------------------------------

/// HTTP verb of a contract operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    /// All verbs in the order OpenAPI path items list them.
    pub fn all() -> &'static [HttpMethod] {
        &[
            HttpMethod::Get,
            HttpMethod::Put,
            HttpMethod::Post,
            HttpMethod::Delete,
            HttpMethod::Options,
            HttpMethod::Head,
            HttpMethod::Patch,
            HttpMethod::Trace,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single operation parameter as documented by the contract.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    /// `query`, `path`, `header` or `cookie`.
    pub location: String,
    pub required: bool,
    /// Schema default, if the contract declares one.
    pub default: Option<serde_json::Value>,
    pub description: String,
}

/// One HTTP endpoint extracted from the contract. Immutable after load.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    /// `operationId` exactly as written in the contract.
    pub operation_id: String,
    /// Title-cased identifier used in generated docs (`translate` → `Translate`).
    pub name: String,
    /// Snake-cased identifier; unique per contract and equal to the Rust method name.
    pub method_name: String,
    pub http_method: HttpMethod,
    pub path: String,
    pub tags: Vec<String>,
    pub parameters: Vec<Parameter>,
    pub has_request_body: bool,
    pub summary: Option<String>,
    pub description: Option<String>,
    /// Every `x-*` key of the operation object.
    pub extensions: BTreeMap<String, serde_json::Value>,
}

impl Operation {
    /// First tag, trimmed; [`DEFAULT_TAG`] when absent or blank.
    pub fn primary_tag(&self) -> &str {
        self.tags
            .first()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TAG)
    }

    /// Destination module requested through [`MODULE_HINT_EXTENSION`].
    pub fn module_hint(&self) -> Option<&str> {
        self.extensions
            .get(MODULE_HINT_EXTENSION)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }

    /// Summary if present, otherwise description.
    pub fn doc_text(&self) -> &str {
        self.summary
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.description.as_deref())
            .unwrap_or("")
    }
}

// ---------------------------------------------------------------------------
// Source side
// ---------------------------------------------------------------------------

/// A single entry of a parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    /// `self`, `&self`, `&mut self`, … kept verbatim.
    Receiver(String),
    /// `pattern: ty`.
    Named { pattern: String, ty: String },
}

impl Param {
    pub fn is_receiver(&self) -> bool {
        matches!(self, Param::Receiver(_))
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Receiver(text) => f.write_str(text),
            Param::Named { pattern, ty } => write!(f, "{pattern}: {ty}"),
        }
    }
}

/// A method of the server trait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceMethod {
    pub name: String,
    pub is_async: bool,
    /// Generic parameter list including angle brackets, if any.
    pub generics: Option<String>,
    pub params: Vec<Param>,
    /// Return type text without the `->`.
    pub result: Option<String>,
    /// Zero-based position inside the trait body.
    pub position: usize,
}

/// The server trait plus the type inventory of the module that declares it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Interface {
    pub name: String,
    pub methods: Vec<InterfaceMethod>,
    /// Struct, enum and alias names defined next to the trait.
    pub types: BTreeSet<String>,
}

impl Interface {
    pub fn method(&self, name: &str) -> Option<&InterfaceMethod> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// The outer doc comment (`///` lines) attached to a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocComment {
    /// Comment text with markers stripped, joined by `\n`, trimmed.
    pub text: String,
    /// From the first `/` of the first line to the end of the last line (newline excluded).
    pub span: Range<usize>,
}

/// An already-implemented (or previously synthesized) controller method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub owner: String,
    pub name: String,
    pub params: Vec<Param>,
    pub result: Option<String>,
    pub doc: Option<DocComment>,
    /// From the first qualifier (`async`, `const`, ...) or `fn` through the
    /// generics; visibility is not part of it.
    pub head_span: Range<usize>,
    /// Parameter list through the end of the return type.
    pub signature_span: Range<usize>,
    pub body_span: Range<usize>,
    /// Leading whitespace of the declaration's first line.
    pub indent: String,
    /// Start of the line holding the first attribute or the `fn` itself.
    pub anchor: usize,
}

/// An inherent `impl` block of a controller type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplBlock {
    pub type_name: String,
    /// Offset of the block's closing `}`.
    pub close_brace: usize,
    pub methods: Vec<String>,
}

/// A parsed destination file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    pub path: PathBuf,
    pub content: String,
    /// Normalized tag derived from the file name.
    pub tag: String,
    /// Exported controller methods by method name.
    pub declarations: BTreeMap<String, Declaration>,
    /// Argument text of every top-level `use` declaration.
    pub imports: Vec<String>,
    pub defined_types: BTreeSet<String>,
    pub impl_blocks: Vec<ImplBlock>,
    /// End offset of the last top-level `use` declaration.
    pub last_import_end: Option<usize>,
    /// Offset just past inner docs/attributes (`//!`, `#![..]`) and the blank lines after them.
    pub preamble_end: usize,
}

impl SourceUnit {
    /// A unit for a file that does not exist yet.
    pub fn empty(path: PathBuf, tag: impl Into<String>) -> Self {
        Self {
            path,
            content: String::new(),
            tag: tag.into(),
            declarations: BTreeMap::new(),
            imports: vec![],
            defined_types: BTreeSet::new(),
            impl_blocks: vec![],
            last_import_end: None,
            preamble_end: 0,
        }
    }

    /// Rust module name of this file (its stem).
    pub fn module_name(&self) -> Option<String> {
        module_name_of(&self.path)
    }

    /// Whether a top-level `use` already brings `alias` into scope.
    ///
    /// Understands renames and one level of braces:
    /// `a::oapigen`, `a::x as oapigen`, `a::{oapigen, y}`, `a::oapigen::{self, T}`.
    pub fn imports_alias(&self, alias: &str) -> bool {
        self.imports.iter().any(|import| {
            let import = import.trim();
            match import.split_once("::{") {
                Some((prefix, rest)) => rest
                    .trim_end_matches('}')
                    .split(',')
                    .any(|item| use_item_binds(prefix, item.trim(), alias)),
                None => use_item_binds("", import, alias),
            }
        })
    }

    /// Whether the file declares the struct or any inherent impl of `type_name`.
    pub fn has_type(&self, type_name: &str) -> bool {
        self.defined_types.contains(type_name)
            || self.impl_blocks.iter().any(|b| b.type_name == type_name)
    }

    pub fn last_impl_block(&self, type_name: &str) -> Option<&ImplBlock> {
        self.impl_blocks.iter().rev().find(|b| b.type_name == type_name)
    }
}

/// Name bound by one `use` tree item; `prefix` is the path before a brace list.
fn use_item_binds(prefix: &str, item: &str, alias: &str) -> bool {
    if let Some((_, renamed)) = item.rsplit_once(" as ") {
        return renamed.trim() == alias;
    }
    let bound = match item.rsplit("::").next() {
        Some("self") => prefix.rsplit("::").next(),
        other => other,
    };
    bound.map(str::trim) == Some(alias)
}

/// File stem of `path` as a module name.
pub fn module_name_of(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
}

/// Everything the scanner found in one destination directory.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DirectoryListing {
    pub dir: PathBuf,
    pub units: Vec<SourceUnit>,
    /// Stems of test-only files (`*_test.rs`, `tests.rs`, …).
    pub test_modules: Vec<String>,
    /// Subdirectories that carry their own `mod.rs`.
    pub submodules: Vec<String>,
}

impl DirectoryListing {
    pub fn unit_for_tag(&self, tag: &str) -> Option<&SourceUnit> {
        self.units.iter().find(|u| u.tag == tag)
    }
}

// ---------------------------------------------------------------------------
// Merge side
// ---------------------------------------------------------------------------

/// An operation paired with the trait method that serves it.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundOperation {
    pub operation: Operation,
    pub method: InterfaceMethod,
}

/// The binding of a tag to its target file.
#[derive(Debug, Clone, PartialEq)]
pub struct TagGroup {
    /// Normalized tag.
    pub tag: String,
    pub operations: Vec<BoundOperation>,
    pub target_dir: PathBuf,
    pub target_path: PathBuf,
    pub existing: Option<SourceUnit>,
    pub type_name: String,
    pub module_hint: Option<String>,
}

impl TagGroup {
    pub fn is_new(&self) -> bool {
        self.existing.is_none()
    }
}

/// A `mod` line of an aggregator file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleEntry {
    pub name: String,
    pub public: bool,
    pub test_only: bool,
}

/// A controller held by an aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatorMember {
    pub type_name: String,
    pub field: String,
    /// Module the member is re-exported from; `None` for cross-directory members.
    pub module: Option<String>,
}

/// Another directory's aggregator embedded by the primary aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossReference {
    /// Fully qualified module path, e.g. `crate::admin`.
    pub module_path: String,
    pub type_name: String,
}

/// Everything needed to emit one aggregator file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatorSpec {
    pub dir: PathBuf,
    pub path: PathBuf,
    pub type_name: String,
    pub modules: Vec<ModuleEntry>,
    pub members: Vec<AggregatorMember>,
    pub cross_refs: Vec<CrossReference>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn operation(tags: &[&str]) -> Operation {
        Operation {
            operation_id: "translate".into(),
            name: "Translate".into(),
            method_name: "translate".into(),
            http_method: HttpMethod::Post,
            path: "/emoji/translate".into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            parameters: vec![],
            has_request_body: true,
            summary: None,
            description: Some("convert aliases".into()),
            extensions: BTreeMap::new(),
        }
    }

    #[test]
    fn http_method_display_is_upper_case() {
        assert_eq!(HttpMethod::Post.to_string(), "POST");
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn primary_tag_defaults_when_absent_or_blank() {
        assert_eq!(operation(&[]).primary_tag(), DEFAULT_TAG);
        assert_eq!(operation(&["  "]).primary_tag(), DEFAULT_TAG);
        assert_eq!(operation(&[" emoji ", "other"]).primary_tag(), "emoji");
    }

    #[test]
    fn doc_text_prefers_summary() {
        let mut op = operation(&["emoji"]);
        assert_eq!(op.doc_text(), "convert aliases");
        op.summary = Some("short".into());
        assert_eq!(op.doc_text(), "short");
    }

    #[test]
    fn module_hint_reads_extension() {
        let mut op = operation(&["emoji"]);
        assert_eq!(op.module_hint(), None);
        op.extensions.insert(
            MODULE_HINT_EXTENSION.into(),
            serde_json::Value::String("admin".into()),
        );
        assert_eq!(op.module_hint(), Some("admin"));
    }

    #[test]
    fn imports_alias_matches_last_segment_or_rename() {
        let mut unit = SourceUnit::empty(PathBuf::from("emoji.rs"), "emoji");
        assert!(!unit.imports_alias("oapigen"));
        unit.imports.push("crate::api::oapigen".into());
        assert!(unit.imports_alias("oapigen"));

        let mut renamed = SourceUnit::empty(PathBuf::from("emoji.rs"), "emoji");
        renamed.imports.push("crate::generated as oapigen".into());
        assert!(renamed.imports_alias("oapigen"));
        assert!(!renamed.imports_alias("generated"));

        let mut grouped = SourceUnit::empty(PathBuf::from("emoji.rs"), "emoji");
        grouped.imports.push("crate::{oapigen, util::Clock}".into());
        assert!(grouped.imports_alias("oapigen"));
        assert!(grouped.imports_alias("Clock"));

        let mut with_self = SourceUnit::empty(PathBuf::from("emoji.rs"), "emoji");
        with_self.imports.push("crate::oapigen::{self, TranslateRequestObject}".into());
        assert!(with_self.imports_alias("oapigen"));
        assert!(!with_self.imports_alias("crate"));
    }

    #[test]
    fn param_display() {
        let p = Param::Named {
            pattern: "request".into(),
            ty: "oapigen::TranslateRequestObject".into(),
        };
        assert_eq!(p.to_string(), "request: oapigen::TranslateRequestObject");
        assert_eq!(Param::Receiver("&self".into()).to_string(), "&self");
    }
}
