//! Locates the server trait in the contract-type module and inventories the
//! type names that module defines.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tree_sitter::Node;

use stubsync_core::{Interface, InterfaceMethod};

use crate::error::{io_err, SyncError};
use crate::syntax;

/// Scan every `.rs` file directly inside `dir` for `pub trait <name>`.
///
/// Type names collected from all files are those declared at top level
/// (`struct`, `enum`, `type`, `union`, `trait`) plus names re-exported with
/// `pub use`; they are the names a controller must qualify with the module
/// alias.
pub fn scan_interface(dir: &Path, name: &str) -> Result<Interface, SyncError> {
    let not_found = || SyncError::InterfaceNotFound {
        name: name.to_string(),
        dir: dir.to_path_buf(),
    };
    if !dir.is_dir() {
        return Err(not_found());
    }

    let mut types = BTreeSet::new();
    let mut methods: Option<Vec<InterfaceMethod>> = None;

    for path in rust_files(dir)? {
        let source = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        let tree = syntax::parse_rust(&path, &source)?;
        let root = tree.root_node();
        let mut cursor = root.walk();
        for item in root.named_children(&mut cursor) {
            match item.kind() {
                "struct_item" | "enum_item" | "type_item" | "union_item" => {
                    if let Some(n) = syntax::field_text(item, "name", &source) {
                        types.insert(n.to_string());
                    }
                }
                "trait_item" => {
                    let Some(trait_name) = syntax::field_text(item, "name", &source) else {
                        continue;
                    };
                    types.insert(trait_name.to_string());
                    if trait_name != name || methods.is_some() {
                        continue;
                    }
                    if !syntax::is_public(item, &source) {
                        tracing::warn!(
                            "trait `{name}` in {} is not public; ignoring it",
                            path.display()
                        );
                        continue;
                    }
                    tracing::debug!("interface `{name}` found in {}", path.display());
                    methods = Some(trait_methods(item, &source));
                }
                "use_declaration" if syntax::is_public(item, &source) => {
                    if let Some(arg) = syntax::field_text(item, "argument", &source) {
                        types.extend(reexported_names(arg));
                    }
                }
                _ => {}
            }
        }
    }

    let methods = methods.ok_or_else(not_found)?;
    Ok(Interface {
        name: name.to_string(),
        methods,
        types,
    })
}

fn rust_files(dir: &Path) -> Result<Vec<PathBuf>, SyncError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
        let path = entry.map_err(|e| io_err(dir, e))?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("rs") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn trait_methods(trait_node: Node<'_>, source: &str) -> Vec<InterfaceMethod> {
    let Some(body) = trait_node.child_by_field_name("body") else {
        return vec![];
    };
    let mut cursor = body.walk();
    let methods = body
        .named_children(&mut cursor)
        .filter(|n| matches!(n.kind(), "function_signature_item" | "function_item"))
        .enumerate()
        .filter_map(|(position, f)| {
            Some(InterfaceMethod {
                name: syntax::field_text(f, "name", source)?.to_string(),
                is_async: syntax::is_async(f, source),
                generics: syntax::field_text(f, "type_parameters", source).map(String::from),
                params: f
                    .child_by_field_name("parameters")
                    .map(|p| syntax::params(p, source))
                    .unwrap_or_default(),
                result: syntax::field_text(f, "return_type", source).map(String::from),
                position,
            })
        })
        .collect();
    methods
}

/// Names bound by a `pub use` argument: `a::B`, `a::B as C`, `a::{B, C as D}`.
fn reexported_names(argument: &str) -> Vec<String> {
    let items: Vec<&str> = match argument.split_once('{') {
        Some((_, list)) => list.trim_end_matches('}').split(',').collect(),
        None => vec![argument],
    };
    items
        .into_iter()
        .filter_map(|item| {
            let item = item.trim();
            let bound = match item.rsplit_once(" as ") {
                Some((_, renamed)) => renamed.trim(),
                None => item.rsplit("::").next().unwrap_or(item),
            };
            (bound != "self" && bound != "*" && stubsync_core::naming::is_identifier(bound))
                .then(|| bound.to_string())
        })
        .collect()
}
