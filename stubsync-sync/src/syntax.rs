//! Thin helpers over tree-sitter-rust shared by the scanners.

use std::path::Path;

use tree_sitter::{Node, Parser, Tree};

use stubsync_core::Param;

use crate::error::SyncError;

/// Parse `source`, failing on the first syntax error.
pub(crate) fn parse_rust(path: &Path, source: &str) -> Result<Tree, SyncError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_rust::LANGUAGE.into())
        .map_err(|e| SyncError::Grammar(e.to_string()))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| SyncError::SourceParse {
            path: path.to_path_buf(),
            line: 1,
            message: "parser produced no tree".to_string(),
        })?;

    let root = tree.root_node();
    if root.has_error() {
        let bad = first_error(root).unwrap_or(root);
        let snippet: String = text(bad, source).chars().take(40).collect();
        let message = if bad.is_missing() {
            format!("syntax error: missing `{}`", bad.kind())
        } else {
            format!("syntax error near `{}`", snippet.trim())
        };
        return Err(SyncError::SourceParse {
            path: path.to_path_buf(),
            line: bad.start_position().row + 1,
            message,
        });
    }
    Ok(tree)
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

pub(crate) fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    &source[node.byte_range()]
}

pub(crate) fn field_text<'s>(node: Node<'_>, field: &str, source: &'s str) -> Option<&'s str> {
    node.child_by_field_name(field).map(|n| text(n, source))
}

/// Whether a `function_item` / `function_signature_item` carries `async`.
pub(crate) fn is_async(node: Node<'_>, source: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .filter(|c| c.kind() == "function_modifiers")
        .any(|m| text(m, source).split_whitespace().any(|w| w == "async"));
    found
}

/// Whether an item is declared `pub` (any `pub(...)` form counts).
pub(crate) fn is_public(node: Node<'_>, source: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|c| c.kind() == "visibility_modifier" && text(c, source).starts_with("pub"));
    found
}

/// Entries of a `parameters` node.
pub(crate) fn params(node: Node<'_>, source: &str) -> Vec<Param> {
    let mut cursor = node.walk();
    let params = node
        .named_children(&mut cursor)
        .filter_map(|child| match child.kind() {
            "self_parameter" => Some(Param::Receiver(text(child, source).to_string())),
            "parameter" => Some(Param::Named {
                pattern: field_text(child, "pattern", source).unwrap_or("_").to_string(),
                ty: field_text(child, "type", source).unwrap_or("_").to_string(),
            }),
            _ => None,
        })
        .collect();
    params
}

/// Name of the type an `impl` block is for: `Foo`, `Foo<T>` and `a::Foo` → `Foo`.
pub(crate) fn impl_type_name(impl_node: Node<'_>, source: &str) -> Option<String> {
    let ty = impl_node.child_by_field_name("type")?;
    let named = match ty.kind() {
        "generic_type" => ty.child_by_field_name("type")?,
        _ => ty,
    };
    let name = match named.kind() {
        "scoped_type_identifier" => named.child_by_field_name("name")?,
        _ => named,
    };
    Some(text(name, source).to_string())
}

// ---------------------------------------------------------------------------
// Line arithmetic
// ---------------------------------------------------------------------------

/// Offset of the first byte of the line holding `offset`.
pub(crate) fn line_start(source: &str, offset: usize) -> usize {
    source[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

/// Offset of the `\n` ending the line holding `offset` (or end of input).
pub(crate) fn line_end(source: &str, offset: usize) -> usize {
    source[offset..]
        .find('\n')
        .map(|i| offset + i)
        .unwrap_or(source.len())
}

/// Whitespace between the line start and `offset`; empty if code precedes it.
pub(crate) fn indent_at(source: &str, offset: usize) -> String {
    let prefix = &source[line_start(source, offset)..offset];
    if prefix.chars().all(|c| c == ' ' || c == '\t') {
        prefix.to_string()
    } else {
        String::new()
    }
}

/// Advance past the rest of the current line and any following blank lines.
pub(crate) fn skip_blank_lines(source: &str, mut offset: usize) -> usize {
    offset = (line_end(source, offset) + 1).min(source.len());
    while offset < source.len() {
        let end = line_end(source, offset);
        if !source[offset..end].trim().is_empty() {
            break;
        }
        offset = (end + 1).min(source.len());
    }
    offset
}
