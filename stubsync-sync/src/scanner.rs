//! Destination tree scanning.
//!
//! Every non-test `.rs` file of a destination directory is parsed into a
//! [`SourceUnit`]: its exported controller methods, its top-level imports and
//! type names, and the byte offsets edits are later anchored on.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use tree_sitter::Node;

use stubsync_core::naming::{TagOverrides, CONTROLLER_SUFFIX};
use stubsync_core::{Declaration, DirectoryListing, DocComment, ImplBlock, SourceUnit};

use crate::error::{io_err, SyncError};
use crate::syntax::{self, text};

const AGGREGATOR_FILE: &str = "mod.rs";

/// Whether a file stem names a test-only module.
pub fn is_test_module(stem: &str) -> bool {
    stem == "tests" || stem == "test" || stem.ends_with("_test") || stem.ends_with("_tests")
}

/// Scan one destination directory. A missing directory scans as empty.
pub fn scan_directory(dir: &Path, overrides: &TagOverrides) -> Result<DirectoryListing, SyncError> {
    let mut listing = DirectoryListing {
        dir: dir.to_path_buf(),
        ..Default::default()
    };
    if !dir.is_dir() {
        tracing::debug!("destination {} does not exist yet", dir.display());
        return Ok(listing);
    }

    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
        entries.push(entry.map_err(|e| io_err(dir, e))?.path());
    }
    entries.sort();

    for path in entries {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()).map(String::from) else {
            continue;
        };
        if path.is_dir() {
            if path.join(AGGREGATOR_FILE).is_file() {
                listing.submodules.push(stem);
            }
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some("rs")
            || path.file_name().and_then(|n| n.to_str()) == Some(AGGREGATOR_FILE)
        {
            continue;
        }
        if is_test_module(&stem) {
            listing.test_modules.push(stem);
            continue;
        }

        let content = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        let tag = overrides.tag_from_file_name(&path);
        tracing::debug!("scan {} (tag {tag})", path.display());
        listing.units.push(parse_unit(&path, content, tag)?);
    }
    Ok(listing)
}

/// Build the structural model of one controller file.
pub fn parse_unit(path: &Path, content: String, tag: String) -> Result<SourceUnit, SyncError> {
    let tree = syntax::parse_rust(path, &content)?;
    let root = tree.root_node();
    let src = content.as_str();

    let mut declarations = BTreeMap::new();
    let mut imports = Vec::new();
    let mut defined_types = BTreeSet::new();
    let mut impl_blocks = Vec::new();
    let mut last_import_end = None;
    let mut preamble_end = 0;
    let mut in_preamble = true;

    let mut cursor = root.walk();
    for item in root.named_children(&mut cursor) {
        let kind = item.kind();
        if in_preamble {
            if kind == "inner_attribute_item" || is_inner_doc(item, src) {
                preamble_end = syntax::skip_blank_lines(src, item.end_byte().saturating_sub(1));
                continue;
            }
            in_preamble = false;
        }

        match kind {
            "use_declaration" => {
                if let Some(arg) = syntax::field_text(item, "argument", src) {
                    imports.push(arg.to_string());
                }
                last_import_end = Some(item.end_byte());
            }
            "struct_item" | "enum_item" | "type_item" => {
                if let Some(name) = syntax::field_text(item, "name", src) {
                    defined_types.insert(name.to_string());
                }
            }
            "impl_item" if item.child_by_field_name("trait").is_none() => {
                let Some(type_name) = syntax::impl_type_name(item, src) else {
                    continue;
                };
                if !type_name.ends_with(CONTROLLER_SUFFIX) {
                    continue;
                }
                let Some(body) = item.child_by_field_name("body") else {
                    continue;
                };
                let mut methods = Vec::new();
                let mut body_cursor = body.walk();
                for f in body.named_children(&mut body_cursor) {
                    if f.kind() != "function_item" || !syntax::is_public(f, src) {
                        continue;
                    }
                    let decl = declaration(path, &type_name, f, src)?;
                    methods.push(decl.name.clone());
                    declarations.insert(decl.name.clone(), decl);
                }
                impl_blocks.push(ImplBlock {
                    type_name,
                    close_brace: body.end_byte().saturating_sub(1),
                    methods,
                });
            }
            _ => {}
        }
    }

    Ok(SourceUnit {
        path: path.to_path_buf(),
        content,
        tag,
        declarations,
        imports,
        defined_types,
        impl_blocks,
        last_import_end,
        preamble_end,
    })
}

fn is_inner_doc(node: Node<'_>, src: &str) -> bool {
    match node.kind() {
        "line_comment" => text(node, src).starts_with("//!"),
        "block_comment" => text(node, src).starts_with("/*!"),
        _ => false,
    }
}

fn is_outer_doc(node: Node<'_>, src: &str) -> bool {
    let t = text(node, src);
    node.kind() == "line_comment" && t.starts_with("///") && !t.starts_with("////")
}

fn declaration(
    path: &Path,
    owner: &str,
    f: Node<'_>,
    src: &str,
) -> Result<Declaration, SyncError> {
    let name = syntax::field_text(f, "name", src).unwrap_or_default().to_string();
    let params_node = f.child_by_field_name("parameters");
    let result_node = f.child_by_field_name("return_type");
    let signature_start = params_node.map(|p| p.start_byte()).unwrap_or(f.start_byte());
    let signature_end = result_node
        .or(params_node)
        .map(|n| n.end_byte())
        .unwrap_or(signature_start);
    let body_span = f
        .child_by_field_name("body")
        .map(|b| b.byte_range())
        .unwrap_or(f.end_byte()..f.end_byte());

    let (doc, anchor) = leading_doc(path, &name, f, src)?;
    let head_span = head_span(f).unwrap_or(signature_start..signature_start);

    Ok(Declaration {
        owner: owner.to_string(),
        name,
        params: params_node.map(|p| syntax::params(p, src)).unwrap_or_default(),
        result: result_node.map(|r| text(r, src).to_string()),
        doc,
        head_span,
        signature_span: signature_start..signature_end,
        body_span,
        indent: syntax::indent_at(src, f.start_byte()),
        anchor,
    })
}

/// `async fn name<T>` of `pub async fn name<T>(..)`.
fn head_span(f: Node<'_>) -> Option<std::ops::Range<usize>> {
    let mut cursor = f.walk();
    let start = f
        .children(&mut cursor)
        .find(|c| c.kind() != "visibility_modifier")?
        .start_byte();
    let end = f
        .child_by_field_name("type_parameters")
        .or_else(|| f.child_by_field_name("name"))?
        .end_byte();
    Some(start..end)
}

/// The single outer doc group above `f` and the offset new docs go at.
///
/// Attributes and plain comments between `f` and its doc lines are skipped.
/// Anything that interrupts a run of doc lines (an attribute or a plain
/// comment) starts a new group, and more than one group is rejected.
fn leading_doc(
    path: &Path,
    name: &str,
    f: Node<'_>,
    src: &str,
) -> Result<(Option<DocComment>, usize), SyncError> {
    let mut groups: Vec<Vec<Node<'_>>> = vec![vec![]];
    let mut first_attribute = None;
    let mut node = f.prev_sibling();
    while let Some(n) = node {
        if is_outer_doc(n, src) {
            if let Some(group) = groups.last_mut() {
                group.push(n);
            }
        } else if matches!(n.kind(), "attribute_item" | "line_comment" | "block_comment") {
            if n.kind() == "attribute_item" {
                first_attribute = Some(n);
            }
            if groups.last().is_some_and(|g| !g.is_empty()) {
                groups.push(vec![]);
            }
        } else {
            break;
        }
        node = n.prev_sibling();
    }
    groups.retain(|g| !g.is_empty());

    if groups.len() > 1 {
        let line = groups[groups.len() - 1]
            .last()
            .map(|n| n.start_position().row + 1)
            .unwrap_or(1);
        return Err(SyncError::SourceParse {
            path: path.to_path_buf(),
            line,
            message: format!("`{name}` has more than one doc comment group"),
        });
    }

    let anchor_node = first_attribute.unwrap_or(f);
    let anchor_node = match groups.first() {
        // Lines were collected bottom-up; the last one is the topmost.
        Some(group) => group.last().copied().unwrap_or(anchor_node),
        None => anchor_node,
    };
    let anchor = syntax::line_start(src, anchor_node.start_byte());

    let doc = groups.first().map(|group| {
        let top = group.last().copied().unwrap_or(f);
        let bottom = group.first().copied().unwrap_or(f);
        let lines: Vec<&str> = group
            .iter()
            .rev()
            .map(|n| doc_line(text(*n, src)))
            .collect();
        DocComment {
            text: lines.join("\n").trim().to_string(),
            span: top.start_byte()..bottom.start_byte() + text(bottom, src).trim_end().len(),
        }
    });
    Ok((doc, anchor))
}

/// `/// text` → `text`; one leading space is part of the marker.
fn doc_line(raw: &str) -> &str {
    let body = raw.trim_start_matches("///");
    body.strip_prefix(' ').unwrap_or(body).trim_end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::PathBuf;
    use stubsync_core::Param;
    use tempfile::TempDir;

    const EMOJI: &str = r#"//! Emoji endpoints.

use crate::oapigen;

#[derive(Debug, Default)]
pub struct EmojiController {}

impl EmojiController {
    /// Translate is endpoint of POST /emoji/translate
    ///
    /// * body  :requestBody
    #[tracing::instrument(skip(self))]
    pub async fn translate(
        &self,
        req: oapigen::TranslateRequestObject,
    ) -> Result<oapigen::TranslateResponseObject, oapigen::Error> {
        todo!()
    }

    pub fn suggest(&self) {}

    fn helper(&self) {}
}

impl Drop for EmojiController {
    fn drop(&mut self) {}
}
"#;

    fn unit(src: &str) -> Result<SourceUnit, SyncError> {
        parse_unit(Path::new("emoji.rs"), src.to_string(), "emoji".to_string())
    }

    #[test]
    fn collects_public_inherent_methods() {
        let unit = unit(EMOJI).unwrap();
        let names: Vec<&str> = unit.declarations.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["suggest", "translate"]);
        assert_eq!(unit.impl_blocks.len(), 1);
        assert_eq!(unit.impl_blocks[0].type_name, "EmojiController");
        assert_eq!(&EMOJI[unit.impl_blocks[0].close_brace..][..2], "}\n");
        assert!(unit.defined_types.contains("EmojiController"));
        assert_eq!(unit.imports, vec!["crate::oapigen".to_string()]);
        assert!(unit.imports_alias("oapigen"));
    }

    #[test]
    fn declaration_spans_and_doc() {
        let unit = unit(EMOJI).unwrap();
        let d = &unit.declarations["translate"];
        assert_eq!(d.owner, "EmojiController");
        assert_eq!(d.indent, "    ");
        assert_eq!(
            d.params[1],
            Param::Named {
                pattern: "req".into(),
                ty: "oapigen::TranslateRequestObject".into()
            }
        );

        let sig = &EMOJI[d.signature_span.clone()];
        assert!(sig.starts_with("(\n        &self,"));
        assert!(sig.ends_with("oapigen::Error>"));
        assert_eq!(&EMOJI[d.body_span.clone()], "{\n        todo!()\n    }");

        let doc = d.doc.as_ref().unwrap();
        assert_eq!(
            doc.text,
            "Translate is endpoint of POST /emoji/translate\n\n* body  :requestBody"
        );
        assert!(EMOJI[doc.span.clone()].starts_with("/// Translate"));
        assert!(EMOJI[doc.span.clone()].ends_with("/// * body  :requestBody"));
        assert_eq!(&EMOJI[d.anchor..d.anchor + 7], "    ///");
    }

    #[test]
    fn anchor_without_doc_is_first_attribute_line() {
        let src = "impl AController {\n    #[inline]\n    pub fn a(&self) {}\n}\n";
        let unit = unit(src).unwrap();
        let d = &unit.declarations["a"];
        assert!(d.doc.is_none());
        assert_eq!(&src[d.anchor..], "    #[inline]\n    pub fn a(&self) {}\n}\n");
    }

    #[test]
    fn split_doc_groups_are_rejected() {
        let src = "impl AController {\n    /// one\n    #[inline]\n    /// two\n    pub fn a(&self) {}\n}\n";
        match unit(src).unwrap_err() {
            SyncError::SourceParse { message, .. } => assert!(message.contains("`a`")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn plain_comment_inside_doc_run_splits_it() {
        let src = "impl AController {\n    /// old\n    // NOTE: keep me\n    /// more\n    pub fn a(&self) {}\n}\n";
        assert!(matches!(unit(src).unwrap_err(), SyncError::SourceParse { .. }));
    }

    #[test]
    fn plain_comment_between_doc_and_fn_is_not_part_of_doc() {
        let src = "impl AController {\n    /// doc\n    // NOTE: keep me\n    pub fn a(&self) {}\n}\n";
        let parsed = unit(src).unwrap();
        let doc = parsed.declarations["a"].doc.clone().unwrap();
        assert_eq!(doc.text, "doc");
        assert_eq!(&src[doc.span], "/// doc");
    }

    #[test]
    fn crlf_doc_span_stops_before_carriage_return() {
        let src = "impl AController {\r\n    /// one\r\n    /// two\r\n    pub fn a(&self) {}\r\n}\r\n";
        let parsed = unit(src).unwrap();
        let doc = parsed.declarations["a"].doc.clone().unwrap();
        assert_eq!(doc.text, "one\ntwo");
        assert_eq!(&src[doc.span], "/// one\r\n    /// two");
    }

    #[test]
    fn head_span_skips_visibility() {
        let src = "impl AController {\n    pub(crate) async fn a<T>(&self) {}\n    pub fn b(&self) {}\n}\n";
        let parsed = unit(src).unwrap();
        assert_eq!(&src[parsed.declarations["a"].head_span.clone()], "async fn a<T>");
        assert_eq!(&src[parsed.declarations["b"].head_span.clone()], "fn b");
    }

    #[test]
    fn preamble_and_import_anchors() {
        let src = "//! docs\n#![allow(dead_code)]\n\nuse a::b;\nuse c::d;\n\nfn x() {}\n";
        let parsed = unit(src).unwrap();
        assert_eq!(&src[parsed.preamble_end..parsed.preamble_end + 3], "use");
        assert_eq!(
            &src[..parsed.last_import_end.unwrap()],
            "//! docs\n#![allow(dead_code)]\n\nuse a::b;\nuse c::d;"
        );

        let bare = unit("fn x() {}\n").unwrap();
        assert_eq!(bare.preamble_end, 0);
        assert_eq!(bare.last_import_end, None);
    }

    #[test]
    fn syntax_errors_are_fatal() {
        assert!(matches!(
            unit("impl AController {\n    pub fn a(&self {\n}\n").unwrap_err(),
            SyncError::SourceParse { .. }
        ));
    }

    #[test]
    fn directory_scan_classifies_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("emoji.rs"), EMOJI).unwrap();
        fs::write(dir.path().join("growth_topic.rs"), "").unwrap();
        fs::write(dir.path().join("emoji_test.rs"), "not rust at all {").unwrap();
        fs::write(dir.path().join("mod.rs"), "mod emoji;").unwrap();
        fs::write(dir.path().join("README.md"), "# hi").unwrap();
        fs::create_dir(dir.path().join("v2")).unwrap();
        fs::write(dir.path().join("v2").join("mod.rs"), "").unwrap();
        fs::create_dir(dir.path().join("fixtures")).unwrap();

        let listing = scan_directory(dir.path(), &TagOverrides::default()).unwrap();
        let tags: Vec<&str> = listing.units.iter().map(|u| u.tag.as_str()).collect();
        assert_eq!(tags, vec!["emoji", "topic"]);
        assert_eq!(listing.test_modules, vec!["emoji_test".to_string()]);
        assert_eq!(listing.submodules, vec!["v2".to_string()]);
    }

    #[test]
    fn missing_directory_scans_empty() {
        let listing =
            scan_directory(&PathBuf::from("/nonexistent/stubsync"), &TagOverrides::default())
                .unwrap();
        assert!(listing.units.is_empty());
    }

    #[test]
    fn test_module_names() {
        assert!(is_test_module("tests"));
        assert!(is_test_module("emoji_test"));
        assert!(is_test_module("emoji_tests"));
        assert!(!is_test_module("testing"));
        assert!(!is_test_module("emoji"));
    }
}
