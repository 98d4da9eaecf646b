//! Per-tag merge of contract-derived methods into a controller file.
//!
//! Existing files are edited through a [`PatchSet`] against their original
//! bytes; only doc-comment spans, signature spans and insertion points are
//! touched, never a method body.

use std::path::PathBuf;

use stubsync_core::{Declaration, Interface, SourceUnit, TagGroup};
use stubsync_renderer::{endpoint_doc_lines, MethodCtx, Renderer, TypeBlockCtx};

use crate::error::SyncError;
use crate::patch::PatchSet;
use crate::signature::{canonical, MethodSignature};

const METHOD_INDENT: &str = "    ";

/// Everything a merge needs besides the group itself.
pub struct MergeContext<'a> {
    pub interface: &'a Interface,
    /// Full module path of the contract types, e.g. `crate::oapigen`.
    pub contract_module: &'a str,
    /// Last segment of `contract_module`.
    pub alias: &'a str,
    pub renderer: &'a Renderer,
}

/// Counters for one merged file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub added: usize,
    pub docs_updated: usize,
    pub signatures_updated: usize,
}

/// New content for one controller file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub path: PathBuf,
    pub dir: PathBuf,
    pub tag: String,
    pub type_name: String,
    /// `None` when the file does not exist yet.
    pub original: Option<String>,
    pub content: String,
    pub stats: MergeStats,
}

impl MergeOutcome {
    pub fn is_new(&self) -> bool {
        self.original.is_none()
    }

    pub fn is_dirty(&self) -> bool {
        self.original.as_deref() != Some(self.content.as_str())
    }
}

/// Merge one tag group.
pub fn merge_group(group: &TagGroup, ctx: &MergeContext<'_>) -> Result<MergeOutcome, SyncError> {
    let unit = match &group.existing {
        Some(unit) => unit.clone(),
        None => SourceUnit::empty(group.target_path.clone(), group.tag.clone()),
    };
    let src = unit.content.as_str();

    let mut edits = PatchSet::new();
    let mut stats = MergeStats::default();
    let mut new_methods = Vec::new();

    for bound in &group.operations {
        let op = &bound.operation;
        let doc_lines = endpoint_doc_lines(op, ctx.alias);
        let existing = unit.declarations.get(&op.method_name);
        let sig = MethodSignature::build(&bound.method, existing, &ctx.interface.types, ctx.alias);

        match existing {
            Some(decl) => {
                if update_doc(&mut edits, decl, &doc_lines) {
                    stats.docs_updated += 1;
                }
                let mut drifted = false;
                if canonical(&src[decl.head_span.clone()]) != canonical(&sig.head) {
                    edits.replace(decl.head_span.clone(), sig.head.clone());
                    drifted = true;
                }
                if canonical(&src[decl.signature_span.clone()]) != canonical(&sig.tail) {
                    edits.replace(decl.signature_span.clone(), sig.tail.clone());
                    drifted = true;
                }
                if drifted {
                    stats.signatures_updated += 1;
                }
            }
            None => {
                new_methods.push(ctx.renderer.render_method(&MethodCtx {
                    indent: METHOD_INDENT.to_string(),
                    doc_lines,
                    signature: sig.full(),
                    body: sig.zero_body(),
                })?);
                stats.added += 1;
            }
        }
    }

    let has_type = unit.has_type(&group.type_name);
    let mut append = None;
    match unit.last_impl_block(&group.type_name) {
        Some(block) if !new_methods.is_empty() => {
            let at = block.close_brace;
            let text = format!(
                "{}{}\n",
                separator_before(&src[..at]),
                new_methods.join("\n\n")
            );
            edits.insert(at, text);
        }
        _ if !has_type || !new_methods.is_empty() => {
            let block = ctx.renderer.render_type_block(&TypeBlockCtx {
                type_name: group.type_name.clone(),
                synthesize: !has_type,
                methods: std::mem::take(&mut new_methods),
            })?;
            let lead = if src.is_empty() {
                ""
            } else if src.ends_with('\n') {
                "\n"
            } else {
                "\n\n"
            };
            append = Some(format!("{lead}{block}\n"));
        }
        _ => {}
    }

    let changes = !edits.is_empty() || append.is_some();
    if (changes || group.is_new()) && !unit.imports_alias(ctx.alias) {
        let line = format!("use {};", ctx.contract_module);
        match unit.last_import_end {
            Some(end) => edits.insert(end, format!("\n{line}")),
            None => edits.insert(unit.preamble_end, format!("{line}\n\n")),
        }
    }
    if let Some(text) = append {
        edits.insert(src.len(), text);
    }

    edits.set_line_ending(line_ending(src));
    let content = edits.apply(src).map_err(|o| SyncError::PatchConflict {
        path: group.target_path.clone(),
        offset: o.offset,
    })?;

    Ok(MergeOutcome {
        path: group.target_path.clone(),
        dir: group.target_dir.clone(),
        tag: group.tag.clone(),
        type_name: group.type_name.clone(),
        original: group.existing.as_ref().map(|u| u.content.clone()),
        content,
        stats,
    })
}

/// Replace or insert the doc comment of `decl`; `false` when already current.
fn update_doc(edits: &mut PatchSet, decl: &Declaration, lines: &[String]) -> bool {
    let wanted = lines.join("\n");
    let current = decl.doc.as_ref().map(|d| d.text.as_str()).unwrap_or("");
    if current == wanted.trim() {
        return false;
    }

    let rendered: Vec<String> = lines
        .iter()
        .map(|l| if l.is_empty() { "///".to_string() } else { format!("/// {l}") })
        .collect();
    let joined = rendered.join(&format!("\n{}", decl.indent));
    match &decl.doc {
        Some(doc) => edits.replace(doc.span.clone(), joined),
        None => edits.insert(decl.anchor, format!("{}{joined}\n", decl.indent)),
    }
    true
}

/// Line break used by `src`, judged by its first line; `\n` for empty files.
fn line_ending(src: &str) -> &'static str {
    match src.find('\n') {
        Some(i) if src[..i].ends_with('\r') => "\r\n",
        _ => "\n",
    }
}

/// Newlines to put between existing text and methods inserted before `}`.
fn separator_before(preceding: &str) -> &'static str {
    let needs_newline = !preceding.ends_with('\n');
    let needs_blank = !preceding.trim_end().ends_with('{');
    match (needs_newline, needs_blank) {
        (true, true) => "\n\n",
        (true, false) | (false, true) => "\n",
        (false, false) => "",
    }
}
