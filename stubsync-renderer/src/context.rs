//! Rendering payloads, one per template.

use serde::Serialize;

use stubsync_core::{
    AggregatorMember, AggregatorSpec, CrossReference, ModuleEntry, Operation, Parameter,
};

use crate::error::RenderError;

/// A single controller method.
#[derive(Debug, Clone, Serialize)]
pub struct MethodCtx {
    /// Leading whitespace of every emitted line.
    pub indent: String,
    /// Doc lines without the `///` marker; empty entries render as a bare `///`.
    pub doc_lines: Vec<String>,
    /// Everything before the opening brace, e.g. `pub async fn translate(&self, ..) -> R`.
    pub signature: String,
    /// Single-line zero-value body, `None` for unit-returning methods.
    pub body: Option<String>,
}

/// An `impl` block appended to a file, optionally preceded by the struct itself.
#[derive(Debug, Clone, Serialize)]
pub struct TypeBlockCtx {
    pub type_name: String,
    /// Emit `struct` + `new()` as well as the methods.
    pub synthesize: bool,
    /// Already rendered methods (see [`MethodCtx`]).
    pub methods: Vec<String>,
}

/// A directory's `mod.rs`.
#[derive(Debug, Clone, Serialize)]
pub struct AggregatorCtx {
    pub type_name: String,
    pub modules: Vec<ModuleEntry>,
    pub members: Vec<AggregatorMember>,
    pub cross_refs: Vec<CrossReference>,
}

impl From<&AggregatorSpec> for AggregatorCtx {
    fn from(spec: &AggregatorSpec) -> Self {
        AggregatorCtx {
            type_name: spec.type_name.clone(),
            modules: spec.modules.clone(),
            members: spec.members.clone(),
            cross_refs: spec.cross_refs.clone(),
        }
    }
}

pub(crate) fn to_tera_context<T: Serialize>(ctx: &T) -> Result<tera::Context, RenderError> {
    tera::Context::from_serialize(ctx).map_err(RenderError::from)
}

// ---------------------------------------------------------------------------
// Endpoint documentation
// ---------------------------------------------------------------------------

/// Doc lines describing `op`, in the order they are written above the method.
///
/// ```text
/// Translate is endpoint of POST /emoji/translate
/// convert aliases to emoji
///
/// * query :limit default=10                    -- "max results"
/// * body  :requestBody                         -- "need: oapigen::TranslateJsonBody"
/// ```
///
/// `alias` is the contract namespace alias used to name the body type.
pub fn endpoint_doc_lines(op: &Operation, alias: &str) -> Vec<String> {
    let mut lines = vec![format!(
        "{} is endpoint of {} {}",
        op.name, op.http_method, op.path
    )];
    lines.extend(
        op.doc_text()
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .map(String::from),
    );

    if !op.parameters.is_empty() || op.has_request_body {
        lines.push(String::new());
        for param in &op.parameters {
            lines.push(param_line(&param.location, &param_label(param), &param.description));
        }
        if op.has_request_body {
            let need = format!("need: {alias}::{}JsonBody", op.name);
            lines.push(param_line("body", "requestBody", &need));
        }
    }
    lines
}

/// The doc lines joined the way a scanned doc comment's text is.
pub fn endpoint_doc_text(op: &Operation, alias: &str) -> String {
    endpoint_doc_lines(op, alias).join("\n")
}

fn param_line(location: &str, label: &str, description: &str) -> String {
    format!("* {location:<6}:{label:<35} -- {description:?}")
}

fn param_label(param: &Parameter) -> String {
    match &param.default {
        Some(serde_json::Value::String(s)) => format!("{} default={s:?}", param.name),
        Some(value) => format!("{} default={value}", param.name),
        None if !param.required => format!("{} default=None", param.name),
        None => param.name.clone(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
