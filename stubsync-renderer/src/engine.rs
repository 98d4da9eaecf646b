//! Tera rendering engine: [`TemplateEngine`] and the typed [`Renderer`] on top.
//!
//! | Template             | Produces                                        |
//! |----------------------|-------------------------------------------------|
//! | `method.rs.tera`     | one controller method with its doc comment      |
//! | `type_block.rs.tera` | an appended `impl` block (plus struct + `new`)  |
//! | `aggregator.rs.tera` | a destination directory's `mod.rs`              |

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tera::Tera;

use crate::context::{to_tera_context, AggregatorCtx, MethodCtx, TypeBlockCtx};
use crate::error::RenderError;

pub const METHOD_TEMPLATE: &str = "method.rs.tera";
pub const TYPE_BLOCK_TEMPLATE: &str = "type_block.rs.tera";
pub const AGGREGATOR_TEMPLATE: &str = "aggregator.rs.tera";

// ---------------------------------------------------------------------------
// Embedded templates, baked into the binary via include_str!
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[
    (METHOD_TEMPLATE, include_str!("templates/method.rs.tera")),
    (TYPE_BLOCK_TEMPLATE, include_str!("templates/type_block.rs.tera")),
    (AGGREGATOR_TEMPLATE, include_str!("templates/aggregator.rs.tera")),
];

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io { path: path.into(), source }
}

fn normalize_template_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").to_lowercase()
}

fn load_user_templates(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut templates = Vec::new();
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("tera") {
            continue;
        }
        let rel = path.strip_prefix(dir).unwrap_or(path.as_path());
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        templates.push((normalize_template_name(rel), contents));
    }
    Ok(templates)
}

fn build_tera(user_template_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let mut templates: HashMap<String, String> = HashMap::new();
    for (name, content) in TPLS {
        templates.insert(normalize_template_name(Path::new(name)), (*content).to_string());
    }
    if let Some(dir) = user_template_dir {
        for (name, content) in load_user_templates(dir)? {
            templates.insert(name, content);
        }
    }

    let mut tera = Tera::default();
    // Generated Rust is never HTML.
    tera.autoescape_on(vec![]);
    tera.add_raw_templates(templates.into_iter().collect::<Vec<_>>())?;
    Ok(tera)
}

/// Strip `\r` and trailing whitespace; the caller decides on the final newline.
fn normalize_output(rendered: &str) -> String {
    rendered.replace("\r\n", "\n").replace('\r', "\n").trim_end().to_string()
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Tera-based engine with optional user overrides.
///
/// `user_template_dir` may contain `.tera` files named like the embedded ones
/// (`method.rs.tera`, …); a file there replaces the embedded default.
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    pub fn new(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        let tera = build_tera(user_template_dir)?;
        Ok(TemplateEngine { tera })
    }

    /// Render template `name` with a serializable context.
    pub fn render<T: Serialize>(&self, name: &str, ctx: &T) -> Result<String, RenderError> {
        let tera_ctx = to_tera_context(ctx)?;
        let rendered = self.tera.render(name, &tera_ctx)?;
        Ok(normalize_output(&rendered))
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Typed front of the engine. Create once per run and reuse.
pub struct Renderer {
    engine: TemplateEngine,
}

impl Renderer {
    /// Renderer over the embedded templates only.
    pub fn new() -> Result<Self, RenderError> {
        Self::with_template_dir(None)
    }

    pub fn with_template_dir(dir: Option<&Path>) -> Result<Self, RenderError> {
        Ok(Renderer { engine: TemplateEngine::new(dir)? })
    }

    /// One method, without a trailing newline.
    pub fn render_method(&self, ctx: &MethodCtx) -> Result<String, RenderError> {
        self.engine.render(METHOD_TEMPLATE, ctx)
    }

    /// An `impl` block (and optionally its struct), without a trailing newline.
    pub fn render_type_block(&self, ctx: &TypeBlockCtx) -> Result<String, RenderError> {
        self.engine.render(TYPE_BLOCK_TEMPLATE, ctx)
    }

    /// A complete `mod.rs`, ending with exactly one newline.
    pub fn render_aggregator(&self, ctx: &AggregatorCtx) -> Result<String, RenderError> {
        let mut out = self.engine.render(AGGREGATOR_TEMPLATE, ctx)?;
        out.push('\n');
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn method() -> MethodCtx {
        MethodCtx {
            indent: "    ".into(),
            doc_lines: vec![
                "Translate is endpoint of POST /emoji/translate".into(),
                String::new(),
                "* body".into(),
            ],
            signature: "pub async fn translate(&self) -> Result<u8, Error>".into(),
            body: Some("Ok(Default::default())".into()),
        }
    }

    #[test]
    fn renderer_new_succeeds() {
        Renderer::new().expect("embedded templates should parse");
    }

    #[test]
    fn method_renders_doc_signature_and_body() {
        let renderer = Renderer::new().unwrap();
        let out = renderer.render_method(&method()).unwrap();
        assert_eq!(
            out,
            "    /// Translate is endpoint of POST /emoji/translate\n\
             \x20   ///\n\
             \x20   /// * body\n\
             \x20   pub async fn translate(&self) -> Result<u8, Error> {\n\
             \x20       Ok(Default::default())\n\
             \x20   }"
        );
    }

    #[test]
    fn unit_method_has_empty_body() {
        let renderer = Renderer::new().unwrap();
        let mut ctx = method();
        ctx.doc_lines.clear();
        ctx.signature = "pub fn ping(&self)".into();
        ctx.body = None;
        assert_eq!(renderer.render_method(&ctx).unwrap(), "    pub fn ping(&self) {\n    }");
    }

    #[test]
    fn synthesized_type_block_has_struct_and_constructor() {
        let renderer = Renderer::new().unwrap();
        let out = renderer
            .render_type_block(&TypeBlockCtx {
                type_name: "EmojiController".into(),
                synthesize: true,
                methods: vec!["    pub fn a(&self) {\n    }".into()],
            })
            .unwrap();
        assert_eq!(
            out,
            "#[derive(Debug, Default)]\n\
             pub struct EmojiController {}\n\
             \n\
             impl EmojiController {\n\
             \x20   pub fn new() -> Self {\n\
             \x20       Self {}\n\
             \x20   }\n\
             \n\
             \x20   pub fn a(&self) {\n\
             \x20   }\n\
             }"
        );
    }

    #[test]
    fn plain_type_block_separates_methods_by_blank_line() {
        let renderer = Renderer::new().unwrap();
        let out = renderer
            .render_type_block(&TypeBlockCtx {
                type_name: "EmojiController".into(),
                synthesize: false,
                methods: vec!["    fn a() {}".into(), "    fn b() {}".into()],
            })
            .unwrap();
        assert_eq!(out, "impl EmojiController {\n    fn a() {}\n\n    fn b() {}\n}");
    }
}
