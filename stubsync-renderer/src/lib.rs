//! # stubsync-renderer
//!
//! Tera templates for the code stubsync emits: controller methods, appended
//! `impl` blocks and per-directory `mod.rs` aggregators.
//!
//! ```rust,no_run
//! use stubsync_renderer::{MethodCtx, Renderer};
//!
//! fn stub() -> Result<String, stubsync_renderer::RenderError> {
//!     let renderer = Renderer::new()?;
//!     renderer.render_method(&MethodCtx {
//!         indent: "    ".into(),
//!         doc_lines: vec!["Ping is endpoint of GET /ping".into()],
//!         signature: "pub fn ping(&self)".into(),
//!         body: None,
//!     })
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::{endpoint_doc_lines, endpoint_doc_text, AggregatorCtx, MethodCtx, TypeBlockCtx};
pub use engine::{Renderer, TemplateEngine};
pub use error::RenderError;
