//! The subset of the OpenAPI 3 object model the synchronizer reads.
//!
//! Unknown keys are ignored; `x-*` keys of an operation are captured through
//! the flattened `extra` map.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use stubsync_core::HttpMethod;

#[derive(Debug, Deserialize)]
pub(crate) struct RawDocument {
    #[serde(default)]
    pub paths: BTreeMap<String, RawPathItem>,
    #[serde(default)]
    pub components: RawComponents,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawComponents {
    #[serde(default)]
    pub parameters: BTreeMap<String, RawParameter>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawPathItem {
    pub get: Option<RawOperation>,
    pub put: Option<RawOperation>,
    pub post: Option<RawOperation>,
    pub delete: Option<RawOperation>,
    pub options: Option<RawOperation>,
    pub head: Option<RawOperation>,
    pub patch: Option<RawOperation>,
    pub trace: Option<RawOperation>,
}

impl RawPathItem {
    /// Declared operations in [`HttpMethod::all`] order.
    pub fn operations(&self) -> Vec<(HttpMethod, &RawOperation)> {
        HttpMethod::all()
            .iter()
            .filter_map(|method| {
                let op = match method {
                    HttpMethod::Get => self.get.as_ref(),
                    HttpMethod::Put => self.put.as_ref(),
                    HttpMethod::Post => self.post.as_ref(),
                    HttpMethod::Delete => self.delete.as_ref(),
                    HttpMethod::Options => self.options.as_ref(),
                    HttpMethod::Head => self.head.as_ref(),
                    HttpMethod::Patch => self.patch.as_ref(),
                    HttpMethod::Trace => self.trace.as_ref(),
                };
                op.map(|op| (*method, op))
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawOperation {
    pub operation_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<RawParameter>,
    pub request_body: Option<Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawParameter {
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "in")]
    pub location: Option<String>,
    #[serde(default)]
    pub required: bool,
    pub description: Option<String>,
    pub schema: Option<RawSchema>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawSchema {
    pub default: Option<Value>,
}
