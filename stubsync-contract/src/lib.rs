//! Contract loading for `stubsync-contract`.
//!
//! `load_contract(path)` reads an OpenAPI 3 document (JSON or YAML) and returns
//! every operation keyed by its Rust method name, in a deterministic order.
//! Any problem with the document is fatal for the run: the loader never
//! returns a partial contract.

mod openapi;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use stubsync_core::naming;
use stubsync_core::{Operation, Parameter};

use crate::openapi::{RawDocument, RawOperation, RawParameter};

const PARAMETER_REF_PREFIX: &str = "#/components/parameters/";

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Serialization format of a contract document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// `.json` → JSON; anything else is read as YAML (a superset of JSON).
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => DocumentFormat::Json,
            _ => DocumentFormat::Yaml,
        }
    }
}

/// Every operation of a contract, keyed by [`Operation::method_name`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contract {
    pub operations: BTreeMap<String, Operation>,
}

impl Contract {
    pub fn get(&self, method_name: &str) -> Option<&Operation> {
        self.operations.get(method_name)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Errors from contract loading.
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("failed to read contract at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse contract at {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to parse contract at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{method} {path}: missing required field `{field}`")]
    MissingField {
        method: String,
        path: String,
        field: &'static str,
    },

    #[error("operation '{second}' collides with '{first}' (both map to method `{method_name}`)")]
    DuplicateOperation {
        method_name: String,
        first: String,
        second: String,
    },

    #[error("unresolved parameter reference '{reference}'")]
    UnresolvedRef { reference: String },
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Load and validate the contract at `path`.
pub fn load_contract(path: &Path) -> Result<Contract, ContractError> {
    let source = std::fs::read_to_string(path).map_err(|source| ContractError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_contract(&source, DocumentFormat::from_path(path), path)
}

/// Parse contract text; `path` is used for diagnostics only.
pub fn parse_contract(
    source: &str,
    format: DocumentFormat,
    path: &Path,
) -> Result<Contract, ContractError> {
    let document: RawDocument = match format {
        DocumentFormat::Json => serde_json::from_str(source).map_err(|e| ContractError::Json {
            path: path.to_path_buf(),
            source: e,
        })?,
        DocumentFormat::Yaml => serde_yaml::from_str(source).map_err(|e| ContractError::Yaml {
            path: path.to_path_buf(),
            source: e,
        })?,
    };
    build_contract(&document)
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

fn build_contract(document: &RawDocument) -> Result<Contract, ContractError> {
    let mut operations: BTreeMap<String, Operation> = BTreeMap::new();

    for (path, item) in &document.paths {
        for (method, raw) in item.operations() {
            if path.trim().is_empty() {
                return Err(ContractError::MissingField {
                    method: method.to_string(),
                    path: path.clone(),
                    field: "path",
                });
            }
            let operation_id = raw
                .operation_id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .ok_or_else(|| ContractError::MissingField {
                    method: method.to_string(),
                    path: path.clone(),
                    field: "operationId",
                })?;

            let operation = Operation {
                operation_id: operation_id.to_string(),
                name: naming::to_title(operation_id),
                method_name: naming::method_name_for_operation(operation_id),
                http_method: method,
                path: path.clone(),
                tags: raw.tags.clone(),
                parameters: resolve_parameters(raw, document)?,
                has_request_body: raw.request_body.is_some(),
                summary: raw.summary.clone(),
                description: raw.description.clone(),
                extensions: extensions(raw),
            };

            if let Some(first) = operations.get(&operation.method_name) {
                return Err(ContractError::DuplicateOperation {
                    method_name: operation.method_name.clone(),
                    first: first.operation_id.clone(),
                    second: operation.operation_id,
                });
            }
            operations.insert(operation.method_name.clone(), operation);
        }
    }

    Ok(Contract { operations })
}

fn resolve_parameters(
    raw: &RawOperation,
    document: &RawDocument,
) -> Result<Vec<Parameter>, ContractError> {
    raw.parameters
        .iter()
        .map(|p| {
            let resolved = resolve_parameter(p, document)?;
            Ok(Parameter {
                name: resolved.name.clone().unwrap_or_default(),
                location: resolved.location.clone().unwrap_or_default(),
                required: resolved.required,
                default: resolved.schema.as_ref().and_then(|s| s.default.clone()),
                description: resolved.description.clone().unwrap_or_default(),
            })
        })
        .collect()
}

fn resolve_parameter<'a>(
    parameter: &'a RawParameter,
    document: &'a RawDocument,
) -> Result<&'a RawParameter, ContractError> {
    let Some(reference) = parameter.reference.as_deref() else {
        return Ok(parameter);
    };
    reference
        .strip_prefix(PARAMETER_REF_PREFIX)
        .and_then(|name| document.components.parameters.get(name))
        .ok_or_else(|| ContractError::UnresolvedRef {
            reference: reference.to_string(),
        })
}

/// `x-*` keys; string values that are themselves JSON-quoted are unquoted.
fn extensions(raw: &RawOperation) -> BTreeMap<String, Value> {
    raw.extra
        .iter()
        .filter(|(key, _)| key.starts_with("x-"))
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => match serde_json::from_str::<String>(s) {
                    Ok(unquoted) => Value::String(unquoted),
                    Err(_) => value.clone(),
                },
                other => other.clone(),
            };
            (key.clone(), value)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
