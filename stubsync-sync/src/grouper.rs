//! Binds contract operations to server-trait methods and groups them by tag.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use stubsync_contract::Contract;
use stubsync_core::naming;
use stubsync_core::{BoundOperation, DirectoryListing, Interface, SyncConfig, TagGroup};

use crate::error::SyncError;

/// Pair every trait method with its operation, in trait order.
///
/// Both directions are checked: a trait method without an operation and an
/// operation without a trait method are each a [`SyncError::ContractMismatch`].
pub fn bind(contract: &Contract, interface: &Interface) -> Result<Vec<BoundOperation>, SyncError> {
    let mut bound = Vec::with_capacity(interface.methods.len());
    for method in &interface.methods {
        let operation = contract.get(&method.name).ok_or_else(|| SyncError::ContractMismatch {
            identifier: method.name.clone(),
            reason: format!("`{}` declares it but the contract has no such operation", interface.name),
        })?;
        bound.push(BoundOperation {
            operation: operation.clone(),
            method: method.clone(),
        });
    }

    if let Some(op) = contract
        .operations
        .values()
        .find(|op| interface.method(&op.method_name).is_none())
    {
        return Err(SyncError::ContractMismatch {
            identifier: op.method_name.clone(),
            reason: format!(
                "operation '{}' ({} {}) has no method on `{}`",
                op.operation_id, op.http_method, op.path, interface.name
            ),
        });
    }
    Ok(bound)
}

/// Group bound operations by normalized first tag, in tag order.
pub fn group(
    bound: Vec<BoundOperation>,
    listings: &[DirectoryListing],
    config: &SyncConfig,
) -> Vec<TagGroup> {
    let mut by_tag: BTreeMap<String, Vec<BoundOperation>> = BTreeMap::new();
    for b in bound {
        let tag = naming::normalize_tag(b.operation.primary_tag());
        by_tag.entry(tag).or_default().push(b);
    }

    by_tag
        .into_iter()
        .map(|(tag, mut operations)| {
            operations.sort_by_key(|b| b.method.position);
            let module_hint = operations
                .first()
                .and_then(|b| b.operation.module_hint())
                .map(String::from);
            let mut target_dir = select_dir(module_hint.as_deref(), &config.dst_dirs).to_path_buf();
            let mut existing = listings
                .iter()
                .find(|l| l.dir == target_dir)
                .and_then(|l| l.unit_for_tag(&tag))
                .cloned();
            // A tag owns one file across all destinations.
            if existing.is_none() {
                let elsewhere = listings
                    .iter()
                    .filter(|l| l.dir != target_dir)
                    .find_map(|l| l.unit_for_tag(&tag).map(|u| (&l.dir, u)));
                if let Some((dir, unit)) = elsewhere {
                    tracing::warn!(
                        "tag '{tag}' already lives in {}, outside {}; updating it there",
                        unit.path.display(),
                        target_dir.display()
                    );
                    target_dir = dir.clone();
                    existing = Some(unit.clone());
                }
            }
            let target_path = existing
                .as_ref()
                .map(|u| u.path.clone())
                .unwrap_or_else(|| target_dir.join(naming::file_name_from_tag(&tag)));

            TagGroup {
                type_name: naming::controller_type_name(&tag),
                tag,
                operations,
                target_dir,
                target_path,
                existing,
                module_hint,
            }
        })
        .collect()
}

/// Destination for a module hint: the first directory with a path component
/// equal to the hint, else the first directory.
pub fn select_dir<'a>(hint: Option<&str>, dirs: &'a [PathBuf]) -> &'a Path {
    let primary = dirs.first().map(PathBuf::as_path).unwrap_or_else(|| Path::new("."));
    let Some(hint) = hint else {
        return primary;
    };
    let matched = dirs.iter().find(|dir| {
        dir.components()
            .any(|c| matches!(c, Component::Normal(s) if s.to_str() == Some(hint)))
    });
    match matched {
        Some(dir) => dir.as_path(),
        None => {
            tracing::warn!(
                "module hint '{hint}' matches no destination; using {}",
                primary.display()
            );
            primary
        }
    }
}
