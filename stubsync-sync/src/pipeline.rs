//! Sync pipeline: plan every file in memory, then commit.
//!
//! [`plan`] runs every fallible analysis step (contract, trait, scan, bind,
//! merge, aggregation) before anything touches disk, so a contract mismatch
//! or parse error leaves the tree exactly as it was.

use std::path::PathBuf;

use stubsync_contract::load_contract;
use stubsync_core::SyncConfig;
use stubsync_renderer::{AggregatorCtx, Renderer};

use crate::aggregator::build_specs;
use crate::error::SyncError;
use crate::grouper::{bind, group};
use crate::interface::scan_interface;
use crate::merger::{merge_group, MergeContext, MergeStats};
use crate::scanner::scan_directory;
use crate::writer::{read_existing, write_file, WriteResult};

/// What a planned file is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileKind {
    Controller {
        tag: String,
        type_name: String,
        stats: MergeStats,
    },
    Aggregator {
        type_name: String,
    },
}

/// Final content of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    pub path: PathBuf,
    pub kind: FileKind,
    /// On-disk content at planning time; `None` if the file is new.
    pub original: Option<String>,
    pub content: String,
}

impl PlannedFile {
    pub fn is_new(&self) -> bool {
        self.original.is_none()
    }

    pub fn is_changed(&self) -> bool {
        self.original.as_deref() != Some(self.content.as_str())
    }
}

/// Every file a sync run produces: controllers in tag order, then aggregators
/// in destination order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    pub files: Vec<PlannedFile>,
}

impl SyncPlan {
    pub fn changed(&self) -> impl Iterator<Item = &PlannedFile> {
        self.files.iter().filter(|f| f.is_changed())
    }
}

/// Outcome of a committed (or dry-run) plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub writes: Vec<WriteResult>,
}

impl SyncReport {
    pub fn written(&self) -> usize {
        self.count(|w| matches!(w, WriteResult::Written { .. }))
    }

    pub fn unchanged(&self) -> usize {
        self.count(|w| matches!(w, WriteResult::Unchanged { .. }))
    }

    pub fn would_write(&self) -> usize {
        self.count(|w| matches!(w, WriteResult::WouldWrite { .. }))
    }

    fn count(&self, pred: impl Fn(&WriteResult) -> bool) -> usize {
        self.writes.iter().filter(|w| pred(w)).count()
    }
}

/// Compute the content of every file without writing anything.
pub fn plan(config: &SyncConfig) -> Result<SyncPlan, SyncError> {
    let contract = load_contract(&config.doc)?;
    tracing::debug!("contract {}: {} operations", config.doc.display(), contract.len());

    let interface = scan_interface(&config.src_dir, &config.interface_name)?;
    let bound = bind(&contract, &interface)?;

    let overrides = config.overrides();
    let listings = config
        .dst_dirs
        .iter()
        .map(|dir| scan_directory(dir, &overrides))
        .collect::<Result<Vec<_>, _>>()?;
    let groups = group(bound, &listings, config);

    let renderer = Renderer::with_template_dir(config.template_dir.as_deref())?;
    let contract_module = config.contract_module_path();
    let alias = config.namespace_alias();
    let ctx = MergeContext {
        interface: &interface,
        contract_module: &contract_module,
        alias: &alias,
        renderer: &renderer,
    };

    let outcomes = groups
        .iter()
        .map(|g| merge_group(g, &ctx))
        .collect::<Result<Vec<_>, _>>()?;
    let specs = build_specs(config, &listings, &outcomes)?;

    let mut files: Vec<PlannedFile> = outcomes
        .into_iter()
        .map(|o| PlannedFile {
            path: o.path,
            kind: FileKind::Controller {
                tag: o.tag,
                type_name: o.type_name,
                stats: o.stats,
            },
            original: o.original,
            content: o.content,
        })
        .collect();

    for spec in &specs {
        let content = renderer.render_aggregator(&AggregatorCtx::from(spec))?;
        files.push(PlannedFile {
            original: read_existing(&spec.path)?,
            path: spec.path.clone(),
            kind: FileKind::Aggregator {
                type_name: spec.type_name.clone(),
            },
            content,
        });
    }
    Ok(SyncPlan { files })
}

/// Write every file of `plan` (or report what would be written).
pub fn commit(plan: &SyncPlan, dry_run: bool) -> Result<SyncReport, SyncError> {
    let mut report = SyncReport::default();
    for file in &plan.files {
        match &file.kind {
            FileKind::Controller { tag, stats, .. } => {
                if !file.is_changed() {
                    tracing::debug!("skip file :: tag={tag} filename={}", file.path.display());
                    report.writes.push(WriteResult::Unchanged {
                        path: file.path.clone(),
                    });
                    continue;
                }
                tracing::info!(
                    "emit file :: create={} tag={tag} filename={} added={} docs={} signatures={}",
                    file.is_new(),
                    file.path.display(),
                    stats.added,
                    stats.docs_updated,
                    stats.signatures_updated,
                );
            }
            FileKind::Aggregator { type_name } => {
                tracing::info!(
                    "emit aggregator :: type={type_name} filename={}",
                    file.path.display()
                );
            }
        }
        report.writes.push(write_file(&file.path, &file.content, dry_run)?);
    }
    Ok(report)
}

/// Plan and commit in one call.
pub fn run(config: &SyncConfig, dry_run: bool) -> Result<SyncReport, SyncError> {
    let plan = plan(config)?;
    commit(&plan, dry_run)
}
