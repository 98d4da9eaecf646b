//! Per-directory `mod.rs` aggregators.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use stubsync_core::naming;
use stubsync_core::{
    module_name_of, AggregatorMember, AggregatorSpec, CrossReference, DirectoryListing,
    ModuleEntry, SyncConfig,
};

use crate::error::SyncError;
use crate::merger::MergeOutcome;

pub const AGGREGATOR_FILE: &str = "mod.rs";

/// One spec per destination directory that received a controller, in
/// configuration order.
///
/// When more than one directory participates, the primary directory's
/// aggregator also holds every other directory's aggregator.
pub fn build_specs(
    config: &SyncConfig,
    listings: &[DirectoryListing],
    outcomes: &[MergeOutcome],
) -> Result<Vec<AggregatorSpec>, SyncError> {
    let mut members_by_dir: BTreeMap<&Path, BTreeMap<String, String>> = BTreeMap::new();
    for outcome in outcomes {
        if let Some(module) = module_name_of(&outcome.path) {
            members_by_dir
                .entry(outcome.dir.as_path())
                .or_default()
                .insert(outcome.type_name.clone(), module);
        }
    }

    let participating: Vec<&PathBuf> = config
        .dst_dirs
        .iter()
        .filter(|d| members_by_dir.contains_key(d.as_path()))
        .collect();

    let mut specs = Vec::with_capacity(participating.len());
    for dir in &participating {
        let members = &members_by_dir[dir.as_path()];
        let type_name = naming::aggregator_type_name(&config.prefix, dir);

        let mut entries: Vec<AggregatorMember> = members
            .iter()
            .map(|(ty, module)| AggregatorMember {
                type_name: ty.clone(),
                field: naming::field_name_for_type(ty),
                module: Some(module.clone()),
            })
            .collect();

        let mut cross_refs = Vec::new();
        if participating.len() > 1 && dir.as_path() == config.primary_dir() {
            for other in participating.iter().filter(|o| o.as_path() != dir.as_path()) {
                let other_type = naming::aggregator_type_name(&config.prefix, other);
                cross_refs.push(CrossReference {
                    module_path: naming::module_path_for_dir(&config.base_namespace, other),
                    type_name: other_type.clone(),
                });
                entries.push(AggregatorMember {
                    field: naming::field_name_for_type(&other_type),
                    type_name: other_type,
                    module: None,
                });
            }
        }
        entries.sort_by(|a, b| a.type_name.cmp(&b.type_name));
        check_collisions(dir, &type_name, &entries)?;

        let listing = listings.iter().find(|l| l.dir == **dir);
        specs.push(AggregatorSpec {
            dir: dir.to_path_buf(),
            path: dir.join(AGGREGATOR_FILE),
            type_name,
            modules: modules(listing, members.values()),
            members: entries,
            cross_refs,
        });
    }
    Ok(specs)
}

fn modules<'a>(
    listing: Option<&DirectoryListing>,
    new_modules: impl Iterator<Item = &'a String>,
) -> Vec<ModuleEntry> {
    let mut set = BTreeSet::new();
    let plain = |name: &str| ModuleEntry {
        name: name.to_string(),
        public: false,
        test_only: false,
    };
    if let Some(listing) = listing {
        for unit in &listing.units {
            if let Some(name) = unit.module_name() {
                set.insert(plain(&name));
            }
        }
        for name in &listing.test_modules {
            set.insert(ModuleEntry {
                test_only: true,
                ..plain(name)
            });
        }
        for name in &listing.submodules {
            set.insert(ModuleEntry {
                public: true,
                ..plain(name)
            });
        }
    }
    for name in new_modules {
        set.insert(plain(name));
    }

    let mut seen = BTreeSet::new();
    let mut entries: Vec<ModuleEntry> = set.into_iter().filter(|m| seen.insert(m.name.clone())).collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}

fn check_collisions(
    dir: &Path,
    aggregator: &str,
    members: &[AggregatorMember],
) -> Result<(), SyncError> {
    let collision = |name: &str, reason: &str| SyncError::NameCollision {
        dir: dir.to_path_buf(),
        name: name.to_string(),
        reason: reason.to_string(),
    };
    let mut fields = BTreeSet::new();
    for m in members {
        if m.type_name == aggregator {
            return Err(collision(aggregator, "is both the aggregator and a member"));
        }
        if !fields.insert(m.field.as_str()) {
            return Err(collision(&m.field, "is used by two members"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stubsync_core::{PartialConfig, SourceUnit};

    fn config(dst: &[&str], prefix: &str) -> SyncConfig {
        PartialConfig {
            src: Some("src/oapigen".into()),
            doc: Some("openapi.yaml".into()),
            dst: dst.iter().map(PathBuf::from).collect(),
            prefix: Some(prefix.into()),
            ..Default::default()
        }
        .resolve()
        .unwrap()
    }

    fn outcome(dir: &str, file: &str, type_name: &str) -> MergeOutcome {
        MergeOutcome {
            path: Path::new(dir).join(file),
            dir: PathBuf::from(dir),
            tag: String::new(),
            type_name: type_name.into(),
            original: None,
            content: String::new(),
            stats: Default::default(),
        }
    }

    #[test]
    fn single_directory_spec() {
        let listing = DirectoryListing {
            dir: PathBuf::from("src/controller"),
            units: vec![
                SourceUnit::empty(PathBuf::from("src/controller/emoji.rs"), "emoji"),
                SourceUnit::empty(PathBuf::from("src/controller/util.rs"), "util"),
            ],
            test_modules: vec!["emoji_test".into()],
            submodules: vec!["v2".into()],
        };
        let specs = build_specs(
            &config(&["src/controller"], ""),
            &[listing],
            &[
                outcome("src/controller", "users.rs", "UsersController"),
                outcome("src/controller", "emoji.rs", "EmojiController"),
            ],
        )
        .unwrap();

        assert_eq!(specs.len(), 1);
        let spec = &specs[0];
        assert_eq!(spec.type_name, "ControllerController");
        assert_eq!(spec.path, PathBuf::from("src/controller/mod.rs"));
        let members: Vec<&str> = spec.members.iter().map(|m| m.type_name.as_str()).collect();
        assert_eq!(members, vec!["EmojiController", "UsersController"]);
        assert_eq!(spec.members[0].field, "emoji_controller");
        assert_eq!(spec.members[0].module.as_deref(), Some("emoji"));

        let modules: Vec<(&str, bool, bool)> = spec
            .modules
            .iter()
            .map(|m| (m.name.as_str(), m.public, m.test_only))
            .collect();
        assert_eq!(
            modules,
            vec![
                ("emoji", false, false),
                ("emoji_test", false, true),
                ("users", false, false),
                ("util", false, false),
                ("v2", true, false),
            ]
        );
        assert!(spec.cross_refs.is_empty());
    }

    #[test]
    fn primary_directory_embeds_the_others() {
        let specs = build_specs(
            &config(&["src/controller", "src/admin", "src/unused"], "app"),
            &[],
            &[
                outcome("src/admin", "users.rs", "UsersController"),
                outcome("src/controller", "emoji.rs", "EmojiController"),
            ],
        )
        .unwrap();

        let names: Vec<&str> = specs.iter().map(|s| s.type_name.as_str()).collect();
        assert_eq!(names, vec!["AppControllerController", "AppAdminController"]);

        let primary = &specs[0];
        assert_eq!(
            primary.cross_refs,
            vec![CrossReference {
                module_path: "crate::admin".into(),
                type_name: "AppAdminController".into(),
            }]
        );
        let admin = primary
            .members
            .iter()
            .find(|m| m.type_name == "AppAdminController")
            .unwrap();
        assert_eq!(admin.module, None);
        assert_eq!(admin.field, "app_admin_controller");
        assert!(specs[1].cross_refs.is_empty());
    }

    #[test]
    fn aggregator_named_like_a_member_is_rejected() {
        let err = build_specs(
            &config(&["src/controller"], ""),
            &[],
            &[outcome("src/controller", "controller.rs", "ControllerController")],
        )
        .unwrap_err();
        assert!(matches!(err, SyncError::NameCollision { .. }));
    }
}
