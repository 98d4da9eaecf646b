//! Deterministic casing transforms shared by every stage of a sync run.
//!
//! Every function here is pure. [`normalize_tag`] is idempotent:
//! `normalize_tag(&normalize_tag(t)) == normalize_tag(t)`.

use std::collections::BTreeMap;
use std::path::{Component, Path};

use once_cell::sync::Lazy;
use regex::Regex;

static FIRST_CAP: Lazy<Regex> =
    Lazy::new(|| Regex::new("(.)([A-Z][a-z]+)").expect("static regex"));
static ALL_CAP: Lazy<Regex> =
    Lazy::new(|| Regex::new("([a-z0-9])([A-Z])").expect("static regex"));

/// Legacy file names whose tag does not follow the snake/kebab convention.
pub const LEGACY_TAG_OVERRIDES: &[(&str, &str)] = &[("growth_topic", "topic")];

/// Suffix every controller type carries.
pub const CONTROLLER_SUFFIX: &str = "Controller";

/// `fooBar` → `foo_bar`, `FooBar` → `foo_bar`, `getUserByID` → `get_user_by_id`.
pub fn to_snake_case(s: &str) -> String {
    let snake = FIRST_CAP.replace_all(s, "${1}_${2}");
    let snake = ALL_CAP.replace_all(&snake, "${1}_${2}");
    snake.to_lowercase()
}

/// `foo` → `Foo`. Only the first character changes.
pub fn to_title(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `foo-bar` / `foo_bar` / `foo bar` → `FooBar`; `fooBar` → `FooBar`.
pub fn to_upper_camel(s: &str) -> String {
    s.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(to_title)
        .collect()
}

/// `fooBar`, `foo_bar`, `Foo Bar` → `foo-bar`.
pub fn normalize_tag(tag: &str) -> String {
    to_snake_case(tag.trim())
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// `foo-bar` → `foo_bar.rs`.
pub fn file_name_from_tag(normalized_tag: &str) -> String {
    format!("{}.rs", module_name_from_tag(normalized_tag))
}

/// `foo-bar` → `foo_bar`.
pub fn module_name_from_tag(normalized_tag: &str) -> String {
    normalized_tag.replace('-', "_")
}

/// `foo-bar` → `FooBarController`.
pub fn controller_type_name(normalized_tag: &str) -> String {
    format!("{}{CONTROLLER_SUFFIX}", to_upper_camel(normalized_tag))
}

/// Rust method name serving a contract `operationId`.
pub fn method_name_for_operation(operation_id: &str) -> String {
    to_snake_case(operation_id.trim()).replace('-', "_")
}

/// Struct field holding a member controller: `EmojiController` → `emoji_controller`.
pub fn field_name_for_type(type_name: &str) -> String {
    to_snake_case(type_name)
}

/// Aggregator type for a directory: prefix `app`, dir `.../controller` → `AppControllerController`.
pub fn aggregator_type_name(prefix: &str, dir: &Path) -> String {
    let base = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!(
        "{}{}{CONTROLLER_SUFFIX}",
        to_upper_camel(prefix),
        to_upper_camel(&base)
    )
}

/// Rust module path of a source directory.
///
/// Components after the last `src` are joined under `base`:
/// `("crate", "api/src/handlers/admin")` → `crate::handlers::admin`.
pub fn module_path_for_dir(base: &str, dir: &Path) -> String {
    let parts: Vec<String> = dir
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().replace('-', "_")),
            _ => None,
        })
        .collect();
    let start = parts
        .iter()
        .rposition(|p| p == "src")
        .map(|i| i + 1)
        .unwrap_or(0);

    let mut segments: Vec<&str> = Vec::with_capacity(parts.len() + 1);
    if !base.is_empty() {
        segments.push(base);
    }
    segments.extend(parts[start..].iter().map(String::as_str));
    segments.join("::")
}

/// Last segment of a module path: `crate::oapigen` → `oapigen`.
pub fn namespace_alias(module_path: &str) -> &str {
    module_path.rsplit("::").next().unwrap_or(module_path)
}

/// Whether `s` can be used as a plain (non-raw) Rust identifier.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

// ---------------------------------------------------------------------------
// Tag overrides
// ---------------------------------------------------------------------------

/// Lookup table from file stem to tag for files predating the naming convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagOverrides {
    table: BTreeMap<String, String>,
}

impl Default for TagOverrides {
    fn default() -> Self {
        Self {
            table: LEGACY_TAG_OVERRIDES
                .iter()
                .map(|(stem, tag)| (stem.to_string(), tag.to_string()))
                .collect(),
        }
    }
}

impl TagOverrides {
    /// Built-in table extended (and overridden) by `extra`.
    pub fn with_extra(extra: &BTreeMap<String, String>) -> Self {
        let mut overrides = Self::default();
        for (stem, tag) in extra {
            overrides.table.insert(stem.clone(), tag.clone());
        }
        overrides
    }

    /// Tag of a file stem: `foo_bar` → `foo-bar`, `growth_topic` → `topic`.
    pub fn tag_for_stem(&self, stem: &str) -> String {
        let raw = self.table.get(stem).map(String::as_str).unwrap_or(stem);
        normalize_tag(raw)
    }

    pub fn tag_from_file_name(&self, path: &Path) -> String {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.tag_for_stem(&stem)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::path::PathBuf;

    #[rstest]
    #[case("fooBar", "foo_bar")]
    #[case("FooBar", "foo_bar")]
    #[case("getUserByID", "get_user_by_id")]
    #[case("translate", "translate")]
    #[case("already_snake", "already_snake")]
    fn snake_case(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(to_snake_case(input), expected);
    }

    #[rstest]
    #[case("emoji", "emoji")]
    #[case("fooBar", "foo-bar")]
    #[case("foo_bar", "foo-bar")]
    #[case("Foo-Bar", "foo-bar")]
    #[case(" User Admin ", "user-admin")]
    fn tag_normalization(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_tag(input), expected);
    }

    #[rstest]
    #[case("emoji")]
    #[case("fooBar")]
    #[case("Foo-Bar")]
    #[case("HTTPServer")]
    #[case("a__b--c")]
    fn tag_normalization_is_idempotent(#[case] input: &str) {
        let once = normalize_tag(input);
        assert_eq!(normalize_tag(&once), once);
    }

    #[test]
    fn controller_type_name_concatenates_components() {
        assert_eq!(controller_type_name("emoji"), "EmojiController");
        assert_eq!(controller_type_name("foo-bar"), "FooBarController");
    }

    #[test]
    fn file_and_module_names() {
        assert_eq!(file_name_from_tag("foo-bar"), "foo_bar.rs");
        assert_eq!(module_name_from_tag("foo-bar"), "foo_bar");
    }

    #[test]
    fn tag_from_file_name_applies_overrides() {
        let overrides = TagOverrides::default();
        assert_eq!(
            overrides.tag_from_file_name(&PathBuf::from("src/controller/foo_bar.rs")),
            "foo-bar"
        );
        assert_eq!(
            overrides.tag_from_file_name(&PathBuf::from("growth_topic.rs")),
            "topic"
        );

        let extra = BTreeMap::from([("old_users".to_string(), "users".to_string())]);
        let extended = TagOverrides::with_extra(&extra);
        assert_eq!(extended.tag_for_stem("old_users"), "users");
        assert_eq!(extended.tag_for_stem("growth_topic"), "topic");
    }

    #[test]
    fn method_name_for_operation_is_snake_case() {
        assert_eq!(method_name_for_operation("translate"), "translate");
        assert_eq!(method_name_for_operation("getUser"), "get_user");
        assert_eq!(method_name_for_operation("list-items"), "list_items");
    }

    #[test]
    fn module_path_strips_through_src() {
        assert_eq!(
            module_path_for_dir("crate", Path::new("src/controller")),
            "crate::controller"
        );
        assert_eq!(
            module_path_for_dir("crate", Path::new("./api/src/handlers/admin")),
            "crate::handlers::admin"
        );
        assert_eq!(
            module_path_for_dir("crate", Path::new("controller")),
            "crate::controller"
        );
        assert_eq!(namespace_alias("crate::oapigen"), "oapigen");
    }

    #[test]
    fn aggregator_type_name_uses_prefix_and_dir() {
        assert_eq!(
            aggregator_type_name("", Path::new("src/controller")),
            "ControllerController"
        );
        assert_eq!(
            aggregator_type_name("app", Path::new("src/admin")),
            "AppAdminController"
        );
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("emoji"));
        assert!(is_identifier("_x1"));
        assert!(!is_identifier("foo-bar"));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn field_name_for_type_is_snake_case() {
        assert_eq!(field_name_for_type("EmojiController"), "emoji_controller");
    }
}
