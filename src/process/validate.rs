//! Validation: checks normalized nodes against their taxonomy, removes what
//! does not fit, and enforces manifest-wide invariants.
//!
//! Three passes, in order:
//! 1. per-property category checks, recursing into nested nodes;
//! 2. manifest-wide structural checks (defaults, formats, resource sets);
//! 3. the profile's `data_validation` hook, then removal of empty arrays.
//!
//! Nothing here is fatal except a gap reported by the profile's
//! `add_default_values` hook.

use std::collections::HashSet;

use serde_json::Value as JsonValue;
use url::Url;

use super::Context;
use super::formats::{is_valid_date, is_valid_duration, is_valid_language_tag};
use crate::logger::Logger;
use crate::model::{Direction, Node, NodeKind, TermCategory, Value};
use crate::util::{MediaClass, media_class_from_path, strip_fragment};

/// Reserved `rel` values of structural resources.
const STRUCTURAL_RELS: [&str; 3] = ["contents", "pagelist", "cover"];

/// Validate a normalized manifest.
///
/// Returns the repaired manifest and its unique resource URLs, or `None` when
/// the profile reported an unrecoverable gap.
pub(crate) fn validate_manifest(
    ctx: &Context<'_>,
    mut manifest: Node,
    logger: &mut Logger,
) -> Option<(Node, Vec<Url>)> {
    global_data_checks(&mut manifest, logger);

    let mut manifest = ctx.profile.add_default_values(ctx, manifest, logger)?;

    default_type(&mut manifest, logger);
    check_access_mode_sufficient(&mut manifest, logger);
    if !manifest.contains("id") {
        logger.warning("No id provided", None);
    }
    remove_invalid_literal(&mut manifest, "duration", is_valid_duration, "Invalid duration", logger);
    for term in ["dateModified", "datePublished"] {
        remove_invalid_literal(&mut manifest, term, is_valid_date, "Invalid date", logger);
    }
    check_in_language(&mut manifest, logger);
    check_reading_progression(&mut manifest, logger);

    let unique_resources = unique_resources(&manifest, logger);
    check_links(&mut manifest, &unique_resources, logger);
    check_structural_resources(&manifest, logger);

    let mut manifest = ctx.profile.data_validation(ctx, manifest, logger);
    strip_empty_arrays(&mut manifest);

    Some((manifest, unique_resources))
}

// ============================================================================
// Pass 1: per-property checks
// ============================================================================

fn global_data_checks(manifest: &mut Node, logger: &mut Logger) {
    check_properties(manifest, logger);
}

/// Check every declared property of `node`; unknown properties are left alone.
fn check_properties(node: &mut Node, logger: &mut Logger) {
    let kind = node.kind();
    let terms = node.terms();
    for term in node.keys() {
        let Some(category) = terms.category(&term) else {
            continue;
        };
        let Some(value) = node.remove(&term) else {
            continue;
        };
        if let Some(value) = check_value(kind, &term, category, value, logger) {
            node.set(term, value);
        }
    }
}

fn check_value(
    kind: NodeKind,
    term: &str,
    category: TermCategory,
    value: Value,
    logger: &mut Logger,
) -> Option<Value> {
    if category == TermCategory::Misc {
        return Some(value);
    }
    if !category.is_array() {
        return check_item(kind, term, category, value, logger);
    }

    let items = match value {
        Value::Array(items) => items,
        other => {
            logger.validation_error(
                format!("\"{term}\" of {kind} must be an array"),
                Some(other.to_json()),
            );
            return None;
        }
    };

    let was_empty = items.is_empty();
    let element = category.element();
    let kept: Vec<Value> = items
        .into_iter()
        .filter_map(|item| check_item(kind, term, element, item, logger))
        .collect();

    if kept.is_empty() && !was_empty {
        None
    } else {
        Some(Value::Array(kept))
    }
}

fn check_item(
    kind: NodeKind,
    term: &str,
    category: TermCategory,
    item: Value,
    logger: &mut Logger,
) -> Option<Value> {
    if !verify_value_category(category, &item) {
        logger.validation_error(
            format!("Value of \"{term}\" of {kind} must be {category}"),
            Some(item.to_json()),
        );
        return None;
    }
    match item {
        Value::Node(node) => repair_node(node, logger).map(Value::Node),
        other => Some(other),
    }
}

/// Whether `value` has the runtime shape implied by `category`.
pub(crate) fn verify_value_category(category: TermCategory, value: &Value) -> bool {
    match category {
        TermCategory::SingleLiteral | TermCategory::ArrayOfLiterals => {
            matches!(value, Value::String(_))
        }
        TermCategory::SingleLocString | TermCategory::ArrayOfLocStrings => {
            value.is_node_of(NodeKind::LocalizableString)
        }
        TermCategory::ArrayOfEntities => value.is_node_of(NodeKind::Entity),
        TermCategory::ArrayOfLinks => value.is_node_of(NodeKind::LinkedResource),
        TermCategory::SingleUrl | TermCategory::ArrayOfUrls => matches!(value, Value::Url(_)),
        TermCategory::SingleBoolean => matches!(value, Value::Bool(_)),
        TermCategory::SingleNumber => matches!(value, Value::Number(_)),
        TermCategory::Misc => true,
    }
}

/// Recurse into a nested node and apply its kind-specific repairs.
/// `None` means the node must be removed from its container.
fn repair_node(mut node: Node, logger: &mut Logger) -> Option<Node> {
    match node.kind() {
        NodeKind::LocalizableString => {
            check_properties(&mut node, logger);
            if node.string("value").is_none_or(str::is_empty) {
                logger.validation_error("Localizable string without a value", Some(node.to_json()));
                return None;
            }
            remove_invalid_literal(
                &mut node,
                "language",
                is_valid_language_tag,
                "Invalid language tag",
                logger,
            );
            remove_invalid_literal(
                &mut node,
                "direction",
                |d| Direction::parse(d).is_some(),
                "Invalid base direction",
                logger,
            );
            Some(node)
        }
        NodeKind::Entity => {
            check_properties(&mut node, logger);
            if node.texts("name").is_empty() {
                logger.validation_error("Entity without a name", Some(node.to_json()));
                return None;
            }
            Some(node)
        }
        NodeKind::LinkedResource => {
            if let Some(length) = node.get("length")
                && !length.as_f64().is_some_and(|l| l >= 0.0)
            {
                logger.validation_error("Invalid length of linked resource", Some(node.to_json()));
                return None;
            }
            check_properties(&mut node, logger);
            if node.url().is_none() {
                logger.validation_error("Linked resource without a valid url", Some(node.to_json()));
                return None;
            }
            remove_invalid_literal(&mut node, "duration", is_valid_duration, "Invalid duration", logger);
            Some(node)
        }
        NodeKind::Manifest => {
            check_properties(&mut node, logger);
            Some(node)
        }
    }
}

/// Remove the literal `term` from `node` when it fails `is_valid`.
fn remove_invalid_literal(
    node: &mut Node,
    term: &str,
    is_valid: fn(&str) -> bool,
    message: &str,
    logger: &mut Logger,
) {
    let invalid = node
        .string(term)
        .filter(|value| !is_valid(value))
        .map(str::to_string);
    if let Some(value) = invalid {
        node.remove(term);
        logger.validation_error(format!("{message} for \"{term}\""), Some(JsonValue::String(value)));
    }
}

// ============================================================================
// Pass 2: manifest-wide checks
// ============================================================================

/// Fill in `CreativeWork` when `type` is absent or left empty after pass 1.
fn default_type(manifest: &mut Node, logger: &mut Logger) {
    if manifest.strings("type").is_empty() {
        logger.warning("No type provided, defaulting to CreativeWork", None);
        manifest.set(
            "type",
            Value::Array(vec![Value::String("CreativeWork".to_string())]),
        );
    }
}

fn check_access_mode_sufficient(manifest: &mut Node, logger: &mut Logger) {
    let Some(value) = manifest.remove("accessModeSufficient") else {
        return;
    };
    let items = match value {
        Value::Raw(JsonValue::Array(items)) => items,
        Value::Raw(item @ JsonValue::Object(_)) => vec![item],
        other => {
            logger.validation_error(
                "accessModeSufficient must be a list of ItemList objects",
                Some(other.to_json()),
            );
            return;
        }
    };

    let kept: Vec<JsonValue> = items
        .into_iter()
        .filter(|item| {
            let ok = is_item_list(item);
            if !ok {
                logger.validation_error("accessModeSufficient entry is not an ItemList", Some(item.clone()));
            }
            ok
        })
        .collect();

    if !kept.is_empty() {
        manifest.set("accessModeSufficient", Value::Raw(JsonValue::Array(kept)));
    }
}

fn is_item_list(item: &JsonValue) -> bool {
    let JsonValue::Object(obj) = item else {
        return false;
    };
    match obj.get("type") {
        Some(JsonValue::String(t)) => t == "ItemList",
        Some(JsonValue::Array(types)) => types.iter().any(|t| t.as_str() == Some("ItemList")),
        _ => false,
    }
}

fn check_in_language(manifest: &mut Node, logger: &mut Logger) {
    if let Some(Value::Array(tags)) = manifest.get_mut("inLanguage") {
        tags.retain(|tag| {
            let ok = tag.as_str().is_some_and(is_valid_language_tag);
            if !ok {
                logger.validation_error("Invalid language tag for \"inLanguage\"", Some(tag.to_json()));
            }
            ok
        });
    }
}

fn check_reading_progression(manifest: &mut Node, logger: &mut Logger) {
    let current = manifest.string("readingProgression").map(str::to_string);
    if current.as_deref().and_then(Direction::parse).is_some() {
        return;
    }
    if let Some(invalid) = current {
        logger.validation_error(
            "Invalid reading progression, defaulting to ltr",
            Some(JsonValue::String(invalid)),
        );
    }
    manifest.set("readingProgression", Value::String(Direction::Ltr.as_str().to_string()));
}

/// Ordered, deduplicated, fragment-free URLs of the reading order and the
/// resources, following alternates.
fn unique_resources(manifest: &Node, logger: &mut Logger) -> Vec<Url> {
    let mut unique = Vec::new();
    let mut seen = HashSet::new();
    for term in ["readingOrder", "resources"] {
        for resource in manifest.nodes(term) {
            collect_resource_urls(resource, &mut unique, &mut seen, logger);
        }
    }
    unique
}

fn collect_resource_urls(
    resource: &Node,
    unique: &mut Vec<Url>,
    seen: &mut HashSet<Url>,
    logger: &mut Logger,
) {
    if let Some(url) = resource.url() {
        let stripped = strip_fragment(url);
        if seen.insert(stripped.clone()) {
            unique.push(stripped);
        } else {
            logger.warning(
                "Resource URL appears more than once",
                Some(JsonValue::String(url.to_string())),
            );
        }
    }
    for alternate in resource.nodes("alternate") {
        collect_resource_urls(alternate, unique, seen, logger);
    }
}

fn check_links(manifest: &mut Node, unique_resources: &[Url], logger: &mut Logger) {
    let Some(Value::Array(links)) = manifest.get_mut("links") else {
        return;
    };
    links.retain(|link| {
        let Some(node) = link.as_node() else {
            return true;
        };
        if let Some(url) = node.url()
            && unique_resources.contains(&strip_fragment(url))
        {
            logger.validation_error(
                "Link is also a publication resource",
                Some(JsonValue::String(url.to_string())),
            );
            return false;
        }
        let rels = node.rel();
        if let Some(rel) = rels.iter().find(|rel| STRUCTURAL_RELS.contains(*rel)) {
            logger.validation_error(
                format!("Resource with rel \"{rel}\" must not appear in links"),
                Some(node.to_json()),
            );
            return false;
        }
        if rels.is_empty() {
            logger.warning("Link without rel", Some(node.to_json()));
        }
        true
    });
}

fn check_structural_resources(manifest: &Node, logger: &mut Logger) {
    let resources: Vec<&Node> = manifest
        .nodes("readingOrder")
        .into_iter()
        .chain(manifest.nodes("resources"))
        .collect();

    for rel in STRUCTURAL_RELS {
        let count = resources.iter().filter(|r| r.rel().contains(&rel)).count();
        if count > 1 {
            logger.warning(format!("More than one resource with rel \"{rel}\""), None);
        }
    }

    for cover in resources.iter().filter(|r| r.rel().contains(&"cover")) {
        if is_image(cover) && cover.texts("name").is_empty() && !cover.contains("description") {
            logger.warning("Cover image without a name", Some(cover.to_json()));
        }
    }
}

fn is_image(resource: &Node) -> bool {
    resource
        .string("encodingFormat")
        .is_some_and(|format| format.starts_with("image/"))
        || resource
            .url()
            .is_some_and(|url| media_class_from_path(url.path()) == MediaClass::Image)
}

// ============================================================================
// Pass 3: cleanup
// ============================================================================

/// Remove declared properties holding empty arrays, recursively.
fn strip_empty_arrays(node: &mut Node) {
    let terms = node.terms();
    for (term, value) in node.properties_mut() {
        if !terms.is_valid(term) {
            continue;
        }
        match value {
            Value::Node(child) => strip_empty_arrays(child),
            Value::Array(items) => {
                for item in items {
                    if let Value::Node(child) = item {
                        strip_empty_arrays(child);
                    }
                }
            }
            _ => {}
        }
    }

    let empty: Vec<String> = node
        .properties()
        .filter(|(term, value)| terms.is_valid(term) && value.is_empty_array())
        .map(|(term, _)| term.to_string())
        .collect();
    for term in empty {
        node.remove(&term);
    }
}
