//! Normalization: raw JSON into typed nodes.
//!
//! Shorthand values are expanded into their canonical form (a bare string
//! becomes a person, a localizable string or a linked resource, depending on
//! the term), single values of array terms are wrapped, and URLs are resolved
//! against the base. Values that cannot be converted are dropped.
//!
//! Each value is built shallowly first: a constructed node keeps its own
//! properties as raw JSON. The profile hook then sees the value, and only
//! afterwards are the nested properties normalized in turn.

use serde_json::{Map, Value as JsonValue};
use url::Url;

use super::Context;
use crate::logger::Logger;
use crate::model::{Node, NodeKind, TermCategory, Value};
use crate::util::resolve_url;

pub(crate) fn normalize_manifest(
    ctx: &Context<'_>,
    data: Map<String, JsonValue>,
    logger: &mut Logger,
) -> Node {
    let mut manifest = pending_node(NodeKind::Manifest, data);
    normalize_node(ctx, &mut manifest, logger);
    manifest
}

/// A node of `kind` whose properties still hold raw JSON.
fn pending_node(kind: NodeKind, data: Map<String, JsonValue>) -> Node {
    let mut node = Node::new(kind);
    for (term, raw) in data {
        node.set(term, Value::Raw(raw));
    }
    node
}

/// Normalize every property of `node` that still holds raw JSON.
fn normalize_node(ctx: &Context<'_>, node: &mut Node, logger: &mut Logger) {
    let kind = node.kind();
    for term in node.keys() {
        if !matches!(node.get(&term), Some(Value::Raw(_))) {
            continue;
        }
        let Some(Value::Raw(raw)) = node.remove(&term) else {
            continue;
        };
        if let Some(value) = normalize_value(ctx, kind, &term, raw, logger) {
            node.set(term, value);
        }
    }
}

/// Recurse into the nodes held by a freshly normalized value.
fn normalize_nested(ctx: &Context<'_>, value: &mut Value, logger: &mut Logger) {
    match value {
        Value::Node(node) => normalize_node(ctx, node, logger),
        Value::Array(items) => {
            for item in items {
                if let Value::Node(node) = item {
                    normalize_node(ctx, node, logger);
                }
            }
        }
        _ => {}
    }
}

/// Normalize the value of `term` on a node of `kind`. `None` drops the term.
fn normalize_value(
    ctx: &Context<'_>,
    kind: NodeKind,
    term: &str,
    raw: JsonValue,
    logger: &mut Logger,
) -> Option<Value> {
    if term == "@context" {
        return None;
    }

    let category = kind.terms().category(term);
    let raw = match category {
        Some(c) if c.is_array() && !raw.is_array() => JsonValue::Array(vec![raw]),
        _ => raw,
    };

    let value = match category {
        Some(TermCategory::ArrayOfEntities) => Value::Array(
            into_items(raw)
                .filter_map(|item| to_entity(ctx, item, logger))
                .map(Value::Node)
                .collect(),
        ),
        Some(TermCategory::ArrayOfLocStrings) => Value::Array(
            into_items(raw)
                .filter_map(|item| to_localizable_string(ctx, item, logger))
                .map(Value::Node)
                .collect(),
        ),
        Some(TermCategory::SingleLocString) => {
            Value::Node(to_localizable_string(ctx, raw, logger)?)
        }
        Some(TermCategory::ArrayOfLinks) => Value::Array(
            into_items(raw)
                .filter_map(|item| to_linked_resource(item, logger))
                .map(Value::Node)
                .collect(),
        ),
        Some(TermCategory::SingleUrl) => Value::Url(to_url(ctx, term, raw, logger)?),
        Some(TermCategory::ArrayOfUrls) => Value::Array(
            into_items(raw)
                .filter_map(|item| to_url(ctx, term, item, logger))
                .map(Value::Url)
                .collect(),
        ),
        Some(
            TermCategory::SingleLiteral
            | TermCategory::ArrayOfLiterals
            | TermCategory::SingleBoolean
            | TermCategory::SingleNumber,
        ) => Value::from_json(raw),
        Some(TermCategory::Misc) | None => Value::Raw(raw),
    };

    let mut value = ctx.profile.normalize_data(ctx, kind, term, value, logger);
    normalize_nested(ctx, &mut value, logger);
    Some(value)
}

fn into_items(raw: JsonValue) -> impl Iterator<Item = JsonValue> {
    match raw {
        JsonValue::Array(items) => items.into_iter(),
        other => vec![other].into_iter(),
    }
}

/// A bare string becomes a person; an object keeps its own type, defaulting
/// to `Person`.
fn to_entity(ctx: &Context<'_>, raw: JsonValue, logger: &mut Logger) -> Option<Node> {
    match raw {
        JsonValue::String(name) => {
            let mut entity = Node::new(NodeKind::Entity);
            entity.set("type", Value::Array(vec![Value::String("Person".to_string())]));
            let name = Node::localizable_string(name, ctx.language.as_deref(), ctx.direction);
            entity.set("name", Value::Array(vec![Value::Node(name)]));
            Some(entity)
        }
        JsonValue::Object(mut data) => {
            let typed = match data.get("type") {
                Some(JsonValue::String(t)) => is_entity_type(t),
                Some(JsonValue::Array(types)) => {
                    types.iter().filter_map(JsonValue::as_str).any(is_entity_type)
                }
                _ => false,
            };
            if !typed {
                let mut types = match data.remove("type") {
                    Some(JsonValue::Array(types)) => types,
                    Some(other) => vec![other],
                    None => Vec::new(),
                };
                types.push(JsonValue::String("Person".to_string()));
                data.insert("type".to_string(), JsonValue::Array(types));
            }
            Some(pending_node(NodeKind::Entity, data))
        }
        other => {
            logger.validation_error("Invalid entity", Some(other));
            None
        }
    }
}

fn is_entity_type(type_name: &str) -> bool {
    matches!(type_name, "Person" | "Organization")
}

/// A bare string inherits the ambient language and direction; an object keeps
/// its own, and an explicit `null` suppresses inheritance.
fn to_localizable_string(
    ctx: &Context<'_>,
    raw: JsonValue,
    logger: &mut Logger,
) -> Option<Node> {
    match raw {
        JsonValue::String(value) => Some(Node::localizable_string(
            value,
            ctx.language.as_deref(),
            ctx.direction,
        )),
        JsonValue::Object(mut data) => {
            let inherit_language = !data.contains_key("language");
            let inherit_direction = !data.contains_key("direction");
            if data.get("language").is_some_and(JsonValue::is_null) {
                data.remove("language");
            }
            if data.get("direction").is_some_and(JsonValue::is_null) {
                data.remove("direction");
            }

            if inherit_language && let Some(language) = &ctx.language {
                data.insert("language".to_string(), JsonValue::String(language.clone()));
            }
            if inherit_direction && let Some(direction) = ctx.direction {
                data.insert(
                    "direction".to_string(),
                    JsonValue::String(direction.as_str().to_string()),
                );
            }
            Some(pending_node(NodeKind::LocalizableString, data))
        }
        other => {
            logger.validation_error("Invalid localizable string", Some(other));
            None
        }
    }
}

/// A bare string is the URL of a minimal resource.
fn to_linked_resource(raw: JsonValue, logger: &mut Logger) -> Option<Node> {
    let mut data = match raw {
        JsonValue::String(url) => {
            let mut data = Map::new();
            data.insert("url".to_string(), JsonValue::String(url));
            data
        }
        JsonValue::Object(data) => data,
        other => {
            logger.validation_error("Invalid linked resource", Some(other));
            return None;
        }
    };

    if !data.contains_key("type") {
        data.insert(
            "type".to_string(),
            JsonValue::Array(vec![JsonValue::String("LinkedResource".to_string())]),
        );
    }
    Some(pending_node(NodeKind::LinkedResource, data))
}

fn to_url(ctx: &Context<'_>, term: &str, raw: JsonValue, logger: &mut Logger) -> Option<Url> {
    let reference = match raw {
        JsonValue::String(reference) => reference,
        other => {
            logger.validation_error(format!("Invalid URL value for \"{term}\""), Some(other));
            return None;
        }
    };
    let resolved = resolve_url(ctx.base.as_ref(), &reference);
    if resolved.is_none() {
        logger.validation_error(
            format!("Invalid URL for \"{term}\""),
            Some(JsonValue::String(reference)),
        );
    }
    resolved
}
