//! Conformance profiles.
//!
//! A profile customizes processing for one conformance class through four
//! hooks, each invoked at a fixed point of the pipeline:
//!
//! 1. [`Profile::normalize_data`] for every property value once it is built,
//!    before the nodes nested inside it are normalized;
//! 2. [`Profile::add_default_values`] after the per-property checks, to fill
//!    gaps from the source HTML document;
//! 3. [`Profile::data_validation`] after the manifest-wide checks;
//! 4. [`Profile::generate_internal_representation`] once everything else ran.
//!
//! Hooks returning `Option` signal an unrecoverable gap with `None`; the
//! manifest is then discarded.

use crate::logger::Logger;
use crate::model::{Node, NodeKind, Value};
use crate::process::Context;
use crate::util::strip_fragment;

/// Identifier of the generic publication manifest profile.
pub const DEFAULT_PROFILE: &str = "https://www.w3.org/TR/pub-manifest/";

/// Extension points of the processing algorithm.
pub trait Profile: Send + Sync {
    /// The `conformsTo` value selecting this profile.
    fn identifier(&self) -> &str;

    fn normalize_data(
        &self,
        _ctx: &Context<'_>,
        _kind: NodeKind,
        _term: &str,
        value: Value,
        _logger: &mut Logger,
    ) -> Value {
        value
    }

    fn add_default_values(
        &self,
        _ctx: &Context<'_>,
        manifest: Node,
        _logger: &mut Logger,
    ) -> Option<Node> {
        Some(manifest)
    }

    fn data_validation(&self, _ctx: &Context<'_>, manifest: Node, _logger: &mut Logger) -> Node {
        manifest
    }

    fn generate_internal_representation(
        &self,
        _ctx: &Context<'_>,
        manifest: Node,
        _logger: &mut Logger,
    ) -> Option<Node> {
        Some(manifest)
    }
}

/// The generic profile, used when no other profile matches `conformsTo`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultProfile;

impl Profile for DefaultProfile {
    fn identifier(&self) -> &str {
        DEFAULT_PROFILE
    }

    fn add_default_values(
        &self,
        ctx: &Context<'_>,
        mut manifest: Node,
        logger: &mut Logger,
    ) -> Option<Node> {
        if let Some(document) = ctx.document {
            if manifest.texts("name").is_empty()
                && let Some(title) = document.title()
            {
                let language = document.language().or(ctx.language.as_deref());
                let name = Node::localizable_string(title, language, ctx.direction);
                manifest.set("name", Value::Array(vec![Value::Node(name)]));
            }

            if manifest.nodes("readingOrder").is_empty() {
                let mut resource = Node::linked_resource(strip_fragment(&document.url));
                resource.set("encodingFormat", Value::String("text/html".to_string()));
                manifest.set("readingOrder", Value::Array(vec![Value::Node(resource)]));
            }
        }

        if manifest.texts("name").is_empty() {
            logger.warning("No title provided", None);
        }

        if manifest.nodes("readingOrder").is_empty() {
            logger.fatal("No reading order provided", None);
            return None;
        }

        Some(manifest)
    }
}
