use serde::{Serialize, Serializer};
use url::Url;

use super::node::{Direction, Node, NodeKind, Value};
use crate::util::strip_fragment;

/// A processed publication manifest.
///
/// Wraps the root [`Node`] together with the derived list of unique resource
/// URLs. An empty manifest (no properties) is the result of a fatal error.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    root: Node,
    unique_resources: Vec<Url>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            root: Node::new(NodeKind::Manifest),
            unique_resources: Vec::new(),
        }
    }
}

impl Manifest {
    pub fn new(root: Node, unique_resources: Vec<Url>) -> Self {
        Self {
            root,
            unique_resources,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn get(&self, term: &str) -> Option<&Value> {
        self.root.get(term)
    }

    pub fn id(&self) -> Option<&str> {
        self.root.string("id")
    }

    /// Title values, in document order.
    pub fn name(&self) -> Vec<&str> {
        self.root.texts("name")
    }

    pub fn types(&self) -> Vec<&str> {
        self.root.strings("type")
    }

    pub fn conforms_to(&self) -> Vec<&str> {
        self.root.strings("conformsTo")
    }

    pub fn reading_progression(&self) -> Option<Direction> {
        self.root.string("readingProgression").and_then(Direction::parse)
    }

    pub fn reading_order(&self) -> Vec<&Node> {
        self.root.nodes("readingOrder")
    }

    pub fn resources(&self) -> Vec<&Node> {
        self.root.nodes("resources")
    }

    pub fn links(&self) -> Vec<&Node> {
        self.root.nodes("links")
    }

    /// Deduplicated, fragment-free URLs of the reading order and resources,
    /// alternates included.
    pub fn unique_resources(&self) -> &[Url] {
        &self.unique_resources
    }

    /// Whether `url`, ignoring its fragment, is one of the publication's resources.
    pub fn contains_resource(&self, url: &Url) -> bool {
        let stripped = strip_fragment(url);
        self.unique_resources.contains(&stripped)
    }

    /// First resource in the reading order or resources carrying `rel`.
    pub fn find_by_rel(&self, rel: &str) -> Option<&Node> {
        self.reading_order()
            .into_iter()
            .chain(self.resources())
            .find(|resource| resource.rel().contains(&rel))
    }

    pub fn to_json(&self) -> serde_json::Value {
        self.root.to_json()
    }
}

impl Serialize for Manifest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.root.serialize(serializer)
    }
}
