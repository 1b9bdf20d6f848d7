//! Typed nodes and values of a processed manifest.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use url::Url;

use super::terms::Terms;

/// The four kinds of manifest node. Each kind has its own term taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Manifest,
    Entity,
    LocalizableString,
    LinkedResource,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Manifest => f.write_str("publication manifest"),
            NodeKind::Entity => f.write_str("entity"),
            NodeKind::LocalizableString => f.write_str("localizable string"),
            NodeKind::LinkedResource => f.write_str("linked resource"),
        }
    }
}

/// Base text direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Ltr,
    Rtl,
}

impl Direction {
    pub fn parse(s: &str) -> Option<Direction> {
        match s {
            "ltr" => Some(Direction::Ltr),
            "rtl" => Some(Direction::Rtl),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        }
    }
}

/// Discriminant of an entity node, read from its `type` term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Person,
    Organization,
}

/// A property value inside a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    /// An absolute, syntactically valid URL.
    Url(Url),
    Array(Vec<Value>),
    Node(Node),
    /// Verbatim JSON: unknown terms, misc terms and ill-typed input.
    Raw(serde_json::Value),
}

impl Value {
    /// Convert a JSON value without interpreting it against any taxonomy.
    ///
    /// Scalars and arrays map onto their typed counterparts; objects and
    /// `null` stay raw.
    pub fn from_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from_json).collect())
            }
            other => Value::Raw(other),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Url(u) => serde_json::Value::String(u.to_string()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Node(node) => node.to_json(),
            Value::Raw(raw) => raw.clone(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_url(&self) -> Option<&Url> {
        match self {
            Value::Url(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_node_mut(&mut self) -> Option<&mut Node> {
        match self {
            Value::Node(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn is_empty_array(&self) -> bool {
        matches!(self, Value::Array(items) if items.is_empty())
    }

    /// Whether this is a node of the given kind.
    pub fn is_node_of(&self, kind: NodeKind) -> bool {
        matches!(self, Value::Node(n) if n.kind() == kind)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Url(u) => serializer.serialize_str(u.as_str()),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Node(node) => node.serialize(serializer),
            Value::Raw(raw) => raw.serialize(serializer),
        }
    }
}

/// A typed node: a kind tag plus its properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: NodeKind,
    properties: BTreeMap<String, Value>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            properties: BTreeMap::new(),
        }
    }

    /// A localizable string with optional language and direction.
    pub fn localizable_string(
        value: impl Into<String>,
        language: Option<&str>,
        direction: Option<Direction>,
    ) -> Self {
        let mut node = Node::new(NodeKind::LocalizableString);
        node.set("value", Value::String(value.into()));
        if let Some(language) = language {
            node.set("language", Value::String(language.to_string()));
        }
        if let Some(direction) = direction {
            node.set("direction", Value::String(direction.as_str().to_string()));
        }
        node
    }

    /// A minimal linked resource pointing at `url`.
    pub fn linked_resource(url: Url) -> Self {
        let mut node = Node::new(NodeKind::LinkedResource);
        node.set(
            "type",
            Value::Array(vec![Value::String("LinkedResource".to_string())]),
        );
        node.set("url", Value::Url(url));
        node
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn terms(&self) -> &'static Terms {
        self.kind.terms()
    }

    pub fn get(&self, term: &str) -> Option<&Value> {
        self.properties.get(term)
    }

    pub fn get_mut(&mut self, term: &str) -> Option<&mut Value> {
        self.properties.get_mut(term)
    }

    pub fn set(&mut self, term: impl Into<String>, value: Value) {
        self.properties.insert(term.into(), value);
    }

    pub fn remove(&mut self, term: &str) -> Option<Value> {
        self.properties.remove(term)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.properties.contains_key(term)
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Names of the properties currently set.
    pub fn keys(&self) -> Vec<String> {
        self.properties.keys().cloned().collect()
    }

    /// A single literal property.
    pub fn string(&self, term: &str) -> Option<&str> {
        self.get(term).and_then(Value::as_str)
    }

    /// The literal members of an array property.
    pub fn strings(&self, term: &str) -> Vec<&str> {
        match self.get(term) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            Some(Value::String(s)) => vec![s.as_str()],
            _ => Vec::new(),
        }
    }

    /// The node members of an array property.
    pub fn nodes(&self, term: &str) -> Vec<&Node> {
        match self.get(term) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_node).collect(),
            Some(Value::Node(node)) => vec![node],
            _ => Vec::new(),
        }
    }

    pub fn url(&self) -> Option<&Url> {
        self.get("url").and_then(Value::as_url)
    }

    pub fn rel(&self) -> Vec<&str> {
        self.strings("rel")
    }

    pub fn has_type(&self, type_name: &str) -> bool {
        self.strings("type").contains(&type_name)
    }

    /// Person or Organization, for entity nodes.
    pub fn entity_kind(&self) -> Option<EntityKind> {
        if self.kind != NodeKind::Entity {
            return None;
        }
        if self.has_type("Organization") && !self.has_type("Person") {
            Some(EntityKind::Organization)
        } else {
            Some(EntityKind::Person)
        }
    }

    /// The text values of a localizable-string array property.
    pub fn texts(&self, term: &str) -> Vec<&str> {
        self.nodes(term)
            .into_iter()
            .filter_map(|n| n.string("value"))
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.properties
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    pub(crate) fn properties_mut(&mut self) -> impl Iterator<Item = (&String, &mut Value)> {
        self.properties.iter_mut()
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.properties.len()))?;
        for (key, value) in &self.properties {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
