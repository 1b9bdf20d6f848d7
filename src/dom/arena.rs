//! Arena-allocated DOM that html5ever parses into.
//!
//! Nodes live in one vector and refer to each other by index. Only the
//! operations the tree builder needs (append, insert before, detach) can
//! change the shape; everything else is a read-only query.

use std::collections::HashMap;

use html5ever::QualName;

/// Index of a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArenaNodeId(usize);

#[derive(Debug, Clone)]
pub enum ArenaNodeData {
    Document,
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
    },
    Text(String),
    /// Comments and processing instructions; their content is not kept.
    Comment,
}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

#[derive(Debug)]
pub struct ArenaNode {
    pub data: ArenaNodeData,
    pub parent: Option<ArenaNodeId>,
    pub first_child: Option<ArenaNodeId>,
    pub last_child: Option<ArenaNodeId>,
    pub prev_sibling: Option<ArenaNodeId>,
    pub next_sibling: Option<ArenaNodeId>,
}

/// Arena-based DOM tree.
#[derive(Debug)]
pub struct ArenaDom {
    nodes: Vec<ArenaNode>,
    /// `id` attribute -> first element carrying it.
    ids: HashMap<String, ArenaNodeId>,
}

impl Default for ArenaDom {
    fn default() -> Self {
        Self::new()
    }
}

impl ArenaDom {
    /// An arena holding only the document node.
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            ids: HashMap::new(),
        };
        dom.alloc(ArenaNodeData::Document);
        dom
    }

    fn alloc(&mut self, data: ArenaNodeData) -> ArenaNodeId {
        let id = ArenaNodeId(self.nodes.len());
        self.nodes.push(ArenaNode {
            data,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        });
        id
    }

    pub fn document(&self) -> ArenaNodeId {
        ArenaNodeId(0)
    }

    pub fn get(&self, id: ArenaNodeId) -> Option<&ArenaNode> {
        self.nodes.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: ArenaNodeId) -> Option<&mut ArenaNode> {
        self.nodes.get_mut(id.0)
    }

    /// Number of nodes, the document included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether nothing but the document node exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    // ------------------------------------------------------------------------
    // Construction (driven by the tree sink)
    // ------------------------------------------------------------------------

    pub(crate) fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> ArenaNodeId {
        let id_value = attrs
            .iter()
            .find(|a| a.name.local.as_ref() == "id")
            .map(|a| a.value.clone());
        let node = self.alloc(ArenaNodeData::Element { name, attrs });
        if let Some(value) = id_value {
            self.ids.entry(value).or_insert(node);
        }
        node
    }

    pub(crate) fn create_text(&mut self, text: String) -> ArenaNodeId {
        self.alloc(ArenaNodeData::Text(text))
    }

    pub(crate) fn create_comment(&mut self) -> ArenaNodeId {
        self.alloc(ArenaNodeData::Comment)
    }

    /// Link `child` under `parent`, between `prev` and `next`.
    fn link(
        &mut self,
        parent: ArenaNodeId,
        child: ArenaNodeId,
        prev: Option<ArenaNodeId>,
        next: Option<ArenaNodeId>,
    ) {
        if let Some(node) = self.get_mut(child) {
            node.parent = Some(parent);
            node.prev_sibling = prev;
            node.next_sibling = next;
        }
        match prev.and_then(|p| self.get_mut(p)) {
            Some(prev) => prev.next_sibling = Some(child),
            None => {
                if let Some(parent) = self.get_mut(parent) {
                    parent.first_child = Some(child);
                }
            }
        }
        match next.and_then(|n| self.get_mut(n)) {
            Some(next) => next.prev_sibling = Some(child),
            None => {
                if let Some(parent) = self.get_mut(parent) {
                    parent.last_child = Some(child);
                }
            }
        }
    }

    pub(crate) fn append(&mut self, parent: ArenaNodeId, child: ArenaNodeId) {
        let last = self.get(parent).and_then(|n| n.last_child);
        self.link(parent, child, last, None);
    }

    pub(crate) fn insert_before(&mut self, sibling: ArenaNodeId, new_node: ArenaNodeId) {
        let Some((Some(parent), prev)) = self.get(sibling).map(|n| (n.parent, n.prev_sibling))
        else {
            return;
        };
        self.link(parent, new_node, prev, Some(sibling));
    }

    /// Append text, merging into a trailing text node when there is one.
    pub(crate) fn append_text(&mut self, parent: ArenaNodeId, text: &str) {
        let last = self.get(parent).and_then(|n| n.last_child);
        if let Some(node) = last.and_then(|l| self.get_mut(l))
            && let ArenaNodeData::Text(existing) = &mut node.data
        {
            existing.push_str(text);
            return;
        }
        let node = self.create_text(text.to_string());
        self.append(parent, node);
    }

    /// Unlink a node from its parent and siblings.
    pub(crate) fn detach(&mut self, target: ArenaNodeId) {
        let Some(node) = self.get_mut(target) else {
            return;
        };
        let parent = node.parent.take();
        let prev = node.prev_sibling.take();
        let next = node.next_sibling.take();

        match prev.and_then(|p| self.get_mut(p)) {
            Some(prev) => prev.next_sibling = next,
            None => {
                if let Some(parent) = parent.and_then(|p| self.get_mut(p)) {
                    parent.first_child = next;
                }
            }
        }
        match next.and_then(|n| self.get_mut(n)) {
            Some(next) => next.prev_sibling = prev,
            None => {
                if let Some(parent) = parent.and_then(|p| self.get_mut(p)) {
                    parent.last_child = prev;
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn children(&self, parent: ArenaNodeId) -> ChildrenIter<'_> {
        ChildrenIter {
            dom: self,
            next: self.get(parent).and_then(|n| n.first_child),
        }
    }

    /// `root` and everything below it, in document order.
    pub fn descendants(&self, root: ArenaNodeId) -> Descendants<'_> {
        Descendants {
            dom: self,
            stack: vec![root],
        }
    }

    /// First node below `root` (inclusive, document order) matching `predicate`.
    pub fn find_from<F>(&self, root: ArenaNodeId, predicate: F) -> Option<ArenaNodeId>
    where
        F: Fn(&ArenaDom, ArenaNodeId) -> bool,
    {
        self.descendants(root).find(|&id| predicate(self, id))
    }

    /// First element with the given tag name.
    pub fn find_by_tag(&self, tag: &str) -> Option<ArenaNodeId> {
        self.find_from(self.document(), |dom, id| dom.element_name(id) == Some(tag))
    }

    pub fn get_by_id(&self, id: &str) -> Option<ArenaNodeId> {
        self.ids.get(id).copied()
    }

    fn attrs(&self, id: ArenaNodeId) -> Option<&[Attribute]> {
        match &self.get(id)?.data {
            ArenaNodeData::Element { attrs, .. } => Some(attrs),
            _ => None,
        }
    }

    /// Element's local name (tag).
    pub fn element_name(&self, id: ArenaNodeId) -> Option<&str> {
        match &self.get(id)?.data {
            ArenaNodeData::Element { name, .. } => Some(name.local.as_ref()),
            _ => None,
        }
    }

    pub fn get_attr(&self, id: ArenaNodeId, attr_name: &str) -> Option<&str> {
        self.attrs(id)?
            .iter()
            .find(|a| a.name.local.as_ref() == attr_name)
            .map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, id: ArenaNodeId, attr_name: &str) -> bool {
        self.get_attr(id, attr_name).is_some()
    }

    /// Whether a whitespace-separated attribute contains `token`.
    pub fn attr_has_token(&self, id: ArenaNodeId, attr_name: &str, token: &str) -> bool {
        self.get_attr(id, attr_name)
            .is_some_and(|value| value.split_ascii_whitespace().any(|t| t == token))
    }

    pub fn is_element(&self, id: ArenaNodeId) -> bool {
        self.element_name(id).is_some()
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: ArenaNodeId) -> String {
        self.descendants(id)
            .filter_map(|node| match &self.get(node)?.data {
                ArenaNodeData::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Iterator over the children of a node.
pub struct ChildrenIter<'a> {
    dom: &'a ArenaDom,
    next: Option<ArenaNodeId>,
}

impl Iterator for ChildrenIter<'_> {
    type Item = ArenaNodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.dom.get(id).and_then(|n| n.next_sibling);
        Some(id)
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'a> {
    dom: &'a ArenaDom,
    stack: Vec<ArenaNodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = ArenaNodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let start = self.stack.len();
        self.stack.extend(self.dom.children(id));
        self.stack[start..].reverse();
        Some(id)
    }
}
