//! html5ever `TreeSink` that builds an [`ArenaDom`].

use std::borrow::Cow;
use std::cell::RefCell;

use html5ever::tendril::StrTendril;
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute as ParsedAttribute, QualName};

use super::arena::{ArenaDom, ArenaNodeData, ArenaNodeId, Attribute};

/// Tree builder target. html5ever only hands out `&self`, hence the `RefCell`.
#[derive(Default)]
pub(crate) struct ArenaSink {
    dom: RefCell<ArenaDom>,
}

impl ArenaSink {
    pub(crate) fn into_dom(self) -> ArenaDom {
        self.dom.into_inner()
    }

    fn insert(&self, parent: ArenaNodeId, child: NodeOrText<ArenaNodeId>) {
        let mut dom = self.dom.borrow_mut();
        match child {
            NodeOrText::AppendNode(node) => dom.append(parent, node),
            NodeOrText::AppendText(text) => dom.append_text(parent, &text),
        }
    }
}

fn convert_attrs(attrs: Vec<ParsedAttribute>) -> impl Iterator<Item = Attribute> {
    attrs.into_iter().map(|a| Attribute {
        name: a.name,
        value: a.value.to_string(),
    })
}

impl TreeSink for ArenaSink {
    type Handle = ArenaNodeId;
    type Output = Self;
    type ElemName<'a>
        = &'a QualName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        tracing::trace!(%msg, "html parse error");
    }

    fn get_document(&self) -> ArenaNodeId {
        self.dom.borrow().document()
    }

    fn elem_name<'a>(&'a self, target: &'a ArenaNodeId) -> &'a QualName {
        static NO_NAME: QualName = QualName {
            prefix: None,
            ns: html5ever::ns!(),
            local: html5ever::local_name!(""),
        };

        let dom = self.dom.borrow();
        match dom.get(*target).map(|n| &n.data) {
            // SAFETY: nodes are never removed from the arena and element names
            // are never rewritten, so the name outlives the `RefCell` guard.
            // The tree builder uses the reference before allocating again.
            Some(ArenaNodeData::Element { name, .. }) => unsafe {
                std::mem::transmute::<&QualName, &'a QualName>(name)
            },
            _ => &NO_NAME,
        }
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<ParsedAttribute>,
        _flags: ElementFlags,
    ) -> ArenaNodeId {
        let attrs = convert_attrs(attrs).collect();
        self.dom.borrow_mut().create_element(name, attrs)
    }

    fn create_comment(&self, _text: StrTendril) -> ArenaNodeId {
        self.dom.borrow_mut().create_comment()
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> ArenaNodeId {
        self.dom.borrow_mut().create_comment()
    }

    fn append(&self, parent: &ArenaNodeId, child: NodeOrText<ArenaNodeId>) {
        self.insert(*parent, child);
    }

    fn append_based_on_parent_node(
        &self,
        element: &ArenaNodeId,
        prev_element: &ArenaNodeId,
        child: NodeOrText<ArenaNodeId>,
    ) {
        let parent = self.dom.borrow().get(*element).and_then(|n| n.parent);
        self.insert(parent.unwrap_or(*prev_element), child);
    }

    fn append_doctype_to_document(&self, _: StrTendril, _: StrTendril, _: StrTendril) {}

    fn get_template_contents(&self, target: &ArenaNodeId) -> ArenaNodeId {
        *target
    }

    fn same_node(&self, x: &ArenaNodeId, y: &ArenaNodeId) -> bool {
        x == y
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(&self, sibling: &ArenaNodeId, new_node: NodeOrText<ArenaNodeId>) {
        let mut dom = self.dom.borrow_mut();
        let node = match new_node {
            NodeOrText::AppendNode(node) => node,
            NodeOrText::AppendText(text) => dom.create_text(text.to_string()),
        };
        dom.insert_before(*sibling, node);
    }

    fn add_attrs_if_missing(&self, target: &ArenaNodeId, attrs: Vec<ParsedAttribute>) {
        let mut dom = self.dom.borrow_mut();
        let Some(ArenaNodeData::Element {
            attrs: existing, ..
        }) = dom.get_mut(*target).map(|n| &mut n.data)
        else {
            return;
        };
        for attr in convert_attrs(attrs) {
            if existing.iter().all(|a| a.name != attr.name) {
                existing.push(attr);
            }
        }
    }

    fn remove_from_parent(&self, target: &ArenaNodeId) {
        self.dom.borrow_mut().detach(*target);
    }

    fn reparent_children(&self, node: &ArenaNodeId, new_parent: &ArenaNodeId) {
        let mut dom = self.dom.borrow_mut();
        let children: Vec<_> = dom.children(*node).collect();
        for child in children {
            dom.detach(child);
            dom.append(*new_parent, child);
        }
    }
}
