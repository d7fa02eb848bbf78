//! In-memory document tree the styling engine scans and decorates.
//!
//! Nodes live in an arena indexed by [`NodeId`]. Removing a subtree frees
//! its slots for reuse, so an id must not be held across a removal of
//! the node it names.

pub mod snapshot;
pub mod style;

pub use snapshot::NodeSnapshot;
pub use style::Style;

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    Element(NodeId),
    Text(String),
}

#[derive(Debug, Clone)]
pub struct Element {
    pub tag: String,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub style: Style,
    children: Vec<Child>,
    parent: Option<NodeId>,
}

/// A child-list change, as a mutation observer would report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub added_nodes: usize,
    pub removed_nodes: usize,
}

impl MutationRecord {
    pub fn adds_nodes(&self) -> bool {
        self.added_nodes > 0
    }
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            style: Style::new(),
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        self.attributes.insert(name.to_string(), value.into());
    }

    pub fn remove_attribute(&mut self, name: &str) {
        self.attributes.remove(name);
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Option<Element>>,
    free: Vec<usize>,
    root: NodeId,
    mutations: Vec<MutationRecord>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(Element::new("body"))],
            free: Vec::new(),
            root: NodeId(0),
            mutations: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Create a detached element. It becomes visible once appended.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let element = Some(Element::new(tag));
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = element;
                NodeId(slot)
            }
            None => {
                self.nodes.push(element);
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    /// Arena slots allocated so far, live or free.
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || self.element(parent).is_none() || self.element(child).is_none() {
            return;
        }
        if self.is_ancestor(child, parent) {
            return;
        }

        self.detach(child);
        if let Some(element) = self.element_mut(child) {
            element.parent = Some(parent);
        }
        if let Some(element) = self.element_mut(parent) {
            element.children.push(Child::Element(child));
        }
        self.mutations.push(MutationRecord {
            target: parent,
            added_nodes: 1,
            removed_nodes: 0,
        });
    }

    pub fn append_text(&mut self, parent: NodeId, text: impl Into<String>) {
        if let Some(element) = self.element_mut(parent) {
            element.children.push(Child::Text(text.into()));
            self.mutations.push(MutationRecord {
                target: parent,
                added_nodes: 1,
                removed_nodes: 0,
            });
        }
    }

    /// Remove a node and its whole subtree from the document.
    pub fn remove(&mut self, id: NodeId) {
        if id == self.root || self.element(id).is_none() {
            return;
        }

        self.detach(id);
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(element) = self.nodes.get_mut(current.0).and_then(Option::take) {
                self.free.push(current.0);
                stack.extend(element.children.iter().filter_map(|child| match child {
                    Child::Element(id) => Some(*id),
                    Child::Text(_) => None,
                }));
            }
        }
    }

    /// Every element below `id` in document (pre-)order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.collect_descendants(id, &mut found);
        found
    }

    /// Elements carrying `class`, in document order.
    pub fn elements_by_class(&self, class: &str) -> Vec<NodeId> {
        let mut all = vec![self.root];
        all.extend(self.descendants(self.root));
        all.into_iter()
            .filter(|id| self.element(*id).is_some_and(|e| e.has_class(class)))
            .collect()
    }

    pub fn text_content(&self, id: NodeId) -> String {
        let mut text = String::new();
        self.collect_text(id, None, &mut text);
        text
    }

    /// Like [`Document::text_content`] but ignoring subtrees whose root
    /// carries `class`.
    pub fn text_content_skipping(&self, id: NodeId, class: &str) -> String {
        let mut text = String::new();
        self.collect_text(id, Some(class), &mut text);
        text
    }

    /// Drain the mutation records accumulated since the last call.
    pub fn take_mutations(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.mutations)
    }

    pub fn to_html(&self) -> String {
        let mut html = String::new();
        self.write_html(self.root, &mut html);
        html
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.element(id).and_then(|e| e.parent) else {
            return;
        };
        if let Some(element) = self.element_mut(parent) {
            element.children.retain(|child| *child != Child::Element(id));
        }
        if let Some(element) = self.element_mut(id) {
            element.parent = None;
        }
        self.mutations.push(MutationRecord {
            target: parent,
            added_nodes: 0,
            removed_nodes: 1,
        });
    }

    fn is_ancestor(&self, candidate: NodeId, of: NodeId) -> bool {
        let mut current = self.element(of).and_then(|e| e.parent);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.element(id).and_then(|e| e.parent);
        }
        false
    }

    fn collect_descendants(&self, id: NodeId, found: &mut Vec<NodeId>) {
        let Some(element) = self.element(id) else {
            return;
        };
        for child in &element.children {
            if let Child::Element(child_id) = child {
                found.push(*child_id);
                self.collect_descendants(*child_id, found);
            }
        }
    }

    fn collect_text(&self, id: NodeId, skip_class: Option<&str>, text: &mut String) {
        let Some(element) = self.element(id) else {
            return;
        };
        for child in &element.children {
            match child {
                Child::Text(value) => text.push_str(value),
                Child::Element(child_id) => {
                    let skipped = skip_class.is_some_and(|class| {
                        self.element(*child_id).is_some_and(|e| e.has_class(class))
                    });
                    if !skipped {
                        self.collect_text(*child_id, skip_class, text);
                    }
                }
            }
        }
    }

    fn write_html(&self, id: NodeId, html: &mut String) {
        let Some(element) = self.element(id) else {
            return;
        };

        html.push('<');
        html.push_str(&element.tag);
        if !element.classes.is_empty() {
            html.push_str(&format!(" class=\"{}\"", escape(&element.classes.join(" "))));
        }
        for (name, value) in &element.attributes {
            html.push_str(&format!(" {}=\"{}\"", name, escape(value)));
        }
        if !element.style.is_empty() {
            html.push_str(&format!(" style=\"{}\"", escape(&element.style.css_text())));
        }
        html.push('>');

        for child in &element.children {
            match child {
                Child::Text(value) => html.push_str(&escape(value)),
                Child::Element(child_id) => self.write_html(*child_id, html),
            }
        }

        html.push_str(&format!("</{}>", element.tag));
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
