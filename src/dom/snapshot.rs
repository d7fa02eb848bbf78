use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Child, Document, NodeId, Style};
use crate::error::StylerResult;

/// JSON form of a page: elements are objects, bare strings are text.
///
/// ```json
/// { "tag": "body", "children": [
///     { "tag": "div", "class": "event", "children": ["Hearing 12/03"] }
/// ] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeSnapshot {
    Text(String),
    Element(ElementSnapshot),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub class: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub style: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

fn default_tag() -> String {
    "div".to_string()
}

impl Document {
    /// Build a document from a snapshot. The snapshot root maps onto the
    /// document body. The returned document has no pending mutations.
    pub fn from_snapshot(snapshot: &NodeSnapshot) -> Self {
        let mut doc = Document::new();
        let root = doc.root();
        match snapshot {
            NodeSnapshot::Text(text) => doc.append_text(root, text.clone()),
            NodeSnapshot::Element(element) => {
                doc.fill(root, element);
            }
        }
        doc.take_mutations();
        doc
    }

    pub fn from_json(json: &str) -> StylerResult<Self> {
        let snapshot: NodeSnapshot = serde_json::from_str(json)?;
        Ok(Self::from_snapshot(&snapshot))
    }

    /// Append the nodes of `snapshot` under `parent`, recording mutations.
    pub fn insert_snapshot(&mut self, parent: NodeId, snapshot: &NodeSnapshot) {
        match snapshot {
            NodeSnapshot::Text(text) => self.append_text(parent, text.clone()),
            NodeSnapshot::Element(element) => {
                let id = self.create_element(&element.tag);
                self.fill(id, element);
                self.append_child(parent, id);
            }
        }
    }

    pub fn to_snapshot(&self) -> NodeSnapshot {
        self.snapshot_of(self.root())
    }

    fn fill(&mut self, id: NodeId, snapshot: &ElementSnapshot) {
        if let Some(element) = self.element_mut(id) {
            for class in snapshot.class.split_whitespace() {
                element.add_class(class);
            }
            element.style = Style::parse(&snapshot.style);
            for (name, value) in &snapshot.attrs {
                element.set_attribute(name, value.clone());
            }
        }
        for child in &snapshot.children {
            self.insert_snapshot(id, child);
        }
    }

    fn snapshot_of(&self, id: NodeId) -> NodeSnapshot {
        let Some(element) = self.element(id) else {
            return NodeSnapshot::Text(String::new());
        };

        NodeSnapshot::Element(ElementSnapshot {
            tag: element.tag.clone(),
            class: element.classes.join(" "),
            style: element.style.css_text(),
            attrs: element.attributes.clone(),
            children: element
                .children()
                .iter()
                .map(|child| match child {
                    Child::Text(text) => NodeSnapshot::Text(text.clone()),
                    Child::Element(child_id) => self.snapshot_of(*child_id),
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() -> StylerResult<()> {
        let doc = Document::from_json(
            r#"{"tag": "body", "children": [
                {"class": "event big", "style": "color: red", "children": [
                    {"tag": "span", "children": ["Hearing ", "12/03"]}
                ]}
            ]}"#,
        )?;

        let events = doc.elements_by_class("event");
        assert_eq!(events.len(), 1);
        let event = doc.element(events[0]).unwrap();
        assert!(event.has_class("big"));
        assert_eq!(event.style.get("color"), Some("red"));
        assert_eq!(doc.text_content(events[0]), "Hearing 12/03");

        Ok(())
    }

    #[test]
    fn test_loaded_document_has_no_pending_mutations() -> StylerResult<()> {
        let mut doc = Document::from_json(r#"{"children": [{"children": ["x"]}]}"#)?;
        assert!(doc.take_mutations().is_empty());
        Ok(())
    }

    #[test]
    fn test_insert_snapshot_records_mutation() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.insert_snapshot(root, &NodeSnapshot::Text("late content".to_string()));
        assert_eq!(doc.take_mutations().len(), 1);
        assert_eq!(doc.text_content(root), "late content");
    }
}
