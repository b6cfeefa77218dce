use crate::Extractor;
use poi_dom::{DomDocument, DomNode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Unknown,
}

impl Role {
    pub fn parse(value: &str) -> Self {
        match value {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            _ => Role::Unknown,
        }
    }
}

/// One chat message found on the page. Regenerated on every extraction pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Message<N> {
    /// `msg_<1-based index>_<raw role>`
    pub id: String,
    /// 0-based position among all messages, in document order.
    pub index: usize,
    pub role: Role,
    pub element: N,
}

impl Extractor {
    /// All elements carrying the message marker, in document order.
    pub fn find_message_elements<D: DomDocument>(&self, doc: &D) -> Vec<D::Node> {
        let nodes = doc.select_all(&self.message_selector);
        log::trace!("find_message_elements: {} match(es)", nodes.len());
        nodes
    }

    pub fn extract_messages<D: DomDocument>(&self, doc: &D) -> Vec<Message<D::Node>> {
        self.find_message_elements(doc)
            .into_iter()
            .enumerate()
            .map(|(index, element)| {
                let raw_role = element
                    .attribute(&self.role_attribute)
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| "unknown".to_string());
                Message {
                    id: format!("msg_{}_{}", index + 1, raw_role),
                    index,
                    role: Role::parse(&raw_role),
                    element,
                }
            })
            .collect()
    }

    /// The nearest ancestor-or-self of `node` that carries the message marker.
    pub fn message_root_of<N: DomNode>(&self, node: &N) -> Option<N> {
        let mut current = Some(node.clone());
        while let Some(candidate) = current {
            if candidate.attribute(&self.role_attribute).is_some() {
                return Some(candidate);
            }
            current = candidate.parent();
        }
        None
    }
}
