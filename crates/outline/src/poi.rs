use poi_dom::DomNode;
use poi_types::{ColorTag, PoiId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoiKind {
    Prompt,
    Response,
    Heading,
    Code,
    Table,
}

impl PoiKind {
    pub fn is_message(&self) -> bool {
        matches!(self, PoiKind::Prompt | PoiKind::Response)
    }
}

/// A non-owning reference to the host element an entry represents.
///
/// The host page owns the element and may remove it at any time, so the node is
/// only handed out after a liveness check.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor<N>(N);

impl<N: DomNode> Anchor<N> {
    pub fn new(node: N) -> Self {
        Self(node)
    }

    /// The element, if it is still attached to the document.
    pub fn live(&self) -> Option<&N> {
        self.0.is_connected().then_some(&self.0)
    }

    /// Identity comparison with a node the host handed back (an observer entry).
    pub fn is(&self, node: &N) -> bool {
        &self.0 == node
    }

    /// The handle without a liveness check, for ordering and identity only.
    pub fn handle(&self) -> &N {
        &self.0
    }
}

/// One outline entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Poi<N> {
    pub id: PoiId,
    pub kind: PoiKind,
    pub title: String,
    pub anchor: Anchor<N>,
    /// The owning message entry; `None` for prompt/response entries.
    pub parent_id: Option<PoiId>,
    /// Indentation level: 0 for messages, the heading level for headings, 1 otherwise.
    pub depth: u8,
    pub marked: bool,
    pub color_tag: Option<ColorTag>,
}

impl<N: DomNode> Poi<N> {
    pub fn summary(&self) -> PoiSummary {
        PoiSummary {
            id: self.id.clone(),
            kind: self.kind,
            title: self.title.clone(),
            parent_id: self.parent_id.clone(),
            depth: self.depth,
            marked: self.marked,
            color_tag: self.color_tag,
        }
    }
}

/// The serializable part of a [`Poi`], handed to presentation layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoiSummary {
    pub id: PoiId,
    pub kind: PoiKind,
    pub title: String,
    pub parent_id: Option<PoiId>,
    pub depth: u8,
    pub marked: bool,
    pub color_tag: Option<ColorTag>,
}
