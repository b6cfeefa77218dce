//! An in-memory, mutable DOM.
//!
//! `MemoryDom` stands in for the browser DOM on native targets: it can be built
//! from an XHTML snapshot (parsed with `roxmltree`), mutated the way a chat page
//! mutates itself (appending messages, replacing nodes, streaming text), and given
//! synthetic layout (bounding boxes, scroll metrics, overflow) so that scroll and
//! visibility logic can be exercised deterministically.

use crate::error::DomError;
use crate::node::{DomDocument, DomNode, Overflow, ScrollBehavior};
use poi_types::{Rect, ScrollMetrics};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

const DOCUMENT: usize = 0;

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone, Default)]
struct Layout {
    rect: Rect,
    scroll: ScrollMetrics,
    overflow_y: Option<Overflow>,
    last_scroll_behavior: Option<ScrollBehavior>,
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<usize>,
    children: Vec<usize>,
    layout: Layout,
}

#[derive(Debug)]
struct Arena {
    nodes: Vec<NodeData>,
    url: String,
}

impl Arena {
    fn push(&mut self, kind: NodeKind) -> usize {
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
            layout: Layout::default(),
        });
        self.nodes.len() - 1
    }

    fn is_element(&self, id: usize) -> bool {
        matches!(self.nodes[id].kind, NodeKind::Element { .. })
    }

    fn detach(&mut self, id: usize) {
        if let Some(parent) = self.nodes[id].parent.take() {
            self.nodes[parent].children.retain(|c| *c != id);
        }
    }

    fn text_of(&self, id: usize, out: &mut String) {
        match &self.nodes[id].kind {
            NodeKind::Text(text) => out.push_str(text),
            _ => {
                for child in &self.nodes[id].children {
                    self.text_of(*child, out);
                }
            }
        }
    }
}

/// A handle to an in-memory DOM tree. Cloning shares the tree.
#[derive(Clone)]
pub struct MemoryDom {
    arena: Rc<RefCell<Arena>>,
}

/// A handle to one element of a [`MemoryDom`].
#[derive(Clone)]
pub struct MemNode {
    arena: Rc<RefCell<Arena>>,
    id: usize,
}

impl MemoryDom {
    /// Creates an empty document with no root element.
    pub fn new() -> Self {
        let mut arena = Arena {
            nodes: Vec::new(),
            url: "about:blank".to_string(),
        };
        arena.push(NodeKind::Document);
        Self {
            arena: Rc::new(RefCell::new(arena)),
        }
    }

    /// Builds a document from a well-formed XHTML snapshot.
    pub fn parse(xml: &str) -> Result<Self, DomError> {
        let parsed = roxmltree::Document::parse(xml).map_err(|e| DomError::Parse(e.to_string()))?;
        let dom = Self::new();
        {
            let mut arena = dom.arena.borrow_mut();
            let root = parsed.root_element();
            copy_subtree(&mut arena, root, DOCUMENT);
            log::debug!("parsed snapshot <{}> into {} node(s)", root.tag_name().name(), arena.nodes.len());
        }
        Ok(dom)
    }

    pub fn with_url(self, url: impl Into<String>) -> Self {
        self.arena.borrow_mut().url = url.into();
        self
    }

    pub fn set_url(&self, url: impl Into<String>) {
        self.arena.borrow_mut().url = url.into();
    }

    /// Creates a detached element.
    pub fn create_element(&self, tag: &str) -> MemNode {
        let id = self.arena.borrow_mut().push(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
        });
        self.node(id)
    }

    /// Parses an XHTML fragment into a detached element.
    pub fn create_fragment(&self, xml: &str) -> Result<MemNode, DomError> {
        let parsed = roxmltree::Document::parse(xml).map_err(|e| DomError::Parse(e.to_string()))?;
        let mut arena = self.arena.borrow_mut();
        let id = arena.push(NodeKind::Document);
        copy_subtree(&mut arena, parsed.root_element(), id);
        let element = arena.nodes[id].children[0];
        arena.detach(element);
        Ok(self.node(element))
    }

    /// Installs `node` as the document element, replacing any existing one.
    pub fn set_document_element(&self, node: &MemNode) {
        let mut arena = self.arena.borrow_mut();
        let old: Vec<usize> = arena.nodes[DOCUMENT].children.clone();
        for child in old {
            arena.detach(child);
        }
        arena.detach(node.id);
        arena.nodes[node.id].parent = Some(DOCUMENT);
        arena.nodes[DOCUMENT].children.push(node.id);
    }

    fn node(&self, id: usize) -> MemNode {
        MemNode {
            arena: self.arena.clone(),
            id,
        }
    }
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryDom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arena = self.arena.borrow();
        f.debug_struct("MemoryDom")
            .field("url", &arena.url)
            .field("nodes", &arena.nodes.len())
            .finish()
    }
}

fn copy_subtree(arena: &mut Arena, source: roxmltree::Node<'_, '_>, parent: usize) {
    let kind = if source.is_element() {
        NodeKind::Element {
            tag: source.tag_name().name().to_ascii_lowercase(),
            attributes: source
                .attributes()
                .map(|a| (a.name().to_ascii_lowercase(), a.value().to_string()))
                .collect(),
        }
    } else if source.is_text() {
        NodeKind::Text(source.text().unwrap_or("").to_string())
    } else {
        return;
    };

    let id = arena.push(kind);
    arena.nodes[id].parent = Some(parent);
    arena.nodes[parent].children.push(id);

    for child in source.children() {
        copy_subtree(arena, child, id);
    }
}

impl DomDocument for MemoryDom {
    type Node = MemNode;

    fn document_element(&self) -> Option<MemNode> {
        let arena = self.arena.borrow();
        let id = arena.nodes[DOCUMENT]
            .children
            .iter()
            .copied()
            .find(|c| arena.is_element(*c))?;
        drop(arena);
        Some(self.node(id))
    }

    fn body(&self) -> Option<MemNode> {
        let root = self.document_element()?;
        if root.tag_name() == "body" {
            return Some(root);
        }
        root.descendants().into_iter().find(|n| n.tag_name() == "body")
    }

    fn location(&self) -> String {
        self.arena.borrow().url.clone()
    }
}

impl MemNode {
    /// Appends `child` as the last child, detaching it from any previous parent.
    pub fn append_child(&self, child: &MemNode) {
        let mut arena = self.arena.borrow_mut();
        arena.detach(child.id);
        arena.nodes[child.id].parent = Some(self.id);
        arena.nodes[self.id].children.push(child.id);
    }

    /// Parses `xml` and appends the resulting element.
    pub fn append_fragment(&self, xml: &str) -> Result<MemNode, DomError> {
        let dom = MemoryDom {
            arena: self.arena.clone(),
        };
        let node = dom.create_fragment(xml)?;
        self.append_child(&node);
        Ok(node)
    }

    /// Detaches this element from its parent. The handle stays usable but is no
    /// longer connected.
    pub fn remove(&self) {
        self.arena.borrow_mut().detach(self.id);
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        let mut arena = self.arena.borrow_mut();
        if let NodeKind::Element { attributes, .. } = &mut arena.nodes[self.id].kind {
            let name = name.to_ascii_lowercase();
            match attributes.iter_mut().find(|(k, _)| *k == name) {
                Some(slot) => slot.1 = value.to_string(),
                None => attributes.push((name, value.to_string())),
            }
        }
    }

    /// Replaces all children with a single text node.
    pub fn set_text(&self, text: &str) {
        let mut arena = self.arena.borrow_mut();
        let old = std::mem::take(&mut arena.nodes[self.id].children);
        for child in old {
            arena.nodes[child].parent = None;
        }
        let text_id = arena.push(NodeKind::Text(text.to_string()));
        arena.nodes[text_id].parent = Some(self.id);
        arena.nodes[self.id].children.push(text_id);
    }

    /// Appends text to the last text child, the way a streamed token would.
    pub fn append_text(&self, text: &str) {
        let mut arena = self.arena.borrow_mut();
        if let Some(last) = arena.nodes[self.id].children.last().copied() {
            if let NodeKind::Text(existing) = &mut arena.nodes[last].kind {
                existing.push_str(text);
                return;
            }
        }
        let text_id = arena.push(NodeKind::Text(text.to_string()));
        arena.nodes[text_id].parent = Some(self.id);
        arena.nodes[self.id].children.push(text_id);
    }

    pub fn set_rect(&self, rect: Rect) {
        self.arena.borrow_mut().nodes[self.id].layout.rect = rect;
    }

    pub fn set_scroll_metrics(&self, metrics: ScrollMetrics) {
        self.arena.borrow_mut().nodes[self.id].layout.scroll = metrics;
    }

    /// Changes the scrollable content height, keeping `scroll_top` in range.
    pub fn set_scroll_height(&self, height: f64) {
        let mut arena = self.arena.borrow_mut();
        let scroll = &mut arena.nodes[self.id].layout.scroll;
        scroll.scroll_height = height;
        scroll.scroll_top = scroll.scroll_top.clamp(0.0, scroll.max_scroll());
    }

    pub fn set_overflow_y(&self, overflow: Overflow) {
        self.arena.borrow_mut().nodes[self.id].layout.overflow_y = Some(overflow);
    }

    /// The behavior of the most recent [`DomNode::scroll_to`] call.
    pub fn last_scroll_behavior(&self) -> Option<ScrollBehavior> {
        self.arena.borrow().nodes[self.id].layout.last_scroll_behavior
    }

    fn handle(&self, id: usize) -> MemNode {
        MemNode {
            arena: self.arena.clone(),
            id,
        }
    }

    fn style_overflow(&self) -> Overflow {
        let Some(style) = self.attribute("style") else {
            return Overflow::Visible;
        };
        let mut overflow = Overflow::Visible;
        for declaration in style.split(';') {
            let Some((property, value)) = declaration.split_once(':') else {
                continue;
            };
            match property.trim().to_ascii_lowercase().as_str() {
                "overflow-y" => return Overflow::parse(value),
                "overflow" => overflow = Overflow::parse(value),
                _ => {}
            }
        }
        overflow
    }
}

impl PartialEq for MemNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.arena, &other.arena) && self.id == other.id
    }
}

impl Eq for MemNode {}

impl Hash for MemNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for MemNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}#{}>", self.tag_name(), self.id)
    }
}

impl DomNode for MemNode {
    fn tag_name(&self) -> String {
        match &self.arena.borrow().nodes[self.id].kind {
            NodeKind::Element { tag, .. } => tag.clone(),
            NodeKind::Text(_) => "#text".to_string(),
            NodeKind::Document => "#document".to_string(),
        }
    }

    fn attribute(&self, name: &str) -> Option<String> {
        match &self.arena.borrow().nodes[self.id].kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.clone()),
            _ => None,
        }
    }

    fn parent(&self) -> Option<Self> {
        let arena = self.arena.borrow();
        let parent = arena.nodes[self.id].parent?;
        if !arena.is_element(parent) {
            return None;
        }
        drop(arena);
        Some(self.handle(parent))
    }

    fn children(&self) -> Vec<Self> {
        let arena = self.arena.borrow();
        let ids: Vec<usize> = arena.nodes[self.id]
            .children
            .iter()
            .copied()
            .filter(|c| arena.is_element(*c))
            .collect();
        drop(arena);
        ids.into_iter().map(|id| self.handle(id)).collect()
    }

    fn text_content(&self) -> String {
        let mut out = String::new();
        self.arena.borrow().text_of(self.id, &mut out);
        out
    }

    fn is_connected(&self) -> bool {
        let arena = self.arena.borrow();
        let mut current = Some(self.id);
        while let Some(id) = current {
            if id == DOCUMENT {
                return true;
            }
            current = arena.nodes[id].parent;
        }
        false
    }

    fn overflow_y(&self) -> Result<Overflow, DomError> {
        if !self.is_connected() {
            return Err(DomError::Detached(format!("{:?}", self)));
        }
        let explicit = self.arena.borrow().nodes[self.id].layout.overflow_y;
        Ok(explicit.unwrap_or_else(|| self.style_overflow()))
    }

    fn bounding_rect(&self) -> Rect {
        self.arena.borrow().nodes[self.id].layout.rect
    }

    fn scroll_metrics(&self) -> ScrollMetrics {
        self.arena.borrow().nodes[self.id].layout.scroll
    }

    fn scroll_to(&self, top: f64, behavior: ScrollBehavior) {
        let mut arena = self.arena.borrow_mut();
        let layout = &mut arena.nodes[self.id].layout;
        layout.scroll.scroll_top = top.clamp(0.0, layout.scroll.max_scroll());
        layout.last_scroll_behavior = Some(behavior);
    }

    fn compare_position(&self, other: &Self) -> Option<Ordering> {
        if !Rc::ptr_eq(&self.arena, &other.arena) {
            return None;
        }
        crate::order::compare_by_ancestry(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::parse_selector;

    const CHAT: &str = r#"<html><body><main style="overflow-y: auto"><article data-message-author-role="user">Hello
there</article></main></body></html>"#;

    #[test]
    fn parses_snapshot_and_reads_text() {
        let dom = MemoryDom::parse(CHAT).unwrap();
        let article = dom
            .select_first(&parse_selector("article").unwrap())
            .unwrap();
        assert_eq!(article.text_content(), "Hello\nthere");
        assert_eq!(article.attribute("data-message-author-role").as_deref(), Some("user"));
        assert_eq!(dom.body().unwrap().tag_name(), "body");
    }

    #[test]
    fn overflow_from_style_attribute() {
        let dom = MemoryDom::parse(CHAT).unwrap();
        let main = dom.select_first(&parse_selector("main").unwrap()).unwrap();
        assert_eq!(main.overflow_y().unwrap(), Overflow::Auto);
        let body = dom.body().unwrap();
        assert_eq!(body.overflow_y().unwrap(), Overflow::Visible);
    }

    #[test]
    fn removal_disconnects_subtree() {
        let dom = MemoryDom::parse(CHAT).unwrap();
        let main = dom.select_first(&parse_selector("main").unwrap()).unwrap();
        let article = main.children()[0].clone();
        assert!(article.is_connected());
        main.remove();
        assert!(!article.is_connected());
        assert!(main.overflow_y().is_err());
        assert!(dom.select_first(&parse_selector("article").unwrap()).is_none());
    }

    #[test]
    fn append_fragment_and_stream_text() {
        let dom = MemoryDom::parse(CHAT).unwrap();
        let main = dom.select_first(&parse_selector("main").unwrap()).unwrap();
        let reply = main
            .append_fragment(r#"<article data-message-author-role="assistant">Hi</article>"#)
            .unwrap();
        reply.append_text(" there");
        assert_eq!(reply.text_content(), "Hi there");
        assert_eq!(main.children().len(), 2);
        assert!(reply.is_connected());
    }

    #[test]
    fn scroll_to_clamps_to_range() {
        let dom = MemoryDom::parse(CHAT).unwrap();
        let main = dom.select_first(&parse_selector("main").unwrap()).unwrap();
        main.set_scroll_metrics(ScrollMetrics::new(0.0, 1000.0, 400.0));
        main.scroll_to(900.0, ScrollBehavior::Smooth);
        assert_eq!(main.scroll_metrics().scroll_top, 600.0);
        main.scroll_to(-5.0, ScrollBehavior::Auto);
        assert_eq!(main.scroll_metrics().scroll_top, 0.0);
        assert_eq!(main.last_scroll_behavior(), Some(ScrollBehavior::Auto));
    }
}
