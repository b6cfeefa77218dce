//! [`DomNode`] and [`DomDocument`] over the live browser DOM.
//!
//! Selector queries go straight to the browser's `querySelectorAll` using the
//! selector's source text; the in-crate matcher is only the fallback when the
//! browser rejects a selector.

use crate::error::{host_error, js_message};
use poi_dom::{DomDocument, DomError, DomNode, Overflow, ScrollBehavior, SelectorList};
use poi_types::{Rect, ScrollMetrics};
use std::cmp::Ordering;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Node, NodeList, ScrollToOptions};

/// A handle to a page element. Equality is element identity.
#[derive(Debug, Clone, PartialEq)]
pub struct WebNode(Element);

impl WebNode {
    pub fn new(element: Element) -> Self {
        Self(element)
    }

    pub fn element(&self) -> &Element {
        &self.0
    }

    fn node(&self) -> &Node {
        &self.0
    }
}

impl From<Element> for WebNode {
    fn from(element: Element) -> Self {
        Self(element)
    }
}

fn elements_of(list: NodeList) -> Vec<WebNode> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .map(WebNode)
        .collect()
}

impl DomNode for WebNode {
    fn tag_name(&self) -> String {
        self.0.tag_name().to_ascii_lowercase()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }

    fn parent(&self) -> Option<Self> {
        self.0.parent_element().map(WebNode)
    }

    fn children(&self) -> Vec<Self> {
        let children = self.0.children();
        (0..children.length())
            .filter_map(|i| children.item(i))
            .map(WebNode)
            .collect()
    }

    fn text_content(&self) -> String {
        self.0.text_content().unwrap_or_default()
    }

    fn is_connected(&self) -> bool {
        self.0.is_connected()
    }

    fn overflow_y(&self) -> Result<Overflow, DomError> {
        let window = web_sys::window().ok_or_else(|| DomError::Host("no window".to_string()))?;
        let style = window
            .get_computed_style(&self.0)
            .map_err(host_error)?
            .ok_or_else(|| DomError::Host("no computed style".to_string()))?;
        let value = style.get_property_value("overflow-y").map_err(host_error)?;
        Ok(Overflow::parse(&value))
    }

    fn bounding_rect(&self) -> Rect {
        let rect = self.0.get_bounding_client_rect();
        Rect::new(rect.top(), rect.left(), rect.width(), rect.height())
    }

    fn scroll_metrics(&self) -> ScrollMetrics {
        ScrollMetrics::new(
            self.0.scroll_top() as f64,
            self.0.scroll_height() as f64,
            self.0.client_height() as f64,
        )
    }

    fn scroll_to(&self, top: f64, behavior: ScrollBehavior) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(match behavior {
            ScrollBehavior::Auto => web_sys::ScrollBehavior::Auto,
            ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
        });
        self.0.scroll_to_with_scroll_to_options(&options);
    }

    fn compare_position(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            return Some(Ordering::Equal);
        }
        let position = self.node().compare_document_position(other.node());
        if position & Node::DOCUMENT_POSITION_DISCONNECTED != 0 {
            None
        } else if position & Node::DOCUMENT_POSITION_FOLLOWING != 0 {
            Some(Ordering::Less)
        } else if position & Node::DOCUMENT_POSITION_PRECEDING != 0 {
            Some(Ordering::Greater)
        } else {
            None
        }
    }

    fn select_all(&self, selector: &SelectorList) -> Vec<Self> {
        match self.0.query_selector_all(selector.source()) {
            Ok(list) => elements_of(list),
            Err(err) => {
                log::warn!(
                    "querySelectorAll('{}') rejected: {}",
                    selector.source(),
                    js_message(&err)
                );
                self.descendants()
                    .into_iter()
                    .filter(|n| selector.matches(n))
                    .collect()
            }
        }
    }

    fn select_first(&self, selector: &SelectorList) -> Option<Self> {
        match self.0.query_selector(selector.source()) {
            Ok(found) => found.map(WebNode),
            Err(_) => self.select_all(selector).into_iter().next(),
        }
    }

    fn contains(&self, other: &Self) -> bool {
        self.node().contains(Some(other.node()))
    }
}

/// The page's `document`.
#[derive(Debug, Clone)]
pub struct WebDocument {
    document: Document,
}

impl WebDocument {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// The document of the current window, if there is one.
    pub fn current() -> Option<Self> {
        web_sys::window()?.document().map(Self::new)
    }
}

impl DomDocument for WebDocument {
    type Node = WebNode;

    fn document_element(&self) -> Option<WebNode> {
        self.document.document_element().map(WebNode)
    }

    fn body(&self) -> Option<WebNode> {
        self.document.body().map(|body| WebNode(body.into()))
    }

    fn location(&self) -> String {
        self.document
            .location()
            .and_then(|location| location.href().ok())
            .unwrap_or_default()
    }

    fn select_all(&self, selector: &SelectorList) -> Vec<WebNode> {
        match self.document.query_selector_all(selector.source()) {
            Ok(list) => elements_of(list),
            Err(err) => {
                log::warn!(
                    "querySelectorAll('{}') rejected: {}",
                    selector.source(),
                    js_message(&err)
                );
                let Some(root) = self.document_element() else {
                    return Vec::new();
                };
                let mut found: Vec<WebNode> = Vec::new();
                if selector.matches(&root) {
                    found.push(root.clone());
                }
                found.extend(root.descendants().into_iter().filter(|n| selector.matches(n)));
                found
            }
        }
    }

    fn select_first(&self, selector: &SelectorList) -> Option<WebNode> {
        match self.document.query_selector(selector.source()) {
            Ok(found) => found.map(WebNode),
            Err(_) => self.select_all(selector).into_iter().next(),
        }
    }
}
