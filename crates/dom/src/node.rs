//! Defines the contract for a node in a live, externally mutated element tree.

use crate::error::DomError;
use crate::order;
use crate::selector::SelectorList;
use poi_types::{Rect, ScrollMetrics};
use std::cmp::Ordering;
use std::fmt::Debug;

/// The computed `overflow-y` of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Clip,
    Auto,
    Scroll,
}

impl Overflow {
    /// Parses a CSS `overflow-y` value. Unknown values map to `Visible`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Overflow::Auto,
            "scroll" => Overflow::Scroll,
            "hidden" => Overflow::Hidden,
            "clip" => Overflow::Clip,
            _ => Overflow::Visible,
        }
    }

    /// `auto` and `scroll` are the only values that make an element a scroll container
    /// for our purposes.
    pub fn is_scrollable(&self) -> bool {
        matches!(self, Overflow::Auto | Overflow::Scroll)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBehavior {
    #[default]
    Auto,
    Smooth,
}

/// The universal contract for an element in the host page.
///
/// A node is a non-owning handle: the host page owns the element and may detach it
/// at any time. Callers holding a node across event-loop turns must check
/// [`DomNode::is_connected`] before acting on it.
///
/// Only element nodes are exposed; text is reachable through [`DomNode::text_content`].
pub trait DomNode: Debug + Clone + PartialEq + 'static {
    /// Lower-case tag name (`div`, `h2`, `pre`).
    fn tag_name(&self) -> String;

    fn attribute(&self, name: &str) -> Option<String>;

    /// The parent element. `None` for the document element and for detached roots.
    fn parent(&self) -> Option<Self>;

    /// Element children in document order.
    fn children(&self) -> Vec<Self>;

    /// Concatenation of all descendant text, like the DOM's `textContent`.
    fn text_content(&self) -> String;

    /// Whether the node is still part of its document.
    fn is_connected(&self) -> bool;

    /// The computed `overflow-y` style.
    fn overflow_y(&self) -> Result<Overflow, DomError>;

    /// Viewport-relative bounding box.
    fn bounding_rect(&self) -> Rect;

    fn scroll_metrics(&self) -> ScrollMetrics;

    /// Scrolls this element's content to `top`. Hosts clamp to the valid range.
    fn scroll_to(&self, top: f64, behavior: ScrollBehavior);

    /// Document-order comparison. `None` when the nodes do not share a root.
    fn compare_position(&self, other: &Self) -> Option<Ordering> {
        order::compare_by_ancestry(self, other)
    }

    /// All descendant elements matching `selector`, in document order.
    fn select_all(&self, selector: &SelectorList) -> Vec<Self> {
        self.descendants()
            .into_iter()
            .filter(|n| selector.matches(n))
            .collect()
    }

    /// First descendant element matching `selector` in document order.
    fn select_first(&self, selector: &SelectorList) -> Option<Self> {
        self.descendants().into_iter().find(|n| selector.matches(n))
    }

    /// Pre-order traversal of descendant elements, excluding `self`.
    fn descendants(&self) -> Vec<Self> {
        let mut results = Vec::new();
        let mut stack: Vec<Self> = self.children().into_iter().rev().collect();
        while let Some(current) = stack.pop() {
            stack.extend(current.children().into_iter().rev());
            results.push(current);
        }
        results
    }

    fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|value| value.split_whitespace().any(|c| c == class))
    }

    /// Whether `other` is `self` or one of its descendants.
    fn contains(&self, other: &Self) -> bool {
        let mut current = Some(other.clone());
        while let Some(node) = current {
            if &node == self {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// The node followed by its ancestors, innermost first.
    fn ancestry(&self) -> Vec<Self> {
        let mut chain = vec![self.clone()];
        let mut current = self.parent();
        while let Some(node) = current {
            current = node.parent();
            chain.push(node);
        }
        chain
    }
}

/// The document hosting the nodes.
pub trait DomDocument {
    type Node: DomNode;

    /// The root element (`<html>`), if the document has one yet.
    fn document_element(&self) -> Option<Self::Node>;

    /// The `<body>` element, if present.
    fn body(&self) -> Option<Self::Node>;

    /// The URL of the current page, used to scope persisted annotations.
    fn location(&self) -> String;

    /// All elements matching `selector` in document order, including the root.
    fn select_all(&self, selector: &SelectorList) -> Vec<Self::Node> {
        let Some(root) = self.document_element() else {
            return Vec::new();
        };
        let mut results = Vec::new();
        if selector.matches(&root) {
            results.push(root.clone());
        }
        results.extend(root.select_all(selector));
        results
    }

    fn select_first(&self, selector: &SelectorList) -> Option<Self::Node> {
        let root = self.document_element()?;
        if selector.matches(&root) {
            return Some(root);
        }
        root.select_first(selector)
    }

    /// Whether `node` is attached to this document.
    fn contains(&self, node: &Self::Node) -> bool {
        node.is_connected()
            && self
                .document_element()
                .is_some_and(|root| root.contains(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_parsing() {
        assert_eq!(Overflow::parse("auto"), Overflow::Auto);
        assert_eq!(Overflow::parse(" SCROLL "), Overflow::Scroll);
        assert_eq!(Overflow::parse("overlay"), Overflow::Visible);
        assert!(Overflow::Auto.is_scrollable());
        assert!(!Overflow::Hidden.is_scrollable());
    }
}
