//! A CSS selector subset: type, class, attribute and `:first-child` selectors,
//! combined with descendant (` `) and child (`>`) combinators, in comma lists.
//!
//! That covers every selector the extractor and the known scroll-container
//! fallbacks use (`[data-message-author-role]`, `thead tr, tr`,
//! `div > div:first-child`, `[class*=overflow-y-auto]`, ...).

mod parser;

use crate::node::DomNode;
pub use parser::parse_selector;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrOp {
    /// `[attr]`
    Exists,
    /// `[attr=value]`
    Equals(String),
    /// `[attr*=value]`
    Contains(String),
    /// `[attr^=value]`
    Prefix(String),
    /// `[attr~=value]`
    Word(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    Type(String),
    Universal,
    Class(String),
    Attribute { name: String, op: AttrOp },
    FirstChild,
}

/// A sequence of simple selectors that must all match the same element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Compound {
    pub parts: Vec<SimpleSelector>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
}

/// `compound (combinator compound)*`, stored left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    pub head: Compound,
    pub tail: Vec<(Combinator, Compound)>,
}

/// A comma-separated selector list, as accepted by `querySelectorAll`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    source: String,
    selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    pub(crate) fn new(source: &str, selectors: Vec<ComplexSelector>) -> Self {
        Self {
            source: source.trim().to_string(),
            selectors,
        }
    }

    /// The selector text, normalized by trimming. Hosts with a native selector
    /// engine can pass it straight to `querySelectorAll`.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn selectors(&self) -> &[ComplexSelector] {
        &self.selectors
    }

    pub fn matches<N: DomNode>(&self, node: &N) -> bool {
        self.selectors.iter().any(|s| s.matches(node))
    }
}

impl ComplexSelector {
    pub fn matches<N: DomNode>(&self, node: &N) -> bool {
        // Right-to-left: the subject compound comes first.
        let mut steps: Vec<(&Compound, Option<Combinator>)> = Vec::with_capacity(self.tail.len() + 1);
        for (combinator, compound) in self.tail.iter().rev() {
            steps.push((compound, Some(*combinator)));
        }
        steps.push((&self.head, None));
        match_steps(node, &steps)
    }
}

/// `steps[0]` is matched against `node`; its combinator says how to reach the
/// element that must match `steps[1]`.
fn match_steps<N: DomNode>(node: &N, steps: &[(&Compound, Option<Combinator>)]) -> bool {
    let Some(((compound, combinator), rest)) = steps.split_first() else {
        return true;
    };
    if !compound.matches(node) {
        return false;
    }
    match combinator {
        None => true,
        Some(Combinator::Child) => node.parent().is_some_and(|p| match_steps(&p, rest)),
        Some(Combinator::Descendant) => {
            let mut current = node.parent();
            while let Some(ancestor) = current {
                if match_steps(&ancestor, rest) {
                    return true;
                }
                current = ancestor.parent();
            }
            false
        }
    }
}

impl Compound {
    pub fn matches<N: DomNode>(&self, node: &N) -> bool {
        self.parts.iter().all(|part| part.matches(node))
    }
}

impl SimpleSelector {
    pub fn matches<N: DomNode>(&self, node: &N) -> bool {
        match self {
            SimpleSelector::Universal => true,
            SimpleSelector::Type(name) => node.tag_name().eq_ignore_ascii_case(name),
            SimpleSelector::Class(class) => node.has_class(class),
            SimpleSelector::Attribute { name, op } => {
                let Some(value) = node.attribute(name) else {
                    return false;
                };
                match op {
                    AttrOp::Exists => true,
                    AttrOp::Equals(expected) => &value == expected,
                    AttrOp::Contains(needle) => !needle.is_empty() && value.contains(needle.as_str()),
                    AttrOp::Prefix(prefix) => !prefix.is_empty() && value.starts_with(prefix.as_str()),
                    AttrOp::Word(word) => value.split_whitespace().any(|w| w == word),
                }
            }
            SimpleSelector::FirstChild => match node.parent() {
                Some(parent) => parent.children().first() == Some(node),
                None => true,
            },
        }
    }
}
