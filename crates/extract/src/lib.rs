//! # poi-extract
//!
//! Reads the host page and answers three questions, any of which may legitimately
//! be "not yet": which elements are chat messages, which element scrolls them, and
//! which subtree contains all of them.

mod container;
mod messages;
mod scroll;

pub use messages::{Message, Role};
pub use scroll::scroll_into_view;

use poi_dom::{DomError, SelectorList, parse_selector};

/// The default marker attribute carrying a message's author role.
pub const ROLE_ATTRIBUTE: &str = "data-message-author-role";

/// Container selectors tried when no scrollable ancestor of the first message exists.
pub const FALLBACK_CONTAINER_SELECTORS: [&str; 4] = [
    ".flex.h-full.flex-col.overflow-y-auto",
    "[class*=overflow-y-auto]",
    ".react-scroll-to-bottom--css",
    "[data-testid='conversation']",
];

/// Compiled selectors for one host page layout.
#[derive(Debug, Clone)]
pub struct Extractor {
    message_selector: SelectorList,
    role_attribute: String,
    fallback_containers: Vec<SelectorList>,
}

impl Extractor {
    pub fn new(
        message_selector: &str,
        role_attribute: &str,
        fallback_containers: &[String],
    ) -> Result<Self, DomError> {
        let fallback_containers = fallback_containers
            .iter()
            .map(|s| parse_selector(s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            message_selector: parse_selector(message_selector)?,
            role_attribute: role_attribute.to_string(),
            fallback_containers,
        })
    }

    /// The extractor for pages marking messages with `data-message-author-role`.
    pub fn standard() -> Result<Self, DomError> {
        let fallbacks: Vec<String> = FALLBACK_CONTAINER_SELECTORS
            .iter()
            .map(|s| s.to_string())
            .collect();
        Self::new(&format!("[{}]", ROLE_ATTRIBUTE), ROLE_ATTRIBUTE, &fallbacks)
    }

    pub fn role_attribute(&self) -> &str {
        &self.role_attribute
    }
}
