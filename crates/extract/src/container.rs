use crate::Extractor;
use poi_dom::{DomDocument, DomNode};

/// Scrollability test shared by both lookup strategies. A failed style read
/// (node detached mid-walk) counts as "not scrollable".
fn is_scrollable<N: DomNode>(node: &N) -> bool {
    match node.overflow_y() {
        Ok(overflow) => overflow.is_scrollable(),
        Err(err) => {
            log::debug!("overflow lookup failed for {:?}: {}", node, err);
            false
        }
    }
}

impl Extractor {
    /// The element that scrolls the conversation.
    ///
    /// Walks up from the first message to (excluding) `<body>` looking for a
    /// computed `overflow-y` of `auto` or `scroll`, then falls back to the known
    /// container selectors, still requiring scrollability. `None` means "not ready".
    pub fn find_scroll_container<D: DomDocument>(&self, doc: &D) -> Option<D::Node> {
        let messages = self.find_message_elements(doc);
        let Some(first) = messages.first() else {
            log::trace!("find_scroll_container: no messages yet");
            return None;
        };

        let body = doc.body();
        let mut current = first.parent();
        while let Some(candidate) = current {
            if body.as_ref() == Some(&candidate) {
                break;
            }
            if is_scrollable(&candidate) {
                log::debug!(
                    "find_scroll_container: scrollable ancestor <{}>",
                    candidate.tag_name()
                );
                return Some(candidate);
            }
            current = candidate.parent();
        }

        for selector in &self.fallback_containers {
            let Some(candidate) = doc.select_first(selector) else {
                continue;
            };
            if is_scrollable(&candidate) {
                log::debug!("find_scroll_container: fallback selector '{}'", selector.source());
                return Some(candidate);
            }
        }

        log::debug!("find_scroll_container: no scrollable container found");
        None
    }

    /// The lowest common ancestor of the first and last message: the subtree to
    /// watch for mutations. Falls back to `<body>` (or the document element) when
    /// there are no messages.
    ///
    /// A lone message is its own common ancestor; its parent is returned
    /// instead so that siblings appended later are still seen.
    pub fn find_chat_root<D: DomDocument>(&self, doc: &D) -> Option<D::Node> {
        let messages = self.find_message_elements(doc);
        let fallback = || doc.body().or_else(|| doc.document_element());

        let (Some(first), Some(last)) = (messages.first(), messages.last()) else {
            log::debug!("find_chat_root: no messages, using body");
            return fallback();
        };

        let last_ancestry = last.ancestry();
        let root = first
            .ancestry()
            .into_iter()
            .find(|candidate| last_ancestry.contains(candidate))
            .map(|root| {
                if messages.contains(&root) {
                    root.parent().unwrap_or(root)
                } else {
                    root
                }
            });

        match root {
            Some(root) => {
                log::debug!("find_chat_root: <{}>", root.tag_name());
                Some(root)
            }
            None => {
                log::warn!("find_chat_root: messages share no ancestor, using body");
                fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Extractor;
    use poi_dom::{DomDocument, DomNode, MemoryDom, Overflow};

    const NESTED: &str = r#"<html><body>
        <div id="app" style="overflow-y: scroll">
          <div id="scroller" style="overflow-y: auto">
            <div id="thread">
              <section><article data-message-author-role="user">Q</article></section>
              <section><article data-message-author-role="assistant">A</article></section>
            </div>
          </div>
        </div>
      </body></html>"#;

    #[test]
    fn nearest_scrollable_ancestor_wins() {
        let dom = MemoryDom::parse(NESTED).unwrap();
        let extractor = Extractor::standard().unwrap();
        let container = extractor.find_scroll_container(&dom).unwrap();
        assert_eq!(container.attribute("id").as_deref(), Some("scroller"));
    }

    #[test]
    fn falls_back_to_known_selectors() {
        let dom = MemoryDom::parse(
            r#"<html><body>
                <div class="react-scroll-to-bottom--css" style="overflow-y:auto"/>
                <div><article data-message-author-role="user">Q</article></div>
              </body></html>"#,
        )
        .unwrap();
        let extractor = Extractor::standard().unwrap();
        let container = extractor.find_scroll_container(&dom).unwrap();
        assert!(container.has_class("react-scroll-to-bottom--css"));
    }

    #[test]
    fn fallback_still_requires_scrollable_style() {
        let dom = MemoryDom::parse(
            r#"<html><body>
                <div data-testid="conversation"><article data-message-author-role="user">Q</article></div>
              </body></html>"#,
        )
        .unwrap();
        let extractor = Extractor::standard().unwrap();
        assert!(extractor.find_scroll_container(&dom).is_none());

        let conversation = dom.body().unwrap().children()[0].clone();
        conversation.set_overflow_y(Overflow::Scroll);
        assert_eq!(extractor.find_scroll_container(&dom), Some(conversation));
    }

    #[test]
    fn body_is_never_the_scroll_container() {
        let dom = MemoryDom::parse(
            r#"<html><body style="overflow-y:auto"><article data-message-author-role="user">Q</article></body></html>"#,
        )
        .unwrap();
        let extractor = Extractor::standard().unwrap();
        assert!(extractor.find_scroll_container(&dom).is_none());
    }

    #[test]
    fn chat_root_is_lowest_common_ancestor() {
        let dom = MemoryDom::parse(NESTED).unwrap();
        let extractor = Extractor::standard().unwrap();
        let root = extractor.find_chat_root(&dom).unwrap();
        assert_eq!(root.attribute("id").as_deref(), Some("thread"));
    }

    #[test]
    fn chat_root_of_single_message_is_its_parent() {
        let dom = MemoryDom::parse(
            r#"<html><body><main><article data-message-author-role="user">Q</article></main></body></html>"#,
        )
        .unwrap();
        let extractor = Extractor::standard().unwrap();
        let root = extractor.find_chat_root(&dom).unwrap();
        assert_eq!(root.tag_name(), "main");
    }

    #[test]
    fn chat_root_without_messages_is_body() {
        let dom = MemoryDom::parse("<html><body><main/></body></html>").unwrap();
        let extractor = Extractor::standard().unwrap();
        assert_eq!(extractor.find_chat_root(&dom), dom.body());
    }
}
