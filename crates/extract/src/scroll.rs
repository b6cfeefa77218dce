use poi_dom::{DomError, DomNode, ScrollBehavior};

/// Scrolls `container` so that `target` sits `margin` pixels below its top edge.
///
/// Returns the requested scroll offset.
pub fn scroll_into_view<N: DomNode>(
    container: &N,
    target: &N,
    margin: f64,
    behavior: ScrollBehavior,
) -> Result<f64, DomError> {
    if !target.is_connected() {
        return Err(DomError::Detached(format!("{:?}", target)));
    }
    if !container.is_connected() {
        return Err(DomError::Detached(format!("{:?}", container)));
    }

    let container_rect = container.bounding_rect();
    let target_rect = target.bounding_rect();
    let offset_top = target_rect.top - container_rect.top;
    let final_top = (container.scroll_metrics().scroll_top + offset_top - margin).max(0.0);

    log::debug!("scroll_into_view: offset_top={} final_top={}", offset_top, final_top);
    container.scroll_to(final_top, behavior);
    Ok(final_top)
}

#[cfg(test)]
mod tests {
    use super::*;
    use poi_dom::MemoryDom;
    use poi_types::{Rect, ScrollMetrics};

    #[test]
    fn applies_margin_relative_to_container() {
        let dom = MemoryDom::new();
        let main = dom.create_element("main");
        let heading = dom.create_element("h1");
        main.append_child(&heading);
        dom.set_document_element(&main);

        main.set_rect(Rect::new(100.0, 0.0, 800.0, 600.0));
        main.set_scroll_metrics(ScrollMetrics::new(200.0, 3000.0, 600.0));
        heading.set_rect(Rect::new(500.0, 0.0, 800.0, 40.0));

        let top = scroll_into_view(&main, &heading, 60.0, ScrollBehavior::Smooth).unwrap();
        assert_eq!(top, 540.0);
        assert_eq!(main.scroll_metrics().scroll_top, 540.0);
        assert_eq!(main.last_scroll_behavior(), Some(ScrollBehavior::Smooth));
    }

    #[test]
    fn never_scrolls_above_zero() {
        let dom = MemoryDom::new();
        let main = dom.create_element("main");
        let heading = dom.create_element("h1");
        main.append_child(&heading);
        dom.set_document_element(&main);
        main.set_scroll_metrics(ScrollMetrics::new(0.0, 3000.0, 600.0));
        heading.set_rect(Rect::new(10.0, 0.0, 100.0, 20.0));

        let top = scroll_into_view(&main, &heading, 60.0, ScrollBehavior::Auto).unwrap();
        assert_eq!(top, 0.0);
    }

    #[test]
    fn detached_target_is_an_error() {
        let dom = MemoryDom::new();
        let main = dom.create_element("main");
        dom.set_document_element(&main);
        let orphan = dom.create_element("h1");
        assert!(matches!(
            scroll_into_view(&main, &orphan, 60.0, ScrollBehavior::Auto),
            Err(DomError::Detached(_))
        ));
    }
}
