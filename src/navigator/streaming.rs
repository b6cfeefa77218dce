use poi_dom::{DomDocument, DomError, DomNode, SelectorList, parse_selector};

/// Tells the navigator whether a reply is still being generated, so it can
/// stretch the rebuild debounce while text streams in.
pub trait StreamingSignal {
    fn is_streaming(&self) -> bool;
}

impl<F: Fn() -> bool> StreamingSignal for F {
    fn is_streaming(&self) -> bool {
        self()
    }
}

/// Reports streaming while the page shows a "stop generating" button.
#[derive(Debug, Clone)]
pub struct StopButtonSignal<D> {
    document: D,
    by_test_id: SelectorList,
    buttons: SelectorList,
}

const STOP_LABELS: [&str; 4] = ["stop generating", "stopp", "stoppen", "generierung anhalten"];

impl<D: DomDocument> StopButtonSignal<D> {
    pub fn new(document: D) -> Result<Self, DomError> {
        Ok(Self {
            document,
            by_test_id: parse_selector("button[data-testid*=stop]")?,
            buttons: parse_selector("button")?,
        })
    }
}

impl<D: DomDocument> StreamingSignal for StopButtonSignal<D> {
    fn is_streaming(&self) -> bool {
        if self.document.select_first(&self.by_test_id).is_some() {
            return true;
        }
        self.document.select_all(&self.buttons).iter().any(|button| {
            let label = button.text_content().to_lowercase();
            STOP_LABELS.iter().any(|stop| label.contains(stop))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poi_dom::MemoryDom;

    #[test]
    fn detects_stop_buttons() {
        let idle = MemoryDom::parse(r#"<html><body><button>Send</button></body></html>"#).unwrap();
        assert!(!StopButtonSignal::new(idle).unwrap().is_streaming());

        let by_id =
            MemoryDom::parse(r#"<html><body><button data-testid="stop-button"/></body></html>"#).unwrap();
        assert!(StopButtonSignal::new(by_id).unwrap().is_streaming());

        let by_label =
            MemoryDom::parse(r#"<html><body><button> Stop Generating </button></body></html>"#).unwrap();
        assert!(StopButtonSignal::new(by_label).unwrap().is_streaming());
    }

    #[test]
    fn closures_are_signals() {
        let signal = || true;
        assert!(signal.is_streaming());
    }
}
