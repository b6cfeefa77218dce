#![allow(dead_code)]

use poi_dom::{DomDocument, MemNode, MemoryDom, parse_selector};
use poi_nav::{Navigator, NavigatorBuilder};
use poi_observe::testing::{ManualScheduler, RecordingObservers};
use poi_traits::{InMemoryStorage, IntersectionEntry, MutationRecord};
use poi_types::{Rect, ScrollMetrics};
use std::rc::Rc;

pub const PAGE_URL: &str = "https://chat.example/c/42";

/// Two user and two assistant messages; the last reply has a heading and a
/// two-line Python block.
pub const BASIC_CHAT: &str = r#"<html><body>
<main style="overflow-y: auto">
<article data-message-author-role="user">How do I print?</article>
<article data-message-author-role="assistant">Use print.</article>
<article data-message-author-role="user">Show me.</article>
<article data-message-author-role="assistant"><p>Sure.</p><h1>Results</h1><pre><code class="language-python">print("hi")
print("bye")</code></pre></article>
</main>
<aside id="overlay"><ul/></aside>
</body></html>"#;

/// Builds a page with one `<article>` per `(role, inner xml)` pair inside a
/// scrollable `<main>`.
pub fn chat(messages: &[(&str, &str)]) -> String {
    let articles: String = messages
        .iter()
        .map(|(role, body)| format!(r#"<article data-message-author-role="{}">{}</article>"#, role, body))
        .collect();
    format!(
        r#"<html><body><main style="overflow-y: auto">{}</main><aside id="overlay"><ul/></aside></body></html>"#,
        articles
    )
}

pub fn find(dom: &MemoryDom, selector: &str) -> MemNode {
    dom.select_first(&parse_selector(selector).unwrap())
        .unwrap_or_else(|| panic!("no element matches '{}'", selector))
}

pub fn find_all(dom: &MemoryDom, selector: &str) -> Vec<MemNode> {
    dom.select_all(&parse_selector(selector).unwrap())
}

pub struct Harness {
    pub dom: MemoryDom,
    pub scheduler: Rc<ManualScheduler>,
    pub observers: Rc<RecordingObservers<MemNode>>,
    pub storage: Rc<InMemoryStorage>,
    pub navigator: Navigator<MemoryDom>,
}

pub fn harness(xml: &str) -> Harness {
    harness_with(xml, |builder, _| builder)
}

pub fn harness_with(
    xml: &str,
    configure: impl FnOnce(NavigatorBuilder<MemoryDom>, &MemoryDom) -> NavigatorBuilder<MemoryDom>,
) -> Harness {
    let _ = env_logger::builder().is_test(true).try_init();

    let dom = MemoryDom::parse(xml).unwrap().with_url(PAGE_URL);
    if let Some(main) = dom.select_first(&parse_selector("main").unwrap()) {
        main.set_rect(Rect::new(100.0, 0.0, 800.0, 500.0));
        main.set_scroll_metrics(ScrollMetrics::new(0.0, 2000.0, 500.0));
    }

    let scheduler = Rc::new(ManualScheduler::new());
    let observers = Rc::new(RecordingObservers::new());
    let storage = Rc::new(InMemoryStorage::new());

    let builder = Navigator::builder(dom.clone())
        .with_scheduler(scheduler.clone())
        .with_observers(observers.clone())
        .with_storage(storage.clone());
    let navigator = configure(builder, &dom).build().unwrap();

    Harness {
        dom,
        scheduler,
        observers,
        storage,
        navigator,
    }
}

impl Harness {
    pub fn container(&self) -> MemNode {
        find(&self.dom, "main")
    }

    pub fn ids(&self) -> Vec<String> {
        self.navigator
            .snapshot()
            .pois
            .iter()
            .map(|p| p.id.to_string())
            .collect()
    }

    pub fn active(&self) -> Option<String> {
        self.navigator.snapshot().active_poi_id.map(|id| id.to_string())
    }

    /// Appends a message element the way the host page does, and reports the
    /// node churn to the mutation watcher.
    pub fn append_message(&self, role: &str, body: &str) -> MemNode {
        let container = self.container();
        let article = container
            .append_fragment(&format!(
                r#"<article data-message-author-role="{}">{}</article>"#,
                role, body
            ))
            .unwrap();
        self.observers
            .fire_mutations(vec![MutationRecord::child_list(container, 1, 0)]);
        article
    }

    pub fn anchor(&self, id: &str) -> MemNode {
        self.navigator
            .snapshot()
            .poi(id)
            .unwrap_or_else(|| panic!("no poi '{}'", id))
            .anchor
            .handle()
            .clone()
    }

    pub fn visible(&self, id: &str, ratio: f64, top: f64) -> IntersectionEntry<MemNode> {
        IntersectionEntry {
            target: self.anchor(id),
            ratio,
            bounding_top: top,
        }
    }
}
