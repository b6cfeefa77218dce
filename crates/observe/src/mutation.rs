use poi_dom::{DomError, DomNode};
use poi_traits::{MutationRecord, ObserverHost, Teardown};

/// Whether a batch of mutation records warrants a rebuild: at least one record
/// must add or remove nodes outside `ignore_within`.
///
/// Text and attribute changes never qualify, so a message that is only growing
/// its text does not trigger a rebuild until some node is added.
pub fn is_relevant_batch<N: DomNode>(records: &[MutationRecord<N>], ignore_within: Option<&N>) -> bool {
    records.iter().any(|record| {
        record.has_node_churn() && !ignore_within.is_some_and(|ignored| ignored.contains(&record.target))
    })
}

/// Signals structural changes below a root element.
pub struct MutationWatcher;

impl MutationWatcher {
    /// Calls `on_change` at most once per relevant batch.
    pub fn attach<N: DomNode>(
        host: &dyn ObserverHost<N>,
        root: &N,
        ignore_within: Option<N>,
        mut on_change: impl FnMut() + 'static,
    ) -> Result<Teardown, DomError> {
        let teardown = host.observe_mutations(
            root,
            Box::new(move |records| {
                if is_relevant_batch(&records, ignore_within.as_ref()) {
                    on_change();
                } else {
                    log::trace!("ignoring {} mutation record(s) without node churn", records.len());
                }
            }),
        )?;
        log::info!("mutation watcher attached to <{}>", root.tag_name());
        Ok(teardown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingObservers;
    use poi_dom::{DomDocument, MemNode, MemoryDom, parse_selector};
    use std::cell::Cell;
    use std::rc::Rc;

    fn find(dom: &MemoryDom, selector: &str) -> MemNode {
        dom.select_first(&parse_selector(selector).unwrap()).unwrap()
    }

    fn page() -> MemoryDom {
        MemoryDom::parse(
            r#"<html><body><main><article data-message-author-role="assistant">hi</article></main><aside id="panel"><ul/></aside></body></html>"#,
        )
        .unwrap()
    }

    #[test]
    fn only_node_churn_is_relevant() {
        let dom = page();
        let article = find(&dom, "article");
        assert!(!is_relevant_batch(&[MutationRecord::character_data(article.clone())], None));
        assert!(!is_relevant_batch(&[MutationRecord::attributes(article.clone())], None));
        assert!(!is_relevant_batch::<MemNode>(&[], None));
        assert!(is_relevant_batch(
            &[
                MutationRecord::character_data(article.clone()),
                MutationRecord::child_list(article.clone(), 0, 1),
            ],
            None
        ));
    }

    #[test]
    fn churn_inside_the_ignored_subtree_is_not_relevant() {
        let dom = page();
        let panel = find(&dom, "aside");
        let list = find(&dom, "ul");
        let main = find(&dom, "main");
        assert!(!is_relevant_batch(&[MutationRecord::child_list(list, 3, 3)], Some(&panel)));
        assert!(is_relevant_batch(&[MutationRecord::child_list(main, 1, 0)], Some(&panel)));
    }

    #[test]
    fn callback_runs_once_per_relevant_batch() {
        let dom = page();
        let body = find(&dom, "body");
        let article = find(&dom, "article");
        let observers = RecordingObservers::new();
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();

        let teardown =
            MutationWatcher::attach(&observers, &body, None, move || counter.set(counter.get() + 1)).unwrap();

        observers.fire_mutations(vec![
            MutationRecord::child_list(article.clone(), 1, 0),
            MutationRecord::child_list(article.clone(), 2, 0),
        ]);
        observers.fire_mutations(vec![MutationRecord::character_data(article.clone())]);
        assert_eq!(calls.get(), 1);

        teardown.run();
        teardown.run();
        observers.fire_mutations(vec![MutationRecord::child_list(article, 1, 0)]);
        assert_eq!(calls.get(), 1);
        assert_eq!(observers.mutation_observer_count(), 0);
    }
}
