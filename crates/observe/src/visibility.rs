//! Elects the active outline entry from intersection updates.

use poi_dom::{DomError, DomNode};
use poi_outline::Poi;
use poi_store::AnnotationStore;
use poi_traits::{IntersectionEntry, ObserverHost, Teardown};
use poi_types::PoiId;
use std::cell::RefCell;
use std::rc::Rc;

pub const DEFAULT_THRESHOLDS: [f64; 6] = [0.0, 0.1, 0.25, 0.5, 0.75, 1.0];

/// The last reported visibility of one entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilitySample {
    pub ratio: f64,
    pub top: f64,
}

/// Picks the best visible entry: highest ratio, then smallest top. Entries with a
/// ratio of zero never win, so `None` means "keep the current selection".
///
/// On a full tie the earlier sample wins.
pub fn elect_active<'a, I>(samples: I) -> Option<&'a PoiId>
where
    I: IntoIterator<Item = (&'a PoiId, &'a VisibilitySample)>,
{
    let mut best: Option<(&PoiId, VisibilitySample)> = None;
    for (id, sample) in samples {
        if sample.ratio <= 0.0 {
            continue;
        }
        let better = match &best {
            None => true,
            Some((_, current)) => {
                sample.ratio > current.ratio || (sample.ratio == current.ratio && sample.top < current.top)
            }
        };
        if better {
            best = Some((id, *sample));
        }
    }
    best.map(|(id, _)| id)
}

struct TrackerState<N> {
    /// Observed anchors and the entry each one stands for.
    targets: Vec<(N, PoiId)>,
    /// Samples in first-seen order, with the anchor they were taken from.
    samples: Vec<(N, PoiId, VisibilitySample)>,
}

impl<N: DomNode> TrackerState<N> {
    fn id_of(&self, node: &N) -> Option<&PoiId> {
        self.targets.iter().find(|(n, _)| n == node).map(|(_, id)| id)
    }

    fn record(&mut self, entries: Vec<IntersectionEntry<N>>) {
        // Anchors detached since their last sample must not win anymore.
        self.samples.retain(|(node, _, _)| node.is_connected());
        for entry in entries {
            if !entry.target.is_connected() {
                continue;
            }
            let Some(id) = self.id_of(&entry.target).cloned() else {
                continue;
            };
            let sample = VisibilitySample {
                ratio: entry.ratio,
                top: entry.bounding_top,
            };
            match self.samples.iter_mut().find(|(_, known, _)| *known == id) {
                Some((_, _, slot)) => *slot = sample,
                None => self.samples.push((entry.target, id, sample)),
            }
        }
    }

    fn best(&self) -> Option<PoiId> {
        elect_active(self.samples.iter().map(|(_, id, s)| (id, s))).cloned()
    }
}

/// Observes every live anchor of an outline against the scroll container.
pub struct VisibilityTracker;

impl VisibilityTracker {
    /// Starts tracking and returns the handle that disconnects it.
    ///
    /// Anchors that are already detached are skipped, as are anchors the host
    /// refuses to observe.
    pub fn attach<N: DomNode>(
        host: &dyn ObserverHost<N>,
        container: &N,
        pois: &[Poi<N>],
        thresholds: &[f64],
        store: Rc<AnnotationStore<N>>,
    ) -> Result<Teardown, DomError> {
        let state = Rc::new(RefCell::new(TrackerState {
            targets: Vec::with_capacity(pois.len()),
            samples: Vec::new(),
        }));

        let callback_state = state.clone();
        let observation = host.observe_intersections(
            container,
            thresholds,
            Box::new(move |entries| {
                let winner = {
                    let mut state = callback_state.borrow_mut();
                    state.record(entries);
                    state.best()
                };
                if let Some(id) = winner {
                    log::trace!("visible: {}", id);
                    store.set_active_poi_id(Some(id));
                }
            }),
        )?;

        for poi in pois {
            let Some(anchor) = poi.anchor.live() else {
                continue;
            };
            match observation.observe(anchor) {
                Ok(()) => state.borrow_mut().targets.push((anchor.clone(), poi.id.clone())),
                Err(err) => log::warn!("failed to observe anchor of '{}': {}", poi.id, err),
            }
        }

        log::info!(
            "visibility tracker attached: {} of {} anchor(s) observed",
            state.borrow().targets.len(),
            pois.len()
        );

        Ok(Teardown::new(move || observation.disconnect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingObservers;
    use poi_dom::{DomDocument, MemNode, MemoryDom, parse_selector};
    use poi_extract::Extractor;
    use poi_outline::{OutlineBuilder, TitleLimits};
    use poi_store::AnnotationRepository;
    use poi_traits::InMemoryStorage;

    fn sample(ratio: f64, top: f64) -> VisibilitySample {
        VisibilitySample { ratio, top }
    }

    #[test]
    fn highest_ratio_wins() {
        let (a, b) = (PoiId::from("a"), PoiId::from("b"));
        let samples = [(a.clone(), sample(0.25, 0.0)), (b.clone(), sample(0.75, 300.0))];
        assert_eq!(elect_active(samples.iter().map(|(i, s)| (i, s))), Some(&b));
    }

    #[test]
    fn equal_ratios_prefer_the_smaller_top() {
        let (a, b) = (PoiId::from("a"), PoiId::from("b"));
        let samples = [(b.clone(), sample(0.6, 120.0)), (a.clone(), sample(0.6, -40.0))];
        assert_eq!(elect_active(samples.iter().map(|(i, s)| (i, s))), Some(&a));
    }

    #[test]
    fn full_ties_keep_the_first_sample() {
        let (a, b) = (PoiId::from("a"), PoiId::from("b"));
        let samples = [(a.clone(), sample(1.0, 10.0)), (b.clone(), sample(1.0, 10.0))];
        assert_eq!(elect_active(samples.iter().map(|(i, s)| (i, s))), Some(&a));
    }

    #[test]
    fn nothing_visible_elects_nobody() {
        let a = PoiId::from("a");
        let samples = [(a, sample(0.0, 0.0))];
        assert_eq!(elect_active(samples.iter().map(|(i, s)| (i, s))), None);
    }

    struct Fixture {
        container: MemNode,
        store: Rc<AnnotationStore<MemNode>>,
        pois: Vec<Poi<MemNode>>,
        observers: RecordingObservers<MemNode>,
    }

    fn fixture() -> Fixture {
        let _ = env_logger::builder().is_test(true).try_init();
        let dom = MemoryDom::parse(
            r#"<html><body><main style="overflow-y: auto">
<article data-message-author-role="user">one</article>
<article data-message-author-role="assistant">two<h2>Part</h2></article>
</main></body></html>"#,
        )
        .unwrap();
        let container = dom.select_first(&parse_selector("main").unwrap()).unwrap();
        let messages = Extractor::standard().unwrap().extract_messages(&dom);
        let pois = OutlineBuilder::new(TitleLimits::default()).unwrap().build(&messages);
        let repository = AnnotationRepository::new(Rc::new(InMemoryStorage::new()), "test");
        let store = Rc::new(AnnotationStore::new(repository, || "u".to_string()));
        store.set_pois(pois.clone());
        Fixture {
            container,
            store,
            pois,
            observers: RecordingObservers::new(),
        }
    }

    fn entry(poi: &Poi<MemNode>, ratio: f64, top: f64) -> IntersectionEntry<MemNode> {
        IntersectionEntry {
            target: poi.anchor.handle().clone(),
            ratio,
            bounding_top: top,
        }
    }

    #[test]
    fn equal_ratio_tie_selects_the_upper_anchor() {
        let f = fixture();
        let _teardown = VisibilityTracker::attach(
            &f.observers,
            &f.container,
            &f.pois,
            &DEFAULT_THRESHOLDS,
            f.store.clone(),
        )
        .unwrap();
        assert_eq!(f.observers.observed_targets().len(), 3);

        f.observers
            .fire_intersections(vec![entry(&f.pois[1], 0.6, 200.0), entry(&f.pois[0], 0.6, 50.0)]);
        assert_eq!(
            f.store.snapshot().active_poi_id.as_ref().map(|id| id.as_str()),
            Some("msg_1_prompt")
        );
    }

    #[test]
    fn invisible_batches_keep_the_previous_selection() {
        let f = fixture();
        let _teardown = VisibilityTracker::attach(
            &f.observers,
            &f.container,
            &f.pois,
            &DEFAULT_THRESHOLDS,
            f.store.clone(),
        )
        .unwrap();

        f.observers.fire_intersections(vec![entry(&f.pois[2], 0.5, 10.0)]);
        f.observers.fire_intersections(vec![entry(&f.pois[2], 0.0, -400.0)]);
        assert_eq!(
            f.store.snapshot().active_poi_id.as_ref().map(|id| id.as_str()),
            Some("msg_2_response_h2_1")
        );
    }

    #[test]
    fn detached_targets_are_ignored() {
        let f = fixture();
        let _teardown = VisibilityTracker::attach(
            &f.observers,
            &f.container,
            &f.pois,
            &DEFAULT_THRESHOLDS,
            f.store.clone(),
        )
        .unwrap();

        f.pois[0].anchor.handle().remove();
        f.observers.fire_intersections(vec![entry(&f.pois[0], 1.0, 0.0)]);
        assert_eq!(f.store.snapshot().active_poi_id, None);
    }

    #[test]
    fn samples_of_anchors_detached_later_stop_winning() {
        let f = fixture();
        let _teardown = VisibilityTracker::attach(
            &f.observers,
            &f.container,
            &f.pois,
            &DEFAULT_THRESHOLDS,
            f.store.clone(),
        )
        .unwrap();

        f.observers.fire_intersections(vec![entry(&f.pois[0], 1.0, 0.0)]);
        assert_eq!(
            f.store.snapshot().active_poi_id.as_ref().map(|id| id.as_str()),
            Some("msg_1_prompt")
        );

        f.pois[0].anchor.handle().remove();
        f.observers.fire_intersections(vec![entry(&f.pois[1], 0.5, 80.0)]);
        assert_eq!(
            f.store.snapshot().active_poi_id.as_ref().map(|id| id.as_str()),
            Some("msg_2_response")
        );
    }

    #[test]
    fn teardown_disconnects_and_is_idempotent() {
        let f = fixture();
        let teardown = VisibilityTracker::attach(
            &f.observers,
            &f.container,
            &f.pois,
            &DEFAULT_THRESHOLDS,
            f.store.clone(),
        )
        .unwrap();
        assert_eq!(f.observers.intersection_observer_count(), 1);
        teardown.run();
        teardown.run();
        assert_eq!(f.observers.intersection_observer_count(), 0);

        f.observers.fire_intersections(vec![entry(&f.pois[0], 1.0, 0.0)]);
        assert_eq!(f.store.snapshot().active_poi_id, None);
    }
}
