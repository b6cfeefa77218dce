use crate::persistence::AnnotationRepository;
use crate::state::StateSnapshot;
use poi_dom::DomNode;
use poi_outline::Poi;
use poi_traits::Teardown;
use poi_types::{ColorTag, PoiId};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::{Rc, Weak};

pub type Subscriber<N> = Rc<dyn Fn(&StateSnapshot<N>)>;

type SubscriberList<N> = RefCell<Vec<(u64, Subscriber<N>)>>;

/// Outcome of an annotation request addressed by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Annotate {
    Updated,
    /// No entry with that id exists; nothing changed and nothing was persisted.
    NotFound,
}

/// The canonical application state.
///
/// Mutations replace the outline wholesale, persist the affected slice, then
/// notify every subscriber with a fresh snapshot. Subscribers are invoked after
/// all internal borrows are released, so they may call back into the store.
pub struct AnnotationStore<N: DomNode> {
    state: RefCell<StateSnapshot<N>>,
    subscribers: Rc<SubscriberList<N>>,
    next_subscriber: Cell<u64>,
    repository: AnnotationRepository,
    location: Box<dyn Fn() -> String>,
}

impl<N: DomNode> fmt::Debug for AnnotationStore<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("AnnotationStore")
            .field("pois", &state.pois.len())
            .field("active_poi_id", &state.active_poi_id)
            .field("subscribers", &self.subscribers.borrow().len())
            .finish()
    }
}

impl<N: DomNode> AnnotationStore<N> {
    /// Creates a store and loads the global panel flags.
    ///
    /// `location` yields the current page URL; annotation records are keyed by it
    /// and it is read on every access, so in-page navigation is picked up.
    pub fn new(repository: AnnotationRepository, location: impl Fn() -> String + 'static) -> Self {
        let panel_collapsed = load_or_default(&repository, &repository.panel_collapsed_key());
        let show_only_marked = load_or_default(&repository, &repository.show_only_marked_key());

        Self {
            state: RefCell::new(StateSnapshot {
                pois: Rc::from(Vec::new()),
                active_poi_id: None,
                panel_collapsed,
                show_only_marked,
            }),
            subscribers: Rc::new(RefCell::new(Vec::new())),
            next_subscriber: Cell::new(0),
            repository,
            location: Box::new(location),
        }
    }

    pub fn snapshot(&self) -> StateSnapshot<N> {
        self.state.borrow().clone()
    }

    /// Replaces the outline with a freshly built one, carrying over annotations.
    ///
    /// An entry is marked if it was marked in memory or in the persisted record
    /// for this page. Its color tag comes from memory if set there, otherwise
    /// from the persisted record.
    pub fn set_pois(&self, next: Vec<Poi<N>>) {
        let url = (self.location)();

        let mut marked: HashSet<PoiId> = match self.repository.load_marks(&url) {
            Ok(ids) => ids,
            Err(err) => {
                log::warn!("Could not load marks for {}: {}", url, err);
                HashSet::new()
            }
        };
        let mut colors: HashMap<PoiId, ColorTag> = match self.repository.load_color_tags(&url) {
            Ok(tags) => tags,
            Err(err) => {
                log::warn!("Could not load color tags for {}: {}", url, err);
                HashMap::new()
            }
        };

        {
            let state = self.state.borrow();
            for poi in state.pois.iter() {
                if poi.marked {
                    marked.insert(poi.id.clone());
                }
                if let Some(tag) = poi.color_tag {
                    colors.insert(poi.id.clone(), tag);
                }
            }
        }

        let merged: Vec<Poi<N>> = next
            .into_iter()
            .map(|mut poi| {
                poi.marked = marked.contains(&poi.id);
                poi.color_tag = colors.get(&poi.id).copied();
                poi
            })
            .collect();

        log::debug!(
            "setPois: {} poi(s), {} marked, {} tagged",
            merged.len(),
            merged.iter().filter(|p| p.marked).count(),
            merged.iter().filter(|p| p.color_tag.is_some()).count()
        );

        self.state.borrow_mut().pois = Rc::from(merged);
        self.notify();
    }

    pub fn set_active_poi_id(&self, id: Option<PoiId>) {
        self.state.borrow_mut().active_poi_id = id;
        self.notify();
    }

    /// Flips the panel's collapsed flag and returns the new value.
    pub fn toggle_panel_collapsed(&self) -> bool {
        let value = {
            let mut state = self.state.borrow_mut();
            state.panel_collapsed = !state.panel_collapsed;
            state.panel_collapsed
        };
        self.persist_flag(&self.repository.panel_collapsed_key(), value);
        self.notify();
        value
    }

    /// Flips the marked-only filter and returns the new value.
    pub fn toggle_show_only_marked(&self) -> bool {
        let value = {
            let mut state = self.state.borrow_mut();
            state.show_only_marked = !state.show_only_marked;
            state.show_only_marked
        };
        self.persist_flag(&self.repository.show_only_marked_key(), value);
        self.notify();
        value
    }

    pub fn toggle_poi_marked(&self, id: &str) -> Annotate {
        let updated = self.update_poi(id, |poi| poi.marked = !poi.marked);
        if !updated {
            log::warn!("toggle_poi_marked: no entry with id '{}'", id);
            return Annotate::NotFound;
        }

        let url = (self.location)();
        let pois = self.state.borrow().pois.clone();
        if let Err(err) = self.repository.store_marks(&url, &pois) {
            log::warn!("Could not persist marks for {}: {}", url, err);
        }
        self.notify();
        Annotate::Updated
    }

    /// Sets or clears (`None`) the color tag of one entry.
    pub fn set_poi_color_tag(&self, id: &str, tag: Option<ColorTag>) -> Annotate {
        let updated = self.update_poi(id, |poi| poi.color_tag = tag);
        if !updated {
            log::warn!("set_poi_color_tag: no entry with id '{}'", id);
            return Annotate::NotFound;
        }

        let url = (self.location)();
        let pois = self.state.borrow().pois.clone();
        if let Err(err) = self.repository.store_color_tags(&url, &pois) {
            log::warn!("Could not persist color tags for {}: {}", url, err);
        }
        self.notify();
        Annotate::Updated
    }

    /// Tags an entry with the least used palette color, returning the tag chosen.
    pub fn assign_auto_color_tag(&self, id: &str) -> Option<ColorTag> {
        let tag = {
            let state = self.state.borrow();
            if state.poi(id).is_none() {
                log::warn!("assign_auto_color_tag: no entry with id '{}'", id);
                return None;
            }
            ColorTag::auto_pick(state.pois.iter().filter_map(|p| p.color_tag))
        };
        match self.set_poi_color_tag(id, Some(tag)) {
            Annotate::Updated => Some(tag),
            Annotate::NotFound => None,
        }
    }

    /// Registers a listener. It is called once right away with the current
    /// snapshot, then after every mutation until the returned handle is run.
    pub fn subscribe(&self, subscriber: impl Fn(&StateSnapshot<N>) + 'static) -> Teardown {
        let key = self.next_subscriber.get();
        self.next_subscriber.set(key + 1);

        let subscriber: Subscriber<N> = Rc::new(subscriber);
        self.subscribers.borrow_mut().push((key, subscriber.clone()));

        let snapshot = self.snapshot();
        subscriber(&snapshot);

        let list: Weak<SubscriberList<N>> = Rc::downgrade(&self.subscribers);
        Teardown::new(move || {
            if let Some(list) = list.upgrade() {
                list.borrow_mut().retain(|(k, _)| *k != key);
            }
        })
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Applies `change` to the entry with `id` on a copy of the outline.
    fn update_poi(&self, id: &str, change: impl FnOnce(&mut Poi<N>)) -> bool {
        if id.is_empty() {
            return false;
        }
        let mut state = self.state.borrow_mut();
        let Some(index) = state.pois.iter().position(|p| p.id.as_str() == id) else {
            return false;
        };
        let mut pois: Vec<Poi<N>> = state.pois.to_vec();
        change(&mut pois[index]);
        state.pois = Rc::from(pois);
        true
    }

    fn persist_flag(&self, key: &str, value: bool) {
        if let Err(err) = self.repository.store_flag(key, value) {
            log::warn!("Could not persist '{}': {}", key, err);
        }
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        let subscribers: Vec<Subscriber<N>> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, s)| s.clone())
            .collect();
        for subscriber in subscribers {
            subscriber(&snapshot);
        }
    }
}

fn load_or_default(repository: &AnnotationRepository, key: &str) -> bool {
    repository.load_flag(key).unwrap_or_else(|err| {
        log::warn!("Could not load '{}', using default: {}", key, err);
        false
    })
}
