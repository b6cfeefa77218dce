// src/navigator/builder.rs
use super::{Inner, Navigator, Phase, Runtime, StreamingSignal};
use crate::config::NavConfig;
use crate::error::NavError;
use poi_dom::DomDocument;
use poi_extract::Extractor;
use poi_observe::Debouncer;
use poi_outline::OutlineBuilder;
use poi_store::{AnnotationRepository, AnnotationStore};
use poi_traits::{InMemoryStorage, KeyValueStorage, ObserverHost, Scheduler};
use std::cell::RefCell;
use std::rc::Rc;

/// A builder for creating a `Navigator`.
///
/// A scheduler and an observer host are required; storage defaults to an
/// in-memory map, so annotations last only as long as the navigator.
pub struct NavigatorBuilder<D: DomDocument> {
    document: D,
    config: NavConfig,
    storage: Option<Rc<dyn KeyValueStorage>>,
    scheduler: Option<Rc<dyn Scheduler>>,
    observers: Option<Rc<dyn ObserverHost<D::Node>>>,
    streaming: Option<Box<dyn StreamingSignal>>,
    ignore_within: Option<D::Node>,
}

impl<D: DomDocument + Clone + 'static> NavigatorBuilder<D> {
    pub fn new(document: D) -> Self {
        Self {
            document,
            config: NavConfig::default(),
            storage: None,
            scheduler: None,
            observers: None,
            streaming: None,
            ignore_within: None,
        }
    }

    pub fn with_config(mut self, config: NavConfig) -> Self {
        self.config = config;
        self
    }

    /// Configures the navigator from a (possibly partial) JSON document.
    pub fn with_config_json(mut self, json: &str) -> Result<Self, NavError> {
        self.config = NavConfig::from_json(json)?;
        Ok(self)
    }

    /// Where marks, color tags and panel flags are persisted.
    pub fn with_storage(mut self, storage: Rc<dyn KeyValueStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_scheduler(mut self, scheduler: Rc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn with_observers(mut self, observers: Rc<dyn ObserverHost<D::Node>>) -> Self {
        self.observers = Some(observers);
        self
    }

    /// Enables the streaming-aware debounce (with `streamingDebounceMs` set).
    pub fn with_streaming_signal(mut self, signal: impl StreamingSignal + 'static) -> Self {
        self.streaming = Some(Box::new(signal));
        self
    }

    /// Node churn inside `node` (the overlay's own panel) never triggers a rebuild.
    pub fn with_ignored_subtree(mut self, node: D::Node) -> Self {
        self.ignore_within = Some(node);
        self
    }

    /// Validates the configuration, compiles the selectors, loads the persisted
    /// panel flags and creates the `Navigator`. Nothing is observed until
    /// [`Navigator::start`].
    pub fn build(self) -> Result<Navigator<D>, NavError> {
        self.config.validate()?;

        let scheduler = self.scheduler.ok_or_else(|| {
            NavError::Builder("No scheduler has been configured. Use `with_scheduler`.".to_string())
        })?;
        let observers = self.observers.ok_or_else(|| {
            NavError::Builder("No observer host has been configured. Use `with_observers`.".to_string())
        })?;
        let storage = self.storage.unwrap_or_else(|| {
            log::debug!("no storage configured, annotations stay in memory");
            Rc::new(InMemoryStorage::new())
        });

        let extractor = Extractor::new(
            &self.config.message_selector,
            &self.config.role_attribute,
            &self.config.fallback_container_selectors,
        )?;
        let outline = OutlineBuilder::new(self.config.title_limits())?;

        let repository = AnnotationRepository::new(storage, self.config.storage_namespace.clone());
        let location_source = self.document.clone();
        let store = Rc::new(AnnotationStore::new(repository, move || location_source.location()));
        let debouncer = Debouncer::new(scheduler.clone());

        let document = self.document;
        let config = self.config;
        let streaming = self.streaming;
        let ignore_within = self.ignore_within;
        let inner = Rc::new_cyclic(|weak| Inner {
            document,
            config,
            extractor,
            outline,
            store,
            scheduler,
            observers,
            streaming,
            ignore_within,
            debouncer,
            runtime: RefCell::new(Runtime {
                phase: Phase::Created,
                scroll_container: None,
                visibility: None,
                resize: None,
                mutation: None,
                correction: None,
                passes: 0,
            }),
            weak: weak.clone(),
        });

        Ok(Navigator { inner })
    }
}
