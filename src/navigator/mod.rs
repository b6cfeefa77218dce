//! The rebuild orchestrator.
//!
//! A [`Navigator`] owns the annotation store and every observer attachment. It is
//! either idle or has one rebuild pending; triggers arriving while a rebuild is
//! pending restart the debounce window, and each window that expires runs exactly
//! one rebuild pass:
//!
//! 1. extract messages (none: abort, the page has not rendered yet)
//! 2. resolve the scroll container (none: abort)
//! 3. capture the scroll position
//! 4. build the outline
//! 5. merge it into the store, which notifies subscribers
//! 6. re-attach visibility tracking and the resize watch
//! 7. restore the scroll position, then correct it on the next frames

mod builder;
mod navigation;
mod rebuild;
mod scroll;
mod streaming;

pub use builder::NavigatorBuilder;
pub use navigation::Direction;
pub use scroll::ScrollCapture;
pub use streaming::{StopButtonSignal, StreamingSignal};

use crate::config::NavConfig;
use crate::error::NavError;
use poi_dom::DomDocument;
use poi_extract::Extractor;
use poi_observe::{Debouncer, MutationWatcher};
use poi_outline::OutlineBuilder;
use poi_store::{AnnotationStore, StateSnapshot};
use poi_traits::{ObserverHost, Scheduler, TaskId, Teardown};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Whether a rebuild is waiting for its debounce window to close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildState {
    Idle,
    RebuildPending,
}

/// How one rebuild pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildOutcome {
    Rebuilt { poi_count: usize },
    /// No message elements yet.
    NoMessages,
    /// No scroll container yet.
    NoScrollContainer,
    /// A step failed; the error was logged and the next trigger retries.
    Failed,
    Disposed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Created,
    Running,
    Disposed,
}

struct Runtime<N> {
    phase: Phase,
    scroll_container: Option<N>,
    visibility: Option<Teardown>,
    resize: Option<Teardown>,
    mutation: Option<Teardown>,
    correction: Option<TaskId>,
    passes: u64,
}

pub(crate) struct Inner<D: DomDocument> {
    document: D,
    config: NavConfig,
    extractor: Extractor,
    outline: OutlineBuilder,
    store: Rc<AnnotationStore<D::Node>>,
    scheduler: Rc<dyn Scheduler>,
    observers: Rc<dyn ObserverHost<D::Node>>,
    streaming: Option<Box<dyn StreamingSignal>>,
    ignore_within: Option<D::Node>,
    debouncer: Debouncer,
    runtime: RefCell<Runtime<D::Node>>,
    weak: Weak<Inner<D>>,
}

/// Keeps the outline of a live chat page in sync with its DOM.
///
/// Cloning yields another handle to the same navigator.
pub struct Navigator<D: DomDocument + 'static> {
    inner: Rc<Inner<D>>,
}

impl<D: DomDocument + 'static> Clone for Navigator<D> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<D: DomDocument + 'static> fmt::Debug for Navigator<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let runtime = self.inner.runtime.borrow();
        f.debug_struct("Navigator")
            .field("phase", &runtime.phase)
            .field("passes", &runtime.passes)
            .field("state", &self.state())
            .field("store", &self.inner.store)
            .finish()
    }
}

impl<D: DomDocument + 'static> Navigator<D> {
    pub fn builder(document: D) -> NavigatorBuilder<D>
    where
        D: Clone,
    {
        NavigatorBuilder::new(document)
    }

    /// Runs the first rebuild and starts watching the chat for structural
    /// changes. A navigator starts once.
    pub fn start(&self) -> Result<(), NavError> {
        {
            let mut runtime = self.inner.runtime.borrow_mut();
            if runtime.phase != Phase::Created {
                log::info!("navigator already started, skipping");
                return Err(NavError::AlreadyStarted);
            }
            runtime.phase = Phase::Running;
        }

        let chat_root = self.inner.extractor.find_chat_root(&self.inner.document);
        self.inner.resolve_scroll_container();
        self.inner.rebuild("init");

        let Some(root) = chat_root else {
            log::warn!("no chat root to watch; rebuilds only run on request");
            return Ok(());
        };
        let weak = self.inner.weak.clone();
        let teardown = MutationWatcher::attach(
            self.inner.observers.as_ref(),
            &root,
            self.inner.ignore_within.clone(),
            move || {
                if let Some(inner) = weak.upgrade() {
                    inner.schedule_rebuild("mutation");
                }
            },
        )?;
        self.inner.runtime.borrow_mut().mutation = Some(teardown);
        log::info!("navigator started");
        Ok(())
    }

    /// Opens (or restarts) the debounce window for a rebuild.
    pub fn schedule_rebuild(&self, reason: &str) {
        self.inner.schedule_rebuild(reason);
    }

    /// Runs one rebuild pass immediately, cancelling any pending one.
    pub fn rebuild_now(&self, reason: &str) -> RebuildOutcome {
        self.inner.debouncer.cancel();
        self.inner.rebuild(reason)
    }

    pub fn state(&self) -> RebuildState {
        if self.inner.debouncer.is_pending() {
            RebuildState::RebuildPending
        } else {
            RebuildState::Idle
        }
    }

    pub fn store(&self) -> &Rc<AnnotationStore<D::Node>> {
        &self.inner.store
    }

    pub fn snapshot(&self) -> StateSnapshot<D::Node> {
        self.inner.store.snapshot()
    }

    pub fn subscribe(&self, subscriber: impl Fn(&StateSnapshot<D::Node>) + 'static) -> Teardown {
        self.inner.store.subscribe(subscriber)
    }

    pub fn config(&self) -> &NavConfig {
        &self.inner.config
    }

    pub fn document(&self) -> &D {
        &self.inner.document
    }

    /// The cached scroll container, if it is still attached.
    pub fn scroll_container(&self) -> Option<D::Node> {
        let cached = self.inner.runtime.borrow().scroll_container.clone();
        cached.filter(|c| self.inner.document.contains(c))
    }

    /// The message element enclosing `node`, for highlighting the active message.
    pub fn message_root_of(&self, node: &D::Node) -> Option<D::Node> {
        self.inner.extractor.message_root_of(node)
    }

    pub fn passes(&self) -> u64 {
        self.inner.runtime.borrow().passes
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }

    /// Tears down every observer and cancels pending work. Idempotent.
    pub fn dispose(&self) {
        let teardowns = {
            let mut runtime = self.inner.runtime.borrow_mut();
            if runtime.phase == Phase::Disposed {
                return;
            }
            runtime.phase = Phase::Disposed;
            runtime.scroll_container = None;
            [
                runtime.visibility.take(),
                runtime.resize.take(),
                runtime.mutation.take(),
            ]
        };
        self.inner.debouncer.cancel();
        self.inner.cancel_correction();
        for teardown in teardowns.into_iter().flatten() {
            teardown.run();
        }
        log::info!("navigator disposed");
    }
}

impl<D: DomDocument + 'static> Inner<D> {
    fn is_disposed(&self) -> bool {
        self.runtime.borrow().phase == Phase::Disposed
    }

    fn schedule_rebuild(&self, reason: &str) {
        if self.is_disposed() {
            log::debug!("rebuild request ignored after dispose ({})", reason);
            return;
        }
        let streaming = self.streaming.as_ref().is_some_and(|signal| signal.is_streaming());
        let delay = match self.config.streaming_debounce() {
            Some(delay) if streaming => delay,
            _ => self.config.debounce(),
        };
        log::debug!("schedule rebuild: {} (delay {:?}, streaming {})", reason, delay, streaming);

        let weak = self.weak.clone();
        let reason = format!("scheduled:{}", reason);
        self.debouncer.schedule(delay, move || {
            if let Some(inner) = weak.upgrade() {
                inner.rebuild(&reason);
            }
        });
    }

    /// The cached container while it is attached, otherwise a fresh lookup.
    fn resolve_scroll_container(&self) -> Option<D::Node> {
        let cached = self.runtime.borrow().scroll_container.clone();
        if let Some(container) = cached {
            if self.document.contains(&container) {
                return Some(container);
            }
            log::debug!("cached scroll container detached, resolving again");
        }
        let found = self.extractor.find_scroll_container(&self.document);
        self.runtime.borrow_mut().scroll_container = found.clone();
        found
    }
}
