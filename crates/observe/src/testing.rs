//! Deterministic stand-ins for the host event loop and observers.
//!
//! [`ManualScheduler`] keeps a virtual clock that only moves when told to, and
//! runs animation frames on demand. [`RecordingObservers`] records every observer
//! the engine registers so a test can deliver intersection, mutation and resize
//! batches by hand.

use poi_dom::{DomError, DomNode};
use poi_traits::{
    IntersectionCallback, IntersectionEntry, IntersectionObservation, MutationCallback,
    MutationRecord, ObserverHost, ResizeCallback, Scheduler, Task, TaskId, Teardown,
};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

struct Timer {
    id: TaskId,
    due: Duration,
    task: Task,
}

#[derive(Default)]
struct Queue {
    now: Duration,
    next_id: u64,
    timers: Vec<Timer>,
    frames: Vec<(TaskId, Task)>,
}

impl Queue {
    fn next_id(&mut self) -> TaskId {
        self.next_id += 1;
        TaskId(self.next_id)
    }
}

/// A scheduler driven by the test.
#[derive(Default)]
pub struct ManualScheduler {
    queue: RefCell<Queue>,
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let queue = self.queue.borrow();
        f.debug_struct("ManualScheduler")
            .field("now", &queue.now)
            .field("timers", &queue.timers.len())
            .field("frames", &queue.frames.len())
            .finish()
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.queue.borrow().now
    }

    /// Moves the clock forward by `by`, running every timer that falls due on the
    /// way in due order. Timers scheduled by those tasks run too if they fall due
    /// before the new time. Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now() + by;
        let mut ran = 0;
        loop {
            let task = {
                let mut queue = self.queue.borrow_mut();
                let next = queue
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= target)
                    .min_by_key(|(_, t)| (t.due, t.id))
                    .map(|(i, _)| i);
                match next {
                    Some(index) => {
                        let timer = queue.timers.remove(index);
                        queue.now = timer.due;
                        timer.task
                    }
                    None => break,
                }
            };
            task();
            ran += 1;
        }
        self.queue.borrow_mut().now = target;
        ran
    }

    /// Runs one animation frame: every frame callback requested before this call.
    /// Callbacks requested while the frame runs wait for the next one.
    pub fn run_frame(&self) -> usize {
        let frames = std::mem::take(&mut self.queue.borrow_mut().frames);
        let count = frames.len();
        for (_, task) in frames {
            task();
        }
        count
    }

    /// Runs frames until none are requested any more, up to `limit` frames.
    pub fn run_frames(&self, limit: usize) -> usize {
        let mut frames = 0;
        while frames < limit && self.pending_frames() > 0 {
            self.run_frame();
            frames += 1;
        }
        frames
    }

    pub fn pending_timers(&self) -> usize {
        self.queue.borrow().timers.len()
    }

    pub fn pending_frames(&self) -> usize {
        self.queue.borrow().frames.len()
    }
}

impl Scheduler for ManualScheduler {
    fn set_timeout(&self, delay: Duration, task: Task) -> TaskId {
        let mut queue = self.queue.borrow_mut();
        let id = queue.next_id();
        let due = queue.now + delay;
        queue.timers.push(Timer { id, due, task });
        id
    }

    fn request_animation_frame(&self, task: Task) -> TaskId {
        let mut queue = self.queue.borrow_mut();
        let id = queue.next_id();
        queue.frames.push((id, task));
        id
    }

    fn cancel(&self, id: TaskId) {
        let mut queue = self.queue.borrow_mut();
        queue.timers.retain(|t| t.id != id);
        queue.frames.retain(|(frame, _)| *frame != id);
    }
}

struct IntersectionSlot<N> {
    id: u64,
    root: N,
    thresholds: Vec<f64>,
    targets: Rc<RefCell<Vec<N>>>,
    callback: Rc<RefCell<IntersectionCallback<N>>>,
}

struct MutationSlot<N> {
    id: u64,
    root: N,
    callback: Rc<RefCell<MutationCallback<N>>>,
}

struct ResizeSlot<N> {
    id: u64,
    target: N,
    callback: Rc<RefCell<ResizeCallback>>,
}

struct Registry<N> {
    next_id: u64,
    intersections: Vec<IntersectionSlot<N>>,
    mutations: Vec<MutationSlot<N>>,
    resizes: Vec<ResizeSlot<N>>,
}

impl<N> Registry<N> {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// An [`ObserverHost`] that records registrations and lets the test fire them.
///
/// Callbacks are invoked with no internal borrow held, so they may register or
/// disconnect observers (as a resize-triggered re-attach does).
pub struct RecordingObservers<N> {
    registry: Rc<RefCell<Registry<N>>>,
}

impl<N: DomNode> Default for RecordingObservers<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: DomNode> fmt::Debug for RecordingObservers<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.borrow();
        f.debug_struct("RecordingObservers")
            .field("intersections", &registry.intersections.len())
            .field("mutations", &registry.mutations.len())
            .field("resizes", &registry.resizes.len())
            .finish()
    }
}

impl<N: DomNode> RecordingObservers<N> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                intersections: Vec::new(),
                mutations: Vec::new(),
                resizes: Vec::new(),
            })),
        }
    }

    pub fn intersection_observer_count(&self) -> usize {
        self.registry.borrow().intersections.len()
    }

    pub fn mutation_observer_count(&self) -> usize {
        self.registry.borrow().mutations.len()
    }

    pub fn resize_observer_count(&self) -> usize {
        self.registry.borrow().resizes.len()
    }

    /// Targets of the most recently created intersection observer still connected.
    pub fn observed_targets(&self) -> Vec<N> {
        self.registry
            .borrow()
            .intersections
            .last()
            .map(|slot| slot.targets.borrow().clone())
            .unwrap_or_default()
    }

    /// Root and thresholds of the most recent intersection observer.
    pub fn intersection_root(&self) -> Option<(N, Vec<f64>)> {
        self.registry
            .borrow()
            .intersections
            .last()
            .map(|slot| (slot.root.clone(), slot.thresholds.clone()))
    }

    /// Delivers `entries` to every connected intersection observer, each
    /// receiving only the entries for targets it observes.
    pub fn fire_intersections(&self, entries: Vec<IntersectionEntry<N>>) {
        let slots: Vec<(u64, Rc<RefCell<Vec<N>>>, Rc<RefCell<IntersectionCallback<N>>>)> = self
            .registry
            .borrow()
            .intersections
            .iter()
            .map(|s| (s.id, s.targets.clone(), s.callback.clone()))
            .collect();

        for (id, targets, callback) in slots {
            if !self.registry.borrow().intersections.iter().any(|s| s.id == id) {
                continue;
            }
            let batch: Vec<IntersectionEntry<N>> = {
                let targets = targets.borrow();
                entries
                    .iter()
                    .filter(|e| targets.contains(&e.target))
                    .cloned()
                    .collect()
            };
            if !batch.is_empty() {
                (*callback.borrow_mut())(batch);
            }
        }
    }

    /// Delivers `records` to every mutation observer whose root contains the
    /// record's target.
    pub fn fire_mutations(&self, records: Vec<MutationRecord<N>>) {
        let slots: Vec<(u64, N, Rc<RefCell<MutationCallback<N>>>)> = self
            .registry
            .borrow()
            .mutations
            .iter()
            .map(|s| (s.id, s.root.clone(), s.callback.clone()))
            .collect();

        for (id, root, callback) in slots {
            if !self.registry.borrow().mutations.iter().any(|s| s.id == id) {
                continue;
            }
            let batch: Vec<MutationRecord<N>> = records
                .iter()
                .filter(|r| root.contains(&r.target))
                .cloned()
                .collect();
            if !batch.is_empty() {
                (*callback.borrow_mut())(batch);
            }
        }
    }

    /// Notifies every resize observer of `target`.
    pub fn fire_resize(&self, target: &N) {
        let slots: Vec<(u64, Rc<RefCell<ResizeCallback>>)> = self
            .registry
            .borrow()
            .resizes
            .iter()
            .filter(|s| &s.target == target)
            .map(|s| (s.id, s.callback.clone()))
            .collect();

        for (id, callback) in slots {
            if !self.registry.borrow().resizes.iter().any(|s| s.id == id) {
                continue;
            }
            (*callback.borrow_mut())();
        }
    }
}

struct RecordedIntersection<N> {
    id: u64,
    targets: Rc<RefCell<Vec<N>>>,
    registry: Weak<RefCell<Registry<N>>>,
    connected: Cell<bool>,
}

impl<N: DomNode> IntersectionObservation<N> for RecordedIntersection<N> {
    fn observe(&self, target: &N) -> Result<(), DomError> {
        if !self.connected.get() {
            return Err(DomError::Host("observer is disconnected".to_string()));
        }
        if !target.is_connected() {
            return Err(DomError::Detached(target.tag_name()));
        }
        let mut targets = self.targets.borrow_mut();
        if !targets.contains(target) {
            targets.push(target.clone());
        }
        Ok(())
    }

    fn disconnect(&self) {
        self.connected.set(false);
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().intersections.retain(|s| s.id != self.id);
        }
    }
}

impl<N: DomNode> ObserverHost<N> for RecordingObservers<N> {
    fn observe_intersections(
        &self,
        root: &N,
        thresholds: &[f64],
        callback: IntersectionCallback<N>,
    ) -> Result<Box<dyn IntersectionObservation<N>>, DomError> {
        let targets = Rc::new(RefCell::new(Vec::new()));
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id();
        registry.intersections.push(IntersectionSlot {
            id,
            root: root.clone(),
            thresholds: thresholds.to_vec(),
            targets: targets.clone(),
            callback: Rc::new(RefCell::new(callback)),
        });
        Ok(Box::new(RecordedIntersection {
            id,
            targets,
            registry: Rc::downgrade(&self.registry),
            connected: Cell::new(true),
        }))
    }

    fn observe_mutations(&self, root: &N, callback: MutationCallback<N>) -> Result<Teardown, DomError> {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id();
        registry.mutations.push(MutationSlot {
            id,
            root: root.clone(),
            callback: Rc::new(RefCell::new(callback)),
        });
        let weak = Rc::downgrade(&self.registry);
        Ok(Teardown::new(move || {
            if let Some(registry) = weak.upgrade() {
                registry.borrow_mut().mutations.retain(|s| s.id != id);
            }
        }))
    }

    fn observe_resize(&self, target: &N, callback: ResizeCallback) -> Result<Teardown, DomError> {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id();
        registry.resizes.push(ResizeSlot {
            id,
            target: target.clone(),
            callback: Rc::new(RefCell::new(callback)),
        });
        let weak = Rc::downgrade(&self.registry);
        Ok(Teardown::new(move || {
            if let Some(registry) = weak.upgrade() {
                registry.borrow_mut().resizes.retain(|s| s.id != id);
            }
        }))
    }
}
