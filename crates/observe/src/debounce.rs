use poi_traits::{Scheduler, TaskId};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// A trailing-edge debouncer: scheduling while a task is pending cancels the
/// pending task and restarts the delay.
pub struct Debouncer {
    scheduler: Rc<dyn Scheduler>,
    pending: Rc<Cell<Option<TaskId>>>,
}

impl fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debouncer")
            .field("pending", &self.pending.get())
            .finish()
    }
}

impl Debouncer {
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            scheduler,
            pending: Rc::new(Cell::new(None)),
        }
    }

    pub fn schedule(&self, delay: Duration, task: impl FnOnce() + 'static) {
        self.cancel();
        let pending = self.pending.clone();
        let id = self.scheduler.set_timeout(
            delay,
            Box::new(move || {
                pending.set(None);
                task();
            }),
        );
        self.pending.set(Some(id));
    }

    pub fn cancel(&self) {
        if let Some(id) = self.pending.take() {
            self.scheduler.cancel(id);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ManualScheduler;

    #[test]
    fn bursts_collapse_into_one_trailing_run() {
        let scheduler = Rc::new(ManualScheduler::new());
        let debouncer = Debouncer::new(scheduler.clone());
        let runs = Rc::new(Cell::new(0));

        for _ in 0..3 {
            let runs = runs.clone();
            debouncer.schedule(Duration::from_millis(250), move || runs.set(runs.get() + 1));
            scheduler.advance(Duration::from_millis(100));
        }
        assert_eq!(runs.get(), 0);
        assert!(debouncer.is_pending());

        scheduler.advance(Duration::from_millis(150));
        assert_eq!(runs.get(), 1);
        assert!(!debouncer.is_pending());
        assert_eq!(scheduler.pending_timers(), 0);
    }

    #[test]
    fn cancel_drops_the_pending_run() {
        let scheduler = Rc::new(ManualScheduler::new());
        let debouncer = Debouncer::new(scheduler.clone());
        let runs = Rc::new(Cell::new(0));
        let counter = runs.clone();
        debouncer.schedule(Duration::from_millis(10), move || counter.set(1));
        debouncer.cancel();
        debouncer.cancel();
        scheduler.advance(Duration::from_secs(1));
        assert_eq!(runs.get(), 0);
    }
}
