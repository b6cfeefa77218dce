use std::cell::RefCell;
use std::fmt;

/// An idempotent teardown handle returned by every observer attachment.
///
/// The wrapped closure runs at most once, no matter how often [`Teardown::run`]
/// is called. Dropping the handle does not run it.
#[derive(Default)]
pub struct Teardown {
    action: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Teardown {
    pub fn new(action: impl FnOnce() + 'static) -> Self {
        Self {
            action: RefCell::new(Some(Box::new(action))),
        }
    }

    /// A handle with nothing to tear down.
    pub fn noop() -> Self {
        Self::default()
    }

    pub fn run(&self) {
        let action = self.action.borrow_mut().take();
        if let Some(action) = action {
            action();
        }
    }

    /// Whether the action has run (or there never was one).
    pub fn is_done(&self) -> bool {
        self.action.borrow().is_none()
    }
}

impl fmt::Debug for Teardown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Teardown").field("done", &self.is_done()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn runs_exactly_once() {
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        let teardown = Teardown::new(move || counter.set(counter.get() + 1));
        assert!(!teardown.is_done());
        teardown.run();
        teardown.run();
        assert_eq!(count.get(), 1);
        assert!(teardown.is_done());
    }

    #[test]
    fn noop_is_done() {
        let teardown = Teardown::noop();
        assert!(teardown.is_done());
        teardown.run();
    }
}
