//! [`Scheduler`] over `setTimeout` and `requestAnimationFrame`.
//!
//! Every pending task owns a `Closure` registered with the browser. A closure is
//! never dropped while it runs: finished slots are swept on the next call into
//! the scheduler.

use crate::error::js_message;
use poi_traits::{Scheduler, Task, TaskId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Window;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotKind {
    Timeout,
    Frame,
}

struct Slot {
    kind: SlotKind,
    handle: i32,
    task: Option<Task>,
    _callback: Closure<dyn FnMut()>,
}

#[derive(Default)]
struct Slots {
    next_id: u64,
    pending: HashMap<u64, Slot>,
    finished: Vec<u64>,
    running: Option<u64>,
}

impl Slots {
    fn sweep(&mut self) {
        let finished = std::mem::take(&mut self.finished);
        for id in finished {
            if self.running != Some(id) {
                self.pending.remove(&id);
            }
        }
    }
}

pub struct BrowserScheduler {
    window: Window,
    slots: Rc<RefCell<Slots>>,
}

impl BrowserScheduler {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            slots: Rc::new(RefCell::new(Slots::default())),
        }
    }

    /// Number of tasks registered with the browser and not yet run or cancelled.
    pub fn pending(&self) -> usize {
        self.slots
            .borrow()
            .pending
            .values()
            .filter(|slot| slot.task.is_some())
            .count()
    }

    fn schedule(&self, kind: SlotKind, delay: Duration, task: Task) -> TaskId {
        let id = {
            let mut slots = self.slots.borrow_mut();
            slots.sweep();
            slots.next_id += 1;
            slots.next_id
        };

        let callback = Closure::<dyn FnMut()>::new(fire(Rc::downgrade(&self.slots), id));
        let function = callback.as_ref().unchecked_ref();
        let registered = match kind {
            SlotKind::Timeout => {
                let millis = delay.as_millis().min(i32::MAX as u128) as i32;
                self.window
                    .set_timeout_with_callback_and_timeout_and_arguments_0(function, millis)
            }
            SlotKind::Frame => self.window.request_animation_frame(function),
        };

        match registered {
            Ok(handle) => {
                self.slots.borrow_mut().pending.insert(
                    id,
                    Slot {
                        kind,
                        handle,
                        task: Some(task),
                        _callback: callback,
                    },
                );
            }
            Err(err) => log::error!("scheduling {:?} task failed: {}", kind, js_message(&err)),
        }
        TaskId(id)
    }
}

/// The body of a registered closure: runs the task unless it was cancelled.
fn fire(slots: Weak<RefCell<Slots>>, id: u64) -> impl FnMut() + 'static {
    move || {
        let Some(slots) = slots.upgrade() else {
            return;
        };
        let task = {
            let mut state = slots.borrow_mut();
            state.running = Some(id);
            state.pending.get_mut(&id).and_then(|slot| slot.task.take())
        };
        if let Some(task) = task {
            task();
        }
        let mut state = slots.borrow_mut();
        state.running = None;
        state.finished.push(id);
    }
}

impl Scheduler for BrowserScheduler {
    fn set_timeout(&self, delay: Duration, task: Task) -> TaskId {
        self.schedule(SlotKind::Timeout, delay, task)
    }

    fn request_animation_frame(&self, task: Task) -> TaskId {
        self.schedule(SlotKind::Frame, Duration::ZERO, task)
    }

    fn cancel(&self, id: TaskId) {
        let mut slots = self.slots.borrow_mut();
        slots.sweep();
        if slots.running == Some(id.0) {
            return;
        }
        let Some(slot) = slots.pending.remove(&id.0) else {
            return;
        };
        match slot.kind {
            SlotKind::Timeout => self.window.clear_timeout_with_handle(slot.handle),
            SlotKind::Frame => {
                if let Err(err) = self.window.cancel_animation_frame(slot.handle) {
                    log::warn!("cancelAnimationFrame failed: {}", js_message(&err));
                }
            }
        }
    }
}

impl fmt::Debug for BrowserScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrowserScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}
