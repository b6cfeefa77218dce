//! Deferred work: timers and animation frames.

use std::time::Duration;

/// Identifies a scheduled task so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

pub type Task = Box<dyn FnOnce()>;

/// The host's event loop, seen from the engine.
///
/// Everything runs on one logical thread: tasks are invoked later from the host's
/// event loop, never re-entrantly from inside `set_timeout` or
/// `request_animation_frame`.
pub trait Scheduler {
    /// Runs `task` once after `delay`.
    fn set_timeout(&self, delay: Duration, task: Task) -> TaskId;

    /// Runs `task` before the next repaint.
    fn request_animation_frame(&self, task: Task) -> TaskId;

    /// Cancels a pending task. Unknown or already-run ids are ignored.
    fn cancel(&self, id: TaskId);
}
