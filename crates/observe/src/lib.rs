//! # poi-observe
//!
//! Everything that reacts to the host page over time: the visibility tracker that
//! elects the active outline entry, the mutation watcher that signals structural
//! changes, the resize watch, and the trailing-edge debouncer.
//!
//! The [`testing`] module provides deterministic stand-ins for the host's event
//! loop and observers.

mod debounce;
mod mutation;
mod resize;
pub mod testing;
mod visibility;

pub use debounce::Debouncer;
pub use mutation::{MutationWatcher, is_relevant_batch};
pub use resize::watch_resize;
pub use visibility::{DEFAULT_THRESHOLDS, VisibilitySample, VisibilityTracker, elect_active};
