//! # poi-store
//!
//! The single mutable resource of the engine. Holds the outline, the active entry,
//! the panel toggles and the user's annotations; merges freshly built outlines
//! against prior annotations; persists annotations per page; and notifies
//! subscribers with immutable snapshots.

mod persistence;
mod state;
mod store;

pub use persistence::AnnotationRepository;
pub use state::StateSnapshot;
pub use store::{Annotate, AnnotationStore, Subscriber};
