//! Observer factories the host provides: intersection, mutation and resize.
//!
//! These mirror the browser's `IntersectionObserver`, `MutationObserver` and
//! `ResizeObserver`. Callbacks are delivered in batches from the host event loop.

use crate::teardown::Teardown;
use poi_dom::{DomError, DomNode};

/// One intersection update for an observed target.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry<N> {
    pub target: N,
    /// Visible fraction of the target within the root, `0.0..=1.0`.
    pub ratio: f64,
    /// Top of the target's bounding box, viewport-relative.
    pub bounding_top: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    ChildList,
    Attributes,
    CharacterData,
}

/// One native mutation record, reduced to what the engine inspects.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRecord<N> {
    pub kind: MutationKind,
    pub target: N,
    pub added_nodes: usize,
    pub removed_nodes: usize,
}

impl<N> MutationRecord<N> {
    pub fn child_list(target: N, added_nodes: usize, removed_nodes: usize) -> Self {
        Self {
            kind: MutationKind::ChildList,
            target,
            added_nodes,
            removed_nodes,
        }
    }

    pub fn character_data(target: N) -> Self {
        Self {
            kind: MutationKind::CharacterData,
            target,
            added_nodes: 0,
            removed_nodes: 0,
        }
    }

    pub fn attributes(target: N) -> Self {
        Self {
            kind: MutationKind::Attributes,
            target,
            added_nodes: 0,
            removed_nodes: 0,
        }
    }

    /// Whether the record added or removed at least one node.
    pub fn has_node_churn(&self) -> bool {
        self.added_nodes > 0 || self.removed_nodes > 0
    }
}

pub type IntersectionCallback<N> = Box<dyn FnMut(Vec<IntersectionEntry<N>>)>;
pub type MutationCallback<N> = Box<dyn FnMut(Vec<MutationRecord<N>>)>;
pub type ResizeCallback = Box<dyn FnMut()>;

/// A live intersection observer.
pub trait IntersectionObservation<N> {
    /// Starts observing `target`.
    fn observe(&self, target: &N) -> Result<(), DomError>;

    /// Stops all observation. Safe to call repeatedly.
    fn disconnect(&self);
}

/// Creates observers against the host page.
pub trait ObserverHost<N: DomNode> {
    /// Creates an intersection observer whose viewport is `root`.
    fn observe_intersections(
        &self,
        root: &N,
        thresholds: &[f64],
        callback: IntersectionCallback<N>,
    ) -> Result<Box<dyn IntersectionObservation<N>>, DomError>;

    /// Observes child-list changes anywhere under `root` (subtree).
    fn observe_mutations(&self, root: &N, callback: MutationCallback<N>) -> Result<Teardown, DomError>;

    /// Observes size changes of `target`.
    fn observe_resize(&self, target: &N, callback: ResizeCallback) -> Result<Teardown, DomError>;
}
