//! Scroll position capture and restore around a rebuild.

use super::Inner;
use poi_dom::{DomDocument, DomNode, ScrollBehavior};
use poi_types::ScrollMetrics;

/// The container's scroll state before a rebuild.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollCapture {
    /// Offset as a fraction of the scrollable distance.
    pub fraction: f64,
    pub offset: f64,
    pub scroll_height: f64,
}

impl ScrollCapture {
    pub fn of(metrics: ScrollMetrics) -> Self {
        Self {
            fraction: metrics.fraction(),
            offset: metrics.scroll_top,
            scroll_height: metrics.scroll_height,
        }
    }

    /// The offset to restore given the container's current metrics.
    ///
    /// After a large height change the relative position is kept; otherwise the
    /// raw offset, clamped to the new range.
    pub fn target_offset(&self, now: ScrollMetrics, layout_shift_threshold: f64) -> f64 {
        let max = now.max_scroll();
        if (now.scroll_height - self.scroll_height).abs() > layout_shift_threshold {
            self.fraction * max
        } else {
            self.offset.clamp(0.0, max)
        }
    }

    /// Applies the restore to `container` and returns the offset requested.
    pub fn restore<N: DomNode>(&self, container: &N, layout_shift_threshold: f64) -> f64 {
        let target = self.target_offset(container.scroll_metrics(), layout_shift_threshold);
        container.scroll_to(target, ScrollBehavior::Auto);
        target
    }
}

impl<D: DomDocument + 'static> Inner<D> {
    /// Restores now, then again on each of the next correction frames with fresh
    /// measurements, since layout keeps settling after the outline re-renders.
    pub(super) fn restore_scroll(&self, container: &D::Node, capture: ScrollCapture) {
        self.cancel_correction();
        let threshold = self.config.layout_shift_threshold_px;
        let offset = capture.restore(container, threshold);
        log::debug!(
            "scroll restored to {} (captured {} of height {})",
            offset,
            capture.offset,
            capture.scroll_height
        );
        self.schedule_correction(container.clone(), capture, self.config.restore_correction_passes);
    }

    fn schedule_correction(&self, container: D::Node, capture: ScrollCapture, remaining: u32) {
        if remaining == 0 {
            return;
        }
        let weak = self.weak.clone();
        let id = self.scheduler.request_animation_frame(Box::new(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.runtime.borrow_mut().correction = None;
            if inner.is_disposed() || !container.is_connected() {
                return;
            }
            let offset = capture.restore(&container, inner.config.layout_shift_threshold_px);
            log::trace!("scroll correction pass: {}", offset);
            inner.schedule_correction(container, capture, remaining - 1);
        }));
        self.runtime.borrow_mut().correction = Some(id);
    }

    pub(super) fn cancel_correction(&self) {
        let pending = self.runtime.borrow_mut().correction.take();
        if let Some(id) = pending {
            self.scheduler.cancel(id);
        }
    }
}
