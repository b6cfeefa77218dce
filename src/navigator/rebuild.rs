use super::{Inner, RebuildOutcome, ScrollCapture};
use crate::error::NavError;
use poi_dom::{DomDocument, DomNode};
use poi_observe::{VisibilityTracker, watch_resize};

impl<D: DomDocument + 'static> Inner<D> {
    /// One rebuild pass. Never fails: errors are logged and reported as
    /// [`RebuildOutcome::Failed`].
    pub(super) fn rebuild(&self, reason: &str) -> RebuildOutcome {
        if self.is_disposed() {
            return RebuildOutcome::Disposed;
        }
        let pass = {
            let mut runtime = self.runtime.borrow_mut();
            runtime.passes += 1;
            runtime.passes
        };
        log::debug!("rebuild #{} start ({})", pass, reason);

        let outcome = match self.run_pass() {
            Ok(outcome) => outcome,
            Err(err) => {
                log::error!("rebuild #{} ({}) failed: {}", pass, reason, err);
                RebuildOutcome::Failed
            }
        };
        match outcome {
            RebuildOutcome::Rebuilt { poi_count } => {
                log::info!("rebuild #{} done: {} poi(s)", pass, poi_count)
            }
            other => log::debug!("rebuild #{} ended: {:?}", pass, other),
        }
        outcome
    }

    fn run_pass(&self) -> Result<RebuildOutcome, NavError> {
        let messages = self.extractor.extract_messages(&self.document);
        if messages.is_empty() {
            return Ok(RebuildOutcome::NoMessages);
        }

        let Some(container) = self.resolve_scroll_container() else {
            return Ok(RebuildOutcome::NoScrollContainer);
        };

        let capture = ScrollCapture::of(container.scroll_metrics());
        let pois = self.outline.build(&messages);
        let poi_count = pois.len();
        self.store.set_pois(pois);

        self.reattach(&container)?;
        self.restore_scroll(&container, capture);

        Ok(RebuildOutcome::Rebuilt { poi_count })
    }

    /// Replaces the visibility tracker and resize watch with fresh attachments
    /// against the current outline.
    fn reattach(&self, container: &D::Node) -> Result<(), NavError> {
        let (visibility, resize) = {
            let mut runtime = self.runtime.borrow_mut();
            (runtime.visibility.take(), runtime.resize.take())
        };
        for teardown in [visibility, resize].into_iter().flatten() {
            teardown.run();
        }

        self.attach_visibility(container)?;

        let weak = self.weak.clone();
        let watched = container.clone();
        let resize = watch_resize(self.observers.as_ref(), container, move || {
            if let Some(inner) = weak.upgrade() {
                inner.on_container_resized(&watched);
            }
        })?;
        self.runtime.borrow_mut().resize = Some(resize);
        Ok(())
    }

    fn attach_visibility(&self, container: &D::Node) -> Result<(), NavError> {
        let pois = self.store.snapshot().pois;
        let teardown = VisibilityTracker::attach(
            self.observers.as_ref(),
            container,
            &pois,
            &self.config.visibility_thresholds,
            self.store.clone(),
        )?;
        self.runtime.borrow_mut().visibility = Some(teardown);
        Ok(())
    }

    /// The container changed size: track the latest outline again.
    fn on_container_resized(&self, container: &D::Node) {
        if self.is_disposed() || !container.is_connected() {
            return;
        }
        let previous = self.runtime.borrow_mut().visibility.take();
        if let Some(teardown) = previous {
            teardown.run();
        }
        if let Err(err) = self.attach_visibility(container) {
            log::error!("re-attaching visibility tracking after resize failed: {}", err);
        }
    }
}
