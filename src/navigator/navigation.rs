use super::Navigator;
use poi_dom::{DomDocument, ScrollBehavior};
use poi_extract::scroll_into_view;
use poi_store::Annotate;
use poi_types::PoiId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

impl<D: DomDocument + 'static> Navigator<D> {
    /// Makes the entry active and smoothly scrolls its anchor into view, a fixed
    /// margin below the container's top edge.
    ///
    /// Returns `false` (with a warning) when the entry, its anchor or the scroll
    /// container is gone.
    pub fn scroll_to_poi(&self, id: &str) -> bool {
        let snapshot = self.snapshot();
        let Some(poi) = snapshot.poi(id) else {
            log::warn!("scroll_to_poi: unknown poi '{}'", id);
            return false;
        };
        let Some(anchor) = poi.anchor.live() else {
            log::warn!("scroll_to_poi: anchor of '{}' is detached", id);
            return false;
        };
        let container = self
            .scroll_container()
            .or_else(|| self.inner.resolve_scroll_container());
        let Some(container) = container else {
            log::warn!("scroll_to_poi: no scroll container for '{}'", id);
            return false;
        };

        self.inner.store.set_active_poi_id(Some(poi.id.clone()));
        match scroll_into_view(
            &container,
            anchor,
            self.inner.config.scroll_margin_px,
            ScrollBehavior::Smooth,
        ) {
            Ok(_) => true,
            Err(err) => {
                log::error!("scroll_to_poi '{}' failed: {}", id, err);
                false
            }
        }
    }

    /// Moves to the adjacent entry and scrolls to it. Only marked entries are
    /// candidates while the marked-only filter is on. Without an active entry
    /// the first candidate is chosen.
    pub fn step(&self, direction: Direction) -> Option<PoiId> {
        let snapshot = self.snapshot();
        let candidates = snapshot.visible_pois();
        if candidates.is_empty() {
            return None;
        }

        let current = snapshot
            .active_poi_id
            .as_ref()
            .and_then(|active| candidates.iter().position(|p| &p.id == active));
        let index = match (current, direction) {
            (None, _) => 0,
            (Some(i), Direction::Next) => (i + 1).min(candidates.len() - 1),
            (Some(i), Direction::Previous) => i.saturating_sub(1),
        };

        let target = candidates[index].id.clone();
        log::debug!("step {:?}: {:?} -> {}", direction, snapshot.active_poi_id, target);
        self.scroll_to_poi(target.as_str());
        Some(target)
    }

    /// Toggles the mark on the active entry. `None` when nothing is active.
    pub fn toggle_active_marked(&self) -> Option<Annotate> {
        let Some(active) = self.snapshot().active_poi_id else {
            log::debug!("mark toggle ignored: no active poi");
            return None;
        };
        Some(self.inner.store.toggle_poi_marked(active.as_str()))
    }

    pub fn toggle_panel_collapsed(&self) -> bool {
        self.inner.store.toggle_panel_collapsed()
    }

    pub fn toggle_show_only_marked(&self) -> bool {
        self.inner.store.toggle_show_only_marked()
    }
}
