use poi_dom::DomNode;
use poi_outline::{Poi, PoiSummary};
use poi_types::PoiId;
use std::rc::Rc;

/// An immutable view of the application state.
///
/// Cloning is cheap: the outline is shared, and the store replaces it wholesale
/// instead of mutating entries in place, so a snapshot never changes after it
/// was handed out.
#[derive(Debug, Clone)]
pub struct StateSnapshot<N> {
    pub pois: Rc<[Poi<N>]>,
    pub active_poi_id: Option<PoiId>,
    pub panel_collapsed: bool,
    pub show_only_marked: bool,
}

impl<N: DomNode> StateSnapshot<N> {
    pub fn poi(&self, id: &str) -> Option<&Poi<N>> {
        self.pois.iter().find(|p| p.id.as_str() == id)
    }

    pub fn active_poi(&self) -> Option<&Poi<N>> {
        self.active_poi_id.as_ref().and_then(|id| self.poi(id.as_str()))
    }

    /// The entries the panel lists: all of them, or only marked ones when the
    /// filter is on.
    pub fn visible_pois(&self) -> Vec<&Poi<N>> {
        self.pois
            .iter()
            .filter(|p| !self.show_only_marked || p.marked)
            .collect()
    }

    pub fn summaries(&self) -> Vec<PoiSummary> {
        self.pois.iter().map(|p| p.summary()).collect()
    }
}
