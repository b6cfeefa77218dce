//! The JavaScript face of a running navigator.

use crate::registry;
use crate::dom::{WebDocument, WebNode};
use crate::error::{WasmError, js_message};
use poi_nav::{Annotate, Direction, Navigator, PoiSummary, RebuildOutcome, StateSnapshot};
use poi_traits::Teardown;
use poi_types::{ColorTag, PoiId};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// What a panel renders: the outline without element handles, plus the UI flags.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotView {
    pois: Vec<PoiSummary>,
    active_poi_id: Option<PoiId>,
    panel_collapsed: bool,
    show_only_marked: bool,
}

impl From<&StateSnapshot<WebNode>> for SnapshotView {
    fn from(snapshot: &StateSnapshot<WebNode>) -> Self {
        Self {
            pois: snapshot.summaries(),
            active_poi_id: snapshot.active_poi_id.clone(),
            panel_collapsed: snapshot.panel_collapsed,
            show_only_marked: snapshot.show_only_marked,
        }
    }
}

fn to_js(snapshot: &StateSnapshot<WebNode>) -> Result<JsValue, WasmError> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    Ok(SnapshotView::from(snapshot).serialize(&serializer)?)
}

/// A running navigator, as handed to the page's panel code.
///
/// # Example
///
/// ```javascript
/// const nav = boot({ debounceMs: 300 });
/// const subscription = nav.subscribe((state) => render(state.pois, state.activePoiId));
/// nav.scrollToPoi("msg_2_response_code_1");
/// nav.next();
/// ```
#[wasm_bindgen]
#[derive(Clone)]
pub struct PoiNavigator {
    navigator: Navigator<WebDocument>,
}

impl PoiNavigator {
    pub(crate) fn new(navigator: Navigator<WebDocument>) -> Self {
        Self { navigator }
    }

    pub fn navigator(&self) -> &Navigator<WebDocument> {
        &self.navigator
    }
}

#[wasm_bindgen]
impl PoiNavigator {
    /// Activates the entry and smoothly scrolls it into view. `false` when the
    /// entry or its element is gone.
    #[wasm_bindgen(js_name = scrollToPoi)]
    pub fn scroll_to_poi(&self, id: &str) -> bool {
        self.navigator.scroll_to_poi(id)
    }

    /// Scrolls to the entry after the active one and returns its id.
    pub fn next(&self) -> Option<String> {
        self.navigator
            .step(Direction::Next)
            .map(|id| id.as_str().to_string())
    }

    pub fn previous(&self) -> Option<String> {
        self.navigator
            .step(Direction::Previous)
            .map(|id| id.as_str().to_string())
    }

    #[wasm_bindgen(js_name = toggleActiveMarked)]
    pub fn toggle_active_marked(&self) -> bool {
        self.navigator.toggle_active_marked() == Some(Annotate::Updated)
    }

    /// `false` when no entry has that id.
    #[wasm_bindgen(js_name = togglePoiMarked)]
    pub fn toggle_poi_marked(&self, id: &str) -> bool {
        self.navigator.store().toggle_poi_marked(id) == Annotate::Updated
    }

    /// Sets (or with `undefined`, clears) the color tag of an entry.
    #[wasm_bindgen(js_name = setPoiColorTag)]
    pub fn set_poi_color_tag(&self, id: &str, tag: Option<String>) -> Result<bool, JsValue> {
        let tag = match tag {
            Some(name) => Some(name.parse::<ColorTag>().map_err(WasmError::from)?),
            None => None,
        };
        Ok(self.navigator.store().set_poi_color_tag(id, tag) == Annotate::Updated)
    }

    /// Gives the entry the least used palette color and returns its name.
    #[wasm_bindgen(js_name = autoColorTag)]
    pub fn auto_color_tag(&self, id: &str) -> Option<String> {
        self.navigator
            .store()
            .assign_auto_color_tag(id)
            .map(|tag| tag.as_str().to_string())
    }

    #[wasm_bindgen(js_name = togglePanelCollapsed)]
    pub fn toggle_panel_collapsed(&self) -> bool {
        self.navigator.toggle_panel_collapsed()
    }

    #[wasm_bindgen(js_name = toggleShowOnlyMarked)]
    pub fn toggle_show_only_marked(&self) -> bool {
        self.navigator.toggle_show_only_marked()
    }

    /// The current state as a plain object.
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        Ok(to_js(&self.navigator.snapshot())?)
    }

    /// Calls `listener` with the current state now and after every change.
    pub fn subscribe(&self, listener: js_sys::Function) -> Subscription {
        let teardown = self.navigator.subscribe(move |snapshot| {
            let value = match to_js(snapshot) {
                Ok(value) => value,
                Err(err) => {
                    log::error!("serializing state for a subscriber failed: {}", err);
                    return;
                }
            };
            if let Err(err) = listener.call1(&JsValue::NULL, &value) {
                log::error!("state subscriber threw: {}", js_message(&err));
            }
        });
        Subscription { teardown }
    }

    /// Rebuilds immediately. Returns the entry count, or `undefined` when the
    /// page had nothing to outline.
    pub fn rebuild(&self) -> Option<u32> {
        match self.navigator.rebuild_now("manual") {
            RebuildOutcome::Rebuilt { poi_count } => Some(poi_count as u32),
            _ => None,
        }
    }

    #[wasm_bindgen(getter, js_name = isDisposed)]
    pub fn is_disposed(&self) -> bool {
        self.navigator.is_disposed()
    }

    /// Stops all observers and timers. A later `boot()` starts a new navigator.
    pub fn dispose(&self) {
        self.navigator.dispose();
        registry::forget_disposed();
    }
}

/// Returned by [`PoiNavigator::subscribe`].
#[wasm_bindgen]
pub struct Subscription {
    teardown: Teardown,
}

#[wasm_bindgen]
impl Subscription {
    pub fn unsubscribe(&self) {
        self.teardown.run();
    }
}
