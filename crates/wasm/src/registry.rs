//! Starting the navigator in a page, at most once per page.
//!
//! A page-global flag (`globalThis.__POI_NAV_BOOTED__`) marks a running
//! navigator, so a second copy of the module injected into the same page
//! refuses to start. Within one module, booting again hands back the running
//! navigator.

use crate::dom::{WebDocument, WebNode};
use crate::error::{ErrorCode, WasmError};
use crate::handle::PoiNavigator;
use crate::observers::BrowserObservers;
use crate::scheduler::BrowserScheduler;
use crate::storage::LocalStorage;
use poi_nav::{NavConfig, Navigator, StopButtonSignal};
use poi_traits::{InMemoryStorage, KeyValueStorage};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::Element;

const BOOTED_FLAG: &str = "__POI_NAV_BOOTED__";

thread_local! {
    static RUNNING: RefCell<Option<PoiNavigator>> = const { RefCell::new(None) };
}

fn page_flag() -> bool {
    js_sys::Reflect::get(&js_sys::global(), &BOOTED_FLAG.into())
        .map(|value| value.is_truthy())
        .unwrap_or(false)
}

fn set_page_flag(booted: bool) {
    let global = js_sys::global();
    let result = if booted {
        js_sys::Reflect::set(&global, &BOOTED_FLAG.into(), &JsValue::TRUE).map(|_| ())
    } else {
        js_sys::Reflect::delete_property(&global, &BOOTED_FLAG.into()).map(|_| ())
    };
    if result.is_err() {
        log::warn!("could not update {}", BOOTED_FLAG);
    }
}

/// Parses the optional configuration object handed to `boot`.
fn config_from(value: JsValue) -> Result<NavConfig, WasmError> {
    if value.is_undefined() || value.is_null() {
        return Ok(NavConfig::default());
    }
    let config: NavConfig = serde_wasm_bindgen::from_value(value)?;
    config.validate()?;
    Ok(config)
}

pub(crate) fn start(config: JsValue, overlay: Option<Element>) -> Result<PoiNavigator, WasmError> {
    if let Some(running) = RUNNING.with(|slot| slot.borrow().clone()) {
        log::info!("already booted, reusing the running navigator");
        return Ok(running);
    }
    if page_flag() {
        return Err(WasmError::new(
            ErrorCode::AlreadyBooted,
            "another navigator already runs in this page",
        ));
    }

    let config = config_from(config)?;
    let window = web_sys::window().ok_or_else(|| WasmError::host("no window"))?;
    let document = window
        .document()
        .map(WebDocument::new)
        .ok_or_else(|| WasmError::host("no document"))?;

    let storage: Rc<dyn KeyValueStorage> = match LocalStorage::from_window(&window) {
        Ok(storage) => Rc::new(storage),
        Err(err) => {
            log::warn!("{}; annotations will not survive a reload", err);
            Rc::new(InMemoryStorage::new())
        }
    };

    let streaming = config.streaming_debounce_ms.is_some();
    let mut builder = Navigator::builder(document.clone())
        .with_config(config)
        .with_storage(storage)
        .with_scheduler(Rc::new(BrowserScheduler::new(window)))
        .with_observers(Rc::new(BrowserObservers::new()));
    if let Some(overlay) = overlay {
        builder = builder.with_ignored_subtree(WebNode::new(overlay));
    }
    if streaming {
        builder = builder.with_streaming_signal(StopButtonSignal::new(document)?);
    }

    let navigator = builder.build()?;
    navigator.start()?;

    let handle = PoiNavigator::new(navigator);
    RUNNING.with(|slot| *slot.borrow_mut() = Some(handle.clone()));
    set_page_flag(true);
    log::info!("navigator booted");
    Ok(handle)
}

/// Clears the registration once the running navigator has been disposed.
pub(crate) fn forget_disposed() {
    let cleared = RUNNING.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.as_ref().is_some_and(|running| running.is_disposed()) {
            *slot = None;
            true
        } else {
            false
        }
    });
    if cleared {
        set_page_flag(false);
    }
}

/// Disposes the running navigator, if any.
pub(crate) fn stop() {
    let running = RUNNING.with(|slot| slot.borrow().clone());
    if let Some(running) = running {
        running.dispose();
    }
}
