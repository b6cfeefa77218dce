//! WebAssembly bindings that run the POI navigator inside a chat page.
//!
//! The engine crates are written against host seams (`DomNode`,
//! `KeyValueStorage`, `Scheduler`, `ObserverHost`). This crate supplies the
//! browser implementations and a small JavaScript API on top.
//!
//! ## Module Structure
//!
//! - [`dom`] - `DomNode`/`DomDocument` over `web_sys::Element` and `Document`
//! - [`storage`] - `window.localStorage`
//! - [`scheduler`] - `setTimeout` and `requestAnimationFrame`
//! - [`observers`] - native intersection, mutation and resize observers
//! - `registry` - the once-per-page boot guard
//! - [`error`] - error types with JavaScript interop
//!
//! # Example
//!
//! ```javascript
//! import init, { boot } from '@poi-nav/wasm';
//!
//! await init();
//!
//! // Called once the chat page's DOM is ready.
//! const nav = boot({ storageNamespace: 'my-outline' }, document.querySelector('#outline-panel'));
//! nav.subscribe((state) => renderPanel(state));
//! ```
//!
//! Passing the panel element makes the navigator ignore DOM churn inside it.

pub mod dom;
pub mod error;
mod handle;
pub mod observers;
mod registry;
pub mod scheduler;
pub mod storage;

pub use dom::{WebDocument, WebNode};
pub use error::{ErrorCode, WasmError};
pub use handle::{PoiNavigator, Subscription};
pub use observers::BrowserObservers;
pub use scheduler::BrowserScheduler;
pub use storage::LocalStorage;

use wasm_bindgen::prelude::*;

/// Initialize the WASM module.
///
/// Sets up panic hooks for better error messages in the browser console. It is
/// called automatically by wasm-pack's generated JavaScript.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    #[cfg(feature = "console-logging")]
    {
        console_log::init_with_level(log::Level::Debug).ok();
    }
}

/// Starts the navigator on the current page.
///
/// `config` is an optional object with the navigator's configuration keys
/// (`debounceMs`, `storageNamespace`, ...). `overlay` is the element hosting
/// the outline panel, if any.
///
/// Booting again from the same module returns the running navigator; a second
/// module injected into the same page fails with `ALREADY_BOOTED`.
#[wasm_bindgen]
pub fn boot(config: JsValue, overlay: Option<web_sys::Element>) -> Result<PoiNavigator, JsValue> {
    Ok(registry::start(config, overlay)?)
}

/// Disposes the running navigator, if any, and clears the page flag.
#[wasm_bindgen]
pub fn shutdown() {
    registry::stop();
}

/// Get the version of the poi-wasm library.
#[wasm_bindgen(js_name = getVersion)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
