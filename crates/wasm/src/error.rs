//! Error handling for WASM bindings.
//!
//! Converts the engine's error types into JavaScript `Error` objects carrying a
//! `code` property.

use poi_dom::DomError;
use poi_nav::{ConfigError, NavError};
use poi_traits::StorageError;
use poi_types::UnknownColorTag;
use thiserror::Error;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Error codes for TypeScript consumption.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid configuration object
    Config,
    /// The page's DOM could not be read or observed
    Dom,
    /// `localStorage` failure
    Storage,
    /// Another navigator already runs in this page
    AlreadyBooted,
    /// Bad argument from the caller (unknown color tag, ...)
    InvalidArgument,
    /// Browser API missing or failing
    Host,
}

impl ErrorCode {
    fn as_js_code(&self) -> &'static str {
        match self {
            ErrorCode::Config => "CONFIG_ERROR",
            ErrorCode::Dom => "DOM_ERROR",
            ErrorCode::Storage => "STORAGE_ERROR",
            ErrorCode::AlreadyBooted => "ALREADY_BOOTED",
            ErrorCode::InvalidArgument => "INVALID_ARGUMENT",
            ErrorCode::Host => "HOST_ERROR",
        }
    }
}

/// A JavaScript-friendly error type.
///
/// Not a `wasm_bindgen` struct: it converts into a plain JS `Error` instead.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct WasmError {
    code: ErrorCode,
    message: String,
}

impl WasmError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn host(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Host, message)
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<NavError> for WasmError {
    fn from(err: NavError) -> Self {
        let code = match &err {
            NavError::Dom(_) => ErrorCode::Dom,
            NavError::Storage(_) => ErrorCode::Storage,
            NavError::Config(_) | NavError::Builder(_) => ErrorCode::Config,
            NavError::AlreadyStarted => ErrorCode::AlreadyBooted,
            NavError::Io(_) => ErrorCode::Host,
        };
        Self::new(code, err.to_string())
    }
}

impl From<DomError> for WasmError {
    fn from(err: DomError) -> Self {
        Self::new(ErrorCode::Dom, err.to_string())
    }
}

impl From<StorageError> for WasmError {
    fn from(err: StorageError) -> Self {
        Self::new(ErrorCode::Storage, err.to_string())
    }
}

impl From<ConfigError> for WasmError {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorCode::Config, err.to_string())
    }
}

impl From<UnknownColorTag> for WasmError {
    fn from(err: UnknownColorTag) -> Self {
        Self::new(ErrorCode::InvalidArgument, err.to_string())
    }
}

impl From<serde_wasm_bindgen::Error> for WasmError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        Self::new(ErrorCode::Config, err.to_string())
    }
}

impl From<WasmError> for JsValue {
    fn from(err: WasmError) -> Self {
        let js_error = js_sys::Error::new(&err.message);
        js_sys::Reflect::set(
            &js_error,
            &"code".into(),
            &JsValue::from_str(err.code.as_js_code()),
        )
        .ok();
        js_error.into()
    }
}

/// Best-effort message of a thrown JS value.
pub(crate) fn js_message(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

/// Maps a thrown JS value to a [`DomError::Host`].
pub(crate) fn host_error(value: JsValue) -> DomError {
    DomError::Host(js_message(&value))
}
