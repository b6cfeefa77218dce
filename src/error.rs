// src/error.rs
use poi_dom::DomError;
use poi_traits::StorageError;
use thiserror::Error;

/// Rejected configuration values.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// The error type for setting up and driving a navigator.
#[derive(Error, Debug)]
pub enum NavError {
    #[error("DOM access failed: {0}")]
    Dom(#[from] DomError),

    #[error("Storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Navigator is incomplete: {0}")]
    Builder(String),

    #[error("Navigator already started")]
    AlreadyStarted,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
