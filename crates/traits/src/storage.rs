//! KeyValueStorage trait for abstracting per-page persistence.
//!
//! The annotation store persists small JSON blobs (marked ids, color tags, panel
//! flags) without knowing whether they end up in `localStorage`, a file, or memory.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::RwLock;
use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to write '{key}': {message}")]
    WriteFailed { key: String, message: String },

    #[error("Corrupt record '{key}': {message}")]
    Corrupt { key: String, message: String },
}

/// A string key/value store, such as the browser's `localStorage`.
///
/// All persistence is best-effort: callers log errors and fall back to defaults.
///
/// # Implementations
///
/// - `InMemoryStorage`: a map in memory (always available)
/// - `LocalStorage` in `poi-wasm`: the page's `window.localStorage`
pub trait KeyValueStorage: Debug {
    /// Reads the value stored under `key`, `Ok(None)` if absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Returns a human-readable name for this storage (for logging/debugging).
    fn name(&self) -> &'static str;
}

/// An in-memory storage.
///
/// Can be switched to an "unavailable" mode to exercise failure handling.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    entries: RwLock<HashMap<String, String>>,
    unavailable: RwLock<bool>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail with `StorageError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        if let Ok(mut flag) = self.unavailable.write() {
            *flag = unavailable;
        }
    }

    /// Get the number of stored entries.
    ///
    /// Returns 0 if the lock is poisoned.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Check if the store is empty.
    ///
    /// Returns `true` if the lock is poisoned (safe default).
    pub fn is_empty(&self) -> bool {
        self.entries.read().map(|e| e.is_empty()).unwrap_or(true)
    }

    /// All keys currently stored, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .read()
            .map(|e| e.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    fn check_available(&self) -> Result<(), StorageError> {
        match self.unavailable.read() {
            Ok(flag) if *flag => Err(StorageError::Unavailable("storage disabled".to_string())),
            Ok(_) => Ok(()),
            Err(_) => Err(StorageError::Unavailable("storage lock poisoned".to_string())),
        }
    }
}

impl KeyValueStorage for InMemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_available()?;
        let entries = self
            .entries
            .read()
            .map_err(|_| StorageError::Unavailable("storage lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_available()?;
        let mut entries = self.entries.write().map_err(|_| StorageError::WriteFailed {
            key: key.to_string(),
            message: "storage lock poisoned".to_string(),
        })?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_available()?;
        let mut entries = self.entries.write().map_err(|_| StorageError::WriteFailed {
            key: key.to_string(),
            message: "storage lock poisoned".to_string(),
        })?;
        entries.remove(key);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "InMemoryStorage"
    }
}
