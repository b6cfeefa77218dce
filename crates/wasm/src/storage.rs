//! `window.localStorage` as a [`KeyValueStorage`].

use crate::error::js_message;
use poi_traits::{KeyValueStorage, StorageError};
use web_sys::{Storage, Window};

#[derive(Debug, Clone)]
pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    /// Fails when the page denies storage access (sandboxed frames, privacy
    /// modes).
    pub fn from_window(window: &Window) -> Result<Self, StorageError> {
        match window.local_storage() {
            Ok(Some(storage)) => Ok(Self { storage }),
            Ok(None) => Err(StorageError::Unavailable(
                "localStorage is not available".to_string(),
            )),
            Err(err) => Err(StorageError::Unavailable(js_message(&err))),
        }
    }
}

impl KeyValueStorage for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage
            .get_item(key)
            .map_err(|err| StorageError::Unavailable(js_message(&err)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // Throws QuotaExceededError when full.
        self.storage
            .set_item(key, value)
            .map_err(|err| StorageError::WriteFailed {
                key: key.to_string(),
                message: js_message(&err),
            })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.storage
            .remove_item(key)
            .map_err(|err| StorageError::WriteFailed {
                key: key.to_string(),
                message: js_message(&err),
            })
    }

    fn name(&self) -> &'static str {
        "localStorage"
    }
}
