use crate::{KeyValueStore, MemoryStore};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Typed access to a [`KeyValueStore`].
///
/// Every failure, from the backend or from `serde_json`, is logged and
/// absorbed: reads fall back to "absent", writes are dropped.
#[derive(Clone)]
pub struct Storage {
    store: Arc<dyn KeyValueStore>,
}

impl Storage {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Storage backed by a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(key, error = %e, "failed to serialize stored value");
                return;
            }
        };
        if let Err(e) = self.store.set_value(key, &json) {
            tracing::error!(key, error = %e, "failed to store value");
        }
    }

    /// The value under `key`, or `None` when absent or unreadable.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get_value(key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::error!(key, error = %e, "failed to read value");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(key, error = %e, "stored value is not valid for the requested type");
                None
            }
        }
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    pub fn remove(&self, key: &str) {
        if let Err(e) = self.store.delete_value(key) {
            tracing::error!(key, error = %e, "failed to remove value");
        }
    }

    /// Whether a raw value exists under `key`, readable or not.
    pub fn has(&self, key: &str) -> bool {
        match self.store.get_value(key) {
            Ok(raw) => raw.is_some(),
            Err(e) => {
                tracing::error!(key, error = %e, "failed to read value");
                false
            }
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.store.list_keys().unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to list keys");
            Vec::new()
        })
    }

    pub fn clear(&self) {
        match self.store.clear_values() {
            Ok(()) => tracing::debug!("storage cleared"),
            Err(e) => tracing::error!(error = %e, "failed to clear storage"),
        }
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}
