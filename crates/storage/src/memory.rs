use crate::{KeyValueStore, Result};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Process-local store. Keys are listed in lexicographic order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get_value(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values().get(key).cloned())
    }

    fn set_value(&self, key: &str, value: &str) -> Result<()> {
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete_value(&self, key: &str) -> Result<bool> {
        Ok(self.values().remove(key).is_some())
    }

    fn list_keys(&self) -> Result<Vec<String>> {
        Ok(self.values().keys().cloned().collect())
    }

    fn clear_values(&self) -> Result<()> {
        self.values().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_delete() {
        let store = MemoryStore::new();
        store.set_value("b", "2").unwrap();
        store.set_value("a", "1").unwrap();

        assert_eq!(store.get_value("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.list_keys().unwrap(), vec!["a", "b"]);
        assert!(store.delete_value("a").unwrap());
        assert!(!store.delete_value("a").unwrap());
        assert_eq!(store.get_value("a").unwrap(), None);
    }

    #[test]
    fn test_clear() {
        let store = MemoryStore::new();
        store.set_value("a", "1").unwrap();
        store.clear_values().unwrap();
        assert!(store.list_keys().unwrap().is_empty());
    }
}
