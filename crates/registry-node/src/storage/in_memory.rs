//! In-memory storage manager.
//!
//! Suitable for single-node operation and tests; contents are lost on exit.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use registry_types::{ComponentError, Settings, StorageManager};
use serde_json::Value;
use tracing::debug;

/// Identifier under which the in-memory provider is registered.
pub const IN_MEMORY_STORAGE_ID: &str = "in-memory";

type Namespace = BTreeMap<String, Value>;

/// Namespace → key → value store.
#[derive(Debug, Default)]
pub struct InMemoryStorageManager {
    namespaces: RwLock<BTreeMap<String, Namespace>>,
}

impl InMemoryStorageManager {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageManager for InMemoryStorageManager {
    fn init(&mut self, properties: &Settings) -> Result<(), ComponentError> {
        debug!(properties = properties.len(), "In-memory storage initialized");
        Ok(())
    }

    fn put(&self, namespace: &str, key: &str, value: Value) -> Result<(), ComponentError> {
        self.namespaces
            .write()
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, ComponentError> {
        Ok(self
            .namespaces
            .read()
            .get(namespace)
            .and_then(|ns| ns.get(key))
            .cloned())
    }

    fn list(&self, namespace: &str) -> Result<Vec<(String, Value)>, ComponentError> {
        Ok(self
            .namespaces
            .read()
            .get(namespace)
            .map(|ns| ns.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    fn remove(&self, namespace: &str, key: &str) -> Result<Option<Value>, ComponentError> {
        Ok(self
            .namespaces
            .write()
            .get_mut(namespace)
            .and_then(|ns| ns.remove(key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_put_get_remove() {
        let storage = InMemoryStorageManager::new();
        storage.put("schemas", "orders", json!({"type": "avro"})).unwrap();

        assert_eq!(
            storage.get("schemas", "orders").unwrap(),
            Some(json!({"type": "avro"}))
        );
        assert_eq!(storage.get("serdes", "orders").unwrap(), None);

        let removed = storage.remove("schemas", "orders").unwrap();
        assert!(removed.is_some());
        assert!(storage.get("schemas", "orders").unwrap().is_none());
    }

    #[test]
    fn test_list_is_ordered_by_key() {
        let storage = InMemoryStorageManager::new();
        storage.put("ns", "b", json!(2)).unwrap();
        storage.put("ns", "a", json!(1)).unwrap();

        let keys: Vec<_> = storage.list("ns").unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert!(storage.list("empty").unwrap().is_empty());
    }
}
