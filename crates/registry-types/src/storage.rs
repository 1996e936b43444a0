//! # Storage Contracts
//!
//! Both backends are constructed once, initialised from configuration and
//! then shared read-only (behind `Arc`) with every module. Implementations
//! provide their own interior synchronization.

use serde_json::Value;

use crate::config::Settings;
use crate::errors::ComponentError;

/// Shared storage backend handed to storage-consuming modules.
pub trait StorageManager: Send + Sync {
    /// Initialise from `storageProvider.properties`.
    fn init(&mut self, properties: &Settings) -> Result<(), ComponentError>;

    /// Insert or replace `key` in `namespace`.
    fn put(&self, namespace: &str, key: &str, value: Value) -> Result<(), ComponentError>;

    fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, ComponentError>;

    /// All entries of a namespace, ordered by key.
    fn list(&self, namespace: &str) -> Result<Vec<(String, Value)>, ComponentError>;

    /// Remove `key`, returning the previous value if any.
    fn remove(&self, namespace: &str, key: &str) -> Result<Option<Value>, ComponentError>;
}

/// Optional blob storage handed to every module at activation.
pub trait FileStorage: Send + Sync {
    /// Initialise from `fileStorage.properties`.
    fn init(&mut self, properties: &Settings) -> Result<(), ComponentError>;

    /// Store `bytes` under `name`, returning the stored location.
    fn upload(&self, name: &str, bytes: &[u8]) -> Result<String, ComponentError>;

    fn download(&self, name: &str) -> Result<Vec<u8>, ComponentError>;

    /// Returns true when something was deleted.
    fn delete(&self, name: &str) -> Result<bool, ComponentError>;

    fn exists(&self, name: &str) -> bool;
}
