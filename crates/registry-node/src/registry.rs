//! # Implementation Registry
//!
//! One [`FactoryRegistry`] per component kind, populated at process start.
//! Configuration refers to implementations only by these identifiers.
//!
//! ## Built-ins
//!
//! | Kind | Identifier | Implementation |
//! |------|------------|----------------|
//! | storage provider | `in-memory` | [`InMemoryStorageManager`] |
//! | file storage | `local-fs` | [`LocalFileStorage`] |
//! | module | `SchemaModule` | [`SchemaModule`] |
//! | module | `SerdeModule` | [`SerdeModule`] |

use std::sync::Arc;

use registry_ha::LeadershipParticipant;
use registry_types::{ComponentKind, FactoryRegistry, FileStorage, StorageManager};

use crate::module::Module;
use crate::modules::{SchemaModule, SerdeModule, SCHEMA_MODULE_ID, SERDE_MODULE_ID};
use crate::storage::{
    InMemoryStorageManager, LocalFileStorage, IN_MEMORY_STORAGE_ID, LOCAL_FS_STORAGE_ID,
};

/// All factories the bootstrap can resolve identifiers against.
pub struct ImplementationRegistry {
    modules: FactoryRegistry<dyn Module>,
    storage_providers: FactoryRegistry<dyn StorageManager>,
    file_storages: FactoryRegistry<dyn FileStorage>,
    participants: Arc<FactoryRegistry<dyn LeadershipParticipant>>,
}

impl ImplementationRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            modules: FactoryRegistry::new(ComponentKind::Module),
            storage_providers: FactoryRegistry::new(ComponentKind::StorageProvider),
            file_storages: FactoryRegistry::new(ComponentKind::FileStorage),
            participants: Arc::new(FactoryRegistry::new(ComponentKind::LeadershipParticipant)),
        }
    }

    /// Registry pre-populated with the built-in implementations.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry
            .storage_providers
            .register(IN_MEMORY_STORAGE_ID, || Box::new(InMemoryStorageManager::new()));
        registry
            .file_storages
            .register(LOCAL_FS_STORAGE_ID, || Box::new(LocalFileStorage::new()));
        registry
            .modules
            .register(SCHEMA_MODULE_ID, || Box::new(SchemaModule::new()));
        registry
            .modules
            .register(SERDE_MODULE_ID, || Box::new(SerdeModule::new()));
        registry
    }

    pub fn modules(&self) -> &FactoryRegistry<dyn Module> {
        &self.modules
    }

    pub fn storage_providers(&self) -> &FactoryRegistry<dyn StorageManager> {
        &self.storage_providers
    }

    pub fn file_storages(&self) -> &FactoryRegistry<dyn FileStorage> {
        &self.file_storages
    }

    /// Shared with the leadership coordinator, which resolves lazily.
    pub fn participants(&self) -> Arc<FactoryRegistry<dyn LeadershipParticipant>> {
        Arc::clone(&self.participants)
    }
}

impl Default for ImplementationRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_registered() {
        let registry = ImplementationRegistry::with_builtins();
        assert!(registry.modules().contains(SCHEMA_MODULE_ID));
        assert!(registry.modules().contains(SERDE_MODULE_ID));
        assert!(registry.storage_providers().contains(IN_MEMORY_STORAGE_ID));
        assert!(registry.file_storages().contains(LOCAL_FS_STORAGE_ID));
        assert!(registry.participants().identifiers().is_empty());
    }

    #[test]
    fn test_empty_registry_resolves_nothing() {
        let registry = ImplementationRegistry::new();
        let err = registry.modules().create(SCHEMA_MODULE_ID).err().unwrap();
        assert_eq!(err.kind, ComponentKind::Module);
    }
}
