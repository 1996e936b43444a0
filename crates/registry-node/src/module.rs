//! # Module Contract
//!
//! A module is a pluggable unit of functionality: it is constructed from an
//! implementation identifier, activated with its config, optionally handed
//! shared dependencies, and finally asked for the resources it exposes.
//!
//! Optional dependencies are declared through capability queries rather
//! than runtime type inspection: a module that wants the storage manager
//! returns itself from [`Module::as_storage_consumer`].

use std::sync::Arc;

use async_trait::async_trait;
use registry_ha::LeadershipConsumer;
use registry_types::{ComponentError, FileStorage, Resource, Settings, StorageManager};

/// Capability: a module that wants the shared storage manager.
pub trait StorageConsumer {
    fn accept_storage_manager(&mut self, storage: Arc<dyn StorageManager>);
}

/// A configured, independently deployable unit of functionality.
#[async_trait]
pub trait Module: Send + Sync {
    /// Initialise from the descriptor's config.
    ///
    /// `file_storage` is `None` when no file storage is configured.
    async fn activate(
        &mut self,
        config: &Settings,
        file_storage: Option<Arc<dyn FileStorage>>,
    ) -> Result<(), ComponentError>;

    /// Resources to register with the routing layer, in order.
    fn resources(&self) -> Vec<Resource>;

    fn as_storage_consumer(&mut self) -> Option<&mut dyn StorageConsumer> {
        None
    }

    fn as_leadership_consumer(&mut self) -> Option<&mut dyn LeadershipConsumer> {
        None
    }
}
