//! # Bootstrap
//!
//! Composes the registry process from configuration.
//!
//! ## Startup Sequence
//!
//! 1. Validate configuration into the ordered module store
//! 2. Start the leadership coordinator (publishes the local leader when no
//!    HA is configured, otherwise subscribes to the routing layer)
//! 3. Construct the storage manager and the optional file storage
//! 4. Activate and wire modules, in order
//! 5. Register every module's resources with the routing layer
//!
//! Every step is fatal on failure; nothing is exposed to the routing layer
//! unless all modules activated.

use std::sync::Arc;

use registry_ha::{CoordinatorState, LeadershipCoordinator, LeadershipRef};
use registry_telemetry::{encode_metrics, metrics::BOOTSTRAP_FAILURES, TelemetryError};
use registry_types::{
    BootstrapError, FatalReporter, FileStorage, FileStorageConfig, RegistryConfig,
    ResourceRouter, StorageManager, StorageProviderConfig,
};
use tracing::{debug, error, info, instrument, warn};

use crate::aggregator::register_resources;
use crate::loader::{ActivatedModule, ModuleActivator};
use crate::registry::ImplementationRegistry;
use crate::wiring::CapabilityWiring;

/// A fully bootstrapped registry process.
pub struct RegistryRuntime {
    modules: Vec<ActivatedModule>,
    storage_manager: Arc<dyn StorageManager>,
    file_storage: Option<Arc<dyn FileStorage>>,
    coordinator: Arc<LeadershipCoordinator>,
    resources_registered: usize,
}

impl RegistryRuntime {
    /// Activated modules, in activation order.
    pub fn modules(&self) -> &[ActivatedModule] {
        &self.modules
    }

    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn storage_manager(&self) -> Arc<dyn StorageManager> {
        Arc::clone(&self.storage_manager)
    }

    pub fn file_storage(&self) -> Option<Arc<dyn FileStorage>> {
        self.file_storage.clone()
    }

    pub fn leadership(&self) -> LeadershipRef {
        self.coordinator.leadership()
    }

    pub fn coordinator(&self) -> Arc<LeadershipCoordinator> {
        Arc::clone(&self.coordinator)
    }

    pub fn resources_registered(&self) -> usize {
        self.resources_registered
    }

    /// Log the state of every module and of leadership.
    pub fn status_report(&self) {
        info!("===========================================");
        info!("  REGISTRY STATUS");
        info!("===========================================");
        for activated in &self.modules {
            let caps = activated.capabilities;
            info!(
                "  {:20} {:20} storage={} leadership={} resources={}",
                activated.name,
                activated.implementation_id,
                caps.storage,
                caps.leadership,
                activated.module.resources().len()
            );
        }
        let leadership = self.leadership();
        let leader = leadership.get().and_then(|p| p.current_leader());
        info!(
            "  leadership: state={:?} set={} leader={:?}",
            self.coordinator.state(),
            leadership.is_set(),
            leader
        );
        info!("  resources registered: {}", self.resources_registered);
        info!("===========================================");
        match self.metrics_snapshot() {
            Ok(text) => debug!(metrics = %text, "Metrics snapshot"),
            Err(e) => warn!(error = %e, "Failed to encode metrics"),
        }
    }

    /// Bootstrap metrics in Prometheus text format.
    pub fn metrics_snapshot(&self) -> Result<String, TelemetryError> {
        encode_metrics()
    }

    /// Graceful shutdown: leave the election and release the participant.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        if self.coordinator.state() != CoordinatorState::Failed {
            self.coordinator.shutdown().await;
        }
        info!("Shutdown complete");
    }
}

/// Bootstrap the registry.
///
/// `fatal` receives failures of the delegated leadership branch, which run
/// after this function has returned.
#[instrument(name = "bootstrap", skip_all, fields(modules = config.modules.len(), ha = config.ha_config.is_some()))]
pub async fn bootstrap(
    config: &RegistryConfig,
    registry: &ImplementationRegistry,
    router: Arc<dyn ResourceRouter>,
    fatal: FatalReporter,
) -> Result<RegistryRuntime, BootstrapError> {
    let result = run(config, registry, router, fatal).await;
    if let Err(err) = &result {
        BOOTSTRAP_FAILURES.with_label_values(&[err.kind()]).inc();
        error!(kind = err.kind(), error = %err, "Bootstrap failed");
    }
    result
}

async fn run(
    config: &RegistryConfig,
    registry: &ImplementationRegistry,
    router: Arc<dyn ResourceRouter>,
    fatal: FatalReporter,
) -> Result<RegistryRuntime, BootstrapError> {
    let store = config.validate()?;

    // Leadership strategy is chosen before any module can be wired.
    let leadership = LeadershipRef::new();
    let coordinator = LeadershipCoordinator::new(
        config.ha_config.clone(),
        registry.participants(),
        leadership.clone(),
        fatal,
    );
    coordinator.start(router.as_ref())?;

    let storage_manager = build_storage_manager(&config.storage_provider, registry)?;
    let file_storage = config
        .file_storage
        .as_ref()
        .map(|fs| build_file_storage(fs, registry))
        .transpose()?;

    let wiring = CapabilityWiring::new(Arc::clone(&storage_manager), leadership);
    let modules = ModuleActivator::new(registry.modules(), file_storage.clone(), wiring)
        .activate_all(&store)
        .await?;

    let resources_registered = register_resources(router.as_ref(), &modules)?;
    info!(
        modules = modules.len(),
        resources = resources_registered,
        "Bootstrap complete"
    );

    Ok(RegistryRuntime {
        modules,
        storage_manager,
        file_storage,
        coordinator,
        resources_registered,
    })
}

fn build_storage_manager(
    config: &StorageProviderConfig,
    registry: &ImplementationRegistry,
) -> Result<Arc<dyn StorageManager>, BootstrapError> {
    let mut storage = registry
        .storage_providers()
        .create(&config.implementation_id)?;
    storage.init(&config.properties).map_err(|source| {
        BootstrapError::initialization(
            format!("storage provider '{}'", config.implementation_id),
            source,
        )
    })?;
    info!(implementation_id = %config.implementation_id, "Storage manager initialized");
    Ok(Arc::from(storage))
}

fn build_file_storage(
    config: &FileStorageConfig,
    registry: &ImplementationRegistry,
) -> Result<Arc<dyn FileStorage>, BootstrapError> {
    let mut storage = registry.file_storages().create(&config.implementation_id)?;
    storage.init(&config.properties).map_err(|source| {
        BootstrapError::initialization(
            format!("file storage '{}'", config.implementation_id),
            source,
        )
    })?;
    info!(implementation_id = %config.implementation_id, "File storage initialized");
    Ok(Arc::from(storage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{SCHEMA_MODULE_ID, SERDE_MODULE_ID};
    use crate::routing::InMemoryRouter;
    use registry_types::{fatal_channel, ModuleDescriptor, Settings};
    use serde_json::json;

    fn config_with(modules: Vec<ModuleDescriptor>) -> RegistryConfig {
        let mut config = RegistryConfig::new("in-memory");
        config.modules = modules;
        config
    }

    #[tokio::test]
    async fn test_unknown_storage_provider_is_fatal() {
        let (reporter, _rx) = fatal_channel();
        let router = Arc::new(InMemoryRouter::new());
        let config = RegistryConfig::new("cassandra");

        let err = bootstrap(
            &config,
            &ImplementationRegistry::with_builtins(),
            router.clone(),
            reporter,
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err.kind(), "resolution");
        assert!(router.resources().is_empty());
    }

    #[tokio::test]
    async fn test_builtin_modules_without_file_storage() {
        let (reporter, _rx) = fatal_channel();
        let router = Arc::new(InMemoryRouter::new());
        let config = config_with(vec![
            ModuleDescriptor::new("schemas", SCHEMA_MODULE_ID),
            ModuleDescriptor::new("serdes", SERDE_MODULE_ID),
        ]);

        let runtime = bootstrap(
            &config,
            &ImplementationRegistry::with_builtins(),
            router.clone(),
            reporter,
        )
        .await
        .unwrap();

        assert_eq!(runtime.module_names(), vec!["schemas", "serdes"]);
        // Serdes activates but has nothing to serve without file storage
        assert_eq!(router.resource_names(), vec!["schemas", "schema-types"]);
        assert!(runtime.file_storage().is_none());
        assert_eq!(runtime.coordinator().state(), CoordinatorState::LeaderLocal);
    }

    #[tokio::test]
    async fn test_builtin_modules_with_file_storage() {
        let tmp = tempfile::tempdir().unwrap();
        let (reporter, _rx) = fatal_channel();
        let router = Arc::new(InMemoryRouter::new());
        let mut config = config_with(vec![
            ModuleDescriptor::new("schemas", SCHEMA_MODULE_ID),
            ModuleDescriptor::new("serdes", SERDE_MODULE_ID),
        ]);
        let mut properties = Settings::new();
        properties.insert("directory".to_string(), json!(tmp.path()));
        config.file_storage = Some(FileStorageConfig {
            implementation_id: "local-fs".to_string(),
            properties,
        });

        let runtime = bootstrap(
            &config,
            &ImplementationRegistry::with_builtins(),
            router.clone(),
            reporter,
        )
        .await
        .unwrap();

        assert_eq!(runtime.module_names(), vec!["schemas", "serdes"]);
        assert_eq!(
            router.resource_names(),
            vec!["schemas", "schema-types", "serdes"]
        );
        assert_eq!(runtime.resources_registered(), 3);
        assert!(runtime.file_storage().is_some());
        assert_eq!(runtime.coordinator().state(), CoordinatorState::LeaderLocal);

        // Already registered by another test is fine
        let _ = registry_telemetry::register_metrics();
        let snapshot = runtime.metrics_snapshot().unwrap();
        assert!(snapshot.contains("registry_modules_activated_total"));
        assert!(snapshot.contains("registry_resources_registered_total"));

        runtime.status_report();
        runtime.shutdown().await;
    }
}
