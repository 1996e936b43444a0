//! # Module Loader/Activator
//!
//! Activates modules strictly in descriptor order, one at a time. Later
//! modules may rely on side effects published by earlier ones (for example
//! into shared storage), so order is part of the contract.
//!
//! Each module is wired immediately after its own activation, never in a
//! batch at the end. Any failure aborts the whole sequence and the partially
//! activated modules are dropped with it.

use std::sync::Arc;

use registry_telemetry::{log_module_event, metrics::MODULES_ACTIVATED};
use registry_types::{BootstrapError, FactoryRegistry, FileStorage, ModuleDescriptorStore};
use tracing::{info, instrument};

use crate::module::Module;
use crate::wiring::{CapabilityWiring, WiredCapabilities};

/// A module that was activated and wired.
pub struct ActivatedModule {
    pub name: String,
    pub implementation_id: String,
    pub capabilities: WiredCapabilities,
    pub module: Box<dyn Module>,
}

impl std::fmt::Debug for ActivatedModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivatedModule")
            .field("name", &self.name)
            .field("implementation_id", &self.implementation_id)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

/// Resolves, activates and wires modules.
pub struct ModuleActivator<'a> {
    factories: &'a FactoryRegistry<dyn Module>,
    file_storage: Option<Arc<dyn FileStorage>>,
    wiring: CapabilityWiring,
}

impl<'a> ModuleActivator<'a> {
    pub fn new(
        factories: &'a FactoryRegistry<dyn Module>,
        file_storage: Option<Arc<dyn FileStorage>>,
        wiring: CapabilityWiring,
    ) -> Self {
        Self {
            factories,
            file_storage,
            wiring,
        }
    }

    /// Activate every descriptor in order.
    #[instrument(name = "module_activation", skip_all, fields(modules = store.len()))]
    pub async fn activate_all(
        &self,
        store: &ModuleDescriptorStore,
    ) -> Result<Vec<ActivatedModule>, BootstrapError> {
        let mut activated = Vec::with_capacity(store.len());

        for descriptor in store.iter() {
            info!(
                module = %descriptor.name,
                implementation_id = %descriptor.implementation_id,
                "Registering module"
            );

            let mut module = self.factories.create(&descriptor.implementation_id)?;
            module
                .activate(&descriptor.config, self.file_storage.clone())
                .await
                .map_err(|source| {
                    BootstrapError::initialization(format!("module '{}'", descriptor.name), source)
                })?;

            let capabilities = self.wiring.wire(&descriptor.name, module.as_mut());
            MODULES_ACTIVATED.inc();
            log_module_event!(
                info,
                descriptor.name,
                "Module activated",
                storage = capabilities.storage,
                leadership = capabilities.leadership
            );

            activated.push(ActivatedModule {
                name: descriptor.name.clone(),
                implementation_id: descriptor.implementation_id.clone(),
                capabilities,
                module,
            });
        }

        info!(count = activated.len(), "All modules activated");
        Ok(activated)
    }
}
