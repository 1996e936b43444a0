//! # Capability Wiring
//!
//! Runs immediately after each module activates. Injection order is fixed:
//! storage manager first, then the leadership reference.

use std::sync::Arc;

use registry_ha::LeadershipRef;
use registry_types::StorageManager;
use tracing::info;

use crate::module::Module;

/// Which optional capabilities a module was wired with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WiredCapabilities {
    pub storage: bool,
    pub leadership: bool,
}

/// Injects shared dependencies into modules that ask for them.
#[derive(Clone)]
pub struct CapabilityWiring {
    storage: Arc<dyn StorageManager>,
    leadership: LeadershipRef,
}

impl CapabilityWiring {
    pub fn new(storage: Arc<dyn StorageManager>, leadership: LeadershipRef) -> Self {
        Self {
            storage,
            leadership,
        }
    }

    /// Wire one freshly activated module. Each capability is injected once.
    pub fn wire(&self, module_name: &str, module: &mut dyn Module) -> WiredCapabilities {
        let mut wired = WiredCapabilities::default();

        if let Some(consumer) = module.as_storage_consumer() {
            info!(module = %module_name, "Module is a storage consumer, setting storage manager");
            consumer.accept_storage_manager(Arc::clone(&self.storage));
            wired.storage = true;
        }

        if let Some(consumer) = module.as_leadership_consumer() {
            info!(
                module = %module_name,
                leadership_set = self.leadership.is_set(),
                "Module is a leadership consumer, setting leadership reference"
            );
            consumer.accept_leadership_ref(self.leadership.clone());
            wired.leadership = true;
        }

        wired
    }
}
