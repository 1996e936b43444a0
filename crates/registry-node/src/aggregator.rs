//! # Resource Aggregator
//!
//! Flattens every module's resources (module order, then per-module order)
//! and registers them with the routing layer. Runs once, after all modules
//! are activated and wired.

use registry_telemetry::metrics::RESOURCES_REGISTERED;
use registry_types::{BootstrapError, Resource, ResourceRouter};
use tracing::{debug, info};

use crate::loader::ActivatedModule;

/// All resources of `modules`, module-major.
pub fn collect_resources(modules: &[ActivatedModule]) -> Vec<Resource> {
    modules
        .iter()
        .flat_map(|activated| activated.module.resources())
        .collect()
}

/// Register every resource, stopping at the first refusal.
///
/// Returns the number of resources registered.
pub fn register_resources(
    router: &dyn ResourceRouter,
    modules: &[ActivatedModule],
) -> Result<usize, BootstrapError> {
    let resources = collect_resources(modules);
    info!(
        resources = ?resources.iter().map(Resource::name).collect::<Vec<_>>(),
        "Registering resources with the routing layer"
    );

    let count = resources.len();
    for resource in resources {
        let name = resource.name().to_string();
        router
            .register(resource)
            .map_err(|e| BootstrapError::Registration {
                resource: name.clone(),
                message: e.to_string(),
            })?;
        RESOURCES_REGISTERED.inc();
        debug!(resource = %name, "Resource registered");
    }
    Ok(count)
}
