//! # Registry Types Crate
//!
//! Types shared by the bootstrap subsystem, the leadership coordinator and
//! the modules themselves.
//!
//! ## Design Principles
//!
//! - **Configured, not linked**: every collaborator is named by an
//!   implementation identifier and constructed through a [`FactoryRegistry`].
//! - **Fatal by default**: every bootstrap failure is a [`BootstrapError`];
//!   none are retried or swallowed.
//! - **Opaque resources**: modules hand [`Resource`] values to the routing
//!   layer without the bootstrap inspecting them.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod errors;
pub mod factory;
pub mod fatal;
pub mod resource;
pub mod routing;
pub mod storage;

pub use config::{
    FileStorageConfig, HaConfig, ModuleDescriptor, ModuleDescriptorStore, RegistryConfig,
    Settings, StorageProviderConfig, DEFAULT_SERVER_URL,
};
pub use errors::{BootstrapError, ComponentError, ComponentKind, ResolutionError};
pub use factory::FactoryRegistry;
pub use fatal::{fatal_channel, FatalReceiver, FatalReporter};
pub use resource::Resource;
pub use routing::{ResourceRouter, RoutingError, ServerLifecycleListener};
pub use storage::{FileStorage, StorageManager};
