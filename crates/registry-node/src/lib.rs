//! # Registry Node Library
//!
//! Module composition and leadership-aware bootstrap for the registry
//! service. The main entry point is the `main.rs` binary.
//!
//! ## Architectural Patterns
//!
//! - **Configured, not linked**: modules, storage and leadership
//!   participants are resolved by identifier through [`ImplementationRegistry`]
//! - **Capability wiring**: modules opt into shared dependencies via
//!   [`Module::as_storage_consumer`] and [`Module::as_leadership_consumer`]
//! - **Late-bound leadership**: modules receive a [`registry_ha::LeadershipRef`]
//!   slot that may be filled after they are wired

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod aggregator;
pub mod bootstrap;
pub mod loader;
pub mod module;
pub mod modules;
pub mod registry;
pub mod routing;
pub mod storage;
pub mod wiring;

pub use bootstrap::{bootstrap, RegistryRuntime};
pub use loader::{ActivatedModule, ModuleActivator};
pub use module::{Module, StorageConsumer};
pub use registry::ImplementationRegistry;
pub use routing::InMemoryRouter;
pub use wiring::{CapabilityWiring, WiredCapabilities};
