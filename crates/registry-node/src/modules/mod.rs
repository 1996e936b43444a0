//! Built-in modules shipped with the registry node.

pub mod schema;
pub mod serdes;

pub use schema::{SchemaError, SchemaModule, SchemaRegistryResource, SchemaTypesResource, SCHEMA_MODULE_ID};
pub use serdes::{SerdeModule, SerdesResource, SERDE_MODULE_ID};
