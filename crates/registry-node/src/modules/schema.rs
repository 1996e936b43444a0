//! # Schema Module
//!
//! Keeps schema metadata in the shared storage manager. Writes are only
//! accepted on the leader; leadership is re-read on every write because the
//! reference may still be unset when the module is wired.

use std::sync::Arc;

use async_trait::async_trait;
use registry_ha::{LeadershipConsumer, LeadershipRef};
use registry_types::{ComponentError, FileStorage, Resource, Settings, StorageManager};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::module::{Module, StorageConsumer};

/// Identifier under which the schema module is registered.
pub const SCHEMA_MODULE_ID: &str = "SchemaModule";

const DEFAULT_NAMESPACE: &str = "schemas";
const DEFAULT_SCHEMA_TYPES: [&str; 1] = ["avro"];

/// Errors returned by [`SchemaRegistryResource`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("leadership has not been decided yet")]
    LeadershipUndecided,

    #[error("this node is not the leader (current leader: {leader:?})")]
    NotLeader { leader: Option<String> },

    #[error("unsupported schema type '{0}'")]
    UnsupportedType(String),

    #[error("storage error: {0}")]
    Storage(#[from] ComponentError),
}

/// Read/write access to schema metadata.
pub struct SchemaRegistryResource {
    namespace: String,
    schema_types: Vec<String>,
    storage: Arc<dyn StorageManager>,
    leadership: LeadershipRef,
}

impl SchemaRegistryResource {
    /// Register or replace metadata for `name`. Leader only.
    pub fn add_schema_metadata(
        &self,
        name: &str,
        schema_type: &str,
        metadata: Value,
    ) -> Result<(), SchemaError> {
        self.ensure_leader()?;
        if !self.schema_types.iter().any(|t| t == schema_type) {
            return Err(SchemaError::UnsupportedType(schema_type.to_string()));
        }
        let record = serde_json::json!({ "type": schema_type, "metadata": metadata });
        self.storage.put(&self.namespace, name, record)?;
        debug!(schema = name, schema_type, "Schema metadata stored");
        Ok(())
    }

    pub fn get_schema_metadata(&self, name: &str) -> Result<Option<Value>, SchemaError> {
        Ok(self.storage.get(&self.namespace, name)?)
    }

    /// Registered schema names, sorted.
    pub fn list_schemas(&self) -> Result<Vec<String>, SchemaError> {
        Ok(self
            .storage
            .list(&self.namespace)?
            .into_iter()
            .map(|(name, _)| name)
            .collect())
    }

    fn ensure_leader(&self) -> Result<(), SchemaError> {
        match self.leadership.get() {
            None => Err(SchemaError::LeadershipUndecided),
            Some(participant) if !participant.is_leader() => Err(SchemaError::NotLeader {
                leader: participant.current_leader(),
            }),
            Some(_) => Ok(()),
        }
    }
}

/// Supported schema types, read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaTypesResource {
    pub schema_types: Vec<String>,
}

/// Built-in module exposing schema metadata.
#[derive(Default)]
pub struct SchemaModule {
    namespace: String,
    schema_types: Vec<String>,
    storage: Option<Arc<dyn StorageManager>>,
    leadership: Option<LeadershipRef>,
}

impl SchemaModule {
    pub fn new() -> Self {
        Self::default()
    }
}

fn string_setting(config: &Settings, key: &str) -> Result<Option<String>, ComponentError> {
    match config.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ComponentError::new(format!(
            "'{key}' must be a string, got {other}"
        ))),
    }
}

#[async_trait]
impl Module for SchemaModule {
    async fn activate(
        &mut self,
        config: &Settings,
        _file_storage: Option<Arc<dyn FileStorage>>,
    ) -> Result<(), ComponentError> {
        self.namespace =
            string_setting(config, "namespace")?.unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

        self.schema_types = match config.get("schemaTypes") {
            None => DEFAULT_SCHEMA_TYPES.iter().map(|t| t.to_string()).collect(),
            Some(Value::Array(types)) => types
                .iter()
                .map(|t| {
                    t.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| ComponentError::new("'schemaTypes' entries must be strings"))
                })
                .collect::<Result<_, _>>()?,
            Some(other) => {
                return Err(ComponentError::new(format!(
                    "'schemaTypes' must be an array, got {other}"
                )))
            }
        };

        info!(
            namespace = %self.namespace,
            schema_types = ?self.schema_types,
            "Schema module activated"
        );
        Ok(())
    }

    fn resources(&self) -> Vec<Resource> {
        let (Some(storage), Some(leadership)) = (&self.storage, &self.leadership) else {
            warn!("Schema module was not wired, exposing no resources");
            return Vec::new();
        };
        vec![
            Resource::new(
                "schemas",
                SchemaRegistryResource {
                    namespace: self.namespace.clone(),
                    schema_types: self.schema_types.clone(),
                    storage: Arc::clone(storage),
                    leadership: leadership.clone(),
                },
            ),
            Resource::new(
                "schema-types",
                SchemaTypesResource {
                    schema_types: self.schema_types.clone(),
                },
            ),
        ]
    }

    fn as_storage_consumer(&mut self) -> Option<&mut dyn StorageConsumer> {
        Some(self)
    }

    fn as_leadership_consumer(&mut self) -> Option<&mut dyn LeadershipConsumer> {
        Some(self)
    }
}

impl StorageConsumer for SchemaModule {
    fn accept_storage_manager(&mut self, storage: Arc<dyn StorageManager>) {
        self.storage = Some(storage);
    }
}

impl LeadershipConsumer for SchemaModule {
    fn accept_leadership_ref(&mut self, leadership: LeadershipRef) {
        self.leadership = Some(leadership);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStorageManager;
    use registry_ha::LocalLeader;
    use serde_json::json;

    async fn wired_module(config: Settings, leadership: LeadershipRef) -> SchemaModule {
        let mut module = SchemaModule::new();
        module.activate(&config, None).await.unwrap();
        module.accept_storage_manager(Arc::new(InMemoryStorageManager::new()));
        module.accept_leadership_ref(leadership);
        module
    }

    fn schema_resource(module: &SchemaModule) -> Resource {
        module.resources().into_iter().next().unwrap()
    }

    #[tokio::test]
    async fn test_exposes_two_resources_in_order() {
        let module = wired_module(Settings::new(), LeadershipRef::new()).await;
        let names: Vec<_> = module.resources().iter().map(|r| r.name().to_string()).collect();
        assert_eq!(names, vec!["schemas", "schema-types"]);
    }

    #[tokio::test]
    async fn test_unwired_module_exposes_nothing() {
        let mut module = SchemaModule::new();
        module.activate(&Settings::new(), None).await.unwrap();
        assert!(module.resources().is_empty());
    }

    #[tokio::test]
    async fn test_write_waits_for_leadership_decision() {
        let leadership = LeadershipRef::new();
        let module = wired_module(Settings::new(), leadership.clone()).await;
        let resource = schema_resource(&module);
        let schemas = resource.downcast_ref::<SchemaRegistryResource>().unwrap();

        assert_eq!(
            schemas.add_schema_metadata("orders", "avro", json!({})),
            Err(SchemaError::LeadershipUndecided)
        );

        // Decided later; the same resource now accepts writes
        leadership.publish(Arc::new(LocalLeader::new())).unwrap();
        schemas
            .add_schema_metadata("orders", "avro", json!({"compatibility": "BACKWARD"}))
            .unwrap();
        assert_eq!(schemas.list_schemas().unwrap(), vec!["orders"]);
        assert_eq!(
            schemas.get_schema_metadata("orders").unwrap().unwrap()["type"],
            "avro"
        );
    }

    #[tokio::test]
    async fn test_schema_types_from_config() {
        let mut config = Settings::new();
        config.insert("schemaTypes".to_string(), json!(["avro", "json"]));
        let leadership = LeadershipRef::new();
        leadership.publish(Arc::new(LocalLeader::new())).unwrap();
        let module = wired_module(config, leadership).await;
        let resource = schema_resource(&module);
        let schemas = resource.downcast_ref::<SchemaRegistryResource>().unwrap();

        assert!(schemas.add_schema_metadata("a", "json", json!({})).is_ok());
        assert_eq!(
            schemas.add_schema_metadata("b", "protobuf", json!({})),
            Err(SchemaError::UnsupportedType("protobuf".to_string()))
        );
    }

    #[tokio::test]
    async fn test_invalid_config_fails_activation() {
        let mut config = Settings::new();
        config.insert("namespace".to_string(), json!(7));
        assert!(SchemaModule::new().activate(&config, None).await.is_err());
    }
}
