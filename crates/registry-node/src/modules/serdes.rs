//! Serializer/deserializer artefact module.
//!
//! Stores serde artefacts (jars, descriptors) through the file storage
//! handle. Without file storage the module still activates but exposes no
//! resource.

use std::sync::Arc;

use async_trait::async_trait;
use registry_types::{ComponentError, FileStorage, Resource, Settings};
use tracing::{debug, info, warn};

use crate::module::Module;

/// Identifier under which the serdes module is registered.
pub const SERDE_MODULE_ID: &str = "SerdeModule";

const DEFAULT_PREFIX: &str = "serdes";

/// Upload and fetch serde artefacts.
pub struct SerdesResource {
    prefix: String,
    file_storage: Arc<dyn FileStorage>,
}

impl SerdesResource {
    fn file_name(&self, artefact: &str) -> String {
        format!("{}-{}", self.prefix, artefact)
    }

    /// Store an artefact, returning where it landed.
    pub fn upload_artefact(&self, artefact: &str, bytes: &[u8]) -> Result<String, ComponentError> {
        let location = self.file_storage.upload(&self.file_name(artefact), bytes)?;
        debug!(artefact, %location, "Serde artefact uploaded");
        Ok(location)
    }

    pub fn download_artefact(&self, artefact: &str) -> Result<Vec<u8>, ComponentError> {
        self.file_storage.download(&self.file_name(artefact))
    }

    pub fn has_artefact(&self, artefact: &str) -> bool {
        self.file_storage.exists(&self.file_name(artefact))
    }
}

#[derive(Default)]
pub struct SerdeModule {
    prefix: String,
    file_storage: Option<Arc<dyn FileStorage>>,
}

impl SerdeModule {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Module for SerdeModule {
    async fn activate(
        &mut self,
        config: &Settings,
        file_storage: Option<Arc<dyn FileStorage>>,
    ) -> Result<(), ComponentError> {
        self.prefix = match config.get("prefix") {
            None => DEFAULT_PREFIX.to_string(),
            Some(serde_json::Value::String(prefix)) if !prefix.is_empty() => prefix.clone(),
            Some(other) => {
                return Err(ComponentError::new(format!(
                    "'prefix' must be a non-empty string, got {other}"
                )))
            }
        };
        if file_storage.is_none() {
            warn!("No fileStorage configured, serdes artefacts will not be served");
        }
        self.file_storage = file_storage;

        info!(
            prefix = %self.prefix,
            file_storage = self.file_storage.is_some(),
            "Serdes module activated"
        );
        Ok(())
    }

    fn resources(&self) -> Vec<Resource> {
        self.file_storage
            .iter()
            .map(|file_storage| {
                Resource::new(
                    "serdes",
                    SerdesResource {
                        prefix: self.prefix.clone(),
                        file_storage: Arc::clone(file_storage),
                    },
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalFileStorage;
    use serde_json::json;

    fn file_storage(dir: &std::path::Path) -> Arc<dyn FileStorage> {
        let mut properties = Settings::new();
        properties.insert("directory".to_string(), json!(dir));
        let mut storage = LocalFileStorage::new();
        storage.init(&properties).unwrap();
        Arc::new(storage)
    }

    #[tokio::test]
    async fn test_activates_without_file_storage() {
        let mut module = SerdeModule::new();
        module.activate(&Settings::new(), None).await.unwrap();
        assert!(module.resources().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_empty_prefix() {
        let mut config = Settings::new();
        config.insert("prefix".to_string(), json!(""));
        let err = SerdeModule::new().activate(&config, None).await.unwrap_err();
        assert!(err.message.contains("prefix"));
    }

    #[tokio::test]
    async fn test_upload_through_resource() {
        let tmp = tempfile::tempdir().unwrap();
        let mut module = SerdeModule::new();
        let mut config = Settings::new();
        config.insert("prefix".to_string(), json!("kafka"));
        module
            .activate(&config, Some(file_storage(tmp.path())))
            .await
            .unwrap();

        let resources = module.resources();
        assert_eq!(resources.len(), 1);
        let serdes = resources[0].downcast_ref::<SerdesResource>().unwrap();

        serdes.upload_artefact("avro.jar", b"bytes").unwrap();
        assert!(serdes.has_artefact("avro.jar"));
        assert!(tmp.path().join("kafka-avro.jar").is_file());
        assert_eq!(serdes.download_artefact("avro.jar").unwrap(), b"bytes");
    }
}
