//! # Registry Configuration
//!
//! Deserialised form of the operator's configuration document. Field names
//! follow the document's camelCase schema:
//!
//! ```json
//! {
//!   "haConfig": { "implementationId": "zk-leader", "config": {} },
//!   "modules": [ { "name": "schemas", "implementationId": "SchemaModule" } ],
//!   "storageProvider": { "implementationId": "in-memory", "properties": {} },
//!   "fileStorage": { "implementationId": "local-fs", "properties": {} }
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::BootstrapError;

/// Free-form configuration mapping handed to collaborators.
pub type Settings = serde_json::Map<String, serde_json::Value>;

/// Default URL reported by the routing layer when no override is given.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:9090";

/// Configuration of a single module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDescriptor {
    pub name: String,
    pub implementation_id: String,
    #[serde(default)]
    pub config: Settings,
}

impl ModuleDescriptor {
    pub fn new(name: impl Into<String>, implementation_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            implementation_id: implementation_id.into(),
            config: Settings::new(),
        }
    }

    /// Attach a config mapping.
    #[must_use]
    pub fn with_config(mut self, config: Settings) -> Self {
        self.config = config;
        self
    }
}

/// Selects delegated leader election when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HaConfig {
    pub implementation_id: String,
    #[serde(default)]
    pub config: Settings,
}

/// Storage backend shared by all storage-consuming modules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageProviderConfig {
    pub implementation_id: String,
    #[serde(default)]
    pub properties: Settings,
}

/// Optional file storage handed to every module at activation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStorageConfig {
    pub implementation_id: String,
    #[serde(default)]
    pub properties: Settings,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

/// Complete registry configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryConfig {
    #[serde(default)]
    pub ha_config: Option<HaConfig>,
    pub modules: Vec<ModuleDescriptor>,
    pub storage_provider: StorageProviderConfig,
    #[serde(default)]
    pub file_storage: Option<FileStorageConfig>,
    #[serde(default = "default_server_url")]
    pub server_url: String,
}

impl RegistryConfig {
    /// Minimal configuration backed by the given storage provider.
    pub fn new(storage_provider_id: impl Into<String>) -> Self {
        Self {
            ha_config: None,
            modules: Vec::new(),
            storage_provider: StorageProviderConfig {
                implementation_id: storage_provider_id.into(),
                properties: Settings::new(),
            },
            file_storage: None,
            server_url: default_server_url(),
        }
    }

    /// Parse a JSON document.
    pub fn from_json_str(raw: &str) -> Result<Self, BootstrapError> {
        serde_json::from_str(raw)
            .map_err(|e| BootstrapError::Configuration(format!("invalid document: {e}")))
    }

    /// Read and parse a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BootstrapError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            BootstrapError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&raw)
    }

    /// Check required fields and produce the ordered module store.
    pub fn validate(&self) -> Result<ModuleDescriptorStore, BootstrapError> {
        if self.storage_provider.implementation_id.trim().is_empty() {
            return Err(BootstrapError::Configuration(
                "storageProvider.implementationId is required".to_string(),
            ));
        }
        if let Some(ha) = &self.ha_config {
            if ha.implementation_id.trim().is_empty() {
                return Err(BootstrapError::Configuration(
                    "haConfig.implementationId is required when haConfig is present".to_string(),
                ));
            }
        }
        if let Some(fs) = &self.file_storage {
            if fs.implementation_id.trim().is_empty() {
                return Err(BootstrapError::Configuration(
                    "fileStorage.implementationId is required when fileStorage is present"
                        .to_string(),
                ));
            }
        }
        ModuleDescriptorStore::new(self.modules.clone())
    }
}

/// Validated, ordered and immutable list of module descriptors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleDescriptorStore {
    descriptors: Vec<ModuleDescriptor>,
}

impl ModuleDescriptorStore {
    pub fn new(descriptors: Vec<ModuleDescriptor>) -> Result<Self, BootstrapError> {
        let mut seen = HashSet::new();
        for (index, descriptor) in descriptors.iter().enumerate() {
            if descriptor.name.trim().is_empty() {
                return Err(BootstrapError::Configuration(format!(
                    "modules[{index}].name is required"
                )));
            }
            if descriptor.implementation_id.trim().is_empty() {
                return Err(BootstrapError::Configuration(format!(
                    "modules[{index}] ('{}') has no implementationId",
                    descriptor.name
                )));
            }
            if !seen.insert(descriptor.name.as_str()) {
                return Err(BootstrapError::Configuration(format!(
                    "duplicate module name '{}'",
                    descriptor.name
                )));
            }
        }
        Ok(Self { descriptors })
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "modules": [
            { "name": "schemas", "implementationId": "SchemaModule", "config": { "cache": 10 } },
            { "name": "serdes", "implementationId": "SerdeModule" }
        ],
        "storageProvider": { "implementationId": "in-memory", "properties": {} }
    }"#;

    #[test]
    fn test_parse_defaults() {
        let config = RegistryConfig::from_json_str(SAMPLE).unwrap();
        assert!(config.ha_config.is_none());
        assert!(config.file_storage.is_none());
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert_eq!(config.modules.len(), 2);
        // Missing config becomes an empty mapping
        assert!(config.modules[1].config.is_empty());
        assert_eq!(config.modules[0].config["cache"], 10);
    }

    #[test]
    fn test_validate_preserves_order() {
        let config = RegistryConfig::from_json_str(SAMPLE).unwrap();
        let store = config.validate().unwrap();
        let names: Vec<_> = store.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["schemas", "serdes"]);
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        let mut config = RegistryConfig::new("in-memory");
        config.modules.push(ModuleDescriptor::new("a", "SchemaModule"));
        config.modules.push(ModuleDescriptor::new("a", "SerdeModule"));
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }

    #[test]
    fn test_validate_rejects_empty_ha_implementation() {
        let mut config = RegistryConfig::new("in-memory");
        config.ha_config = Some(HaConfig {
            implementation_id: " ".to_string(),
            config: Settings::new(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_storage_provider_is_configuration_error() {
        let err = RegistryConfig::from_json_str(r#"{ "modules": [] }"#).unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }

    #[test]
    fn test_missing_modules_is_configuration_error() {
        let err = RegistryConfig::from_json_str(
            r#"{ "storageProvider": { "implementationId": "in-memory", "properties": {} } }"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), "configuration");
        assert!(err.to_string().contains("modules"));

        // An explicitly empty list is still a valid document
        let config = RegistryConfig::from_json_str(
            r#"{ "modules": [], "storageProvider": { "implementationId": "in-memory" } }"#,
        )
        .unwrap();
        assert!(config.modules.is_empty());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = RegistryConfig::from_file(file.path()).unwrap();
        assert_eq!(config.storage_provider.implementation_id, "in-memory");
    }
}
