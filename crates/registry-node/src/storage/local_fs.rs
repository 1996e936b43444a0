//! Local filesystem file storage.
//!
//! Stores each artefact as a flat file under a configured directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use registry_types::{ComponentError, FileStorage, Settings};
use tracing::{debug, info};

/// Identifier under which the local filesystem provider is registered.
pub const LOCAL_FS_STORAGE_ID: &str = "local-fs";

/// Property naming the upload directory.
pub const DIRECTORY_PROPERTY: &str = "directory";

/// File storage rooted at a single directory.
#[derive(Debug)]
pub struct LocalFileStorage {
    directory: PathBuf,
}

impl Default for LocalFileStorage {
    fn default() -> Self {
        Self {
            directory: std::env::temp_dir().join("registry-uploads"),
        }
    }
}

impl LocalFileStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, ComponentError> {
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(ComponentError::new(format!("invalid file name '{name}'")));
        }
        Ok(self.directory.join(name))
    }
}

impl FileStorage for LocalFileStorage {
    fn init(&mut self, properties: &Settings) -> Result<(), ComponentError> {
        match properties.get(DIRECTORY_PROPERTY) {
            Some(serde_json::Value::String(dir)) => self.directory = PathBuf::from(dir),
            Some(other) => {
                return Err(ComponentError::new(format!(
                    "property '{DIRECTORY_PROPERTY}' must be a string, got {other}"
                )))
            }
            None => {}
        }
        std::fs::create_dir_all(&self.directory).map_err(|e| {
            ComponentError::new(format!("cannot create {}: {e}", self.directory.display()))
        })?;
        info!(directory = %self.directory.display(), "Local file storage initialized");
        Ok(())
    }

    fn upload(&self, name: &str, bytes: &[u8]) -> Result<String, ComponentError> {
        let path = self.path_for(name)?;
        std::fs::write(&path, bytes)
            .map_err(|e| ComponentError::new(format!("cannot write {}: {e}", path.display())))?;
        debug!(path = %path.display(), size = bytes.len(), "File uploaded");
        Ok(path.display().to_string())
    }

    fn download(&self, name: &str) -> Result<Vec<u8>, ComponentError> {
        let path = self.path_for(name)?;
        std::fs::read(&path)
            .map_err(|e| ComponentError::new(format!("cannot read {}: {e}", path.display())))
    }

    fn delete(&self, name: &str) -> Result<bool, ComponentError> {
        let path = self.path_for(name)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ComponentError::new(format!(
                "cannot delete {}: {e}",
                path.display()
            ))),
        }
    }

    fn exists(&self, name: &str) -> bool {
        self.path_for(name).map(|p| p.is_file()).unwrap_or(false)
    }
}
