//! Model registry
//!
//! Named, versioned model artifacts. A registration records the artifact
//! URI produced by the tracking layer under a model name; versions count up
//! from 1.
//!
//! # Example
//!
//! ```
//! use tasador::registry::{InMemoryRegistry, ModelRegistry};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = InMemoryRegistry::new();
//! let v1 = registry.register_model("housing-prices-estimator-LR", "mem://run-1/model.json")?;
//! assert_eq!(v1.version, 1);
//! let v2 = registry.register_model("housing-prices-estimator-LR", "mem://run-2/model.json")?;
//! assert_eq!(v2.version, 2);
//! # Ok(())
//! # }
//! ```

mod log;
mod signature;

pub use log::{log_model, LogError, ModelArtifact};
pub use signature::{infer_signature, ColumnSpec, ModelSignature};

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("registry error: {0}")]
    Internal(String),
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// One registered version of a named model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelVersion {
    pub name: String,
    pub version: u32,
    pub artifact_uri: String,
    pub created_at: DateTime<Utc>,
}

/// Registry of named model versions
pub trait ModelRegistry {
    /// Register a new version under `name`; versions count up from 1.
    fn register_model(&mut self, name: &str, artifact_uri: &str) -> Result<ModelVersion>;

    /// Latest version of a model
    fn get_latest(&self, name: &str) -> Result<ModelVersion>;

    /// All versions of a model, oldest first
    fn list_versions(&self, name: &str) -> Result<Vec<ModelVersion>>;
}

/// In-memory registry
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    models: HashMap<String, Vec<ModelVersion>>,
}

impl InMemoryRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModelRegistry for InMemoryRegistry {
    fn register_model(&mut self, name: &str, artifact_uri: &str) -> Result<ModelVersion> {
        let versions = self.models.entry(name.to_string()).or_default();
        let version = ModelVersion {
            name: name.to_string(),
            version: versions.len() as u32 + 1,
            artifact_uri: artifact_uri.to_string(),
            created_at: Utc::now(),
        };
        versions.push(version.clone());
        Ok(version)
    }

    fn get_latest(&self, name: &str) -> Result<ModelVersion> {
        self.models
            .get(name)
            .and_then(|v| v.last())
            .cloned()
            .ok_or_else(|| RegistryError::ModelNotFound(name.to_string()))
    }

    fn list_versions(&self, name: &str) -> Result<Vec<ModelVersion>> {
        self.models
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::ModelNotFound(name.to_string()))
    }
}

/// JSON file registry: one `{name}.json` per model holding its versions.
#[derive(Debug)]
pub struct JsonFileRegistry {
    dir: PathBuf,
}

impl JsonFileRegistry {
    /// Create a registry rooted at `dir`. The directory is created lazily
    /// on first registration.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn model_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    fn read_versions(&self, name: &str) -> Result<Vec<ModelVersion>> {
        let path = self.model_path(name);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let json = fs::read_to_string(&path)
            .map_err(|e| RegistryError::Internal(format!("read {}: {e}", path.display())))?;
        serde_json::from_str(&json)
            .map_err(|e| RegistryError::Internal(format!("parse {}: {e}", path.display())))
    }
}

impl ModelRegistry for JsonFileRegistry {
    fn register_model(&mut self, name: &str, artifact_uri: &str) -> Result<ModelVersion> {
        let mut versions = self.read_versions(name)?;
        let version = ModelVersion {
            name: name.to_string(),
            version: versions.len() as u32 + 1,
            artifact_uri: artifact_uri.to_string(),
            created_at: Utc::now(),
        };
        versions.push(version.clone());

        fs::create_dir_all(&self.dir)
            .map_err(|e| RegistryError::Internal(format!("create registry dir: {e}")))?;
        let json = serde_json::to_string_pretty(&versions)
            .map_err(|e| RegistryError::Internal(format!("serialize versions: {e}")))?;
        fs::write(self.model_path(name), json)
            .map_err(|e| RegistryError::Internal(format!("write registry file: {e}")))?;
        Ok(version)
    }

    fn get_latest(&self, name: &str) -> Result<ModelVersion> {
        self.read_versions(name)?
            .pop()
            .ok_or_else(|| RegistryError::ModelNotFound(name.to_string()))
    }

    fn list_versions(&self, name: &str) -> Result<Vec<ModelVersion>> {
        let versions = self.read_versions(name)?;
        if versions.is_empty() {
            return Err(RegistryError::ModelNotFound(name.to_string()));
        }
        Ok(versions)
    }
}
