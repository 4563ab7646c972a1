//! The per-invocation project record every capability reads from.

use std::collections::BTreeMap;

use crate::error::ConfigError;
use crate::manifest::Manifest;
use crate::registry::{ConfigurationRegistry, PropertyStore};

/// Immutable snapshot of the consuming project for one composition pass.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    name: String,
    version: String,
    properties: PropertyStore,
}

impl ProjectContext {
    /// Name and version feed the image reference and the release tag, so
    /// neither may be blank.
    ///
    /// # Errors
    /// Returns `ConfigError::EmptyProjectField` for a blank name or version.
    pub fn new(name: &str, version: &str, properties: PropertyStore) -> Result<Self, ConfigError> {
        if name.trim().is_empty() {
            return Err(ConfigError::EmptyProjectField { field: "name" });
        }
        if version.trim().is_empty() {
            return Err(ConfigError::EmptyProjectField { field: "version" });
        }
        Ok(Self {
            name: name.to_owned(),
            version: version.to_owned(),
            properties,
        })
    }

    /// Build a context from a parsed manifest plus invocation overrides.
    ///
    /// # Errors
    /// Returns `ConfigError::EmptyProjectField` for a blank name or version.
    pub fn from_manifest(
        manifest: Manifest,
        overrides: BTreeMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let properties = PropertyStore::new(manifest.properties).with_overrides(overrides);
        Self::new(&manifest.project.name, &manifest.project.version, properties)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// A registry view over this project's properties.
    pub fn registry(&self) -> ConfigurationRegistry<'_> {
        ConfigurationRegistry::new(&self.properties)
    }
}
