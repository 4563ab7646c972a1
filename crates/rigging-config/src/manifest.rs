use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ConfigError;

/// The `rigging.toml` project manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub project: Project,
    /// Project-level properties, keyed by property name (e.g. `nexus.host`).
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Project {
    pub name: String,
    pub version: String,
}

impl Manifest {
    /// Read and parse a `rigging.toml` from the given path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, contains invalid TOML,
    /// or has an empty project name or version.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parse manifest content; `origin` names the source in error messages.
    ///
    /// # Errors
    /// Returns an error if the content is not a valid manifest.
    pub fn parse(content: &str, origin: &str) -> Result<Self, ConfigError> {
        let manifest: Manifest = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_owned(),
            source: e,
        })?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.project.name.trim().is_empty() {
            return Err(ConfigError::EmptyProjectField { field: "name" });
        }
        if self.project.version.trim().is_empty() {
            return Err(ConfigError::EmptyProjectField { field: "version" });
        }
        Ok(())
    }
}
