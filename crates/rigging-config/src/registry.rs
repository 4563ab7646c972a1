//! Layered property lookup and the fail-fast configuration registry.

use std::collections::BTreeMap;
use std::fmt;

use secrecy::SecretString;

use crate::credentials::CredentialMaterial;
use crate::error::ConfigError;
use crate::key::ConfigurationKey;

/// Two-layer property store: invocation overrides shadow project properties.
///
/// Blank values are treated as absent in both layers.
#[derive(Clone, Default)]
pub struct PropertyStore {
    overrides: BTreeMap<String, String>,
    project: BTreeMap<String, String>,
}

impl PropertyStore {
    /// Create a store holding only project-level properties.
    pub fn new(project: BTreeMap<String, String>) -> Self {
        Self {
            overrides: BTreeMap::new(),
            project,
        }
    }

    /// Add invocation-time overrides on top of the project layer.
    pub fn with_overrides(mut self, overrides: BTreeMap<String, String>) -> Self {
        self.overrides.extend(overrides);
        self
    }

    /// Parse a `key=value` override as given on the command line.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidOverride` if there is no `=` or the key is blank.
    pub fn parse_override(raw: &str) -> Result<(String, String), ConfigError> {
        let Some((key, value)) = raw.split_once('=') else {
            return Err(ConfigError::InvalidOverride {
                raw: raw.to_owned(),
            });
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(ConfigError::InvalidOverride {
                raw: raw.to_owned(),
            });
        }
        Ok((key.to_owned(), value.to_owned()))
    }

    /// Look up a raw property, overrides first. A blank override falls
    /// through to the project layer.
    pub fn get(&self, property: &str) -> Option<&str> {
        non_blank(&self.overrides, property).or_else(|| non_blank(&self.project, property))
    }
}

fn non_blank<'m>(layer: &'m BTreeMap<String, String>, property: &str) -> Option<&'m str> {
    layer
        .get(property)
        .map(String::as_str)
        .filter(|v| !v.trim().is_empty())
}

impl fmt::Debug for PropertyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redacted(map: &BTreeMap<String, String>) -> BTreeMap<&str, &str> {
            map.iter()
                .map(|(k, v)| {
                    let secret = ConfigurationKey::from_property(k).is_some_and(ConfigurationKey::is_secret);
                    (k.as_str(), if secret { "[REDACTED]" } else { v.as_str() })
                })
                .collect()
        }
        f.debug_struct("PropertyStore")
            .field("overrides", &redacted(&self.overrides))
            .field("project", &redacted(&self.project))
            .finish()
    }
}

/// Resolves [`ConfigurationKey`]s against a [`PropertyStore`].
///
/// Lookup order is fixed: overrides, then project properties, then the
/// key's cosmetic default if it has one. There is no environment layer.
#[derive(Debug, Clone, Copy)]
pub struct ConfigurationRegistry<'a> {
    store: &'a PropertyStore,
}

impl<'a> ConfigurationRegistry<'a> {
    pub fn new(store: &'a PropertyStore) -> Self {
        Self { store }
    }

    /// Resolve a key to its value.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingConfiguration` if no layer supplies a value
    /// and the key has no default.
    pub fn resolve(&self, key: ConfigurationKey) -> Result<&'a str, ConfigError> {
        self.lookup(key).ok_or_else(|| ConfigError::missing(key))
    }

    /// Resolve a key that is allowed to be absent.
    pub fn resolve_optional(&self, key: ConfigurationKey) -> Option<&'a str> {
        self.lookup(key)
    }

    /// Check that every key resolves, reporting all missing keys at once.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingConfiguration` listing each unresolvable key.
    pub fn require(&self, keys: &[ConfigurationKey]) -> Result<(), ConfigError> {
        let missing: Vec<ConfigurationKey> = keys
            .iter()
            .copied()
            .filter(|k| self.lookup(*k).is_none())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingConfiguration { keys: missing })
        }
    }

    /// Resolve the repository username and password.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingConfiguration` naming whichever of the two is absent.
    pub fn resolve_credentials(&self) -> Result<CredentialMaterial, ConfigError> {
        self.require(&[
            ConfigurationKey::RepositoryUsername,
            ConfigurationKey::RepositoryPassword,
        ])?;
        let username = self.resolve(ConfigurationKey::RepositoryUsername)?;
        let password = self.resolve(ConfigurationKey::RepositoryPassword)?;
        Ok(CredentialMaterial::new(
            username,
            SecretString::from(password.to_owned()),
        ))
    }

    fn lookup(&self, key: ConfigurationKey) -> Option<&'a str> {
        self.store.get(key.property()).or(key.default_value())
    }
}
