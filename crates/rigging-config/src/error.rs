//! Error types for rigging-config.

use crate::key::ConfigurationKey;

/// Errors produced while loading or resolving project configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// One or more required keys have no value in any property layer.
    #[error("missing configuration: {} — set {} in rigging.toml [properties] or pass -P", describe(.keys), plural(.keys))]
    MissingConfiguration { keys: Vec<ConfigurationKey> },

    /// An invocation override was not of the form `key=value`.
    #[error("invalid property override \"{raw}\": expected key=value")]
    InvalidOverride { raw: String },

    /// The manifest could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    /// The manifest is not valid TOML or has the wrong shape.
    #[error("invalid rigging.toml at {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    /// A required `[project]` field is empty.
    #[error("invalid rigging.toml: project {field} must not be empty")]
    EmptyProjectField { field: &'static str },
}

impl ConfigError {
    /// Shorthand for a single missing key.
    pub fn missing(key: ConfigurationKey) -> Self {
        Self::MissingConfiguration { keys: vec![key] }
    }
}

fn describe(keys: &[ConfigurationKey]) -> String {
    keys.iter()
        .map(|k| format!("`{}`", k.property()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn plural(keys: &[ConfigurationKey]) -> &'static str {
    if keys.len() == 1 {
        "it"
    } else {
        "them"
    }
}
