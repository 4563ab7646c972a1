//! Parse `rigging.toml` and resolve project configuration for capabilities.

pub mod context;
pub mod credentials;
pub mod error;
pub mod key;
pub mod manifest;
pub mod registry;

pub use context::ProjectContext;
pub use credentials::CredentialMaterial;
pub use error::ConfigError;
pub use key::ConfigurationKey;
pub use manifest::Manifest;
pub use registry::{ConfigurationRegistry, PropertyStore};
