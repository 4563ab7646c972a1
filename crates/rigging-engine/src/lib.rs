#![forbid(unsafe_code)]
//! Capability composition: resolve, wire, and install build capabilities.

pub mod capability;
pub mod composer;
pub mod error;

pub use capability::{
    CapabilityApplier, CapabilityConfig, CapabilityHandle, ContainerImageConfig,
    DocumentationConfig, PublicationConfig, QualityGateConfig, ReleaseConfig,
};
pub use composer::{Composition, PluginComposer, DEFAULT_ORDER};
pub use error::EngineError;
pub use rigging_graph::CapabilityId;
