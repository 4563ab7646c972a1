//! The five capabilities and the two-phase contract they share.
//!
//! Each capability first resolves an immutable config from the project
//! context (no side effects), then registers its tasks and edges against
//! the staged graph. The composer resolves every capability before it
//! registers any of them.

pub mod container;
pub mod documentation;
pub mod publication;
pub mod quality;
pub mod release;

use serde::Serialize;

use rigging_config::ProjectContext;
use rigging_graph::{CapabilityId, GraphError, TaskGraphBuilder, TaskNode, TaskOrigin};

use crate::error::EngineError;

pub use container::ContainerImageConfig;
pub use documentation::DocumentationConfig;
pub use publication::PublicationConfig;
pub use quality::QualityGateConfig;
pub use release::ReleaseConfig;

/// Configures one external capability.
pub trait CapabilityApplier: Sized {
    /// The capability this applier configures.
    const ID: CapabilityId;

    /// Resolve every value the capability needs.
    ///
    /// # Errors
    /// Returns `EngineError::Config` if a required key is missing.
    fn resolve(context: &ProjectContext) -> Result<Self, EngineError>;

    /// Register the capability's tasks and ordering edges.
    ///
    /// Returns the tasks it created.
    ///
    /// # Errors
    /// Returns an error if a task name collides, a referenced task is
    /// unknown, or an edge would close a cycle.
    fn register(&self, graph: &mut TaskGraphBuilder) -> Result<Vec<TaskNode>, GraphError>;
}

/// The resolved configuration of one capability.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "capability", rename_all = "kebab-case")]
pub enum CapabilityConfig {
    Documentation(DocumentationConfig),
    QualityGate(QualityGateConfig),
    Publication(PublicationConfig),
    ContainerImage(ContainerImageConfig),
    Release(ReleaseConfig),
}

impl CapabilityConfig {
    /// Resolve the config for `id`.
    ///
    /// # Errors
    /// Returns `EngineError::Config` if a required key is missing.
    pub fn resolve(id: CapabilityId, context: &ProjectContext) -> Result<Self, EngineError> {
        Ok(match id {
            CapabilityId::Documentation => Self::Documentation(DocumentationConfig::resolve(context)?),
            CapabilityId::QualityGate => Self::QualityGate(QualityGateConfig::resolve(context)?),
            CapabilityId::Publication => Self::Publication(PublicationConfig::resolve(context)?),
            CapabilityId::ContainerImage => {
                Self::ContainerImage(ContainerImageConfig::resolve(context)?)
            }
            CapabilityId::Release => Self::Release(ReleaseConfig::resolve(context)?),
        })
    }

    pub fn id(&self) -> CapabilityId {
        match self {
            Self::Documentation(_) => DocumentationConfig::ID,
            Self::QualityGate(_) => QualityGateConfig::ID,
            Self::Publication(_) => PublicationConfig::ID,
            Self::ContainerImage(_) => ContainerImageConfig::ID,
            Self::Release(_) => ReleaseConfig::ID,
        }
    }

    /// Register this capability's tasks and return a handle to them.
    ///
    /// Colliding with a task an earlier capability created means the
    /// capability is already present: `EngineError::DuplicateApplication`.
    /// Colliding with a host-native task stays `GraphError::DuplicateTask`.
    ///
    /// # Errors
    /// Returns an error if registration or wiring fails.
    pub fn apply(&self, graph: &mut TaskGraphBuilder) -> Result<CapabilityHandle, EngineError> {
        let id = self.id();
        let tasks = match self {
            Self::Documentation(c) => c.register(graph),
            Self::QualityGate(c) => c.register(graph),
            Self::Publication(c) => c.register(graph),
            Self::ContainerImage(c) => c.register(graph),
            Self::Release(c) => c.register(graph),
        }
        .map_err(|e| match e {
            GraphError::DuplicateTask { ref name }
                if !matches!(graph.node(name), Ok(TaskNode { origin: TaskOrigin::Host, .. })) =>
            {
                EngineError::DuplicateApplication { capability: id }
            }
            other => EngineError::from(other),
        })?;
        Ok(CapabilityHandle {
            capability: id,
            tasks,
        })
    }
}

/// The tasks one capability contributed to the graph.
#[derive(Debug, Clone, Serialize)]
pub struct CapabilityHandle {
    pub capability: CapabilityId,
    pub tasks: Vec<TaskNode>,
}

impl CapabilityHandle {
    pub fn task_names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name.as_str()).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod test_support {
    use std::collections::BTreeMap;

    use rigging_config::{ProjectContext, PropertyStore};

    /// Every required property, with values that exercise each capability.
    pub(crate) const FULL_PROPERTIES: [(&str, &str); 8] = [
        ("nexus.host", "nexus.example.com"),
        ("nexus.port.jar", "8443"),
        ("nexus.port.image", "5000"),
        ("nexus.user", "deployer"),
        ("nexus.password", "hunter2"),
        ("release.git.remote", "origin"),
        ("bootstrap.location.cloud-server", "file:/config/server/"),
        ("bootstrap.location.cloud-client", "file:/config/client/"),
    ];

    pub(crate) fn context(name: &str, version: &str) -> ProjectContext {
        context_with(name, version, &FULL_PROPERTIES)
    }

    pub(crate) fn context_with(name: &str, version: &str, pairs: &[(&str, &str)]) -> ProjectContext {
        let props: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        ProjectContext::new(name, version, PropertyStore::new(props))
            .unwrap()
    }

    pub(crate) fn context_without(name: &str, version: &str, omit: &str) -> ProjectContext {
        let pairs: Vec<(&str, &str)> = FULL_PROPERTIES
            .iter()
            .copied()
            .filter(|(k, _)| *k != omit)
            .collect();
        context_with(name, version, &pairs)
    }
}
