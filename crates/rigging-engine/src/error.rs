//! Error types for rigging-engine.

use rigging_config::ConfigError;
use rigging_graph::{CapabilityId, GraphError};

/// Errors produced by composition. Any of them aborts the whole pass.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration could not be resolved.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// A task could not be staged or wired.
    #[error("{0}")]
    Graph(GraphError),

    /// A capability was applied to a project that already has it.
    #[error("capability `{capability}` has already been applied to this project")]
    DuplicateApplication { capability: CapabilityId },

    /// The composer was given no capabilities to apply.
    #[error("no capabilities to compose")]
    EmptyOrder,

    /// The assembled task graph contains a cycle.
    #[error("task ordering cycle: {cycle} — the capability order is inconsistent")]
    CycleDetected { cycle: String },
}

impl From<GraphError> for EngineError {
    fn from(e: GraphError) -> Self {
        match e {
            GraphError::CycleDetected { cycle } => Self::CycleDetected { cycle },
            other => Self::Graph(other),
        }
    }
}
