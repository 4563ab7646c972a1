//! Applies every capability in a fixed order and installs the result.
//!
//! # Phases
//! 1. Resolve the config of every capability. Missing keys from all
//!    capabilities are reported together; nothing is staged yet.
//! 2. Stage each capability's tasks and edges, in order.
//! 3. Validate the staged graph (full cycle check, topological order).
//! 4. Install the graph into the host in one call.
//!
//! The host is only touched in phase 4, so a failure anywhere earlier
//! leaves it exactly as it was.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, info};

use rigging_config::{ConfigError, ConfigurationKey, ProjectContext};
use rigging_graph::{CapabilityId, GraphError, HostEngine, TaskGraph, TaskGraphBuilder, TaskOrigin};

use crate::capability::{CapabilityConfig, CapabilityHandle};
use crate::error::EngineError;

/// The order capabilities are applied in. Later capabilities may wire
/// against tasks created by earlier ones.
pub const DEFAULT_ORDER: [CapabilityId; 5] = [
    CapabilityId::Documentation,
    CapabilityId::QualityGate,
    CapabilityId::Publication,
    CapabilityId::ContainerImage,
    CapabilityId::Release,
];

/// Applies capabilities to a project. A composer composes exactly once.
#[derive(Debug)]
pub struct PluginComposer {
    order: Vec<CapabilityId>,
    applied: BTreeSet<CapabilityId>,
}

impl Default for PluginComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginComposer {
    pub fn new() -> Self {
        Self::with_order(DEFAULT_ORDER.to_vec())
    }

    /// A composer with a custom capability order.
    pub fn with_order(order: Vec<CapabilityId>) -> Self {
        Self {
            order,
            applied: BTreeSet::new(),
        }
    }

    pub fn order(&self) -> &[CapabilityId] {
        &self.order
    }

    /// Apply every capability to `context` and install the tasks into `host`.
    ///
    /// Either all capabilities are wired and installed, or the host is left
    /// untouched.
    ///
    /// # Errors
    /// - `EngineError::EmptyOrder` if the order names no capability
    /// - `EngineError::DuplicateApplication` if this composer already ran, the
    ///   order names a capability twice, or the host already has its tasks
    /// - `EngineError::Config` if any required key is missing
    /// - `EngineError::Graph` if a referenced task does not exist
    /// - `EngineError::CycleDetected` if the order produces a cyclic graph
    pub fn compose(
        &mut self,
        context: &ProjectContext,
        host: &mut dyn HostEngine,
    ) -> Result<Composition, EngineError> {
        self.check_order()?;

        info!(
            project = context.name(),
            version = context.version(),
            capabilities = self.order.len(),
            "composing capabilities"
        );

        let configs = self.resolve_all(context)?;

        let mut builder = TaskGraphBuilder::new(&*host);
        let mut handles = Vec::with_capacity(configs.len());
        for config in &configs {
            let handle = config.apply(&mut builder)?;
            debug!(
                capability = %handle.capability,
                tasks = ?handle.task_names(),
                "applied capability"
            );
            handles.push(handle);
        }

        let graph = builder.finish()?;

        host.install(&graph).map_err(|e| match e {
            GraphError::DuplicateTask { name } => duplicate_for_task(&graph, &name),
            other => EngineError::from(other),
        })?;

        self.applied.extend(self.order.iter().copied());
        info!(
            tasks = graph.new_tasks().len(),
            edges = graph.edges().len(),
            "composition complete"
        );

        Ok(Composition {
            project: context.name().to_owned(),
            version: context.version().to_owned(),
            configs,
            handles,
            graph,
        })
    }

    /// Reject an empty order, a composer that already ran, or an order that
    /// repeats a capability.
    fn check_order(&self) -> Result<(), EngineError> {
        if self.order.is_empty() {
            return Err(EngineError::EmptyOrder);
        }
        let mut seen = BTreeSet::new();
        for id in &self.order {
            if self.applied.contains(id) || !seen.insert(*id) {
                return Err(EngineError::DuplicateApplication { capability: *id });
            }
        }
        Ok(())
    }

    /// Resolve every capability, merging missing-key errors into one.
    fn resolve_all(&self, context: &ProjectContext) -> Result<Vec<CapabilityConfig>, EngineError> {
        let mut configs = Vec::with_capacity(self.order.len());
        let mut missing: Vec<ConfigurationKey> = Vec::new();

        for id in &self.order {
            match CapabilityConfig::resolve(*id, context) {
                Ok(config) => configs.push(config),
                Err(EngineError::Config(ConfigError::MissingConfiguration { keys })) => {
                    for key in keys {
                        if !missing.contains(&key) {
                            missing.push(key);
                        }
                    }
                }
                Err(other) => return Err(other),
            }
        }

        if missing.is_empty() {
            Ok(configs)
        } else {
            Err(ConfigError::MissingConfiguration { keys: missing }.into())
        }
    }
}

fn duplicate_for_task(graph: &TaskGraph, name: &str) -> EngineError {
    let origin = graph
        .new_tasks()
        .iter()
        .find(|t| t.name.as_str() == name)
        .map(|t| t.origin);
    match origin {
        Some(TaskOrigin::Capability(capability)) => EngineError::DuplicateApplication { capability },
        _ => EngineError::Graph(GraphError::DuplicateTask {
            name: name.to_owned(),
        }),
    }
}

/// The outcome of one successful composition.
#[derive(Debug, Clone, Serialize)]
pub struct Composition {
    pub project: String,
    pub version: String,
    pub configs: Vec<CapabilityConfig>,
    pub handles: Vec<CapabilityHandle>,
    pub graph: TaskGraph,
}

impl Composition {
    pub fn config(&self, id: CapabilityId) -> Option<&CapabilityConfig> {
        self.configs.iter().find(|c| c.id() == id)
    }

    pub fn handle(&self, id: CapabilityId) -> Option<&CapabilityHandle> {
        self.handles.iter().find(|h| h.capability == id)
    }
}
