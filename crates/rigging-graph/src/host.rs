//! The seam between composition and the build engine that executes tasks.

use std::collections::BTreeMap;

use tracing::info;

use crate::builder::TaskGraph;
use crate::edge::TaskEdge;
use crate::error::GraphError;
use crate::task::{TaskName, TaskNode, TaskOrigin};

/// The host task that runs the project's tests.
pub const TEST_TASK: &str = "test";

/// The host task that produces the project's primary build output.
pub const JAR_TASK: &str = "jar";

/// Tasks a plain JVM project exposes before any capability is applied.
pub const JAVA_PROJECT_TASKS: [&str; 6] = [
    "compileJava",
    "processResources",
    "classes",
    JAR_TASK,
    TEST_TASK,
    "build",
];

/// A build engine that owns and executes tasks.
///
/// Composition reads the existing tasks once, then hands over a finished
/// graph in a single [`install`](Self::install) call.
pub trait HostEngine {
    /// Every task currently registered, with the origin that created it.
    fn tasks(&self) -> Vec<TaskNode>;

    /// Register the graph's new tasks and edges.
    ///
    /// Implementations must apply all of it or none of it.
    ///
    /// # Errors
    /// Returns an error if any new task collides with an existing one.
    fn install(&mut self, graph: &TaskGraph) -> Result<(), GraphError>;
}

/// A host engine held entirely in memory, used by the CLI and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHost {
    tasks: BTreeMap<TaskName, TaskOrigin>,
    edges: Vec<TaskEdge>,
    installs: usize,
}

impl InMemoryHost {
    /// A host pre-populated with the tasks of a plain JVM project.
    pub fn java_project() -> Self {
        let tasks = JAVA_PROJECT_TASKS
            .iter()
            .filter_map(|name| TaskName::new(name).ok())
            .map(|name| (name, TaskOrigin::Host))
            .collect();
        Self {
            tasks,
            edges: Vec::new(),
            installs: 0,
        }
    }

    /// A host pre-populated with the given task names.
    ///
    /// # Errors
    /// Returns `GraphError::InvalidTaskName` for any unacceptable name.
    pub fn with_tasks(names: &[&str]) -> Result<Self, GraphError> {
        let tasks = names
            .iter()
            .map(|name| TaskName::new(name).map(|n| (n, TaskOrigin::Host)))
            .collect::<Result<_, _>>()?;
        Ok(Self {
            tasks,
            edges: Vec::new(),
            installs: 0,
        })
    }

    /// Number of successful [`install`](HostEngine::install) calls.
    pub fn mutation_count(&self) -> usize {
        self.installs
    }

    pub fn origin(&self, name: &str) -> Option<TaskOrigin> {
        self.tasks
            .iter()
            .find(|(n, _)| n.as_str() == name)
            .map(|(_, origin)| *origin)
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn edges(&self) -> &[TaskEdge] {
        &self.edges
    }
}

impl HostEngine for InMemoryHost {
    fn tasks(&self) -> Vec<TaskNode> {
        self.tasks
            .iter()
            .map(|(name, origin)| TaskNode {
                name: name.clone(),
                origin: *origin,
            })
            .collect()
    }

    fn install(&mut self, graph: &TaskGraph) -> Result<(), GraphError> {
        if let Some(clash) = graph
            .new_tasks()
            .iter()
            .find(|t| self.tasks.contains_key(&t.name))
        {
            return Err(GraphError::DuplicateTask {
                name: clash.name.to_string(),
            });
        }

        for task in graph.new_tasks() {
            self.tasks.insert(task.name.clone(), task.origin);
        }
        self.edges.extend(graph.edges().iter().cloned());
        self.installs = self.installs.saturating_add(1);
        info!(
            tasks = graph.new_tasks().len(),
            edges = graph.edges().len(),
            "installed task graph"
        );
        Ok(())
    }
}
