//! Staging area for tasks and ordering edges, with cycle rejection.
//!
//! Capabilities register tasks and edges here; nothing reaches the host
//! until the finished [`TaskGraph`] is installed in one step.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::edge::{EdgeKind, TaskEdge};
use crate::error::GraphError;
use crate::host::HostEngine;
use crate::task::{CapabilityId, TaskName, TaskNode, TaskOrigin};

/// Accumulates tasks and edges for one composition pass.
#[derive(Debug)]
pub struct TaskGraphBuilder {
    /// Every known task, host-provided and staged, by name.
    nodes: BTreeMap<TaskName, TaskNode>,
    /// Staged tasks in registration order.
    staged: Vec<TaskNode>,
    edges: Vec<TaskEdge>,
    /// Precedence adjacency: `earlier -> {later}`.
    successors: BTreeMap<TaskName, BTreeSet<TaskName>>,
}

impl TaskGraphBuilder {
    /// Start a builder seeded with the tasks the host already has.
    pub fn new(host: &dyn HostEngine) -> Self {
        let nodes = host
            .tasks()
            .into_iter()
            .map(|node| (node.name.clone(), node))
            .collect();
        Self {
            nodes,
            staged: Vec::new(),
            edges: Vec::new(),
            successors: BTreeMap::new(),
        }
    }

    /// Stage a new task owned by `origin`.
    ///
    /// # Errors
    /// Returns an error if the name is invalid or already registered, either
    /// by the host or by an earlier capability.
    pub fn register(&mut self, name: &str, origin: CapabilityId) -> Result<TaskNode, GraphError> {
        let name = TaskName::new(name)?;
        if self.nodes.contains_key(&name) {
            return Err(GraphError::DuplicateTask {
                name: name.to_string(),
            });
        }
        let node = TaskNode {
            name: name.clone(),
            origin: TaskOrigin::Capability(origin),
        };
        debug!(task = %name, capability = %origin, "registered task");
        self.nodes.insert(name, node.clone());
        self.staged.push(node.clone());
        Ok(node)
    }

    /// Look up a known task by name.
    ///
    /// # Errors
    /// Returns `GraphError::UnknownTask` if no such task exists yet.
    pub fn node(&self, name: &str) -> Result<TaskNode, GraphError> {
        TaskName::new(name)
            .ok()
            .and_then(|n| self.nodes.get(&n).cloned())
            .ok_or_else(|| GraphError::UnknownTask {
                name: name.to_owned(),
            })
    }

    /// Whether a task with this name is known.
    pub fn contains(&self, name: &str) -> bool {
        self.node(name).is_ok()
    }

    /// Record an ordering constraint. Adding an identical edge twice is a no-op.
    ///
    /// # Errors
    /// Returns `GraphError::UnknownTask` if either endpoint is unknown, or
    /// `GraphError::CycleDetected` if the edge would close a cycle.
    pub fn add_edge(
        &mut self,
        from: &TaskNode,
        to: &TaskNode,
        kind: EdgeKind,
    ) -> Result<(), GraphError> {
        for endpoint in [from, to] {
            if !self.nodes.contains_key(&endpoint.name) {
                return Err(GraphError::UnknownTask {
                    name: endpoint.name.to_string(),
                });
            }
        }

        let edge = TaskEdge {
            from: from.clone(),
            to: to.clone(),
            kind,
        };
        if self.edges.contains(&edge) {
            return Ok(());
        }

        let (earlier, later) = edge.precedence();
        if let Some(path) = self.path(later, earlier) {
            let mut cycle: Vec<String> = vec![earlier.to_string()];
            cycle.extend(path.iter().map(ToString::to_string));
            return Err(GraphError::CycleDetected {
                cycle: cycle.join(" -> "),
            });
        }

        debug!(%edge, "added edge");
        self.successors
            .entry(earlier.clone())
            .or_default()
            .insert(later.clone());
        self.edges.push(edge);
        Ok(())
    }

    /// Find a precedence path `start ->* goal`, inclusive of both ends.
    fn path(&self, start: &TaskName, goal: &TaskName) -> Option<Vec<TaskName>> {
        let mut stack = vec![(start.clone(), vec![start.clone()])];
        let mut seen = BTreeSet::new();
        while let Some((current, trail)) = stack.pop() {
            if current == *goal {
                return Some(trail);
            }
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(next) = self.successors.get(&current) {
                for n in next.iter().rev() {
                    let mut extended = trail.clone();
                    extended.push(n.clone());
                    stack.push((n.clone(), extended));
                }
            }
        }
        None
    }

    /// Validate the whole graph and fix a topological execution order.
    ///
    /// # Errors
    /// Returns `GraphError::CycleDetected` if the staged edges form a cycle.
    pub fn finish(self) -> Result<TaskGraph, GraphError> {
        let order = topological_order(&self.nodes, &self.successors)?;
        Ok(TaskGraph {
            new_tasks: self.staged,
            edges: self.edges,
            order,
        })
    }
}

/// Color states for the depth-first traversal.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Three-color DFS over the precedence relation; earliest tasks come first.
fn topological_order(
    nodes: &BTreeMap<TaskName, TaskNode>,
    successors: &BTreeMap<TaskName, BTreeSet<TaskName>>,
) -> Result<Vec<TaskName>, GraphError> {
    let mut marks: HashMap<TaskName, Mark> = HashMap::new();
    let mut post: Vec<TaskName> = Vec::with_capacity(nodes.len());
    let mut stack: Vec<TaskName> = Vec::new();

    // Visit in reverse name order so the reversed post-order reads alphabetically
    // among unconstrained tasks.
    for name in nodes.keys().rev() {
        visit(name, successors, &mut marks, &mut post, &mut stack)?;
    }

    post.reverse();
    Ok(post)
}

fn visit(
    name: &TaskName,
    successors: &BTreeMap<TaskName, BTreeSet<TaskName>>,
    marks: &mut HashMap<TaskName, Mark>,
    post: &mut Vec<TaskName>,
    stack: &mut Vec<TaskName>,
) -> Result<(), GraphError> {
    match marks.get(name) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::InProgress) => {
            let start = stack.iter().position(|n| n == name).unwrap_or(0);
            let mut cycle: Vec<String> = stack
                .get(start..)
                .unwrap_or(stack.as_slice())
                .iter()
                .map(ToString::to_string)
                .collect();
            cycle.push(name.to_string());
            return Err(GraphError::CycleDetected {
                cycle: cycle.join(" -> "),
            });
        }
        None => {}
    }

    marks.insert(name.clone(), Mark::InProgress);
    stack.push(name.clone());

    if let Some(next) = successors.get(name) {
        for n in next.iter().rev() {
            visit(n, successors, marks, post, stack)?;
        }
    }

    stack.pop();
    marks.insert(name.clone(), Mark::Done);
    post.push(name.clone());
    Ok(())
}

/// A validated, acyclic set of new tasks and edges ready for the host.
#[derive(Debug, Clone, Serialize)]
pub struct TaskGraph {
    new_tasks: Vec<TaskNode>,
    edges: Vec<TaskEdge>,
    order: Vec<TaskName>,
}

impl TaskGraph {
    /// Tasks registered during composition, in registration order.
    pub fn new_tasks(&self) -> &[TaskNode] {
        &self.new_tasks
    }

    pub fn edges(&self) -> &[TaskEdge] {
        &self.edges
    }

    /// Every task (host and new) in an order that satisfies all edges.
    pub fn order(&self) -> &[TaskName] {
        &self.order
    }

    /// Whether an edge with exactly these endpoints and kind was recorded.
    pub fn has_edge(&self, from: &str, to: &str, kind: EdgeKind) -> bool {
        self.edges
            .iter()
            .any(|e| e.kind == kind && e.from.name.as_str() == from && e.to.name.as_str() == to)
    }

    /// Position of a task in the execution order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.order.iter().position(|n| n.as_str() == name)
    }
}
