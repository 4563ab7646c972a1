//! Ordering constraints between tasks.

use std::fmt;

use serde::Serialize;

use crate::task::{TaskName, TaskNode};

/// How `from` relates to `to` in a [`TaskEdge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
    /// `from` must run before `to`.
    RunsBefore,
    /// `from` must run after `to`.
    RunsAfter,
    /// `to` runs once `from` finishes, whether or not it succeeded.
    FinalizedBy,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RunsBefore => "runs before",
            Self::RunsAfter => "runs after",
            Self::FinalizedBy => "finalized by",
        })
    }
}

/// A directed ordering constraint between two tasks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TaskEdge {
    pub from: TaskNode,
    pub to: TaskNode,
    pub kind: EdgeKind,
}

impl TaskEdge {
    /// The `(earlier, later)` pair this edge imposes on execution order.
    pub fn precedence(&self) -> (&TaskName, &TaskName) {
        match self.kind {
            EdgeKind::RunsBefore | EdgeKind::FinalizedBy => (&self.from.name, &self.to.name),
            EdgeKind::RunsAfter => (&self.to.name, &self.from.name),
        }
    }
}

impl fmt::Display for TaskEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.from, self.kind, self.to)
    }
}
