//! Task identity: validated names and the capability each task came from.

use std::fmt;

use serde::Serialize;

use crate::error::GraphError;

/// One of the five capabilities that contribute tasks to the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CapabilityId {
    Documentation,
    QualityGate,
    Publication,
    ContainerImage,
    Release,
}

impl CapabilityId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Documentation => "documentation",
            Self::QualityGate => "quality-gate",
            Self::Publication => "publication",
            Self::ContainerImage => "container-image",
            Self::Release => "release",
        }
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task name accepted by the host engine.
///
/// Non-empty, made of ASCII alphanumerics, `-`, `_` and `:`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TaskName(String);

impl TaskName {
    /// Validate and wrap a task name.
    ///
    /// # Errors
    /// Returns `GraphError::InvalidTaskName` if the name is empty or contains
    /// characters outside the allowed set.
    pub fn new(name: &str) -> Result<Self, GraphError> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':');
        if valid {
            Ok(Self(name.to_owned()))
        } else {
            Err(GraphError::InvalidTaskName {
                name: name.to_owned(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who owns a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "capability")]
pub enum TaskOrigin {
    /// Provided by the host build engine before composition.
    Host,
    /// Registered by a capability during composition.
    Capability(CapabilityId),
}

impl fmt::Display for TaskOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host => f.write_str("host"),
            Self::Capability(id) => write!(f, "{id}"),
        }
    }
}

/// A reference to a task in the host engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TaskNode {
    pub name: TaskName,
    pub origin: TaskOrigin,
}

impl fmt::Display for TaskNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.as_str())
    }
}
