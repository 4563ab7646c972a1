//! Error types for rigging-graph.

/// Errors produced while staging or installing the task graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A task name is not acceptable to the host engine.
    #[error("invalid task name \"{name}\": only ASCII letters, digits, `-`, `_` and `:` are allowed")]
    InvalidTaskName { name: String },

    /// An edge or lookup referenced a task that neither the host nor an
    /// earlier capability registered.
    #[error("unknown task `{name}` — it must be registered before it can be wired")]
    UnknownTask { name: String },

    /// A task with this name is already registered.
    #[error("task `{name}` is already registered")]
    DuplicateTask { name: String },

    /// Adding an ordering constraint would make the graph cyclic.
    #[error("task ordering cycle: {cycle}")]
    CycleDetected { cycle: String },
}
