#![forbid(unsafe_code)]
//! Task identity, ordering edges, and the staged task graph handed to the host.

pub mod builder;
pub mod edge;
pub mod error;
pub mod host;
pub mod task;

pub use builder::{TaskGraph, TaskGraphBuilder};
pub use edge::{EdgeKind, TaskEdge};
pub use error::GraphError;
pub use host::{HostEngine, InMemoryHost, JAR_TASK, TEST_TASK};
pub use task::{CapabilityId, TaskName, TaskNode, TaskOrigin};
