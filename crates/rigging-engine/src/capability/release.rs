//! Git-based release tagging.

use serde::Serialize;

use rigging_config::{ConfigurationKey, ProjectContext};
use rigging_graph::{CapabilityId, EdgeKind, GraphError, TaskGraphBuilder, TaskNode};

use super::publication::PUBLISH_TASK;
use super::CapabilityApplier;
use crate::error::EngineError;

/// Task that performs the release.
pub const RELEASE_TASK: &str = "release";

/// `{name}.{version}`.
pub fn tag_name(project_name: &str, version: &str) -> String {
    format!("{project_name}.{version}")
}

#[derive(Debug, Clone, Serialize)]
pub struct ReleaseConfig {
    pub scm_adapter: String,
    /// Releases may only start from this branch.
    pub require_branch: String,
    pub push_to_remote: String,
    /// Branch that receives the post-release version bump commit.
    pub version_bump_branch: String,
    pub tag: String,
}

impl CapabilityApplier for ReleaseConfig {
    const ID: CapabilityId = CapabilityId::Release;

    fn resolve(context: &ProjectContext) -> Result<Self, EngineError> {
        let registry = context.registry();
        Ok(Self {
            scm_adapter: "git".to_owned(),
            require_branch: registry
                .resolve(ConfigurationKey::ReleaseRequireBranch)?
                .to_owned(),
            push_to_remote: registry.resolve(ConfigurationKey::ReleaseGitRemote)?.to_owned(),
            version_bump_branch: registry
                .resolve(ConfigurationKey::ReleaseVersionBranch)?
                .to_owned(),
            tag: tag_name(context.name(), context.version()),
        })
    }

    fn register(&self, graph: &mut TaskGraphBuilder) -> Result<Vec<TaskNode>, GraphError> {
        let publish = graph.node(PUBLISH_TASK)?;

        let release = graph.register(RELEASE_TASK, Self::ID)?;
        graph.add_edge(&release, &publish, EdgeKind::RunsAfter)?;

        Ok(vec![release])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rigging_graph::InMemoryHost;

    use super::*;
    use crate::capability::test_support::{context, context_with, context_without};

    #[test]
    fn tag_interpolates_name_and_version() {
        let config = ReleaseConfig::resolve(&context("svc", "2.3.1")).unwrap();
        assert_eq!(config.tag, "svc.2.3.1");
    }

    #[test]
    fn branch_defaults() {
        let config = ReleaseConfig::resolve(&context("svc", "1.0.0")).unwrap();
        assert_eq!(config.require_branch, "develop");
        assert_eq!(config.version_bump_branch, "master");
        assert_eq!(config.push_to_remote, "origin");
        assert_eq!(config.scm_adapter, "git");
    }

    #[test]
    fn branches_are_configurable() {
        let ctx = context_with(
            "svc",
            "1.0.0",
            &[
                ("release.git.remote", "upstream"),
                ("release.require.branch", "main"),
                ("release.version.branch", "main"),
            ],
        );
        let config = ReleaseConfig::resolve(&ctx).unwrap();
        assert_eq!(config.require_branch, "main");
        assert_eq!(config.version_bump_branch, "main");
        assert_eq!(config.push_to_remote, "upstream");
    }

    #[test]
    fn remote_is_required() {
        let err =
            ReleaseConfig::resolve(&context_without("svc", "1.0.0", "release.git.remote")).unwrap_err();
        assert!(err.to_string().contains("release.git.remote"), "error was: {err}");
    }

    #[test]
    fn needs_publish_task() {
        let host = InMemoryHost::java_project();
        let mut graph = TaskGraphBuilder::new(&host);
        let config = ReleaseConfig::resolve(&context("svc", "1.0.0")).unwrap();
        let err = config.register(&mut graph).unwrap_err();
        assert!(matches!(err, GraphError::UnknownTask { ref name } if name == "publish"));
    }
}
