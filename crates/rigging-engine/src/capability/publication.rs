//! Artifact publication to a Maven repository.

use serde::Serialize;
use tracing::debug;

use rigging_config::{ConfigurationKey, CredentialMaterial, ProjectContext};
use rigging_graph::{CapabilityId, EdgeKind, GraphError, TaskGraphBuilder, TaskNode, JAR_TASK};

use super::CapabilityApplier;
use crate::error::EngineError;

/// Task that uploads the publication.
pub const PUBLISH_TASK: &str = "publish";

const SNAPSHOT_SUFFIX: &str = "SNAPSHOT";

/// Which repository a version is published to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepositoryChannel {
    Snapshots,
    Releases,
}

impl RepositoryChannel {
    /// Versions ending in `SNAPSHOT` go to snapshots; everything else to releases.
    pub fn for_version(version: &str) -> Self {
        if version.ends_with(SNAPSHOT_SUFFIX) {
            Self::Snapshots
        } else {
            Self::Releases
        }
    }

    fn repository_name(self) -> &'static str {
        match self {
            Self::Snapshots => "maven-snapshots",
            Self::Releases => "maven-releases",
        }
    }
}

/// `https://{host}:{port}/repository/{maven-snapshots|maven-releases}`.
pub fn repository_url(host: &str, port: &str, channel: RepositoryChannel) -> String {
    format!(
        "https://{host}:{port}/repository/{}",
        channel.repository_name()
    )
}

/// Source-control coordinates embedded in the published POM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScmMetadata {
    pub connection: String,
    pub developer_connection: String,
    pub url: String,
}

impl ScmMetadata {
    fn github(owner: &str, project: &str) -> Self {
        let connection = format!("scm:git:git@github.com:{owner}/{project}.git");
        Self {
            developer_connection: connection.clone(),
            connection,
            url: format!("https://github.com/{owner}/{project}/"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicationConfig {
    /// Named after the project.
    pub publication_name: String,
    pub channel: RepositoryChannel,
    pub repository_url: String,
    #[serde(skip)]
    pub credentials: CredentialMaterial,
    /// Host task whose output is the published artifact set.
    pub artifact_task: String,
    pub scm: Option<ScmMetadata>,
}

impl CapabilityApplier for PublicationConfig {
    const ID: CapabilityId = CapabilityId::Publication;

    fn resolve(context: &ProjectContext) -> Result<Self, EngineError> {
        let registry = context.registry();
        registry.require(&[
            ConfigurationKey::RepositoryHost,
            ConfigurationKey::RepositoryJarPort,
            ConfigurationKey::RepositoryUsername,
            ConfigurationKey::RepositoryPassword,
        ])?;

        let host = registry.resolve(ConfigurationKey::RepositoryHost)?;
        let port = registry.resolve(ConfigurationKey::RepositoryJarPort)?;
        let credentials = registry.resolve_credentials()?;

        let channel = RepositoryChannel::for_version(context.version());
        let url = repository_url(host, port, channel);
        let scm = registry
            .resolve_optional(ConfigurationKey::ScmOwner)
            .map(|owner| ScmMetadata::github(owner, context.name()));

        debug!(url = %url, ?channel, "resolved publication repository");

        Ok(Self {
            publication_name: context.name().to_owned(),
            channel,
            repository_url: url,
            credentials,
            artifact_task: JAR_TASK.to_owned(),
            scm,
        })
    }

    fn register(&self, graph: &mut TaskGraphBuilder) -> Result<Vec<TaskNode>, GraphError> {
        let artifacts = graph.node(&self.artifact_task)?;

        let publish = graph.register(PUBLISH_TASK, Self::ID)?;
        graph.add_edge(&publish, &artifacts, EdgeKind::RunsAfter)?;

        Ok(vec![publish])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;
    use rigging_config::ConfigError;
    use rigging_graph::InMemoryHost;

    use super::*;
    use crate::capability::test_support::{context, context_with, context_without};

    #[test]
    fn snapshot_version_routes_to_snapshots() {
        let config = PublicationConfig::resolve(&context("svc", "1.0.0-SNAPSHOT")).unwrap();
        assert_eq!(config.channel, RepositoryChannel::Snapshots);
        assert_eq!(
            config.repository_url,
            "https://nexus.example.com:8443/repository/maven-snapshots"
        );
    }

    #[test]
    fn release_version_routes_to_releases() {
        let config = PublicationConfig::resolve(&context("svc", "1.0.0")).unwrap();
        assert_eq!(config.channel, RepositoryChannel::Releases);
        assert_eq!(
            config.repository_url,
            "https://nexus.example.com:8443/repository/maven-releases"
        );
    }

    #[test]
    fn snapshot_match_is_a_suffix_match() {
        assert_eq!(
            RepositoryChannel::for_version("1.0.0-SNAPSHOT.1"),
            RepositoryChannel::Releases
        );
        assert_eq!(
            RepositoryChannel::for_version("1.0.0-snapshot"),
            RepositoryChannel::Releases
        );
    }

    #[test]
    fn publication_named_after_project_and_bound_to_jar() {
        let config = PublicationConfig::resolve(&context("cloud-client", "1.0.0")).unwrap();
        assert_eq!(config.publication_name, "cloud-client");
        assert_eq!(config.artifact_task, "jar");
        assert_eq!(config.credentials.username(), "deployer");
    }

    #[test]
    fn scm_metadata_only_with_owner() {
        let without = PublicationConfig::resolve(&context("svc", "1.0.0")).unwrap();
        assert!(without.scm.is_none());

        let mut pairs = crate::capability::test_support::FULL_PROPERTIES.to_vec();
        pairs.push(("scm.owner", "acme"));
        let with = PublicationConfig::resolve(&context_with("svc", "1.0.0", &pairs)).unwrap();
        let scm = with.scm.unwrap();
        assert_eq!(scm.connection, "scm:git:git@github.com:acme/svc.git");
        assert_eq!(scm.developer_connection, scm.connection);
        assert_eq!(scm.url, "https://github.com/acme/svc/");
    }

    #[test]
    fn missing_port_fails() {
        let err = PublicationConfig::resolve(&context_without("svc", "1.0.0", "nexus.port.jar"))
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Config(ConfigError::MissingConfiguration { ref keys })
                if keys == &[ConfigurationKey::RepositoryJarPort]
        ));
    }

    #[test]
    fn missing_keys_reported_together() {
        let err = PublicationConfig::resolve(&context_with("svc", "1.0.0", &[])).unwrap_err();
        let msg = err.to_string();
        for property in ["nexus.host", "nexus.port.jar", "nexus.user", "nexus.password"] {
            assert!(msg.contains(property), "{property} missing from: {msg}");
        }
    }

    #[test]
    fn publish_runs_after_jar() {
        let host = InMemoryHost::java_project();
        let mut graph = TaskGraphBuilder::new(&host);
        let config = PublicationConfig::resolve(&context("svc", "1.0.0")).unwrap();
        config.register(&mut graph).unwrap();
        let graph = graph.finish().unwrap();
        assert!(graph.has_edge(PUBLISH_TASK, JAR_TASK, EdgeKind::RunsAfter));
    }

    #[test]
    fn serialized_config_omits_credentials() {
        let config = PublicationConfig::resolve(&context("svc", "1.0.0")).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("hunter2"), "json: {json}");
        assert!(!json.contains("deployer"), "json: {json}");
    }

    proptest! {
        #[test]
        fn snapshot_suffix_always_selects_snapshots(base in "[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}") {
            let version = format!("{base}-SNAPSHOT");
            let url = repository_url("h", "1", RepositoryChannel::for_version(&version));
            prop_assert!(url.ends_with("/repository/maven-snapshots"));
        }

        #[test]
        fn plain_versions_always_select_releases(version in "[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}(-[a-z]{1,5})?") {
            let url = repository_url("h", "1", RepositoryChannel::for_version(&version));
            prop_assert!(url.ends_with("/repository/maven-releases"));
        }
    }
}
