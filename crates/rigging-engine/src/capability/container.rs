//! Container image construction and push.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use rigging_config::{ConfigurationKey, CredentialMaterial, ProjectContext};
use rigging_graph::{CapabilityId, EdgeKind, GraphError, TaskGraphBuilder, TaskNode, JAR_TASK};

use super::CapabilityApplier;
use crate::error::EngineError;

/// Task that builds and pushes the image.
pub const IMAGE_TASK: &str = "jib";

/// The project name that gets the server bootstrap location.
pub const SERVER_PROJECT: &str = "cloud-server";

const WORKING_DIRECTORY: &str = "/";
const EXPOSED_PORT: &str = "8080";
const BOOTSTRAP_ENV: &str = "SPRING_CLOUD_BOOTSTRAP_LOCATION";

/// `{host}:{port}/{name}:{version}`.
pub fn image_reference(host: &str, port: &str, name: &str, version: &str) -> String {
    format!("{host}:{port}/{name}:{version}")
}

/// The bootstrap-location key for a project: server for [`SERVER_PROJECT`],
/// client for everything else.
pub fn bootstrap_key(project_name: &str) -> ConfigurationKey {
    if project_name == SERVER_PROJECT {
        ConfigurationKey::ServerBootstrapLocation
    } else {
        ConfigurationKey::ClientBootstrapLocation
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContainerImageConfig {
    pub base_image: String,
    pub target_image: String,
    #[serde(skip)]
    pub credentials: CredentialMaterial,
    pub working_directory: String,
    pub ports: Vec<String>,
    pub environment: BTreeMap<String, String>,
    pub allow_insecure_registries: bool,
    /// Stamp the image with the build time instead of the epoch. Images
    /// are therefore not reproducible: identical inputs yield different
    /// digests.
    pub use_current_timestamp: bool,
}

impl CapabilityApplier for ContainerImageConfig {
    const ID: CapabilityId = CapabilityId::ContainerImage;

    fn resolve(context: &ProjectContext) -> Result<Self, EngineError> {
        let registry = context.registry();
        let bootstrap = bootstrap_key(context.name());
        registry.require(&[
            ConfigurationKey::RepositoryHost,
            ConfigurationKey::RepositoryImagePort,
            ConfigurationKey::RepositoryUsername,
            ConfigurationKey::RepositoryPassword,
            bootstrap,
        ])?;

        let host = registry.resolve(ConfigurationKey::RepositoryHost)?;
        let port = registry.resolve(ConfigurationKey::RepositoryImagePort)?;
        let base_image = registry.resolve(ConfigurationKey::ContainerBaseImage)?;
        let bootstrap_location = registry.resolve(bootstrap)?;
        let credentials = registry.resolve_credentials()?;

        let target_image = image_reference(host, port, context.name(), context.version());
        let environment = BTreeMap::from([
            ("SPRING_OUTPUT_ANSI_ENABLED".to_owned(), "ALWAYS".to_owned()),
            (BOOTSTRAP_ENV.to_owned(), bootstrap_location.to_owned()),
        ]);

        debug!(image = %target_image, base = base_image, "resolved container image");

        Ok(Self {
            base_image: base_image.to_owned(),
            target_image,
            credentials,
            working_directory: WORKING_DIRECTORY.to_owned(),
            ports: vec![EXPOSED_PORT.to_owned()],
            environment,
            allow_insecure_registries: true,
            use_current_timestamp: true,
        })
    }

    fn register(&self, graph: &mut TaskGraphBuilder) -> Result<Vec<TaskNode>, GraphError> {
        let jar = graph.node(JAR_TASK)?;

        let image = graph.register(IMAGE_TASK, Self::ID)?;
        graph.add_edge(&image, &jar, EdgeKind::RunsAfter)?;

        Ok(vec![image])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::capability::test_support::{context, context_without};

    #[test]
    fn image_reference_format() {
        assert_eq!(
            image_reference("reg.local", "5000", "svc", "2.3.1"),
            "reg.local:5000/svc:2.3.1"
        );
    }

    #[test]
    fn target_image_uses_image_port() {
        let config = ContainerImageConfig::resolve(&context("svc", "2.3.1")).unwrap();
        assert_eq!(config.target_image, "nexus.example.com:5000/svc:2.3.1");
    }

    #[test]
    fn server_project_gets_server_bootstrap() {
        let config = ContainerImageConfig::resolve(&context("cloud-server", "1.0.0")).unwrap();
        assert_eq!(
            config.environment.get(BOOTSTRAP_ENV).map(String::as_str),
            Some("file:/config/server/")
        );
    }

    #[test]
    fn client_project_gets_client_bootstrap() {
        let config = ContainerImageConfig::resolve(&context("cloud-client", "1.0.0")).unwrap();
        assert_eq!(
            config.environment.get(BOOTSTRAP_ENV).map(String::as_str),
            Some("file:/config/client/")
        );
    }

    #[test]
    fn server_does_not_need_client_bootstrap() {
        let ctx = context_without("cloud-server", "1.0.0", "bootstrap.location.cloud-client");
        assert!(ContainerImageConfig::resolve(&ctx).is_ok());
    }

    #[test]
    fn client_needs_client_bootstrap() {
        let ctx = context_without("cloud-client", "1.0.0", "bootstrap.location.cloud-client");
        let err = ContainerImageConfig::resolve(&ctx).unwrap_err();
        assert!(
            err.to_string().contains("bootstrap.location.cloud-client"),
            "error was: {err}"
        );
    }

    #[test]
    fn fixed_container_settings() {
        let config = ContainerImageConfig::resolve(&context("svc", "1.0.0")).unwrap();
        assert_eq!(config.base_image, "openjdk:8-jdk-alpine");
        assert_eq!(config.working_directory, "/");
        assert_eq!(config.ports, vec!["8080".to_owned()]);
        assert!(config.allow_insecure_registries);
        assert!(config.use_current_timestamp);
        assert_eq!(
            config.environment.get("SPRING_OUTPUT_ANSI_ENABLED").map(String::as_str),
            Some("ALWAYS")
        );
    }
}
