//! API documentation: metadata extraction, rendering, and index packaging.
//!
//! Tests emit request/response snippets and read the extracted API metadata,
//! so extraction must precede the test task and rendering must follow it.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;

use rigging_config::{ConfigurationKey, ProjectContext};
use rigging_graph::{CapabilityId, EdgeKind, GraphError, TaskGraphBuilder, TaskNode, TEST_TASK};

use super::CapabilityApplier;
use crate::error::EngineError;

/// Task that extracts API metadata from sources.
pub const EXTRACT_TASK: &str = "dokka";
/// Task that renders the documentation.
pub const RENDER_TASK: &str = "asciidoctor";
/// Task that copies the rendered index into the packaged resources.
pub const PACKAGE_TASK: &str = "packageDocsIndex";

const SNIPPETS_DIR: &str = "build/generated-snippets";
const METADATA_DIR: &str = "build/generated-javadoc-json";
const SOURCE_DIR: &str = "src/main/asciidoc";
const OUTPUT_DIR: &str = "build/generated-docs";
const RENDERED_INDEX: &str = "build/generated-docs/html5/index.html";
const PACKAGED_INDEX: &str = "build/resources/main/static/docs/index.html";

const METADATA_FORMAT: &str = "auto-restdocs-json";
const METADATA_RENDERER: &str = "capital.scalable:spring-auto-restdocs-dokka-json:2.0.6";

/// Renderer runtime configuration the host must declare.
const RENDERER_CONFIGURATION: &str = "asciidoctorj";

/// Settings for the metadata-extraction stage.
#[derive(Debug, Clone, Serialize)]
pub struct MetadataExtraction {
    pub output_dir: PathBuf,
    pub output_format: String,
    pub include_non_public: bool,
    pub renderer_artifact: String,
}

/// Settings for the rendering stage.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRendering {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub options: BTreeMap<String, String>,
    pub attributes: BTreeMap<String, String>,
}

/// Copy of the rendered index into the packaged output.
#[derive(Debug, Clone, Serialize)]
pub struct IndexPackaging {
    pub from: PathBuf,
    pub to: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentationConfig {
    pub extraction: MetadataExtraction,
    pub rendering: DocumentRendering,
    pub packaging: IndexPackaging,
    /// System properties handed to the test task so it writes snippets
    /// where the renderer reads them.
    pub test_system_properties: BTreeMap<String, String>,
    pub dependency_configurations: Vec<String>,
}

impl CapabilityApplier for DocumentationConfig {
    const ID: CapabilityId = CapabilityId::Documentation;

    fn resolve(context: &ProjectContext) -> Result<Self, EngineError> {
        let registry = context.registry();
        let backend = registry.resolve(ConfigurationKey::DocsBackend)?;
        let doctype = registry.resolve(ConfigurationKey::DocsDoctype)?;

        let options = BTreeMap::from([
            ("backend".to_owned(), backend.to_owned()),
            ("doctype".to_owned(), doctype.to_owned()),
        ]);
        let attributes = BTreeMap::from([
            ("source-highlighter".to_owned(), "highlightjs".to_owned()),
            ("snippets".to_owned(), SNIPPETS_DIR.to_owned()),
        ]);
        let test_system_properties = BTreeMap::from([
            (
                "org.springframework.restdocs.outputDir".to_owned(),
                SNIPPETS_DIR.to_owned(),
            ),
            (
                "org.springframework.restdocs.javadocJsonDir".to_owned(),
                METADATA_DIR.to_owned(),
            ),
        ]);

        debug!(backend, doctype, "resolved documentation settings");

        Ok(Self {
            extraction: MetadataExtraction {
                output_dir: PathBuf::from(METADATA_DIR),
                output_format: METADATA_FORMAT.to_owned(),
                include_non_public: true,
                renderer_artifact: METADATA_RENDERER.to_owned(),
            },
            rendering: DocumentRendering {
                source_dir: PathBuf::from(SOURCE_DIR),
                output_dir: PathBuf::from(OUTPUT_DIR),
                options,
                attributes,
            },
            packaging: IndexPackaging {
                from: PathBuf::from(RENDERED_INDEX),
                to: PathBuf::from(PACKAGED_INDEX),
            },
            test_system_properties,
            dependency_configurations: vec![RENDERER_CONFIGURATION.to_owned()],
        })
    }

    fn register(&self, graph: &mut TaskGraphBuilder) -> Result<Vec<TaskNode>, GraphError> {
        let test = graph.node(TEST_TASK)?;

        let extract = graph.register(EXTRACT_TASK, Self::ID)?;
        let render = graph.register(RENDER_TASK, Self::ID)?;
        let package = graph.register(PACKAGE_TASK, Self::ID)?;

        graph.add_edge(&test, &extract, EdgeKind::RunsAfter)?;
        graph.add_edge(&render, &test, EdgeKind::RunsAfter)?;
        graph.add_edge(&render, &extract, EdgeKind::RunsAfter)?;
        graph.add_edge(&package, &render, EdgeKind::RunsAfter)?;

        Ok(vec![extract, render, package])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rigging_graph::InMemoryHost;

    use super::*;
    use crate::capability::test_support::{context, context_with};

    #[test]
    fn fixed_directories() {
        let config = DocumentationConfig::resolve(&context("svc", "1.0.0")).unwrap();
        assert_eq!(config.extraction.output_dir, PathBuf::from("build/generated-javadoc-json"));
        assert_eq!(config.rendering.output_dir, PathBuf::from("build/generated-docs"));
        assert_eq!(config.rendering.source_dir, PathBuf::from("src/main/asciidoc"));
        assert_eq!(
            config.packaging.to,
            PathBuf::from("build/resources/main/static/docs/index.html")
        );
    }

    #[test]
    fn cosmetic_options_default() {
        let config = DocumentationConfig::resolve(&context_with("svc", "1.0.0", &[])).unwrap();
        assert_eq!(config.rendering.options.get("backend").map(String::as_str), Some("html"));
        assert_eq!(config.rendering.options.get("doctype").map(String::as_str), Some("book"));
    }

    #[test]
    fn cosmetic_options_can_be_set() {
        let ctx = context_with("svc", "1.0.0", &[("docs.doctype", "article")]);
        let config = DocumentationConfig::resolve(&ctx).unwrap();
        assert_eq!(config.rendering.options.get("doctype").map(String::as_str), Some("article"));
    }

    #[test]
    fn snippets_dir_is_shared_with_tests() {
        let config = DocumentationConfig::resolve(&context("svc", "1.0.0")).unwrap();
        assert_eq!(
            config.rendering.attributes.get("snippets"),
            config.test_system_properties.get("org.springframework.restdocs.outputDir")
        );
        assert_eq!(
            config
                .test_system_properties
                .get("org.springframework.restdocs.javadocJsonDir")
                .map(PathBuf::from),
            Some(config.extraction.output_dir.clone())
        );
    }

    #[test]
    fn rendering_runs_after_test_and_extraction() {
        let host = InMemoryHost::java_project();
        let mut graph = TaskGraphBuilder::new(&host);
        let config = DocumentationConfig::resolve(&context("svc", "1.0.0")).unwrap();
        let tasks = config.register(&mut graph).unwrap();
        assert_eq!(tasks.len(), 3);

        let graph = graph.finish().unwrap();
        assert!(graph.has_edge(RENDER_TASK, TEST_TASK, EdgeKind::RunsAfter));
        assert!(graph.has_edge(RENDER_TASK, EXTRACT_TASK, EdgeKind::RunsAfter));
        assert!(graph.has_edge(TEST_TASK, EXTRACT_TASK, EdgeKind::RunsAfter));
        assert!(graph.has_edge(PACKAGE_TASK, RENDER_TASK, EdgeKind::RunsAfter));

        let pos = |n: &str| graph.position(n).unwrap();
        assert!(pos(EXTRACT_TASK) < pos(TEST_TASK));
        assert!(pos(TEST_TASK) < pos(RENDER_TASK));
        assert!(pos(RENDER_TASK) < pos(PACKAGE_TASK));
    }

    #[test]
    fn requires_host_test_task() {
        let host = InMemoryHost::with_tasks(&["jar"]).unwrap();
        let mut graph = TaskGraphBuilder::new(&host);
        let config = DocumentationConfig::resolve(&context("svc", "1.0.0")).unwrap();
        let err = config.register(&mut graph).unwrap_err();
        assert!(matches!(err, GraphError::UnknownTask { ref name } if name == "test"));
        assert!(!graph.contains(EXTRACT_TASK), "nothing staged before the lookup failed");
    }
}
