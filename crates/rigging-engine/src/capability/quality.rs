//! Static analysis and coverage reporting.

use std::collections::BTreeMap;

use serde::Serialize;

use rigging_config::ProjectContext;
use rigging_graph::{CapabilityId, EdgeKind, GraphError, TaskGraphBuilder, TaskNode, TEST_TASK};

use super::CapabilityApplier;
use crate::error::EngineError;

/// Task that writes the coverage report.
pub const REPORT_TASK: &str = "jacocoTestReport";
/// Task that runs the static-analysis scan.
pub const ANALYSIS_TASK: &str = "sonarqube";

const ANALYSIS_SOURCES: &str = "src/main";

/// Which coverage report formats are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CoverageReports {
    pub html: bool,
    pub xml: bool,
}

impl CoverageReports {
    /// The analysis server reads XML only; HTML is always off.
    pub const MACHINE_READABLE: Self = Self {
        html: false,
        xml: true,
    };
}

#[derive(Debug, Clone, Serialize)]
pub struct QualityGateConfig {
    pub coverage: CoverageReports,
    pub analysis_properties: BTreeMap<String, String>,
}

impl CapabilityApplier for QualityGateConfig {
    const ID: CapabilityId = CapabilityId::QualityGate;

    fn resolve(_context: &ProjectContext) -> Result<Self, EngineError> {
        Ok(Self {
            coverage: CoverageReports::MACHINE_READABLE,
            analysis_properties: BTreeMap::from([(
                "sonar.sources".to_owned(),
                ANALYSIS_SOURCES.to_owned(),
            )]),
        })
    }

    fn register(&self, graph: &mut TaskGraphBuilder) -> Result<Vec<TaskNode>, GraphError> {
        let test = graph.node(TEST_TASK)?;

        let report = graph.register(REPORT_TASK, Self::ID)?;
        let analysis = graph.register(ANALYSIS_TASK, Self::ID)?;

        graph.add_edge(&test, &report, EdgeKind::FinalizedBy)?;
        graph.add_edge(&analysis, &report, EdgeKind::RunsAfter)?;

        Ok(vec![report, analysis])
    }
}
