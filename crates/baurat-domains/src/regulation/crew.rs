use std::sync::Arc;

use anyhow::Result;
use baurat_core::{
    agent::AgentBackend,
    pipeline::{Pipeline, PipelineSettings},
    retrieval::DocumentSearch,
    types::{AgentProfile, CrewRun, RegulationQuery, TaskConfig},
};
use tracing::{error, info};

use super::{agents, build_tasks, Findings};

pub const DEFAULT_TOP_K: usize = 5;

/// Entry point for one regulation analysis.
///
/// Holds only read-only state (personas, backend handle, document search),
/// so one instance serves every concurrent request.
pub struct RegulationCrew {
    pipeline: Pipeline,
    search: DocumentSearch,
    top_k: usize,
}

impl RegulationCrew {
    pub fn new(
        backend: Arc<dyn AgentBackend>,
        search: DocumentSearch,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            pipeline: Pipeline::new(backend, Arc::new(agents()), settings),
            search,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn agents(&self) -> &[AgentProfile] {
        &self.pipeline.agents
    }

    pub fn agent_roles(&self) -> Vec<String> {
        self.agents().iter().map(|a| a.role.clone()).collect()
    }

    pub fn backend_name(&self) -> &str {
        self.pipeline.backend.name()
    }

    pub fn has_document_index(&self) -> bool {
        self.search.is_configured()
    }

    /// Run the retrieval and rule tools, then build the task list.
    pub async fn prepare(&self, query: &RegulationQuery) -> Vec<TaskConfig> {
        let outcome = self.search.search(&query.query, self.top_k).await;
        let findings = Findings::gather(query, &outcome);
        build_tasks(query, &findings)
    }

    /// Run the full crew and return every stage.
    pub async fn try_run(&self, query: &RegulationQuery) -> Result<CrewRun> {
        info!(
            query = %query.query,
            project_type = %query.project_type,
            district = %query.district,
            backend = self.backend_name(),
            "starting regulation analysis"
        );
        let tasks = self.prepare(query).await;
        let run = self.pipeline.run(query, &tasks).await?;
        info!(stages = run.stages.len(), "regulation analysis complete");
        Ok(run)
    }

    /// Run the full crew and return the synthesized report, or an
    /// `Error occurred during analysis: ..` message. Never fails.
    pub async fn run(&self, query: &RegulationQuery) -> String {
        match self.try_run(query).await {
            Ok(run) => run.final_output().to_string(),
            Err(e) => {
                error!("regulation analysis failed: {e:#}");
                format!("Error occurred during analysis: {e:#}")
            },
        }
    }
}
