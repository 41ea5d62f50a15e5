use anyhow::Result;
use async_trait::async_trait;

use crate::types::{AgentProfile, TaskConfig, TaskContext, TaskOutput};

#[async_trait]
pub trait AgentBackend: Send + Sync {
    /// Short backend name for logs and health output.
    fn name(&self) -> &str;

    async fn run_task(
        &self,
        agent: &AgentProfile,
        task: &TaskConfig,
        ctx: TaskContext,
    ) -> Result<TaskOutput>;
}
