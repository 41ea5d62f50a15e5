use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use tracing::{error, info};

use crate::{
    agent::AgentBackend,
    types::{AgentProfile, CrewRun, RegulationQuery, StageResult, TaskConfig, TaskContext},
};

/// Model parameters forwarded to every task.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub model: String,
    pub temperature: f32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4".into(),
            temperature: 0.1,
        }
    }
}

/// Sequential task runner.
///
/// Tasks execute in declaration order. Each task sees the full outputs of
/// the tasks it names in `context` and nothing else. The first failure
/// aborts the run.
pub struct Pipeline {
    pub backend: Arc<dyn AgentBackend>,
    pub agents: Arc<Vec<AgentProfile>>,
    pub settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        backend: Arc<dyn AgentBackend>,
        agents: Arc<Vec<AgentProfile>>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            backend,
            agents,
            settings,
        }
    }

    fn agent(&self, key: &str) -> Option<&AgentProfile> {
        self.agents.iter().find(|a| a.key == key)
    }

    pub async fn run(&self, query: &RegulationQuery, tasks: &[TaskConfig]) -> Result<CrewRun> {
        validate_graph(tasks, &self.agents)?;

        let mut run = CrewRun::default();

        for (i, task) in tasks.iter().enumerate() {
            let agent = self
                .agent(&task.agent)
                .ok_or_else(|| anyhow!("task '{}' references unknown agent '{}'", task.name, task.agent))?;

            let upstream = task
                .context
                .iter()
                .map(|dep| {
                    let label = tasks
                        .iter()
                        .find(|t| &t.name == dep)
                        .map(|t| t.label.clone())
                        .unwrap_or_else(|| dep.clone());
                    let output = run.stage(dep).map(|s| s.output.clone()).unwrap_or_default();
                    (label, output)
                })
                .collect::<Vec<_>>();

            let ctx = TaskContext {
                query: query.clone(),
                model: self.settings.model.clone(),
                temperature: self.settings.temperature,
                upstream,
            };

            info!(
                task = %task.name,
                agent = %agent.role,
                step = i + 1,
                of = tasks.len(),
                "running task"
            );

            let result = self
                .backend
                .run_task(agent, task, ctx)
                .await
                .with_context(|| format!("task '{}' ({}) failed", task.name, agent.role))?;

            if !result.success {
                error!(task = %task.name, "task reported failure: {}", result.output);
                bail!("task '{}' ({}) failed: {}", task.name, agent.role, result.output);
            }

            info!(task = %task.name, output_len = result.output.len(), "task complete");

            run.stages.push(StageResult {
                task: task.name.clone(),
                label: task.label.clone(),
                agent_role: agent.role.clone(),
                output: result.output,
            });
        }

        Ok(run)
    }
}

/// Check that `tasks` form a DAG executable in declaration order with a single
/// terminal task that depends, directly or transitively, on every other task.
pub fn validate_graph(tasks: &[TaskConfig], agents: &[AgentProfile]) -> Result<()> {
    if tasks.is_empty() {
        bail!("pipeline has no tasks");
    }

    let mut declared: HashSet<&str> = HashSet::new();
    for task in tasks {
        if !agents.iter().any(|a| a.key == task.agent) {
            bail!("task '{}' references unknown agent '{}'", task.name, task.agent);
        }
        for dep in &task.context {
            if dep == &task.name {
                bail!("task '{}' depends on itself", task.name);
            }
            if !declared.contains(dep.as_str()) {
                bail!(
                    "task '{}' depends on '{}', which is not declared before it",
                    task.name,
                    dep
                );
            }
        }
        if !declared.insert(task.name.as_str()) {
            bail!("duplicate task name '{}'", task.name);
        }
    }

    // Walk back from the terminal task; everything must be reachable.
    let by_name: HashMap<&str, &TaskConfig> = tasks.iter().map(|t| (t.name.as_str(), t)).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = tasks.last().map(|t| t.name.as_str()).into_iter().collect();
    while let Some(name) = stack.pop() {
        if !seen.insert(name) {
            continue;
        }
        if let Some(task) = by_name.get(name) {
            stack.extend(task.context.iter().map(String::as_str));
        }
    }
    if let Some(orphan) = tasks.iter().find(|t| !seen.contains(t.name.as_str())) {
        bail!(
            "task '{}' does not feed the terminal task '{}'",
            orphan.name,
            tasks.last().map(|t| t.name.as_str()).unwrap_or_default()
        );
    }

    Ok(())
}
