use anyhow::Result;
use async_trait::async_trait;
use baurat_core::{
    agent::AgentBackend,
    types::{AgentProfile, TaskConfig, TaskContext, TaskOutput},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Calls a locally-hosted Ollama model via its native chat API.
///
/// For deployments where regulation questions must not leave the machine.
/// Needs no credential; the model name comes from the task context.
pub struct OllamaBackend {
    pub base_url: String,
    pub timeout_secs: u64,
    http: reqwest::Client,
}

impl OllamaBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: 300,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[derive(Serialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaResponseMessage,
}

#[derive(Deserialize)]
struct OllamaResponseMessage {
    content: String,
}

#[async_trait]
impl AgentBackend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn run_task(
        &self,
        agent: &AgentProfile,
        task: &TaskConfig,
        ctx: TaskContext,
    ) -> Result<TaskOutput> {
        let messages = vec![
            OllamaMessage {
                role: "system".into(),
                content: crate::instruction::build_system_prompt(agent),
            },
            OllamaMessage {
                role: "user".into(),
                content: crate::instruction::build_instruction(task, &ctx),
            },
        ];

        let request_body = OllamaChatRequest {
            model: ctx.model.clone(),
            messages,
            stream: false,
            options: OllamaOptions {
                temperature: ctx.temperature,
            },
        };

        info!(
            task = %task.name,
            model = %ctx.model,
            base_url = %self.base_url,
            "calling ollama chat API"
        );

        let url = format!("{}/api/chat", self.base_url.trim_end_matches('/'));

        let response = match self
            .http
            .post(&url)
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .json(&request_body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                warn!(task = %task.name, timeout_secs = self.timeout_secs, "ollama request timed out");
                return Ok(TaskOutput::failed(format!(
                    "Ollama request timed out after {}s",
                    self.timeout_secs
                )));
            },
            Err(e) => {
                warn!(task = %task.name, "ollama request failed: {}", e);
                return Ok(TaskOutput::failed(format!("Ollama request failed: {}", e)));
            },
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(task = %task.name, status = %status, "ollama returned non-200: {}", body);
            return Ok(TaskOutput::failed(format!("Ollama error {}: {}", status, body)));
        }

        let parsed: OllamaChatResponse = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                warn!(task = %task.name, "failed to parse ollama response: {}", e);
                return Ok(TaskOutput::failed(format!("Failed to parse Ollama response: {}", e)));
            },
        };

        let output = parsed.message.content;

        info!(task = %task.name, output_len = output.len(), "ollama response received");

        Ok(TaskOutput::ok(output))
    }
}
