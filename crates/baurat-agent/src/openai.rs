use anyhow::Result;
use async_trait::async_trait;
use baurat_core::{
    agent::AgentBackend,
    types::{AgentProfile, TaskConfig, TaskContext, TaskOutput},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Calls an OpenAI-compatible chat completions endpoint.
///
/// Stateless: every task is a single system + user exchange, so one
/// instance is shared by all concurrent requests.
pub struct OpenAiBackend {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
    http: reqwest::Client,
}

impl OpenAiBackend {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
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
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[async_trait]
impl AgentBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    async fn run_task(
        &self,
        agent: &AgentProfile,
        task: &TaskConfig,
        ctx: TaskContext,
    ) -> Result<TaskOutput> {
        let request_body = ChatRequest {
            model: &ctx.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: crate::instruction::build_system_prompt(agent),
                },
                ChatMessage {
                    role: "user",
                    content: crate::instruction::build_instruction(task, &ctx),
                },
            ],
            temperature: ctx.temperature,
        };

        info!(
            task = %task.name,
            agent = %agent.role,
            model = %ctx.model,
            "calling chat completions API"
        );

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let response = match self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .json(&request_body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                warn!(task = %task.name, timeout_secs = self.timeout_secs, "chat completions request timed out");
                return Ok(TaskOutput::failed(format!(
                    "OpenAI request timed out after {}s",
                    self.timeout_secs
                )));
            },
            Err(e) => {
                warn!(task = %task.name, "chat completions request failed: {}", e);
                return Ok(TaskOutput::failed(format!("OpenAI request failed: {}", e)));
            },
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(task = %task.name, status = %status, "chat completions returned non-200: {}", body);
            return Ok(TaskOutput::failed(format!("OpenAI error {}: {}", status, body)));
        }

        let parsed: ChatResponse = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                warn!(task = %task.name, "failed to parse chat completions response: {}", e);
                return Ok(TaskOutput::failed(format!("Failed to parse OpenAI response: {}", e)));
            },
        };

        let Some(output) = parsed.choices.into_iter().next().and_then(|c| c.message.content) else {
            warn!(task = %task.name, "chat completions response had no content");
            return Ok(TaskOutput::failed("OpenAI response contained no message content"));
        };

        info!(task = %task.name, output_len = output.len(), "chat completions response received");

        Ok(TaskOutput::ok(output))
    }
}
