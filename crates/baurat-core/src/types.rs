use serde::{Deserialize, Serialize};

// ── Query ────────────────────────────────────────────────────────────────

/// One building-regulation question plus the project facts that shape it.
///
/// Built once per request and only ever read by the pipeline stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegulationQuery {
    pub query: String,
    #[serde(default = "default_project_type")]
    pub project_type: String,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default = "default_district")]
    pub district: String,
    #[serde(default = "default_urgency")]
    pub urgency: String,
}

pub fn default_project_type() -> String {
    "mixed-use".into()
}

pub fn default_location() -> String {
    "Stuttgart".into()
}

pub fn default_district() -> String {
    "general".into()
}

pub fn default_urgency() -> String {
    "normal".into()
}

impl RegulationQuery {
    /// A query with the default project facts (mixed-use in general Stuttgart).
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            project_type: default_project_type(),
            location: default_location(),
            district: default_district(),
            urgency: default_urgency(),
        }
    }

    pub fn with_project_type(mut self, project_type: impl Into<String>) -> Self {
        self.project_type = project_type.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_district(mut self, district: impl Into<String>) -> Self {
        self.district = district.into();
        self
    }

    pub fn with_urgency(mut self, urgency: impl Into<String>) -> Self {
        self.urgency = urgency.into();
        self
    }
}

// ── Agents ───────────────────────────────────────────────────────────────

/// A named persona bound to the shared model backend.
///
/// Created once at startup and shared read-only by every pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Stable lookup key referenced by `TaskConfig::agent`.
    pub key: String,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    /// Capability names. Always empty: agents only talk to the model.
    #[serde(default)]
    pub tools: Vec<String>,
}

// ── Tasks ────────────────────────────────────────────────────────────────

/// One pipeline stage: its instruction, the agent that runs it, and the
/// upstream tasks whose outputs are injected as context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    pub name: String,
    pub label: String,
    pub description: String,
    pub expected_output: String,
    /// Key of the `AgentProfile` that executes this task.
    pub agent: String,
    /// Upstream task names, in injection order. Each must be declared earlier.
    #[serde(default)]
    pub context: Vec<String>,
    /// Deterministic findings (title, body) computed before the run.
    #[serde(default)]
    pub notes: Vec<(String, String)>,
}

impl TaskConfig {
    /// Marker placed at the top of every prompt composed for this task.
    pub fn marker(&self) -> String {
        format!("[{}]", self.name)
    }

    pub fn with_context(mut self, upstream: &[&str]) -> Self {
        self.context = upstream.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_note(mut self, title: impl Into<String>, body: impl Into<String>) -> Self {
        self.notes.push((title.into(), body.into()));
        self
    }
}

// ── Documents ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default)]
    pub document_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub page_number: Option<serde_json::Value>,
    /// Any further fields the index returns.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A ranked hit from the document index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentResult {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

// ── Task Execution ───────────────────────────────────────────────────────

/// Runtime context passed to a backend for one task.
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub query: RegulationQuery,
    pub model: String,
    pub temperature: f32,
    /// (upstream label, full upstream output), in the task's declared order.
    pub upstream: Vec<(String, String)>,
}

/// Output produced by a backend for one task.
#[derive(Debug, Clone)]
pub struct TaskOutput {
    pub output: String,
    pub success: bool,
}

impl TaskOutput {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            success: true,
        }
    }

    pub fn failed(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            success: false,
        }
    }
}

/// One completed stage of a crew run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageResult {
    pub task: String,
    pub label: String,
    pub agent_role: String,
    pub output: String,
}

/// Every stage output of a completed run, in execution order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrewRun {
    pub stages: Vec<StageResult>,
}

impl CrewRun {
    /// The terminal stage's text: the user-facing deliverable.
    pub fn final_output(&self) -> &str {
        self.stages.last().map(|s| s.output.as_str()).unwrap_or_default()
    }

    pub fn stage(&self, name: &str) -> Option<&StageResult> {
        self.stages.iter().find(|s| s.task == name)
    }
}
