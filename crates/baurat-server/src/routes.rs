use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, Json},
};
use baurat_core::types::{
    default_district, default_location, default_project_type, default_urgency, RegulationQuery,
};
use baurat_domains::RegulationCrew;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::AppState;

const INDEX_HTML: &str = include_str!("../static/index.html");

// ── Error helper ──────────────────────────────────────────────────────────

pub(crate) type ApiError = (StatusCode, Json<Value>);

pub(crate) fn detail(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "detail": message.into() })))
}

fn crew_or(state: &AppState, message: &str) -> Result<Arc<RegulationCrew>, ApiError> {
    state
        .crew
        .clone()
        .ok_or_else(|| detail(StatusCode::SERVICE_UNAVAILABLE, message))
}

// ── Request / response types ──────────────────────────────────────────────

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub(crate) struct MultiAgentRequest {
    pub query: String,
    #[serde(default = "default_project_type")]
    pub project_type: String,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default = "default_district")]
    pub district: String,
    #[serde(default = "default_urgency")]
    pub urgency: String,
    /// Accepted for client compatibility; the crew always runs.
    #[serde(default = "default_true")]
    #[allow(dead_code)]
    pub use_multi_agent: bool,
}

impl MultiAgentRequest {
    fn to_query(&self) -> RegulationQuery {
        RegulationQuery::new(&self.query)
            .with_project_type(&self.project_type)
            .with_location(&self.location)
            .with_district(&self.district)
            .with_urgency(&self.urgency)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct MultiAgentResponse {
    pub analysis: String,
    pub timestamp: String,
    pub query_details: RegulationQuery,
    pub processing_time: f64,
    pub agents_used: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ChatResponse {
    pub message: String,
    pub timestamp: String,
    pub context_used: u32,
    pub conversation_id: Option<String>,
}

// ── Handlers ──────────────────────────────────────────────────────────────

pub(crate) async fn home() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub(crate) async fn ping() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "running" }))
}

pub(crate) async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let agents = state
        .crew
        .as_ref()
        .map(|c| c.agent_roles())
        .unwrap_or_default();
    let document_database = match &state.crew {
        Some(c) if c.has_document_index() => "available",
        _ => "not_configured",
    };
    let crew_system = if state.crew.is_some() { "ready" } else { "not_initialized" };
    let openai_api = if state.config.has_credential() { "configured" } else { "missing" };
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "uptime_s": state.start_time.elapsed().as_secs(),
        "multi_agent_ready": state.crew.is_some(),
        "components": {
            "crew_system": crew_system,
            "openai_api": openai_api,
            "document_database": document_database,
        },
        "agents": agents,
    }))
}

/// Run the crew on its own task so a panic in one analysis cannot take
/// the connection handler down with it.
async fn analyze(
    crew: Arc<RegulationCrew>,
    query: RegulationQuery,
) -> Result<(String, f64), tokio::task::JoinError> {
    let started = Instant::now();
    let analysis = tokio::spawn(async move { crew.run(&query).await }).await?;
    Ok((analysis, started.elapsed().as_secs_f64()))
}

pub(crate) async fn multi_agent(
    State(state): State<Arc<AppState>>,
    Json(body): Json<MultiAgentRequest>,
) -> Result<Json<MultiAgentResponse>, ApiError> {
    let crew = crew_or(&state, "Multi-agent system not initialized")?;
    let query = body.to_query();
    info!(query = %query.query, district = %query.district, "multi-agent analysis requested");

    let (analysis, processing_time) = analyze(Arc::clone(&crew), query.clone())
        .await
        .map_err(|e| {
            error!("multi-agent analysis error: {e}");
            detail(StatusCode::INTERNAL_SERVER_ERROR, format!("Analysis failed: {e}"))
        })?;

    Ok(Json(MultiAgentResponse {
        analysis,
        timestamp: Utc::now().to_rfc3339(),
        query_details: query,
        processing_time,
        agents_used: crew.agent_roles(),
    }))
}

pub(crate) async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let crew = crew_or(&state, "AI system not available")?;
    let query = RegulationQuery::new(body.message);

    let (analysis, _) = analyze(crew, query).await.map_err(|e| {
        error!("legacy chat error: {e}");
        detail(StatusCode::INTERNAL_SERVER_ERROR, format!("Chat failed: {e}"))
    })?;

    Ok(Json(ChatResponse {
        message: analysis,
        timestamp: Utc::now().to_rfc3339(),
        context_used: 5,
        conversation_id: body.conversation_id,
    }))
}
