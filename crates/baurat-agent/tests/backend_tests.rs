// Backends against in-process mock servers. Every provider failure must come
// back as an unsuccessful TaskOutput, never a panic.

use std::sync::{Arc, Mutex};

use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::post, Json, Router};
use baurat_agent::{OllamaBackend, OpenAiBackend};
use baurat_core::{
    agent::AgentBackend,
    types::{AgentProfile, RegulationQuery, TaskConfig, TaskContext},
};
use serde_json::{json, Value};
use tracing_test::traced_test;

type Captured = Arc<Mutex<Vec<(Option<String>, Value)>>>;

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn capture_router(path: &str, reply: Value, captured: Captured) -> Router {
    Router::new()
        .route(
            path,
            post(
                |State((captured, reply)): State<(Captured, Value)>,
                 headers: HeaderMap,
                 Json(body): Json<Value>| async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    captured.lock().unwrap().push((auth, body));
                    Json(reply)
                },
            ),
        )
        .with_state((captured, reply))
}

fn agent() -> AgentProfile {
    AgentProfile {
        key: "document_specialist".into(),
        role: "Document Research Specialist".into(),
        goal: "Find regulations".into(),
        backstory: String::new(),
        tools: Vec::new(),
    }
}

fn task() -> TaskConfig {
    TaskConfig {
        name: "document_research".into(),
        label: "Document Research".into(),
        description: "Research parking rules".into(),
        expected_output: String::new(),
        agent: "document_specialist".into(),
        context: Vec::new(),
        notes: Vec::new(),
    }
}

fn ctx(model: &str) -> TaskContext {
    TaskContext {
        query: RegulationQuery::new("parking"),
        model: model.into(),
        temperature: 0.1,
        upstream: Vec::new(),
    }
}

#[tokio::test]
async fn test_openai_sends_persona_and_parses_content() {
    let captured: Captured = Arc::default();
    let reply = json!({"choices":[{"message":{"role":"assistant","content":"§ 37 LBO applies"}}]});
    let url = spawn(capture_router("/v1/chat/completions", reply, captured.clone())).await;

    let backend = OpenAiBackend::new("sk-test", format!("{url}/v1/"));
    let out = backend.run_task(&agent(), &task(), ctx("gpt-4")).await.unwrap();

    assert!(out.success);
    assert_eq!(out.output, "§ 37 LBO applies");

    let calls = captured.lock().unwrap();
    let (auth, body) = &calls[0];
    assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
    assert_eq!(body["model"], "gpt-4");
    assert_eq!(body["messages"][0]["role"], "system");
    assert!(body["messages"][0]["content"].as_str().unwrap().contains("Document Research Specialist"));
    assert!(body["messages"][1]["content"].as_str().unwrap().starts_with("Task [document_research]"));
    assert!((body["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
}

#[tokio::test]
#[traced_test]
async fn test_openai_non_success_status_is_failed_output() {
    let router = Router::new().route(
        "/chat/completions",
        post(|| async { (StatusCode::TOO_MANY_REQUESTS, "rate limited") }),
    );
    let url = spawn(router).await;

    let out = OpenAiBackend::new("sk-test", url)
        .run_task(&agent(), &task(), ctx("gpt-4"))
        .await
        .unwrap();

    assert!(!out.success);
    assert!(out.output.contains("429"));
    assert!(out.output.contains("rate limited"));
    assert!(logs_contain("chat completions returned non-200"));
}

#[tokio::test]
async fn test_openai_missing_content_is_failed_output() {
    let captured: Captured = Arc::default();
    let url = spawn(capture_router("/chat/completions", json!({"choices": []}), captured)).await;

    let out = OpenAiBackend::new("sk-test", url)
        .run_task(&agent(), &task(), ctx("gpt-4"))
        .await
        .unwrap();

    assert!(!out.success);
    assert!(out.output.contains("no message content"));
}

#[tokio::test]
async fn test_openai_unreachable_host_is_failed_output() {
    // Bind then drop to get a port nobody listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let out = OpenAiBackend::new("sk-test", format!("http://{addr}"))
        .with_timeout(5)
        .run_task(&agent(), &task(), ctx("gpt-4"))
        .await
        .unwrap();

    assert!(!out.success);
    assert!(out.output.starts_with("OpenAI request failed"));
}

#[tokio::test]
async fn test_ollama_uses_context_model_and_parses_message() {
    let captured: Captured = Arc::default();
    let reply = json!({"message":{"role":"assistant","content":"Stellplatzsatzung Stuttgart"}});
    let url = spawn(capture_router("/api/chat", reply, captured.clone())).await;

    let out = OllamaBackend::new(url)
        .run_task(&agent(), &task(), ctx("llama3.1"))
        .await
        .unwrap();

    assert!(out.success);
    assert_eq!(out.output, "Stellplatzsatzung Stuttgart");
    let calls = captured.lock().unwrap();
    let (auth, body) = &calls[0];
    assert!(auth.is_none());
    assert_eq!(body["model"], "llama3.1");
    assert_eq!(body["stream"], false);
}

#[tokio::test]
async fn test_ollama_malformed_body_is_failed_output() {
    let router = Router::new().route("/api/chat", post(|| async { "not json" }));
    let url = spawn(router).await;

    let out = OllamaBackend::new(url)
        .run_task(&agent(), &task(), ctx("llama3.1"))
        .await
        .unwrap();

    assert!(!out.success);
    assert!(out.output.starts_with("Failed to parse Ollama response"));
}
