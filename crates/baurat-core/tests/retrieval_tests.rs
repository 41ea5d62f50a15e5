use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use baurat_core::{
    retrieval::{preview, DocumentIndex, DocumentSearch, SearchOutcome, PREVIEW_CHARS},
    types::{DocumentMetadata, DocumentResult},
};

struct FixedIndex(Vec<DocumentResult>);

#[async_trait]
impl DocumentIndex for FixedIndex {
    async fn search(&self, _query: &str, _top_k: usize) -> Result<Vec<DocumentResult>> {
        Ok(self.0.clone())
    }
}

struct DownIndex;

#[async_trait]
impl DocumentIndex for DownIndex {
    async fn search(&self, _query: &str, _top_k: usize) -> Result<Vec<DocumentResult>> {
        Err(anyhow!("connection refused"))
    }
}

fn doc(name: &str, content: &str) -> DocumentResult {
    DocumentResult {
        content: content.into(),
        metadata: DocumentMetadata {
            document_name: Some(name.into()),
            category: Some("LBO".into()),
            page_number: Some(serde_json::json!(12)),
            ..Default::default()
        },
    }
}

#[tokio::test]
async fn test_results_are_capped_at_top_k() {
    let docs = (0..8).map(|i| doc(&format!("d{i}.pdf"), "text")).collect();
    let search = DocumentSearch::new(Arc::new(FixedIndex(docs)));
    let outcome = search.search("Abstandsflächen", 3).await;
    assert_eq!(outcome.documents().len(), 3);
    assert_eq!(outcome.documents()[0].metadata.document_name.as_deref(), Some("d0.pdf"));
}

#[tokio::test]
async fn test_empty_query_is_no_results() {
    let search = DocumentSearch::new(Arc::new(FixedIndex(vec![doc("a.pdf", "x")])));
    let outcome = search.search("   ", 5).await;
    assert!(matches!(outcome, SearchOutcome::NoResults { .. }));
    assert!(outcome.render().starts_with("No relevant documents found for query:"));
}

#[tokio::test]
async fn test_no_matches_is_no_results() {
    let search = DocumentSearch::new(Arc::new(FixedIndex(Vec::new())));
    let outcome = search.search("Dachbegrünung", 5).await;
    assert_eq!(
        outcome.render(),
        "No relevant documents found for query: Dachbegrünung"
    );
}

#[tokio::test]
async fn test_index_failure_becomes_text() {
    let search = DocumentSearch::new(Arc::new(DownIndex));
    let outcome = search.search("Brandschutz", 5).await;
    assert!(!outcome.is_found());
    assert_eq!(outcome.render(), "Error searching documents: connection refused");
}

#[tokio::test]
async fn test_missing_index_degrades_like_failure() {
    let search = DocumentSearch::disabled();
    assert!(!search.is_configured());
    let outcome = search.search("Brandschutz", 5).await;
    assert!(outcome.render().starts_with("Error searching documents:"));
}

#[tokio::test]
async fn test_render_lists_metadata_and_preview() {
    let long = "x".repeat(PREVIEW_CHARS + 250);
    let mut bare = doc("ignored", "short");
    bare.metadata = DocumentMetadata::default();
    let search = DocumentSearch::new(Arc::new(FixedIndex(vec![doc("LBO_BW.pdf", &long), bare])));

    let text = search.search("LBO", 5).await.render();
    assert!(text.contains("Document 1:\n- File: LBO_BW.pdf\n- Category: LBO\n- Page: 12\n"));
    assert!(text.contains(&format!("- Content Preview: {}...", "x".repeat(PREVIEW_CHARS))));
    assert!(!text.contains(&"x".repeat(PREVIEW_CHARS + 1)));
    assert!(text.contains("Document 2:\n- File: Unknown\n- Category: Unknown\n- Page: Unknown\n- Content Preview: short..."));
}

#[test]
fn test_preview_respects_char_boundaries() {
    let umlauts = "ä".repeat(PREVIEW_CHARS + 10);
    let p = preview(&umlauts);
    assert_eq!(p.chars().count(), PREVIEW_CHARS);
    assert_eq!(preview("kurz"), "kurz");
}

#[test]
fn test_metadata_keeps_unknown_fields() {
    let raw = r#"{"content":"c","metadata":{"document_name":"a.pdf","page_number":"3","section":"§ 5"}}"#;
    let parsed: DocumentResult = serde_json::from_str(raw).unwrap();
    assert_eq!(parsed.metadata.page_number, Some(serde_json::json!("3")));
    assert_eq!(parsed.metadata.extra.get("section"), Some(&serde_json::json!("§ 5")));
}
