use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use crate::types::DocumentResult;

/// Characters of document content kept in a preview.
pub const PREVIEW_CHARS: usize = 500;

/// Appended to every preview, truncated or not.
pub const TRUNCATION_MARKER: &str = "...";

/// A ranked search over the precomputed regulation corpus.
#[async_trait]
pub trait DocumentIndex: Send + Sync {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<DocumentResult>>;
}

/// What the adapter hands to the pipeline. Never an error: failures become text.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found(Vec<DocumentResult>),
    NoResults { query: String },
    Failed { cause: String },
}

impl SearchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn documents(&self) -> &[DocumentResult] {
        match self {
            Self::Found(docs) => docs,
            _ => &[],
        }
    }

    /// Text form used in stage prompts.
    pub fn render(&self) -> String {
        match self {
            Self::Found(docs) => docs
                .iter()
                .enumerate()
                .map(|(i, doc)| render_document(i + 1, doc))
                .collect::<Vec<_>>()
                .join("\n"),
            Self::NoResults { query } => format!("No relevant documents found for query: {query}"),
            Self::Failed { cause } => format!("Error searching documents: {cause}"),
        }
    }
}

fn render_document(position: usize, doc: &DocumentResult) -> String {
    let meta = &doc.metadata;
    let page = match &meta.page_number {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Null) | None => "Unknown".into(),
        Some(v) => v.to_string(),
    };
    format!(
        "Document {position}:\n\
         - File: {}\n\
         - Category: {}\n\
         - Page: {page}\n\
         - Content Preview: {}{TRUNCATION_MARKER}\n",
        meta.document_name.as_deref().unwrap_or("Unknown"),
        meta.category.as_deref().unwrap_or("Unknown"),
        preview(&doc.content),
    )
}

/// First `PREVIEW_CHARS` characters of `content`, split on a char boundary.
pub fn preview(content: &str) -> &str {
    match content.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}

/// Boundary between the pipeline and the retrieval subsystem.
///
/// An absent index behaves like an unreachable one: the outcome is `Failed`
/// and the pipeline continues with that text in place of documents.
#[derive(Clone)]
pub struct DocumentSearch {
    index: Option<Arc<dyn DocumentIndex>>,
}

impl DocumentSearch {
    pub fn new(index: Arc<dyn DocumentIndex>) -> Self {
        Self { index: Some(index) }
    }

    pub fn disabled() -> Self {
        Self { index: None }
    }

    pub fn is_configured(&self) -> bool {
        self.index.is_some()
    }

    pub async fn search(&self, query: &str, top_k: usize) -> SearchOutcome {
        let Some(index) = &self.index else {
            return SearchOutcome::Failed {
                cause: "document index not configured".into(),
            };
        };

        if query.trim().is_empty() || top_k == 0 {
            return SearchOutcome::NoResults {
                query: query.to_string(),
            };
        }

        match index.search(query, top_k).await {
            Ok(mut docs) if !docs.is_empty() => {
                docs.truncate(top_k);
                info!(hits = docs.len(), top_k, "document search complete");
                SearchOutcome::Found(docs)
            },
            Ok(_) => SearchOutcome::NoResults {
                query: query.to_string(),
            },
            Err(e) => {
                warn!("document search failed: {e:#}");
                SearchOutcome::Failed {
                    cause: format!("{e:#}"),
                }
            },
        }
    }
}
