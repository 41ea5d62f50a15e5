use anyhow::{Context, Result};
use async_trait::async_trait;
use baurat_core::{retrieval::DocumentIndex, types::DocumentResult};
use serde::Deserialize;
use tracing::debug;

/// Client for the precomputed regulation document index.
///
/// Speaks a small JSON protocol: `GET {base}/search?q=..&top_k=n` answers
/// `{"results": [{"content": .., "metadata": {..}}]}`.
pub struct HttpDocumentIndex {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<DocumentResult>,
}

impl HttpDocumentIndex {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::builder()
                .user_agent(concat!("baurat/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl DocumentIndex for HttpDocumentIndex {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<DocumentResult>> {
        let url = format!(
            "{}/search?q={}&top_k={top_k}",
            self.base_url,
            urlencoding::encode(query)
        );
        debug!(%url, "querying document index");
        let resp: SearchResponse = self
            .http
            .get(&url)
            .send()
            .await
            .context("document index unreachable")?
            .error_for_status()?
            .json()
            .await
            .context("malformed document index response")?;
        Ok(resp.results)
    }
}
