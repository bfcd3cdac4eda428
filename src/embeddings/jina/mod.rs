
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::EmbeddingConfig;
use crate::embeddings::Embedder;
use crate::{RagError, Result};

const DEFAULT_TIMEOUT_SECONDS: u64 = 60;
const EMBEDDINGS_PATH: &str = "/v1/embeddings";

/// Task hint sent to the embedding API: passages at index time, queries at
/// search time.
const TASK_PASSAGE: &str = "retrieval.passage";
const TASK_QUERY: &str = "retrieval.query";

/// Blocking client for a Jina-compatible embedding endpoint.
#[derive(Debug, Clone)]
pub struct JinaClient {
    base_url: Url,
    api_key: String,
    model: String,
    late_chunking: bool,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    task: &'a str,
    late_chunking: bool,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

impl JinaClient {
    #[inline]
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| RagError::Config(format!("Invalid embedding base URL: {}", e)))?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)))
            .build()
            .into();

        Ok(Self {
            base_url,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            late_chunking: config.late_chunking,
            agent,
        })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        self
    }

    fn request_embeddings(&self, input: &[String], task: &str) -> Result<Vec<Vec<f32>>> {
        let url = self
            .base_url
            .join(EMBEDDINGS_PATH)
            .map_err(|e| RagError::Embedding(format!("Failed to build embedding URL: {}", e)))?;

        let request = EmbedRequest {
            model: &self.model,
            task,
            late_chunking: self.late_chunking,
            input,
        };
        let body = serde_json::to_string(&request)
            .map_err(|e| RagError::Embedding(format!("Failed to serialize request: {}", e)))?;

        debug!("Requesting {} embeddings from {}", input.len(), url);

        // Remote failures are surfaced as-is; there is no retry logic.
        let response_text = self
            .agent
            .post(url.as_str())
            .header("Content-Type", "application/json")
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .send(&body)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|e| RagError::Embedding(format!("Embedding API request failed: {}", e)))?;

        let mut parsed: EmbedResponse = serde_json::from_str(&response_text)
            .map_err(|e| RagError::Embedding(format!("Failed to parse response: {}", e)))?;

        if parsed.data.len() != input.len() {
            return Err(RagError::Embedding(format!(
                "Mismatch between request and response counts: {} vs {}",
                input.len(),
                parsed.data.len()
            )));
        }

        parsed.data.sort_by_key(|d| d.index);
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

impl Embedder for JinaClient {
    fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        // The remote API rejects empty batches, so short-circuit before any
        // network call.
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request_embeddings(texts, TASK_PASSAGE)
    }

    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let input = [text.to_string()];
        let mut vectors = self.request_embeddings(&input, TASK_QUERY)?;
        vectors
            .pop()
            .ok_or_else(|| RagError::Embedding("Empty embedding response".to_string()))
    }
}
