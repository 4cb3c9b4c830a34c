//! Ollama embeddings (`/api/embed`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{EmbeddingProvider, check_status, ensure_count, http_client};
use crate::ai::provider::validate_endpoint;
use crate::config::EmbeddingConfig;
use crate::types::{DocumateError, Result};

const DEFAULT_API_BASE: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "nomic-embed-text";

pub struct OllamaEmbeddings {
    api_base: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaEmbeddings {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        Ok(Self {
            api_base: validate_endpoint(config.api_base.as_deref().unwrap_or(DEFAULT_API_BASE))?,
            model: config.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            client: http_client(config.timeout_secs)?,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddings {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!("Embedding {} documents with {}", texts.len(), self.model);

        let response = self
            .client
            .post(format!("{}/api/embed", self.api_base))
            .json(&EmbedRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    DocumateError::Embedding(format!(
                        "Failed to connect to Ollama at {}. Is Ollama running?",
                        self.api_base
                    ))
                } else {
                    DocumateError::Embedding(format!("Ollama embedding request failed: {}", e))
                }
            })?;
        let response = check_status("Ollama", response).await?;

        let parsed: EmbedResponse = response.json().await.map_err(|e| {
            DocumateError::Embedding(format!("Failed to parse Ollama embeddings: {}", e))
        })?;
        ensure_count("Ollama", texts.len(), &parsed.embeddings)?;
        Ok(parsed.embeddings)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_documents(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| DocumateError::Embedding("Ollama returned no embedding".to_string()))
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let embedder = OllamaEmbeddings::new(&EmbeddingConfig::default()).unwrap();
        assert_eq!(embedder.model(), DEFAULT_MODEL);
        assert_eq!(embedder.api_base, DEFAULT_API_BASE);
    }
}
