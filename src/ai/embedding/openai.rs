//! OpenAI embeddings (`/embeddings`).
//!
//! The response types are shared with the Azure OpenAI client, which
//! speaks the same wire format behind a different URL and credential.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{EmbeddingProvider, check_status, ensure_count, http_client};
use crate::config::EmbeddingConfig;
use crate::types::{DocumateError, Result};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "text-embedding-3-small";

pub struct OpenAiEmbeddings {
    api_key: SecretString,
    api_base: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiEmbeddings {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            DocumateError::Config("OpenAI API key not found. Set OPENAI_API_KEY".to_string())
        })?;

        Ok(Self {
            api_key: SecretString::from(api_key),
            api_base: config
                .api_base
                .clone()
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: config.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            client: http_client(config.timeout_secs)?,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!("Embedding {} documents with {}", texts.len(), self.model);

        let response = self
            .client
            .post(format!("{}/embeddings", self.api_base))
            .bearer_auth(self.api_key.expose_secret())
            .json(&EmbeddingRequest {
                model: Some(&self.model),
                input: texts,
            })
            .send()
            .await
            .map_err(|e| DocumateError::Embedding(format!("OpenAI embedding request failed: {}", e)))?;
        let response = check_status("OpenAI", response).await?;

        let vectors = parse_embedding_response(response).await?;
        ensure_count("OpenAI", texts.len(), &vectors)?;
        Ok(vectors)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_documents(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| DocumateError::Embedding("OpenAI returned no embedding".to_string()))
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
pub(super) struct EmbeddingRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<&'a str>,
    pub input: &'a [String],
}

#[derive(Debug, Deserialize)]
pub(super) struct EmbeddingResponse {
    pub data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
pub(super) struct EmbeddingData {
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub index: usize,
}

impl EmbeddingResponse {
    /// Vectors ordered by their input index
    pub fn into_vectors(mut self) -> Vec<Vec<f32>> {
        self.data.sort_by_key(|d| d.index);
        self.data.into_iter().map(|d| d.embedding).collect()
    }
}

pub(super) async fn parse_embedding_response(response: reqwest::Response) -> Result<Vec<Vec<f32>>> {
    let parsed: EmbeddingResponse = response
        .json()
        .await
        .map_err(|e| DocumateError::Embedding(format!("Failed to parse embeddings: {}", e)))?;
    Ok(parsed.into_vectors())
}
