//! Gemini embeddings (`batchEmbedContents` / `embedContent`).

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{EmbeddingProvider, check_status, ensure_count, http_client};
use crate::config::EmbeddingConfig;
use crate::types::{DocumateError, Result};

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "models/embedding-001";

pub struct GoogleEmbeddings {
    api_key: SecretString,
    api_base: String,
    /// Fully qualified model name (`models/...`)
    model: String,
    client: reqwest::Client,
}

impl GoogleEmbeddings {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let api_key = std::env::var("GOOGLE_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                DocumateError::Config("GOOGLE_API_KEY is not set in the environment.".to_string())
            })?;

        let model = config.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let model = if model.starts_with("models/") {
            model
        } else {
            format!("models/{}", model)
        };

        Ok(Self {
            api_key: SecretString::from(api_key),
            api_base: config
                .api_base
                .clone()
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            model,
            client: http_client(config.timeout_secs)?,
        })
    }

    fn request<'a>(&'a self, text: &'a str, task_type: &'static str) -> EmbedRequest<'a> {
        EmbedRequest {
            model: &self.model,
            content: EmbedContent {
                parts: vec![EmbedPart { text }],
            },
            task_type,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for GoogleEmbeddings {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!("Embedding {} documents with {}", texts.len(), self.model);

        let body = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|t| self.request(t, "RETRIEVAL_DOCUMENT"))
                .collect(),
        };
        let url = format!("{}/{}:batchEmbedContents", self.api_base, self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| DocumateError::Embedding(format!("Gemini embedding request failed: {}", e)))?;
        let response = check_status("Gemini", response).await?;

        let parsed: BatchEmbedResponse = response.json().await.map_err(|e| {
            DocumateError::Embedding(format!("Failed to parse Gemini embeddings: {}", e))
        })?;
        let vectors: Vec<Vec<f32>> = parsed.embeddings.into_iter().map(|e| e.values).collect();
        ensure_count("Gemini", texts.len(), &vectors)?;
        Ok(vectors)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/{}:embedContent", self.api_base, self.model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&self.request(text, "RETRIEVAL_QUERY"))
            .send()
            .await
            .map_err(|e| DocumateError::Embedding(format!("Gemini embedding request failed: {}", e)))?;
        let response = check_status("Gemini", response).await?;

        let parsed: SingleEmbedResponse = response.json().await.map_err(|e| {
            DocumateError::Embedding(format!("Failed to parse Gemini embedding: {}", e))
        })?;
        Ok(parsed.embedding.values)
    }

    fn name(&self) -> &str {
        "google"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedRequest<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedRequest<'a> {
    model: &'a str,
    content: EmbedContent<'a>,
    task_type: &'static str,
}

#[derive(Debug, Serialize)]
struct EmbedContent<'a> {
    parts: Vec<EmbedPart<'a>>,
}

#[derive(Debug, Serialize)]
struct EmbedPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Debug, Deserialize)]
struct SingleEmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}
