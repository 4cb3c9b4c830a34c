//! Embedding Provider Abstraction
//!
//! Turns text into vectors for the collections in `storage`. The same
//! provider must embed a collection's chunks and the queries run against
//! it; collections record the provider and model they were built with.

mod azure;
mod google;
mod ollama;
mod openai;

pub use azure::AzureEmbeddings;
pub use google::GoogleEmbeddings;
pub use ollama::OllamaEmbeddings;
pub use openai::OpenAiEmbeddings;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::EmbeddingConfig;
use crate::types::{DocumateError, Result};

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed document chunks, one vector per input in input order
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a search query
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Provider name recorded in collection metadata
    fn name(&self) -> &str;

    /// Model name recorded in collection metadata
    fn model(&self) -> &str;
}

pub type SharedEmbedder = Arc<dyn EmbeddingProvider>;

/// Create the embedding provider selected by configuration
pub fn create_embedder(config: &EmbeddingConfig) -> Result<SharedEmbedder> {
    let provider = config.provider.to_lowercase();
    tracing::info!("Embedding provider selected: {}", provider);

    match provider.as_str() {
        "google" => Ok(Arc::new(GoogleEmbeddings::new(config)?)),
        "openai" => Ok(Arc::new(OpenAiEmbeddings::new(config)?)),
        "ollama" => Ok(Arc::new(OllamaEmbeddings::new(config)?)),
        "azure" => Ok(Arc::new(AzureEmbeddings::from_env(config)?)),
        other => Err(DocumateError::Config(format!(
            "Unsupported embedding provider: '{}'. Please use 'google', 'openai', 'ollama' or 'azure'.",
            other
        ))),
    }
}

/// Check that a provider returned one vector per input
pub(crate) fn ensure_count(provider: &str, expected: usize, vectors: &[Vec<f32>]) -> Result<()> {
    if vectors.len() != expected {
        return Err(DocumateError::Embedding(format!(
            "{} returned {} embeddings for {} inputs",
            provider,
            vectors.len(),
            expected
        )));
    }
    Ok(())
}

pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| DocumateError::Embedding(format!("Failed to create HTTP client: {}", e)))
}

/// Turn a non-success response into an `Embedding` error carrying its body
pub(crate) async fn check_status(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(DocumateError::Embedding(format!(
        "{} embedding error ({}): {}",
        provider, status, body
    )))
}
