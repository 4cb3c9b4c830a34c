//! Azure OpenAI embeddings authenticated with a certificate credential.
//!
//! Requests go to `{endpoint}/openai/deployments/{deployment}/embeddings`
//! with a bearer token minted by [`AzureCertificateCredential`].

use async_trait::async_trait;
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::debug;

use super::openai::{EmbeddingRequest, parse_embedding_response};
use super::{EmbeddingProvider, check_status, ensure_count, http_client};
use crate::ai::auth::{AZURE_COGNITIVE_SCOPE, AzureCertificateCredential};
use crate::config::EmbeddingConfig;
use crate::types::{DocumateError, Result};

const DEFAULT_API_VERSION: &str = "2024-02-01";

pub struct AzureEmbeddings {
    endpoint: String,
    deployment: String,
    api_version: String,
    credential: Arc<AzureCertificateCredential>,
    client: reqwest::Client,
}

impl AzureEmbeddings {
    /// Build from `AZURE_OPENAI_ENDPOINT`, `AZURE_EMBEDDING_DEPLOYMENT_NAME`
    /// and `AZURE_OPENAI_API_VERSION` plus the certificate identity variables.
    /// `embedding.api_base` and `embedding.model` override endpoint and
    /// deployment.
    pub fn from_env(config: &EmbeddingConfig) -> Result<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        let endpoint = config
            .api_base
            .clone()
            .or_else(|| var("AZURE_OPENAI_ENDPOINT"))
            .ok_or_else(|| DocumateError::Config("AZURE_OPENAI_ENDPOINT is not set.".to_string()))?;
        let deployment = config
            .model
            .clone()
            .or_else(|| var("AZURE_EMBEDDING_DEPLOYMENT_NAME"))
            .ok_or_else(|| {
                DocumateError::Config("AZURE_EMBEDDING_DEPLOYMENT_NAME is not set.".to_string())
            })?;
        let api_version =
            var("AZURE_OPENAI_API_VERSION").unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        let credential = Arc::new(AzureCertificateCredential::from_env()?);
        Self::new(endpoint, deployment, api_version, credential, config.timeout_secs)
    }

    pub fn new(
        endpoint: String,
        deployment: String,
        api_version: String,
        credential: Arc<AzureCertificateCredential>,
        timeout_secs: u64,
    ) -> Result<Self> {
        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            deployment,
            api_version,
            credential,
            client: http_client(timeout_secs)?,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/embeddings?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }
}

#[async_trait]
impl EmbeddingProvider for AzureEmbeddings {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!("Embedding {} documents with Azure deployment {}", texts.len(), self.deployment);

        let token = self.credential.token(AZURE_COGNITIVE_SCOPE).await?;
        let response = self
            .client
            .post(self.url())
            .bearer_auth(token.expose_secret())
            .json(&EmbeddingRequest {
                model: None,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| DocumateError::Embedding(format!("Azure embedding request failed: {}", e)))?;
        let response = check_status("Azure OpenAI", response).await?;

        let vectors = parse_embedding_response(response).await?;
        ensure_count("Azure OpenAI", texts.len(), &vectors)?;
        Ok(vectors)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_documents(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| DocumateError::Embedding("Azure returned no embedding".to_string()))
    }

    fn name(&self) -> &str {
        "azure"
    }

    fn model(&self) -> &str {
        &self.deployment
    }
}
