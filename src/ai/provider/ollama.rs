//! Ollama Local LLM Provider
//!
//! Talks to a locally-running Ollama daemon through `/api/generate`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{
    LlmProvider, LlmResponse, ProviderConfig, ResponseMetadata, ResponseTiming, TokenUsage,
    prompt_utils,
};
use crate::ai::validation::extract_json_from_response;
use crate::types::{DocumateError, Result};

const DEFAULT_API_BASE: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3:latest";

/// Ollama Local LLM Provider
pub struct OllamaProvider {
    api_base: String,
    model: String,
    temperature: f32,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_base = validate_endpoint(
            config.api_base.as_deref().unwrap_or(DEFAULT_API_BASE),
        )?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DocumateError::LlmApi(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_base,
            model: config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: config.temperature,
            client,
        })
    }

    fn build_request(&self, prompt: String, json_mode: bool) -> OllamaRequest {
        OllamaRequest {
            model: self.model.clone(),
            prompt,
            stream: false,
            options: Some(OllamaOptions {
                temperature: self.temperature,
            }),
            format: json_mode.then(|| "json".to_string()),
        }
    }

    async fn send(&self, request: OllamaRequest) -> Result<(OllamaResponse, Duration)> {
        let start = Instant::now();
        let url = format!("{}/api/generate", self.api_base);

        debug!("Sending request to Ollama API");
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    DocumateError::LlmApi(format!(
                        "Failed to connect to Ollama at {}. Is Ollama running? Start with: ollama serve",
                        self.api_base
                    ))
                } else {
                    DocumateError::LlmApi(format!("Ollama request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DocumateError::LlmApi(format!(
                "Ollama API error ({}): {}",
                status, body
            )));
        }

        let body: OllamaResponse = response.json().await.map_err(|e| {
            DocumateError::LlmApi(format!("Failed to parse Ollama response: {}", e))
        })?;
        Ok((body, start.elapsed()))
    }

    fn finish(&self, content: Value, body: &OllamaResponse, elapsed: Duration) -> LlmResponse {
        LlmResponse::with_metrics(
            content,
            TokenUsage::new(
                body.prompt_eval_count.unwrap_or(0),
                body.eval_count.unwrap_or(0),
            ),
            ResponseTiming::from_duration(elapsed),
            ResponseMetadata {
                model: self.model.clone(),
                provider: "ollama".to_string(),
            },
        )
    }
}

/// Accept only http(s) endpoints and warn when the daemon is not local.
pub(crate) fn validate_endpoint(endpoint: &str) -> Result<String> {
    let url = url::Url::parse(endpoint).map_err(|e| {
        DocumateError::Config(format!("Invalid Ollama endpoint URL '{}': {}", endpoint, e))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(DocumateError::Config(format!(
            "Ollama endpoint must use http or https scheme, got: {}",
            url.scheme()
        )));
    }

    if let Some(host) = url.host_str()
        && !matches!(host, "localhost" | "127.0.0.1" | "::1" | "[::1]")
    {
        warn!("Ollama endpoint is not localhost: {}", host);
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn generate(&self, prompt: &str, schema: &Value) -> Result<LlmResponse> {
        info!("Generating with Ollama (model: {})", self.model);

        let request = self.build_request(prompt_utils::build_schema_prompt(prompt, schema), true);
        let (body, elapsed) = self.send(request).await?;
        let content = extract_json_from_response(&body.response)?;
        Ok(self.finish(content, &body, elapsed))
    }

    async fn complete(&self, prompt: &str) -> Result<LlmResponse> {
        debug!("Completing with Ollama (model: {})", self.model);

        let (body, elapsed) = self.send(self.build_request(prompt.to_string(), false)).await?;
        let content = Value::String(body.response.clone());
        Ok(self.finish(content, &body, elapsed))
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let provider = OllamaProvider::new(ProviderConfig {
            provider: "ollama".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(provider.api_base, DEFAULT_API_BASE);
        assert_eq!(provider.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        assert!(validate_endpoint("file:///etc/passwd").is_err());
        assert!(validate_endpoint("not a url").is_err());
    }

    #[test]
    fn test_completion_request_is_plain_text() {
        let provider = OllamaProvider::new(ProviderConfig::default()).unwrap();
        let request = provider.build_request("hello".to_string(), false);
        assert!(request.format.is_none());
        assert!(!request.stream);
    }
}
