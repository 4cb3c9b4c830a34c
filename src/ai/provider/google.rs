//! Google Gemini provider (`generateContent`).
//!
//! Structured calls set `responseMimeType: application/json` and carry the
//! schema inside the prompt; Gemini's own response schema dialect is a
//! subset of JSON Schema and rejects many of the schemas we send.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::{
    LlmProvider, LlmResponse, ProviderConfig, ResponseMetadata, ResponseTiming, TokenUsage,
    prompt_utils,
};
use crate::ai::validation::extract_json_from_response;
use crate::types::{DocumateError, Result};

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash-lite";

pub struct GoogleProvider {
    api_key: SecretString,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for GoogleProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl GoogleProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                DocumateError::Config("GOOGLE_API_KEY is not set in the environment.".to_string())
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DocumateError::LlmApi(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: SecretString::from(api_key),
            api_base: config
                .api_base
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: config
                .model
                .unwrap_or_else(|| DEFAULT_MODEL.to_string())
                .trim_start_matches("models/")
                .to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    fn build_request(&self, prompt: String, json_mode: bool) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_tokens,
                response_mime_type: json_mode.then(|| "application/json".to_string()),
            },
        }
    }

    async fn send(&self, request: GenerateRequest) -> Result<(String, TokenUsage, Duration)> {
        let start = Instant::now();
        let url = format!("{}/models/{}:generateContent", self.api_base, self.model);

        debug!("Sending request to Gemini API");
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| DocumateError::LlmApi(format!("Gemini request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DocumateError::LlmApi(format!(
                "Gemini API error ({}): {}",
                status, body
            )));
        }

        let body: GenerateResponse = response.json().await.map_err(|e| {
            DocumateError::LlmApi(format!("Failed to parse Gemini response: {}", e))
        })?;

        let usage = body
            .usage_metadata
            .as_ref()
            .map(|u| TokenUsage::new(u.prompt_token_count, u.candidates_token_count))
            .unwrap_or_default();

        let text = body.text().ok_or_else(|| {
            DocumateError::LlmApi("No content in Gemini response".to_string())
        })?;

        Ok((text, usage, start.elapsed()))
    }

    fn metadata(&self) -> ResponseMetadata {
        ResponseMetadata {
            model: self.model.clone(),
            provider: "google".to_string(),
        }
    }
}

#[async_trait]
impl LlmProvider for GoogleProvider {
    async fn generate(&self, prompt: &str, schema: &Value) -> Result<LlmResponse> {
        info!("Generating with Gemini (model: {})", self.model);

        let request = self.build_request(prompt_utils::build_schema_prompt(prompt, schema), true);
        let (text, usage, elapsed) = self.send(request).await?;
        let content = extract_json_from_response(&text)?;

        Ok(LlmResponse::with_metrics(
            content,
            usage,
            ResponseTiming::from_duration(elapsed),
            self.metadata(),
        ))
    }

    async fn complete(&self, prompt: &str) -> Result<LlmResponse> {
        debug!("Completing with Gemini (model: {})", self.model);

        let (text, usage, elapsed) = self.send(self.build_request(prompt.to_string(), false)).await?;
        Ok(LlmResponse::with_metrics(
            Value::String(text),
            usage,
            ResponseTiming::from_duration(elapsed),
            self.metadata(),
        ))
    }

    fn name(&self) -> &str {
        "google"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate
    fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?.content.as_ref()?;
        let text: String = candidate.parts.iter().map(|p| p.text.as_str()).collect();
        (!text.is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> GoogleProvider {
        GoogleProvider::new(ProviderConfig {
            provider: "google".to_string(),
            api_key: Some("g-test".to_string()),
            model: Some("models/gemini-test".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_model_prefix_stripped() {
        assert_eq!(provider().model(), "gemini-test");
    }

    #[test]
    fn test_request_shape() {
        let body = serde_json::to_value(provider().build_request("hi".to_string(), true)).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");

        let body = serde_json::to_value(provider().build_request("hi".to_string(), false)).unwrap();
        assert!(body["generationConfig"].get("responseMimeType").is_none());
    }

    #[test]
    fn test_response_text_joins_parts() {
        let raw = serde_json::json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": "a"}, {"text": "b"}]}}],
            "usageMetadata": {"promptTokenCount": 3, "candidatesTokenCount": 2}
        });
        let response: GenerateResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(response.text().as_deref(), Some("ab"));
        assert_eq!(response.usage_metadata.unwrap().prompt_token_count, 3);
    }

    #[test]
    fn test_empty_candidates_yield_none() {
        let response: GenerateResponse =
            serde_json::from_value(serde_json::json!({"candidates": []})).unwrap();
        assert!(response.text().is_none());
    }
}
