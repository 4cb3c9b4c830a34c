//! In-crate test doubles for the model providers.

use async_trait::async_trait;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::{Arc, Mutex};

use crate::ai::{EmbeddingProvider, LlmProvider, LlmResponse, SharedEmbedder, SharedProvider};
use crate::types::{DocumateError, Result};

const MOCK_DIMENSIONS: usize = 64;

/// Deterministic bag-of-words embedder: texts sharing words score higher.
#[derive(Debug, Default)]
pub struct MockEmbedder {
    fail: bool,
}

impl MockEmbedder {
    pub fn shared() -> SharedEmbedder {
        Arc::new(Self::default())
    }

    pub fn failing() -> SharedEmbedder {
        Arc::new(Self { fail: true })
    }

    pub fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; MOCK_DIMENSIONS];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let digest = Sha256::digest(token.to_lowercase().as_bytes());
            v[digest[0] as usize % MOCK_DIMENSIONS] += 1.0;
        }
        v
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if self.fail {
            return Err(DocumateError::Embedding("mock embedder failure".to_string()));
        }
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        if self.fail {
            return Err(DocumateError::Embedding("mock embedder failure".to_string()));
        }
        Ok(Self::vector(text))
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-embedding"
    }
}

enum Reply {
    Text(String),
    Json(Value),
    Fail,
}

/// Rule-based chat model. The first rule whose pattern occurs in the
/// prompt decides the reply; unmatched prompts get the default text.
pub struct ScriptedLlm {
    rules: Vec<(String, Reply)>,
    default_text: String,
    prompts: Mutex<Vec<String>>,
}

impl Default for ScriptedLlm {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedLlm {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            default_text: "mock answer".to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn on(mut self, pattern: &str, reply: &str) -> Self {
        self.rules
            .push((pattern.to_string(), Reply::Text(reply.to_string())));
        self
    }

    pub fn on_json(mut self, pattern: &str, reply: Value) -> Self {
        self.rules.push((pattern.to_string(), Reply::Json(reply)));
        self
    }

    pub fn fail_on(mut self, pattern: &str) -> Self {
        self.rules.push((pattern.to_string(), Reply::Fail));
        self
    }

    pub fn with_default(mut self, reply: &str) -> Self {
        self.default_text = reply.to_string();
        self
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Every prompt received so far, in order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn reply(&self, prompt: &str) -> Result<Value> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        match self.rules.iter().find(|(pattern, _)| prompt.contains(pattern.as_str())) {
            Some((_, Reply::Text(text))) => Ok(Value::String(text.clone())),
            Some((_, Reply::Json(value))) => Ok(value.clone()),
            Some((pattern, Reply::Fail)) => {
                Err(DocumateError::LlmApi(format!("scripted failure on '{}'", pattern)))
            }
            None => Ok(Value::String(self.default_text.clone())),
        }
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    async fn generate(&self, prompt: &str, _schema: &Value) -> Result<LlmResponse> {
        let value = self.reply(prompt)?;
        let value = match value {
            Value::String(s) => crate::ai::validation::extract_json_from_response(&s)?,
            other => other,
        };
        Ok(LlmResponse::content_only(value))
    }

    async fn complete(&self, prompt: &str) -> Result<LlmResponse> {
        Ok(LlmResponse::content_only(self.reply(prompt)?))
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }
}

/// Upcast a scripted model for components that take a shared provider
pub fn shared(llm: &Arc<ScriptedLlm>) -> SharedProvider {
    llm.clone()
}

/// Persist a collection at `dir` whose chunks are embedded by [`MockEmbedder`]
pub fn seed_collection(dir: &std::path::Path, docs: &[(&str, &str)]) {
    let chunks: Vec<crate::storage::EmbeddedChunk> = docs
        .iter()
        .enumerate()
        .map(|(ordinal, (source, content))| crate::storage::EmbeddedChunk {
            source: source.to_string(),
            ordinal,
            content: content.to_string(),
            embedding: MockEmbedder::vector(content),
        })
        .collect();
    crate::storage::Collection::create(dir, "mock", "mock-embedding", &chunks)
        .expect("seed collection");
}

/// Config rooted at `root` with a filter document allowing `.rs` and `.md`
pub fn config_in(root: &std::path::Path) -> crate::config::Config {
    let mut config = crate::config::Config::default();
    config.paths.clone_root = root.join("repos");
    config.paths.vector_root = root.join("vectors");
    config.paths.wiki_root = root.join("wikis");
    config.paths.filters_file = root.join("file_filters.json");
    std::fs::write(
        &config.paths.filters_file,
        r#"{"allowed_extensions": [".rs", ".md"], "excluded_patterns": []}"#,
    )
    .expect("write filters");
    config
}

/// Application context under `root` driven by `llm` and [`MockEmbedder`]
pub fn app_with(root: &std::path::Path, llm: &Arc<ScriptedLlm>) -> crate::app::AppContext {
    crate::app::AppContext::with_providers(&config_in(root), shared(llm), MockEmbedder::shared())
        .expect("build app context")
}

pub fn app_in(root: &std::path::Path) -> crate::app::AppContext {
    app_with(root, &ScriptedLlm::new().into_shared())
}
