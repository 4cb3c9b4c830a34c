//! Configuration Types
//!
//! All configuration structures with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{diagram, indexing, layout, network, pipeline, retrieval};
use crate::types::{DocumateError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Storage locations
    pub paths: PathsConfig,

    /// Chat model settings
    pub llm: LlmConfig,

    /// Embedding model settings
    pub embedding: EmbeddingConfig,

    /// Chunking settings
    pub indexing: IndexingConfig,

    /// Per-collection retrieval fan-out
    pub retrieval: RetrievalConfig,

    /// Diagram trigger and acceptance policy
    pub diagram: DiagramConfig,

    /// Staged pipeline limits
    pub agent: AgentConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            paths: PathsConfig::default(),
            llm: LlmConfig::default(),
            embedding: EmbeddingConfig::default(),
            indexing: IndexingConfig::default(),
            retrieval: RetrievalConfig::default(),
            diagram: DiagramConfig::default(),
            agent: AgentConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `DocumateError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(DocumateError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 || self.embedding.timeout_secs == 0 {
            return Err(DocumateError::Config(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.indexing.chunk_size == 0 {
            return Err(DocumateError::Config(
                "indexing.chunk_size must be greater than 0".to_string(),
            ));
        }

        if self.indexing.chunk_overlap >= self.indexing.chunk_size {
            return Err(DocumateError::Config(format!(
                "indexing.chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.indexing.chunk_overlap, self.indexing.chunk_size
            )));
        }

        if self.embedding.batch_size == 0 {
            return Err(DocumateError::Config(
                "embedding.batch_size must be greater than 0".to_string(),
            ));
        }

        let r = &self.retrieval;
        if [r.code_k, r.wiki_k, r.single_k, r.global_k].contains(&0) {
            return Err(DocumateError::Config(
                "retrieval k values must be greater than 0".to_string(),
            ));
        }

        if self.diagram.required_token.trim().is_empty() || self.diagram.arrow_tokens.is_empty()
        {
            return Err(DocumateError::Config(
                "diagram.required_token and diagram.arrow_tokens must not be empty".to_string(),
            ));
        }

        if self.agent.max_steps == 0 {
            return Err(DocumateError::Config(
                "agent.max_steps must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Paths
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Where cloned and extracted repositories live
    pub clone_root: PathBuf,
    /// Where vector collections are persisted
    pub vector_root: PathBuf,
    /// Where generated wikis are written
    pub wiki_root: PathBuf,
    /// JSON document with `allowed_extensions` and `excluded_patterns`
    pub filters_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            clone_root: PathBuf::from(layout::CLONE_ROOT),
            vector_root: PathBuf::from(layout::VECTOR_ROOT),
            wiki_root: PathBuf::from(layout::WIKI_ROOT),
            filters_file: PathBuf::from(layout::FILTERS_FILE),
        }
    }
}

// =============================================================================
// Providers
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider: google, openai, ollama, azure
    pub provider: String,
    /// Model override (provider default when unset)
    pub model: Option<String>,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub max_tokens: usize,
    /// Custom endpoint
    pub api_base: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "google".to_string(),
            model: None,
            temperature: 0.1,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            max_tokens: 8192,
            api_base: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Provider: google, openai, ollama, azure
    pub provider: String,
    /// Model (or Azure deployment) override
    pub model: Option<String>,
    /// Custom endpoint
    pub api_base: Option<String>,
    pub timeout_secs: u64,
    /// Texts per embedding request
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "google".to_string(),
            model: None,
            api_base: None,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            batch_size: indexing::EMBEDDING_BATCH_SIZE,
        }
    }
}

// =============================================================================
// Indexing & Retrieval
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            chunk_size: indexing::CHUNK_SIZE,
            chunk_overlap: indexing::CHUNK_OVERLAP,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub code_k: usize,
    pub wiki_k: usize,
    pub single_k: usize,
    pub global_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            code_k: retrieval::CODE_K,
            wiki_k: retrieval::WIKI_K,
            single_k: retrieval::SINGLE_K,
            global_k: retrieval::GLOBAL_K,
        }
    }
}

// =============================================================================
// Diagram Policy & Agents
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    /// Case-insensitive keywords that make a page worth a diagram
    pub trigger_keywords: Vec<String>,
    /// Token every accepted diagram must contain
    pub required_token: String,
    /// Accepted diagrams contain at least one of these
    pub arrow_tokens: Vec<String>,
    /// Model reply meaning "no diagram"
    pub ignore_sentinel: String,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            trigger_keywords: diagram::TRIGGER_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            required_token: diagram::REQUIRED_TOKEN.to_string(),
            arrow_tokens: diagram::ARROW_TOKENS.iter().map(|s| s.to_string()).collect(),
            ignore_sentinel: diagram::IGNORE_SENTINEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Maximum stage transitions per pipeline run
    pub max_steps: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: pipeline::MAX_STEPS,
        }
    }
}
