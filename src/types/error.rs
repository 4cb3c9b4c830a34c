//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//!
//! ## Error Classes
//!
//! - **Configuration**: missing environment values, unreadable credentials,
//!   unknown or unimplemented providers. Raised at startup, never retried.
//! - **Ingestion**: clone or extraction failures. Surfaced to callers as
//!   `None` by the repository manager, with details in the logs.
//! - **Retrieval**: a repository with no persisted collection, kept distinct
//!   from "the model produced no answer".
//! - **Pipeline**: any failure inside a staged pipeline propagates to the
//!   top-level caller unchanged.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumateError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    #[error("{0} is not yet implemented")]
    NotImplemented(String),

    // -------------------------------------------------------------------------
    // Model Errors
    // -------------------------------------------------------------------------
    #[error("LLM API error: {0}")]
    LlmApi(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Vector store for repository '{repo}' not found")]
    CollectionNotFound { repo: String },

    #[error("{what} not found: {}", path.display())]
    NotFound { what: &'static str, path: PathBuf },

    #[error("Ingestion failed: {0}")]
    Ingestion(String),

    #[error("Storage error: {0}")]
    Storage(String),

    /// A stage of a staged pipeline failed
    #[error("Pipeline error in stage {stage}: {message}")]
    Pipeline { stage: String, message: String },

    #[error("Step limit of {limit} reached before the pipeline finished")]
    StepLimitExceeded { limit: usize },
}

pub type Result<T> = std::result::Result<T, DocumateError>;

impl DocumateError {
    pub fn not_found(what: &'static str, path: impl Into<PathBuf>) -> Self {
        Self::NotFound {
            what,
            path: path.into(),
        }
    }

    pub fn pipeline(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Pipeline {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Errors the user must fix before anything can run
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_) | Self::NotImplemented(_))
    }
}

/// Context extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> Result<T>;

    /// Add context using a closure (lazy evaluation)
    fn with_context_fn<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: std::error::Error + Send + Sync + 'static> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> Result<T> {
        self.map_err(|e| DocumateError::Storage(format!("{}: {}", context.into(), e)))
    }

    fn with_context_fn<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| DocumateError::Storage(format!("{}: {}", f().into(), e)))
    }
}
