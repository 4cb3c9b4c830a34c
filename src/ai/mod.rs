//! AI Integration Layer
//!
//! Chat and embedding providers, the credential flow they need, prompt
//! assembly, and validation of what models return.

pub mod auth;
pub mod embedding;
pub mod prompt;
pub mod provider;
pub mod validation;

pub use embedding::{EmbeddingProvider, SharedEmbedder, create_embedder};
pub use provider::{
    LlmProvider, LlmResponse, ProviderConfig, ResponseMetadata, ResponseTiming, SharedProvider,
    TokenUsage, create_provider,
};
pub use validation::{DiagramPolicy, Segment};
