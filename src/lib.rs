//! Documate - Chat with Code Repositories
//!
//! Ingests git repositories and ZIP archives, indexes them into vector
//! collections, and answers questions about them with source citations.
//! On top of retrieval it plans and writes a hierarchical wiki per
//! repository and a single-document README.
//!
//! ## Core Features
//!
//! - **Ingestion**: git clone (optionally with a personal access token) or ZIP upload
//! - **Indexing**: extension/glob filtering, overlapping chunks, batched embeddings
//! - **Q&A**: per-repository hybrid code + wiki retrieval, and global search across repositories
//! - **Wiki pipeline**: architect → hierarchy → page writer → orchestrator
//! - **README agent**: planner → research → diagram → document, under a step budget
//!
//! ## Quick Start
//!
//! ```ignore
//! use documate::{AppContext, ConfigLoader};
//!
//! let config = ConfigLoader::load()?;
//! let app = AppContext::from_config(&config)?;
//! let repo = app.repos.clone_repo("https://github.com/owner/repo.git", None).await;
//! if let Some(path) = repo {
//!     app.indexer.index_repository(&path).await?;
//!     println!("{}", app.qa.answer("How is the server started?", "owner_repo").await?);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: chat and embedding providers, prompt building, diagram validation
//! - [`index`]: content filter, text splitter, indexer
//! - [`storage`]: SQLite-backed vector collections and their layout
//! - [`rag`]: repository and global answerers
//! - [`wiki`]: wiki planning, hierarchy reconstruction, page writing
//! - [`docs`]: README agent

pub mod ai;
pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod docs;
pub mod index;
pub mod pipeline;
pub mod rag;
pub mod repo;
pub mod storage;
pub mod types;
pub mod wiki;

#[cfg(test)]
pub(crate) mod testing;

// =============================================================================
// Core Re-exports
// =============================================================================

pub use app::AppContext;
pub use config::{Config, ConfigLoader};
pub use types::error::{DocumateError, Result, ResultExt};

// =============================================================================
// Component Re-exports
// =============================================================================

pub use ai::{EmbeddingProvider, LlmProvider, LlmResponse, create_embedder, create_provider};
pub use docs::DocumentationAgent;
pub use index::{ContentFilter, Indexer, TextSplitter};
pub use rag::{GlobalQaAgent, QaAgent};
pub use repo::RepoManager;
pub use storage::{Collection, CollectionKind, CollectionLayout};
pub use wiki::{WikiOrchestrator, WikiStructure};
