//! Retrieval-Augmented Answering
//!
//! Embeds a question, pulls the closest chunks from one repository's
//! collections (or from every repository), and asks the chat model for a
//! cited answer.

mod answerer;
mod context;
mod global;
mod prompts;

pub use answerer::QaAgent;
pub use context::{RetrievedChunk, format_global_context, format_repo_context};
pub use global::{GlobalQaAgent, NO_REPOSITORIES_MESSAGE};
