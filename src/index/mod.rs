//! Indexing
//!
//! Selects repository files, splits them into overlapping chunks and
//! persists their embeddings as vector collections.

pub mod filter;
pub mod indexer;
pub mod splitter;

pub use filter::{ContentFilter, FileFilters};
pub use indexer::Indexer;
pub use splitter::{Chunk, TextSplitter};
