//! Vector Storage
//!
//! SQLite-backed vector collections and the directory layout that maps
//! repositories to them.

pub mod collection;
pub mod database;
pub mod layout;

pub use collection::{Collection, CollectionMeta, EmbeddedChunk, ScoredChunk, cosine_similarity};
pub use database::{Database, PoolConfig};
pub use layout::{CollectionKind, CollectionLayout};
