//! Repository Ingestion
//!
//! Brings repositories onto local disk from git URLs or ZIP uploads.

mod manager;

pub use manager::RepoManager;
