//! Retrieval and context assembly shared by the answerers.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::ai::EmbeddingProvider;
use crate::storage::{Collection, CollectionKind, ScoredChunk};
use crate::types::{DocumateError, Result};

/// A search hit tagged with where it came from
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub repo: String,
    pub kind: CollectionKind,
    pub chunk: ScoredChunk,
}

/// Open the collection at `dir` and return its `k` best matches for `query`.
///
/// A collection embedded with a different model than `embedder` is still
/// searched; the mismatch is only logged.
pub(crate) async fn search_collection(
    dir: &Path,
    query: Arc<Vec<f32>>,
    k: usize,
    embedder: &dyn EmbeddingProvider,
) -> Result<Vec<ScoredChunk>> {
    let active_provider = embedder.name().to_string();
    let active_model = embedder.model().to_string();
    let dir: PathBuf = dir.to_path_buf();

    tokio::task::spawn_blocking(move || {
        let collection = Collection::open(&dir)?;
        let meta = collection.meta();
        if meta.provider != active_provider || meta.model != active_model {
            warn!(
                "Collection {} was embedded with {}/{} but the active embedder is {}/{}",
                dir.display(),
                meta.provider,
                meta.model,
                active_provider,
                active_model
            );
        }
        let hits = collection.search(&query, k)?;
        debug!("Retrieved {} chunks from {}", hits.len(), dir.display());
        Ok(hits)
    })
    .await
    .map_err(|e| DocumateError::Storage(format!("Retrieval task failed: {}", e)))?
}

/// Context for a single repository:
/// `--- START OF [Source Code] src/lib.rs ---` ... `--- END OF src/lib.rs ---`
pub fn format_repo_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .map(|c| {
            format!(
                "--- START OF [{}] {} ---\n{}\n--- END OF {} ---",
                c.kind.label(),
                c.chunk.source,
                c.chunk.content,
                c.chunk.source
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Context spanning repositories; each chunk names its repository, content
/// type and file name.
pub fn format_global_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .map(|c| {
            format!(
                "--- START OF CONTEXT {} ---\n{}\n--- END OF CONTEXT ---",
                global_header(c),
                c.chunk.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn global_header(chunk: &RetrievedChunk) -> String {
    let filename = Path::new(&chunk.chunk.source)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| chunk.chunk.source.clone());
    format!(
        "[From Repo: {}, Type: {}, File: {}]",
        chunk.repo,
        chunk.kind.label(),
        filename
    )
}
