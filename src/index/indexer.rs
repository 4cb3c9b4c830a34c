//! Indexer: files → chunks → embeddings → collection.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::filter::ContentFilter;
use super::splitter::{Chunk, TextSplitter};
use crate::ai::SharedEmbedder;
use crate::storage::{Collection, CollectionKind, CollectionLayout, EmbeddedChunk};
use crate::types::{DocumateError, Result};

pub struct Indexer {
    filter: ContentFilter,
    splitter: TextSplitter,
    embedder: SharedEmbedder,
    layout: CollectionLayout,
    batch_size: usize,
}

impl Indexer {
    pub fn new(
        filter: ContentFilter,
        splitter: TextSplitter,
        embedder: SharedEmbedder,
        layout: CollectionLayout,
        batch_size: usize,
    ) -> Self {
        Self {
            filter,
            splitter,
            embedder,
            layout,
            batch_size: batch_size.max(1),
        }
    }

    /// Filter a repository's files and index them into its code collection.
    ///
    /// The repository name is the directory name of `repo_path`.
    pub async fn index_repository(&self, repo_path: &Path) -> Result<bool> {
        let repo_name = repo_name_of(repo_path)?;
        info!("Starting analysis for: {}", repo_name);

        let files = self.filter.select(repo_path);
        if files.is_empty() {
            info!("No relevant files found to process in {}", repo_path.display());
            return Ok(false);
        }

        let target = self.layout.dir(&repo_name, CollectionKind::Code);
        self.index(&files, repo_path, &target).await
    }

    /// Index a repository's generated wiki pages into its wiki collection
    pub async fn index_wiki(&self, repo_name: &str, pages: &[PathBuf], wiki_dir: &Path) -> Result<bool> {
        let target = self.layout.dir(repo_name, CollectionKind::Wiki);
        self.index(pages, wiki_dir, &target).await
    }

    /// Chunk, embed and persist `paths` as a fresh collection at `target`.
    ///
    /// Chunk sources are recorded relative to `root`. Unreadable and
    /// non-UTF-8 files are skipped. Returns `false` without touching
    /// `target` when nothing could be chunked.
    pub async fn index(&self, paths: &[PathBuf], root: &Path, target: &Path) -> Result<bool> {
        let mut chunks: Vec<Chunk> = Vec::new();
        let mut loaded = 0usize;

        for path in paths {
            let bytes = match tokio::fs::read(path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Could not load file {}: {}", path.display(), e);
                    continue;
                }
            };
            let text = match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(_) => {
                    warn!("Could not load file {}: not valid UTF-8", path.display());
                    continue;
                }
            };
            loaded += 1;
            chunks.extend(self.splitter.split_document(&relative_source(path, root), &text));
        }

        info!("Split {} documents into {} chunks", loaded, chunks.len());
        if chunks.is_empty() {
            info!("No documents could be loaded or split for {}", target.display());
            return Ok(false);
        }

        let mut embedded = Vec::with_capacity(chunks.len());
        let total_batches = chunks.len().div_ceil(self.batch_size);
        for (i, batch) in chunks.chunks(self.batch_size).enumerate() {
            debug!("Embedding batch {}/{}", i + 1, total_batches);
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let vectors = self.embedder.embed_documents(&texts).await?;
            embedded.extend(batch.iter().zip(vectors).map(|(chunk, embedding)| EmbeddedChunk {
                source: chunk.source.clone(),
                ordinal: chunk.ordinal,
                content: chunk.content.clone(),
                embedding,
            }));
        }

        info!("Generating embeddings and persisting to: {}", target.display());
        let target = target.to_path_buf();
        let provider = self.embedder.name().to_string();
        let model = self.embedder.model().to_string();
        tokio::task::spawn_blocking(move || Collection::create(&target, &provider, &model, &embedded))
            .await
            .map_err(|e| DocumateError::Storage(format!("Indexing task failed: {}", e)))??;

        Ok(true)
    }
}

fn repo_name_of(repo_path: &Path) -> Result<String> {
    repo_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| DocumateError::not_found("Repository directory", repo_path))
}

/// `path` relative to `root` with `/` separators, or the full path when it
/// lies outside `root`
fn relative_source(path: &Path, root: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) => rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path.to_string_lossy().to_string(),
    }
}
