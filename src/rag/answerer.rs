//! Per-repository question answering over code and wiki collections.

use std::sync::Arc;
use tracing::info;

use super::context::{RetrievedChunk, format_repo_context, search_collection};
use super::prompts;
use crate::ai::{SharedEmbedder, SharedProvider};
use crate::config::RetrievalConfig;
use crate::storage::{CollectionKind, CollectionLayout};
use crate::types::{DocumateError, Result};

pub struct QaAgent {
    llm: SharedProvider,
    embedder: SharedEmbedder,
    layout: CollectionLayout,
    retrieval: RetrievalConfig,
}

impl QaAgent {
    pub fn new(
        llm: SharedProvider,
        embedder: SharedEmbedder,
        layout: CollectionLayout,
        retrieval: RetrievalConfig,
    ) -> Self {
        Self {
            llm,
            embedder,
            layout,
            retrieval,
        }
    }

    fn k_for(&self, kind: CollectionKind) -> usize {
        match kind {
            CollectionKind::Code => self.retrieval.code_k,
            CollectionKind::Wiki => self.retrieval.wiki_k,
            CollectionKind::Legacy => self.retrieval.single_k,
        }
    }

    /// Answer `question` from the repository's collections.
    ///
    /// Fails with [`DocumateError::CollectionNotFound`] when the repository
    /// has never been indexed. The model's text is returned as-is.
    pub async fn answer(&self, question: &str, repo_name: &str) -> Result<String> {
        info!("Querying repository '{}' with question: '{}'", repo_name, question);

        let collections = self.layout.available(repo_name);
        if collections.is_empty() {
            return Err(DocumateError::CollectionNotFound {
                repo: repo_name.to_string(),
            });
        }

        let query = Arc::new(self.embedder.embed_query(question).await?);

        let mut retrieved = Vec::new();
        for (kind, dir) in collections {
            let hits = search_collection(&dir, query.clone(), self.k_for(kind), &*self.embedder).await?;
            retrieved.extend(hits.into_iter().map(|chunk| RetrievedChunk {
                repo: repo_name.to_string(),
                kind,
                chunk,
            }));
        }

        let context = format_repo_context(&retrieved);
        let prompt = prompts::repo_answer(repo_name, &context, question);
        let response = self.llm.complete(&prompt).await?;
        Ok(response.text())
    }
}
