//! Cross-repository question answering.

use std::sync::Arc;
use tracing::{debug, info};

use super::context::{RetrievedChunk, format_global_context, search_collection};
use super::prompts;
use crate::ai::{SharedEmbedder, SharedProvider};
use crate::storage::CollectionLayout;
use crate::types::Result;

/// Reply when no repository has a collection yet
pub const NO_REPOSITORIES_MESSAGE: &str =
    "No repositories have been indexed yet. Please add a repository first.";

pub struct GlobalQaAgent {
    llm: SharedProvider,
    embedder: SharedEmbedder,
    layout: CollectionLayout,
    k: usize,
}

impl GlobalQaAgent {
    pub fn new(llm: SharedProvider, embedder: SharedEmbedder, layout: CollectionLayout, k: usize) -> Self {
        Self {
            llm,
            embedder,
            layout,
            k,
        }
    }

    /// Answer `question` from every collection of every indexed repository
    pub async fn answer(&self, question: &str) -> Result<String> {
        let targets: Vec<_> = self
            .layout
            .repositories()?
            .into_iter()
            .flat_map(|repo| {
                self.layout
                    .available(&repo)
                    .into_iter()
                    .map(move |(kind, dir)| (repo.clone(), kind, dir))
            })
            .collect();

        if targets.is_empty() {
            return Ok(NO_REPOSITORIES_MESSAGE.to_string());
        }
        info!("Searching {} collections for a global question", targets.len());

        let query = Arc::new(self.embedder.embed_query(question).await?);

        let mut retrieved = Vec::new();
        for (repo, kind, dir) in targets {
            debug!("Querying {} ({})", repo, kind.label());
            let hits = search_collection(&dir, query.clone(), self.k, &*self.embedder).await?;
            retrieved.extend(hits.into_iter().map(|chunk| RetrievedChunk {
                repo: repo.clone(),
                kind,
                chunk,
            }));
        }

        let context = format_global_context(&retrieved);
        let response = self.llm.complete(&prompts::global_answer(&context, question)).await?;
        Ok(response.text())
    }
}
