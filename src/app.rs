//! Application context.
//!
//! Every component is built once from the loaded [`Config`] and shared by
//! the command handlers. Provider construction happens here, so a bad
//! provider selection or missing credential fails before any work starts.

use std::sync::Arc;
use tracing::debug;

use crate::ai::{
    DiagramPolicy, ProviderConfig, SharedEmbedder, SharedProvider, create_embedder,
    create_provider,
};
use crate::config::Config;
use crate::docs::DocumentationAgent;
use crate::index::{ContentFilter, FileFilters, Indexer, TextSplitter};
use crate::rag::{GlobalQaAgent, QaAgent};
use crate::repo::RepoManager;
use crate::storage::CollectionLayout;
use crate::types::Result;
use crate::wiki::{PageWriter, WikiArchitect, WikiOrchestrator};

pub struct AppContext {
    pub config: Config,
    pub llm: SharedProvider,
    pub embedder: SharedEmbedder,
    pub repos: RepoManager,
    pub indexer: Arc<Indexer>,
    pub qa: Arc<QaAgent>,
    pub global_qa: GlobalQaAgent,
    pub wiki: WikiOrchestrator,
    pub docs: DocumentationAgent,
}

impl AppContext {
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let llm = create_provider(&ProviderConfig::from(&config.llm))?;
        let embedder = create_embedder(&config.embedding)?;
        Self::with_providers(config, llm, embedder)
    }

    /// Wire the components around already-built providers
    pub fn with_providers(config: &Config, llm: SharedProvider, embedder: SharedEmbedder) -> Result<Self> {
        let repos = RepoManager::new(&config.paths.clone_root)?;
        let filters = FileFilters::load(&config.paths.filters_file)?;
        debug!(
            "Filters: {} extensions, {} excluded patterns",
            filters.allowed_extensions.len(),
            filters.excluded_patterns.len()
        );

        let layout = CollectionLayout::new(&config.paths.vector_root);
        let indexer = Arc::new(Indexer::new(
            ContentFilter::new(filters),
            TextSplitter::new(config.indexing.chunk_size, config.indexing.chunk_overlap),
            embedder.clone(),
            layout.clone(),
            config.embedding.batch_size,
        ));

        let qa = Arc::new(QaAgent::new(
            llm.clone(),
            embedder.clone(),
            layout.clone(),
            config.retrieval.clone(),
        ));
        let global_qa = GlobalQaAgent::new(
            llm.clone(),
            embedder.clone(),
            layout,
            config.retrieval.global_k,
        );

        let policy = DiagramPolicy::from_config(&config.diagram);
        let wiki = WikiOrchestrator::new(
            WikiArchitect::new(llm.clone()),
            PageWriter::new(llm.clone(), qa.clone(), policy.clone()),
            indexer.clone(),
            &config.paths.wiki_root,
            config.agent.max_steps,
        );
        let docs = DocumentationAgent::new(llm.clone(), qa.clone(), policy, config.agent.max_steps);

        Ok(Self {
            config: config.clone(),
            llm,
            embedder,
            repos,
            indexer,
            qa,
            global_qa,
            wiki,
            docs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockEmbedder, ScriptedLlm, config_in, shared};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_context_answers_across_components() {
        let temp = TempDir::new().unwrap();
        let config = config_in(temp.path());
        let llm = ScriptedLlm::new().with_default("From `src/lib.rs`.").into_shared();
        let app = AppContext::with_providers(&config, shared(&llm), MockEmbedder::shared()).unwrap();

        assert!(temp.path().join("repos").is_dir());

        let repo = app.repos.repo_path("demo");
        std::fs::create_dir_all(repo.join("src")).unwrap();
        std::fs::write(repo.join("src/lib.rs"), "pub fn demo() {}").unwrap();
        assert!(app.indexer.index_repository(&repo).await.unwrap());

        let answer = app.qa.answer("What is demo?", "demo").await.unwrap();
        assert_eq!(answer, "From `src/lib.rs`.");
        let global = app.global_qa.answer("What is demo?").await.unwrap();
        assert_eq!(global, "From `src/lib.rs`.");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let temp = TempDir::new().unwrap();
        let mut config = config_in(temp.path());
        config.indexing.chunk_size = 0;
        assert!(AppContext::from_config(&config).is_err_and(|e| e.is_configuration()));

        let mut config = config_in(temp.path());
        config.llm.provider = "azure".to_string();
        assert!(AppContext::from_config(&config).is_err_and(|e| e.is_configuration()));
    }

    #[test]
    fn test_missing_filters_file_is_a_config_error() {
        let temp = TempDir::new().unwrap();
        let mut config = config_in(temp.path());
        config.paths.filters_file = temp.path().join("absent.json");
        let llm = ScriptedLlm::new().into_shared();
        let result = AppContext::with_providers(&config, shared(&llm), MockEmbedder::shared());
        assert!(matches!(result, Err(crate::types::DocumateError::Config(_))));
    }
}
