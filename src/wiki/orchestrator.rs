//! Wiki orchestrator.
//!
//! ```text
//! PlanStructure → ReconstructHierarchy → SavePlan → GeneratePages → IndexWiki → Done
//! ```
//!
//! Each stage reads and extends a shared [`WikiGenerationState`]. Every
//! transition spends one step of the run's budget.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use super::architect::WikiArchitect;
use super::hierarchy::{nest, validate_plan};
use super::page_writer::PageWriter;
use super::store::{is_page_file, page_path, save_structure, wiki_dir};
use super::types::{FlatWikiStructure, Page, WikiStructure};
use crate::index::Indexer;
use crate::pipeline::StepBudget;
use crate::types::{DocumateError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WikiStage {
    PlanStructure,
    ReconstructHierarchy,
    SavePlan,
    GeneratePages,
    IndexWiki,
    Done,
}

impl WikiStage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PlanStructure => "Planning wiki structure",
            Self::ReconstructHierarchy => "Reconstructing page hierarchy",
            Self::SavePlan => "Saving plan",
            Self::GeneratePages => "Generating pages",
            Self::IndexWiki => "Indexing wiki",
            Self::Done => "Done",
        }
    }

    fn next(&self) -> Self {
        match self {
            Self::PlanStructure => Self::ReconstructHierarchy,
            Self::ReconstructHierarchy => Self::SavePlan,
            Self::SavePlan => Self::GeneratePages,
            Self::GeneratePages => Self::IndexWiki,
            Self::IndexWiki | Self::Done => Self::Done,
        }
    }
}

/// Accumulated results of one generation run
#[derive(Debug, Default)]
pub struct WikiGenerationState {
    pub repo_name: String,
    pub repo_path: PathBuf,
    pub flat: Option<FlatWikiStructure>,
    pub nested: Option<WikiStructure>,
    pub output_dir: Option<PathBuf>,
    pub written: Vec<PathBuf>,
    pub indexed: bool,
}

#[derive(Debug, Clone)]
pub struct WikiGenerationReport {
    pub output_dir: PathBuf,
    pub pages_written: usize,
    pub wiki_indexed: bool,
}

pub struct WikiOrchestrator {
    architect: WikiArchitect,
    writer: PageWriter,
    indexer: Arc<Indexer>,
    wiki_root: PathBuf,
    max_steps: usize,
}

impl WikiOrchestrator {
    pub fn new(
        architect: WikiArchitect,
        writer: PageWriter,
        indexer: Arc<Indexer>,
        wiki_root: impl Into<PathBuf>,
        max_steps: usize,
    ) -> Self {
        Self {
            architect,
            writer,
            indexer,
            wiki_root: wiki_root.into(),
            max_steps,
        }
    }

    /// Generate, save and index the wiki for the repository at `repo_path`
    pub async fn generate(&self, repo_name: &str, repo_path: &Path) -> Result<WikiGenerationReport> {
        if !repo_path.is_dir() {
            return Err(DocumateError::not_found("Repository path", repo_path));
        }
        info!("Starting wiki generation for: {}", repo_name);

        let mut state = WikiGenerationState {
            repo_name: repo_name.to_string(),
            repo_path: repo_path.to_path_buf(),
            ..Default::default()
        };
        let mut budget = StepBudget::new(self.max_steps);
        let mut stage = WikiStage::PlanStructure;

        while stage != WikiStage::Done {
            budget.enter(stage.name())?;
            self.run_stage(stage, &mut state).await?;
            stage = stage.next();
        }

        let output_dir = state
            .output_dir
            .ok_or_else(|| DocumateError::pipeline("done", "no output directory recorded"))?;
        info!("Wiki generation complete for: {} in {} steps", repo_name, budget.taken());

        Ok(WikiGenerationReport {
            output_dir,
            pages_written: state.written.len(),
            wiki_indexed: state.indexed,
        })
    }

    async fn run_stage(&self, stage: WikiStage, state: &mut WikiGenerationState) -> Result<()> {
        match stage {
            WikiStage::PlanStructure => {
                let flat = self.architect.plan(&state.repo_name, &state.repo_path).await?;
                for issue in validate_plan(&flat) {
                    warn!("Wiki plan: {}", issue);
                }
                state.flat = Some(flat);
            }
            WikiStage::ReconstructHierarchy => {
                let flat = state.flat.as_ref().ok_or_else(|| missing(stage, "flat plan"))?;
                let mut nested = nest(flat);
                nested.pages = drop_unsafe_pages(std::mem::take(&mut nested.pages));
                info!("Wiki plan has {} pages", nested.page_count());
                state.nested = Some(nested);
            }
            WikiStage::SavePlan => {
                let nested = state.nested.as_ref().ok_or_else(|| missing(stage, "hierarchy"))?;
                let dir = wiki_dir(&self.wiki_root, &state.repo_name);
                let path = save_structure(&dir, nested)?;
                info!("Plan saved to {}", path.display());
                state.output_dir = Some(dir);
            }
            WikiStage::GeneratePages => {
                let nested = state.nested.as_ref().ok_or_else(|| missing(stage, "hierarchy"))?;
                let dir = state.output_dir.as_ref().ok_or_else(|| missing(stage, "output directory"))?;

                // walk() is an explicit-stack pre-order traversal: parents are
                // written before their children
                let mut written = Vec::new();
                for (page, parent_title) in nested.walk() {
                    let path = page_path(dir, &page.file).ok_or_else(|| {
                        DocumateError::pipeline(stage.name(), format!("unsafe page file '{}'", page.file))
                    })?;
                    let content = self
                        .writer
                        .write(&state.repo_name, &page.title, parent_title)
                        .await?;
                    tokio::fs::write(&path, content).await?;
                    info!("Saved page: {}", path.display());
                    written.push(path);
                }
                state.written = written;
            }
            WikiStage::IndexWiki => {
                let dir = state.output_dir.as_ref().ok_or_else(|| missing(stage, "output directory"))?;
                state.indexed = self
                    .indexer
                    .index_wiki(&state.repo_name, &state.written, dir)
                    .await?;
                if !state.indexed {
                    warn!("No wiki content was indexed for {}", state.repo_name);
                }
            }
            WikiStage::Done => {}
        }
        Ok(())
    }
}

/// Remove pages whose file name cannot live in the wiki directory, so the
/// saved structure only lists files that get written. Children of a
/// removed page take its place.
fn drop_unsafe_pages(pages: Vec<Page>) -> Vec<Page> {
    let mut kept = Vec::with_capacity(pages.len());
    for mut page in pages {
        page.pages = drop_unsafe_pages(std::mem::take(&mut page.pages));
        if is_page_file(&page.file) {
            kept.push(page);
        } else {
            warn!("Dropping page '{}' with unsafe file name '{}'", page.title, page.file);
            kept.extend(page.pages);
        }
    }
    kept
}

fn missing(stage: WikiStage, what: &str) -> DocumateError {
    DocumateError::pipeline(stage.name(), format!("{} not available", what))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::DiagramPolicy;
    use crate::config::RetrievalConfig;
    use crate::constants::layout::STRUCTURE_FILE;
    use crate::index::{ContentFilter, FileFilters, TextSplitter};
    use crate::rag::QaAgent;
    use crate::storage::{Collection, CollectionKind, CollectionLayout};
    use crate::testing::{MockEmbedder, ScriptedLlm, shared};
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        temp: TempDir,
        repo: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let repo = temp.path().join("clones").join("demo");
            fs::create_dir_all(repo.join("src")).unwrap();
            fs::write(repo.join("src/lib.rs"), "pub fn run() {}").unwrap();
            Self { temp, repo }
        }

        fn vectors(&self) -> PathBuf {
            self.temp.path().join("vs")
        }

        fn wikis(&self) -> PathBuf {
            self.temp.path().join("wikis")
        }

        fn orchestrator(&self, llm: &Arc<ScriptedLlm>, max_steps: usize) -> WikiOrchestrator {
            let layout = CollectionLayout::new(self.vectors());
            let indexer = Arc::new(Indexer::new(
                ContentFilter::new(FileFilters {
                    allowed_extensions: vec![".rs".to_string()],
                    excluded_patterns: vec![],
                }),
                TextSplitter::default(),
                MockEmbedder::shared(),
                layout.clone(),
                8,
            ));
            let qa = Arc::new(QaAgent::new(
                shared(llm),
                MockEmbedder::shared(),
                layout,
                RetrievalConfig::default(),
            ));
            WikiOrchestrator::new(
                WikiArchitect::new(shared(llm)),
                PageWriter::new(shared(llm), qa, DiagramPolicy::default()),
                indexer,
                self.wikis(),
                max_steps,
            )
        }
    }

    fn scripted() -> Arc<ScriptedLlm> {
        ScriptedLlm::new()
            .on_json(
                "FLAT LIST",
                json!({"title": "Demo Wiki", "pages": [
                    {"title": "Details", "file": "01_01_Details.md", "parent_file": "01_Intro.md"},
                    {"title": "Intro", "file": "01_Intro.md"},
                    {"title": "Orphan", "file": "02_Orphan.md", "parent_file": "99_Missing.md"},
                    {"title": "Escape", "file": "../escape.md"}
                ]}),
            )
            .on("QUESTIONS:", "1. What is it?")
            .on("page titled \"Intro\"", "# Intro\n\nIntroduction text.")
            .on("page titled \"Details\"", "# Details\n\nDetail text.")
            .on("page titled \"Orphan\"", "# Orphan\n\nOrphan text.")
            .into_shared()
    }

    #[tokio::test]
    async fn test_generate_full_run() {
        let fixture = Fixture::new();
        let llm = scripted();
        let report = fixture
            .orchestrator(&llm, 10)
            .generate("demo", &fixture.repo)
            .await
            .unwrap();

        let dir = fixture.wikis().join("demo");
        assert_eq!(report.output_dir, dir);
        assert_eq!(report.pages_written, 3);
        assert!(report.wiki_indexed);

        let structure: WikiStructure =
            serde_json::from_str(&fs::read_to_string(dir.join(STRUCTURE_FILE)).unwrap()).unwrap();
        let top: Vec<&str> = structure.pages.iter().map(|p| p.file.as_str()).collect();
        assert_eq!(top, vec!["01_Intro.md", "02_Orphan.md"]);
        assert_eq!(structure.pages[0].pages[0].file, "01_01_Details.md");

        assert_eq!(
            fs::read_to_string(dir.join("01_Intro.md")).unwrap(),
            "# Intro\n\nIntroduction text."
        );
        assert!(dir.join("01_01_Details.md").is_file());
        assert!(!fixture.temp.path().join("wikis").join("escape.md").exists());

        // Parent written before child: the Intro synthesis precedes Details
        let prompts = llm.prompts();
        let intro = prompts.iter().position(|p| p.contains("page titled \"Intro\"")).unwrap();
        let details = prompts.iter().position(|p| p.contains("page titled \"Details\"")).unwrap();
        assert!(intro < details);

        let wiki = Collection::open(&CollectionLayout::new(fixture.vectors()).dir("demo", CollectionKind::Wiki))
            .unwrap();
        let hits = wiki.search(&MockEmbedder::vector("Introduction text"), 10).unwrap();
        assert!(hits.iter().any(|h| h.source == "01_Intro.md"));
    }

    #[test]
    fn test_unsafe_pages_dropped_and_children_promoted() {
        let pages = vec![
            Page {
                title: "Escape".to_string(),
                file: "../escape.md".to_string(),
                pages: vec![Page::leaf("Child", "02_01_Child.md"), Page::leaf("Nested", "sub/x.md")],
            },
            Page::leaf("Intro", "01_Intro.md"),
        ];
        let kept = drop_unsafe_pages(pages);
        let files: Vec<&str> = kept.iter().map(|p| p.file.as_str()).collect();
        assert_eq!(files, vec!["02_01_Child.md", "01_Intro.md"]);
        assert!(kept.iter().all(|p| p.pages.is_empty()));
    }

    #[tokio::test]
    async fn test_saved_structure_lists_only_written_pages() {
        let fixture = Fixture::new();
        fixture
            .orchestrator(&scripted(), 10)
            .generate("demo", &fixture.repo)
            .await
            .unwrap();

        let dir = fixture.wikis().join("demo");
        let structure = crate::wiki::store::load_structure(&dir).unwrap();
        for (page, _) in structure.walk() {
            assert!(crate::wiki::store::read_page(&dir, &page.file).is_ok(), "{}", page.file);
        }
    }

    #[tokio::test]
    async fn test_regeneration_replaces_previous_wiki() {
        let fixture = Fixture::new();
        let stale = fixture.wikis().join("demo").join("old_page.md");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "stale").unwrap();

        fixture
            .orchestrator(&scripted(), 10)
            .generate("demo", &fixture.repo)
            .await
            .unwrap();
        assert!(!stale.exists());
    }

    #[tokio::test]
    async fn test_missing_repository() {
        let fixture = Fixture::new();
        let result = fixture
            .orchestrator(&scripted(), 10)
            .generate("ghost", &fixture.temp.path().join("clones").join("ghost"))
            .await;
        assert!(matches!(result, Err(DocumateError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_step_budget_enforced() {
        let fixture = Fixture::new();
        let result = fixture
            .orchestrator(&scripted(), 3)
            .generate("demo", &fixture.repo)
            .await;
        assert!(matches!(result, Err(DocumateError::StepLimitExceeded { limit: 3 })));
    }

    #[tokio::test]
    async fn test_architect_failure_propagates() {
        let fixture = Fixture::new();
        let llm = ScriptedLlm::new().fail_on("FLAT LIST").into_shared();
        let result = fixture.orchestrator(&llm, 10).generate("demo", &fixture.repo).await;
        assert!(matches!(result, Err(DocumateError::LlmApi(_))));
        assert!(!fixture.wikis().join("demo").exists());
    }
}
