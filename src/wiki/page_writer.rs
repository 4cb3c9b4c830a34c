//! Page writer: research, synthesis and an optional diagram for one page.

use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

use super::prompts;
use crate::ai::validation::splice_diagram;
use crate::ai::{DiagramPolicy, SharedProvider};
use crate::rag::QaAgent;
use crate::types::Result;

/// Answer recorded when research for a question fails
pub const UNANSWERED: &str = "Could not retrieve answer.";

static NUMBERED_LINE: OnceLock<Regex> = OnceLock::new();

fn numbered_line() -> &'static Regex {
    NUMBERED_LINE.get_or_init(|| Regex::new(r"(?m)^[ \t]*\d+\.[ \t]*(.+)$").expect("valid question regex"))
}

/// Numbered list items of a model reply, in order
pub fn parse_questions(text: &str) -> Vec<String> {
    numbered_line()
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|q| !q.is_empty())
        .collect()
}

fn fallback_question(page_title: &str) -> String {
    format!(
        "Provide a detailed explanation of {} including its main components and purpose.",
        page_title
    )
}

pub struct PageWriter {
    llm: SharedProvider,
    qa: Arc<QaAgent>,
    policy: DiagramPolicy,
}

impl PageWriter {
    pub fn new(llm: SharedProvider, qa: Arc<QaAgent>, policy: DiagramPolicy) -> Self {
        Self { llm, qa, policy }
    }

    /// Write the markdown for one page
    pub async fn write(&self, repo_name: &str, page_title: &str, parent_title: &str) -> Result<String> {
        info!("Writing page '{}'", page_title);

        let plan = self
            .llm
            .complete(&prompts::research_questions(repo_name, page_title, parent_title))
            .await?
            .text();

        let mut questions = parse_questions(&plan);
        if questions.is_empty() {
            warn!("No numbered questions for '{}', using a generic one", page_title);
            questions.push(fallback_question(page_title));
        }
        debug!("Researching '{}' with {} questions", page_title, questions.len());

        let mut notes = String::new();
        for question in &questions {
            let answer = match self.qa.answer(question, repo_name).await {
                Ok(answer) => answer,
                Err(e) => {
                    warn!("Error answering question '{}': {}", question, e);
                    UNANSWERED.to_string()
                }
            };
            notes.push_str(&format!("Q: {}\nA: {}\n\n", question, answer));
        }

        let content = self
            .llm
            .complete(&prompts::synthesize_page(page_title, &notes))
            .await?
            .text();

        match self.diagram_for(page_title, &content).await {
            Some(source) => Ok(splice_diagram(&content, &source)),
            None => Ok(content),
        }
    }

    async fn diagram_for(&self, page_title: &str, content: &str) -> Option<String> {
        if !self.policy.should_diagram(content) {
            return None;
        }
        debug!("Diagram keyword found for '{}'", page_title);

        match self
            .llm
            .complete(&prompts::diagram(page_title, self.policy.ignore_sentinel()))
            .await
        {
            Ok(response) => self.policy.accept(&response.text()),
            Err(e) => {
                warn!("Diagram generation failed for '{}': {}", page_title, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::SharedEmbedder;
    use crate::config::{DiagramConfig, RetrievalConfig};
    use crate::constants::diagram::{IGNORE_SENTINEL, MARKER};
    use crate::storage::{CollectionKind, CollectionLayout};
    use crate::testing::{MockEmbedder, ScriptedLlm, seed_collection, shared};
    use tempfile::TempDir;

    fn writer(root: &std::path::Path, llm: &Arc<ScriptedLlm>, embedder: SharedEmbedder) -> PageWriter {
        let qa = QaAgent::new(
            shared(llm),
            embedder,
            CollectionLayout::new(root),
            RetrievalConfig::default(),
        );
        PageWriter::new(shared(llm), Arc::new(qa), DiagramPolicy::default())
    }

    fn seeded() -> TempDir {
        let temp = TempDir::new().unwrap();
        seed_collection(
            &CollectionLayout::new(temp.path()).dir("demo", CollectionKind::Code),
            &[("src/server.rs", "fn serve() handles requests")],
        );
        temp
    }

    #[test]
    fn test_parse_questions() {
        let reply = "Here are my questions:\n1. What is X?\n  2.  How does Y work?\nnot a question\n3.\n10. Why Z?";
        assert_eq!(
            parse_questions(reply),
            vec!["What is X?", "How does Y work?", "Why Z?"]
        );
        assert!(parse_questions("no list here").is_empty());
        // A bare number never borrows the following line
        assert!(parse_questions("1.\nFollowing prose").is_empty());
        assert_eq!(parse_questions("1.\t Tabbed?\r\n"), vec!["Tabbed?"]);
    }

    #[tokio::test]
    async fn test_page_without_diagram() {
        let temp = seeded();
        let llm = ScriptedLlm::new()
            .on("QUESTIONS:", "1. What does the server do?\n2. How are requests handled?")
            .on("FINAL MARKDOWN DOCUMENT:", "# Server\n\nIt serves requests (`src/server.rs`).")
            .with_default("Answer citing `src/server.rs`.")
            .into_shared();

        let page = writer(temp.path(), &llm, MockEmbedder::shared())
            .write("demo", "Server", "Overview")
            .await
            .unwrap();
        assert_eq!(page, "# Server\n\nIt serves requests (`src/server.rs`).");

        let prompts = llm.prompts();
        // questions, two answers, synthesis
        assert_eq!(prompts.len(), 4);
        let synthesis = &prompts[3];
        assert!(synthesis.contains("Q: What does the server do?\nA: Answer citing `src/server.rs`."));
        assert!(synthesis.contains("Q: How are requests handled?"));
    }

    #[tokio::test]
    async fn test_fallback_question_and_failed_research() {
        let temp = TempDir::new().unwrap();
        let llm = ScriptedLlm::new()
            .on("QUESTIONS:", "I would ask about the module.")
            .on("FINAL MARKDOWN DOCUMENT:", "# Parser")
            .into_shared();

        // No collection for the repository: every answer fails
        let page = writer(temp.path(), &llm, MockEmbedder::shared())
            .write("ghost", "Parser", "Core")
            .await
            .unwrap();
        assert_eq!(page, "# Parser");

        let synthesis = llm.prompts().pop().unwrap();
        assert!(synthesis.contains(
            "Q: Provide a detailed explanation of Parser including its main components and purpose."
        ));
        assert!(synthesis.contains(&format!("A: {}", UNANSWERED)));
    }

    #[tokio::test]
    async fn test_diagram_spliced_after_first_section() {
        let temp = seeded();
        let llm = ScriptedLlm::new()
            .on("QUESTIONS:", "1. What is the request flow?")
            .on(
                "FINAL MARKDOWN DOCUMENT:",
                "# Server\n\nIntro.\n## Request Flow\nDetails follow.",
            )
            .on("Topic to Diagram", "```mermaid\ngraph TD\n    A --> B\n```")
            .into_shared();

        let page = writer(temp.path(), &llm, MockEmbedder::shared())
            .write("demo", "Server", "Overview")
            .await
            .unwrap();
        assert_eq!(
            page,
            format!(
                "# Server\n\nIntro.\n## Request Flow\n\n\n{m}graph TD\n    A --> B{m}\n\nDetails follow.",
                m = MARKER
            )
        );
    }

    #[tokio::test]
    async fn test_declined_diagram_leaves_page_untouched() {
        let temp = seeded();
        let llm = ScriptedLlm::new()
            .on("QUESTIONS:", "1. What is the architecture?")
            .on("FINAL MARKDOWN DOCUMENT:", "# Architecture\n\nLayers.")
            .on("Topic to Diagram", IGNORE_SENTINEL)
            .into_shared();

        let page = writer(temp.path(), &llm, MockEmbedder::shared())
            .write("demo", "Architecture", "Overview")
            .await
            .unwrap();
        assert_eq!(page, "# Architecture\n\nLayers.");
    }

    #[tokio::test]
    async fn test_configured_sentinel_reaches_prompt_and_declines() {
        let temp = seeded();
        let llm = ScriptedLlm::new()
            .on("QUESTIONS:", "1. What is the flow?")
            .on("FINAL MARKDOWN DOCUMENT:", "# Flow\n\nSteps.")
            .on("Topic to Diagram", "SKIP_DIAGRAM")
            .into_shared();
        let config = DiagramConfig {
            ignore_sentinel: "SKIP_DIAGRAM".to_string(),
            ..DiagramConfig::default()
        };
        let qa = QaAgent::new(
            shared(&llm),
            MockEmbedder::shared(),
            CollectionLayout::new(temp.path()),
            RetrievalConfig::default(),
        );
        let writer = PageWriter::new(shared(&llm), Arc::new(qa), DiagramPolicy::from_config(&config));

        let page = writer.write("demo", "Flow", "Overview").await.unwrap();
        assert_eq!(page, "# Flow\n\nSteps.");

        let diagram_prompt = llm.prompts().pop().unwrap();
        assert!(diagram_prompt.contains("output the single word: \"SKIP_DIAGRAM\""));
        assert!(!diagram_prompt.contains(IGNORE_SENTINEL));
    }

    #[tokio::test]
    async fn test_diagram_failure_is_not_fatal() {
        let temp = seeded();
        let llm = ScriptedLlm::new()
            .on("QUESTIONS:", "1. Structure?")
            .on("FINAL MARKDOWN DOCUMENT:", "# Structure")
            .fail_on("Topic to Diagram")
            .into_shared();

        let page = writer(temp.path(), &llm, MockEmbedder::shared())
            .write("demo", "Structure", "Overview")
            .await
            .unwrap();
        assert_eq!(page, "# Structure");
    }
}
