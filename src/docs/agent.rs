//! Single-document agent.
//!
//! ```text
//! Planner → Research → GenerateDiagram → WriteDocument → Done
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

use super::prompts;
use crate::ai::{DiagramPolicy, SharedProvider};
use crate::constants::diagram::FALLBACK;
use crate::pipeline::StepBudget;
use crate::rag::QaAgent;
use crate::types::{DocumateError, Result};

/// Answer recorded when research for a question fails
pub const RESEARCH_FAILED: &str = "Error retrieving answer.";

static LIST_MARKER: OnceLock<Regex> = OnceLock::new();

fn list_marker() -> &'static Regex {
    LIST_MARKER.get_or_init(|| Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s+").expect("valid list marker regex"))
}

/// One line per question, list markers removed, blank lines dropped
pub fn parse_plan(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| list_marker().replace(line, "").trim().to_string())
        .filter(|q| !q.is_empty())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchNote {
    pub question: String,
    pub answer: String,
}

fn format_notes(notes: &[ResearchNote]) -> String {
    notes
        .iter()
        .map(|n| format!("Q: {}\nA: {}", n.question, n.answer))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocStage {
    Planner,
    Research,
    GenerateDiagram,
    WriteDocument,
    Done,
}

impl DocStage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Planner => "planner",
            Self::Research => "research",
            Self::GenerateDiagram => "generate_diagram",
            Self::WriteDocument => "write_document",
            Self::Done => "done",
        }
    }

    fn next(&self) -> Self {
        match self {
            Self::Planner => Self::Research,
            Self::Research => Self::GenerateDiagram,
            Self::GenerateDiagram => Self::WriteDocument,
            Self::WriteDocument | Self::Done => Self::Done,
        }
    }
}

#[derive(Debug, Default)]
struct DocAgentState {
    plan: Vec<String>,
    notes: Vec<ResearchNote>,
    diagram: Option<String>,
    document: Option<String>,
}

pub struct DocumentationAgent {
    llm: SharedProvider,
    qa: Arc<QaAgent>,
    policy: DiagramPolicy,
    max_steps: usize,
}

impl DocumentationAgent {
    pub fn new(llm: SharedProvider, qa: Arc<QaAgent>, policy: DiagramPolicy, max_steps: usize) -> Self {
        Self {
            llm,
            qa,
            policy,
            max_steps,
        }
    }

    /// Research the repository and write its README
    pub async fn generate(&self, repo_name: &str) -> Result<String> {
        let mut state = DocAgentState::default();
        let mut budget = StepBudget::new(self.max_steps);
        let mut stage = DocStage::Planner;

        while stage != DocStage::Done {
            budget.enter(stage.name())?;
            self.run_stage(stage, repo_name, &mut state).await?;
            stage = stage.next();
        }
        info!("README research finished in {} steps", budget.taken());

        state
            .document
            .ok_or_else(|| DocumateError::pipeline(DocStage::WriteDocument.name(), "no document produced"))
    }

    async fn run_stage(&self, stage: DocStage, repo_name: &str, state: &mut DocAgentState) -> Result<()> {
        match stage {
            DocStage::Planner => {
                let reply = self.llm.complete(&prompts::planner(repo_name)).await?.text();
                state.plan = parse_plan(&reply);
                info!("Research plan has {} questions", state.plan.len());
            }
            DocStage::Research => {
                let total = state.plan.len();
                for (i, question) in state.plan.iter().enumerate() {
                    debug!("Researching question {}/{}: {}", i + 1, total, question);
                    let answer = match self.qa.answer(question, repo_name).await {
                        Ok(answer) => answer,
                        Err(e) => {
                            warn!("Failed to answer question '{}': {}", question, e);
                            RESEARCH_FAILED.to_string()
                        }
                    };
                    state.notes.push(ResearchNote {
                        question: question.clone(),
                        answer,
                    });
                }
            }
            DocStage::GenerateDiagram => {
                let prompt = prompts::diagram(&format_notes(&state.notes));
                let accepted = match self.llm.complete(&prompt).await {
                    Ok(response) => self.policy.accept(&response.text()),
                    Err(e) => {
                        warn!("Diagram request failed: {}", e);
                        None
                    }
                };
                state.diagram = Some(accepted.unwrap_or_else(|| {
                    warn!("Diagram generation failed, using fallback");
                    FALLBACK.to_string()
                }));
            }
            DocStage::WriteDocument => {
                let diagram = state.diagram.as_deref().unwrap_or(FALLBACK);
                let prompt = prompts::writer(repo_name, &format_notes(&state.notes), diagram);
                state.document = Some(self.llm.complete(&prompt).await?.text());
            }
            DocStage::Done => {}
        }
        Ok(())
    }
}
