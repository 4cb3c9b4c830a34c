//! Documentation Agent
//!
//! Researches a repository through the question answerer and writes a
//! single README-style document with an architecture diagram.

mod agent;
mod prompts;

pub use agent::{DocStage, DocumentationAgent, RESEARCH_FAILED, ResearchNote, parse_plan};
