//! Wiki Generation
//!
//! ```text
//! Architect → Hierarchy → SavePlan → Page Writer (per page) → Wiki Index
//! ```
//!
//! The architect plans a flat page list from the repository's file tree,
//! the hierarchy builder nests it, and the page writer researches and
//! writes each page through the question answerer. Finished pages are
//! indexed into the repository's wiki collection so later questions can
//! draw on them.

pub mod architect;
pub mod hierarchy;
pub mod orchestrator;
pub mod page_writer;
mod prompts;
pub mod store;
pub mod types;

pub use architect::{WikiArchitect, file_tree};
pub use hierarchy::{PlanIssue, nest, validate_plan};
pub use orchestrator::{WikiGenerationReport, WikiGenerationState, WikiOrchestrator, WikiStage};
pub use page_writer::PageWriter;
pub use types::{FlatPage, FlatWikiStructure, Page, WikiStructure};
