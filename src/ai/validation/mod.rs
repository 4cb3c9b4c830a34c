//! Model Output Validation
//!
//! - JSON recovery for structured-output calls
//! - Mermaid diagram policy: trigger, acceptance, embedding and splitting

mod diagram;
mod json_repair;

pub use diagram::{DiagramPolicy, Segment, render_fenced, splice_diagram, split_diagrams};
pub use json_repair::{extract_json_from_response, extract_json_with_repair_status, strip_code_fences};
