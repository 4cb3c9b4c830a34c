//! Mermaid Diagram Policy
//!
//! Decides when a page deserves a diagram, whether a model-produced diagram
//! is usable, and how diagrams are embedded in and recovered from markdown.
//!
//! Diagrams are stored inside pages between paired `%%MERMAID_DIAGRAM%%`
//! markers so the viewer can render them separately from the prose.

use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use super::json_repair::strip_code_fences;
use crate::config::DiagramConfig;
use crate::constants::diagram::MARKER;

static FIRST_SECTION_HEADING: OnceLock<Regex> = OnceLock::new();

fn first_section_heading() -> &'static Regex {
    FIRST_SECTION_HEADING.get_or_init(|| Regex::new(r"\n## .*\n").expect("valid heading regex"))
}

/// Trigger keywords and acceptance rules for generated diagrams
#[derive(Debug, Clone)]
pub struct DiagramPolicy {
    trigger_keywords: Vec<String>,
    required_token: String,
    arrow_tokens: Vec<String>,
    ignore_sentinel: String,
}

impl Default for DiagramPolicy {
    fn default() -> Self {
        Self::from_config(&DiagramConfig::default())
    }
}

impl DiagramPolicy {
    pub fn from_config(config: &DiagramConfig) -> Self {
        Self {
            trigger_keywords: config
                .trigger_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
            required_token: config.required_token.clone(),
            arrow_tokens: config.arrow_tokens.clone(),
            ignore_sentinel: config.ignore_sentinel.clone(),
        }
    }

    /// Reply a model gives to decline drawing a diagram
    pub fn ignore_sentinel(&self) -> &str {
        &self.ignore_sentinel
    }

    /// Whether page content mentions any trigger keyword (case-insensitive)
    pub fn should_diagram(&self, content: &str) -> bool {
        let lowered = content.to_lowercase();
        self.trigger_keywords
            .iter()
            .any(|keyword| lowered.contains(keyword.as_str()))
    }

    /// Validate a model reply and return the cleaned diagram source.
    ///
    /// Rejects the "no diagram" sentinel and anything that lacks the
    /// required token or an edge token after stripping code fences.
    pub fn accept(&self, raw: &str) -> Option<String> {
        let source = strip_code_fences(raw);

        if source.is_empty() || source.contains(&self.ignore_sentinel) {
            debug!("Diagram declined by model");
            return None;
        }
        if !source.contains(&self.required_token) {
            debug!("Diagram rejected: missing '{}'", self.required_token);
            return None;
        }
        if !self.arrow_tokens.iter().any(|arrow| source.contains(arrow.as_str())) {
            debug!("Diagram rejected: no edges");
            return None;
        }

        Some(source)
    }
}

/// Embed diagram source in a page after its first `## ` section heading,
/// or at the end when the page has none.
pub fn splice_diagram(page: &str, source: &str) -> String {
    let block = format!("\n\n{MARKER}{source}{MARKER}\n\n");

    match first_section_heading().find(page) {
        Some(heading) => {
            let at = heading.end();
            let mut out = String::with_capacity(page.len() + block.len());
            out.push_str(&page[..at]);
            out.push_str(&block);
            out.push_str(&page[at..]);
            out
        }
        None => format!("{page}{block}"),
    }
}

/// A run of page content: prose or a marked diagram
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Markdown(String),
    Diagram(String),
}

/// Split a page into prose and diagram segments.
///
/// Text between paired markers becomes a diagram; an unpaired trailing
/// marker is kept as prose. Whitespace-only prose is dropped.
pub fn split_diagrams(page: &str) -> Vec<Segment> {
    let parts: Vec<&str> = page.split(MARKER).collect();
    let paired = parts.len() % 2 == 1;
    let mut segments = Vec::new();

    for (i, part) in parts.iter().enumerate() {
        let is_last = i == parts.len() - 1;
        let is_diagram = i % 2 == 1 && (paired || !is_last);

        if is_diagram {
            segments.push(Segment::Diagram(part.trim().to_string()));
        } else {
            let text = if i % 2 == 1 {
                format!("{MARKER}{part}")
            } else {
                part.to_string()
            };
            if !text.trim().is_empty() {
                segments.push(Segment::Markdown(text));
            }
        }
    }

    segments
}

/// Render a page with every marked diagram as a fenced `mermaid` block
pub fn render_fenced(page: &str) -> String {
    split_diagrams(page)
        .into_iter()
        .map(|segment| match segment {
            Segment::Markdown(text) => text,
            Segment::Diagram(source) => format!("\n```mermaid\n{source}\n```\n"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignore_sentinel_rejected() {
        assert_eq!(DiagramPolicy::default().accept("IGNORE"), None);
    }

    #[test]
    fn test_graph_with_arrow_accepted() {
        let policy = DiagramPolicy::default();
        assert_eq!(
            policy.accept("graph TD\n A-->B").as_deref(),
            Some("graph TD\n A-->B")
        );
    }

    #[test]
    fn test_fenced_diagram_accepted_without_fence() {
        let accepted = DiagramPolicy::default()
            .accept("```mermaid\ngraph LR\n  A ==> B\n```")
            .unwrap();
        assert_eq!(accepted, "graph LR\n  A ==> B");
    }

    #[test]
    fn test_prose_and_edgeless_graph_rejected() {
        let policy = DiagramPolicy::default();
        assert_eq!(policy.accept("This module handles parsing."), None);
        assert_eq!(policy.accept("graph TD\n A[Only node]"), None);
    }

    #[test]
    fn test_trigger_keywords_case_insensitive() {
        let policy = DiagramPolicy::default();
        assert!(policy.should_diagram("The overall ARCHITECTURE is layered"));
        assert!(policy.should_diagram("Data Flow"));
        assert!(!policy.should_diagram("A list of constants."));
    }

    #[test]
    fn test_splice_after_first_section_heading() {
        let page = "# Title\nintro\n## Overview\nbody\n## Next\nmore";
        let spliced = splice_diagram(page, "graph TD\nA-->B");
        assert_eq!(
            spliced,
            "# Title\nintro\n## Overview\n\n\n%%MERMAID_DIAGRAM%%graph TD\nA-->B%%MERMAID_DIAGRAM%%\n\nbody\n## Next\nmore"
        );
    }

    #[test]
    fn test_splice_appends_without_heading() {
        let spliced = splice_diagram("# Title\nbody", "graph TD\nA-->B");
        assert!(spliced.starts_with("# Title\nbody\n\n%%MERMAID_DIAGRAM%%"));
        assert!(spliced.ends_with("%%MERMAID_DIAGRAM%%\n\n"));
    }

    #[test]
    fn test_split_roundtrips_spliced_page() {
        let page = splice_diagram("# T\n## A\nbody", "graph TD\nA-->B");
        let segments = split_diagrams(&page);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1], Segment::Diagram("graph TD\nA-->B".to_string()));
    }

    #[test]
    fn test_unpaired_marker_is_prose() {
        let segments = split_diagrams("text %%MERMAID_DIAGRAM%%dangling");
        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(|s| matches!(s, Segment::Markdown(_))));
    }

    #[test]
    fn test_render_fenced() {
        let page = splice_diagram("# T\n## A\nbody", "graph TD\nA-->B");
        let rendered = render_fenced(&page);
        assert!(rendered.contains("```mermaid\ngraph TD\nA-->B\n```"));
        assert!(!rendered.contains(MARKER));
    }
}
