//! Prompt Builder
//!
//! Standardized prompt construction for model calls. Every pipeline prompt
//! is assembled from the same tagged sections so roles, rules and inputs
//! read alike across the answerers and agents.

/// Prompt section types
#[derive(Debug, Clone)]
pub enum PromptSection {
    /// Role definition with expertise area
    Role { expertise: String, task: String },
    /// Numbered objectives
    Objectives(Vec<String>),
    /// Ordered key-value pairs
    Context(Vec<(String, String)>),
    /// Raw text section with optional header
    Text {
        header: Option<String>,
        content: String,
    },
    /// Numbered hard rules the model must follow
    Rules(Vec<String>),
    /// Trailing cue the model continues from
    Cue(String),
}

#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(mut self, expertise: &str, task: &str) -> Self {
        self.sections.push(PromptSection::Role {
            expertise: expertise.to_string(),
            task: task.to_string(),
        });
        self
    }

    pub fn objectives(mut self, objectives: &[&str]) -> Self {
        self.sections.push(PromptSection::Objectives(
            objectives.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    /// Add a context item, appending to the first context section
    pub fn context_item(mut self, key: &str, value: &str) -> Self {
        let item = (key.to_string(), value.to_string());
        match self.sections.iter_mut().find_map(|s| match s {
            PromptSection::Context(items) => Some(items),
            _ => None,
        }) {
            Some(items) => items.push(item),
            None => self.sections.push(PromptSection::Context(vec![item])),
        }
        self
    }

    pub fn text(mut self, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: None,
            content: content.to_string(),
        });
        self
    }

    pub fn section(mut self, header: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: Some(header.to_string()),
            content: content.to_string(),
        });
        self
    }

    pub fn rules(mut self, rules: &[&str]) -> Self {
        self.sections
            .push(PromptSection::Rules(rules.iter().map(|s| s.to_string()).collect()));
        self
    }

    pub fn cue(mut self, cue: &str) -> Self {
        self.sections.push(PromptSection::Cue(cue.to_string()));
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::Role { expertise, task } => {
                    prompt.push_str("<ROLE>\n");
                    prompt.push_str(&format!("You are an expert {} for {}.\n", expertise, task));
                    prompt.push_str("</ROLE>\n\n");
                }
                PromptSection::Objectives(objectives) => {
                    prompt.push_str("<OBJECTIVES>\n");
                    for (i, obj) in objectives.iter().enumerate() {
                        prompt.push_str(&format!("{}. {}\n", i + 1, obj));
                    }
                    prompt.push_str("</OBJECTIVES>\n\n");
                }
                PromptSection::Context(items) => {
                    prompt.push_str("# Context\n\n");
                    for (key, value) in items {
                        prompt.push_str(&format!("**{}**: {}\n", key, value));
                    }
                    prompt.push('\n');
                }
                PromptSection::Text { header, content } => {
                    if let Some(h) = header {
                        prompt.push_str(&format!("# {}\n\n", h));
                    }
                    prompt.push_str(&content);
                    prompt.push_str("\n\n");
                }
                PromptSection::Rules(rules) => {
                    prompt.push_str("<CRITICAL_INSTRUCTIONS>\n");
                    for (i, rule) in rules.iter().enumerate() {
                        prompt.push_str(&format!("{}. {}\n", i + 1, rule));
                    }
                    prompt.push_str("</CRITICAL_INSTRUCTIONS>\n\n");
                }
                PromptSection::Cue(cue) => {
                    prompt.push_str(&cue);
                    prompt.push_str("\n\n");
                }
            }
        }

        prompt.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_prompt() {
        let prompt = PromptBuilder::new()
            .role("technical writer", "the codebase demo")
            .objectives(&["Explain the module", "Cite sources"])
            .build();

        assert!(prompt.contains("<ROLE>"));
        assert!(prompt.contains("expert technical writer for the codebase demo"));
        assert!(prompt.contains("1. Explain the module"));
        assert!(prompt.contains("2. Cite sources"));
    }

    #[test]
    fn test_context_items_keep_order() {
        let prompt = PromptBuilder::new()
            .context_item("Repository", "demo")
            .text("between")
            .context_item("Page", "Overview")
            .build();

        let repo = prompt.find("**Repository**: demo").unwrap();
        let page = prompt.find("**Page**: Overview").unwrap();
        assert!(repo < page);
        assert!(page < prompt.find("between").unwrap());
    }

    #[test]
    fn test_rules_and_cue() {
        let prompt = PromptBuilder::new()
            .rules(&["Cite every claim", "Never invent files"])
            .section("QUESTION", "How?")
            .cue("ANSWER:")
            .build();

        assert!(prompt.contains("<CRITICAL_INSTRUCTIONS>\n1. Cite every claim\n2. Never invent files"));
        assert!(prompt.contains("# QUESTION\n\nHow?"));
        assert!(prompt.ends_with("ANSWER:"));
    }
}
