use crate::ai::prompt::PromptBuilder;

pub fn planner(repo_name: &str) -> String {
    PromptBuilder::new()
        .role("technical writer", "planning the README of a software project")
        .context_item("Repository", repo_name)
        .text(
            "A Q&A tool can answer questions about the codebase from its source files. \
             Plan the research needed to write a README covering the project overview, \
             its architecture and how its core components interact, setup and usage, and \
             its key features.",
        )
        .rules(&[
            "Write 5-7 specific research questions.",
            "Put each question on its own line.",
            "Output only the questions, with no introduction or closing text.",
        ])
        .cue("RESEARCH PLAN:")
        .build()
}

pub fn diagram(research_notes: &str) -> String {
    PromptBuilder::new()
        .role("system architect", "high-level architecture diagrams")
        .text(
            "Generate a high-level architecture diagram based on the research about a codebase.",
        )
        .rules(&[
            "The diagram's syntax MUST be Mermaid 'graph TD' (top-down).",
            "Output ONLY the Mermaid code. No other text, explanation or markdown fences.",
            "Show the main components, services or modules and the primary flow of data or \
             control between them.",
            "Keep it high-level and focus on the big picture.",
        ])
        .section("Research Notes (Questions and Answers)", research_notes)
        .section(
            "Example of a good output",
            "graph TD\n    A[User Request] --> B(API Server);\n    B --> C{Database};\n    \
             B --> D[Authentication Service];",
        )
        .cue("MERMAID DIAGRAM:")
        .build()
}

pub fn writer(repo_name: &str, research_notes: &str, diagram: &str) -> String {
    PromptBuilder::new()
        .role("technical writer", "a high-quality README.md")
        .text(
            "Synthesize the questions and answers researched from the codebase into a clear, \
             well-structured markdown document.",
        )
        .context_item("Repository", repo_name)
        .section("Research Notes (Questions and Answers)", research_notes)
        .section("Diagram", &format!("```mermaid\n{}\n```", diagram))
        .objectives(&[
            &format!("`# {}`: the project title.", repo_name),
            "`## Overview`: a brief, high-level summary of the project.",
            "`## Architecture`: the core components and their interactions, with the Mermaid \
             diagram block included here.",
            "`## Setup and Usage`: how to set up and run the project locally.",
            "`## Key Features`: a brief highlight of 1-2 important features.",
        ])
        .rules(&[
            "Keep the source file citations (e.g. `src/main.js`) from the research notes.",
            "Use a professional tone that helps a new developer approach the codebase.",
            "Output only the raw markdown, with no text before the title or after the document.",
        ])
        .cue("README.md:")
        .build()
}
