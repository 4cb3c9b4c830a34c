use crate::ai::prompt::PromptBuilder;

pub fn architect(file_structure: &str) -> String {
    PromptBuilder::new()
        .role(
            "software architect and technical writer",
            "designing the documentation wiki of a codebase",
        )
        .text(
            "Analyze the file structure of the codebase and design a comprehensive, \
             hierarchical structure for its documentation wiki. Output a JSON object with a \
             FLAT LIST of all pages. The hierarchy is defined by linking pages to their \
             parents via the `parent_file` field.",
        )
        .section("Codebase File Structure", &format!("```\n{}\n```", file_structure))
        .objectives(&[
            "Identify main components, features and logical groupings from the file structure.",
            "Design a table of contents that is intuitive for a new developer.",
            "Create clear, descriptive titles for each page.",
            "Generate unique, numbered filenames so pages sort logically \
             (e.g. `01_Setup.md`, `02_Architecture.md`).",
            "For nested pages set `parent_file` to the parent's filename. For example \
             `02_01_API_Server.md` has `parent_file: '02_Architecture.md'`.",
            "For top-level pages leave `parent_file` null or omit it.",
        ])
        .cue("Generate the complete JSON structure containing the flat list of all pages.")
        .build()
}

pub fn research_questions(repo_name: &str, page_title: &str, parent_title: &str) -> String {
    PromptBuilder::new()
        .role("technical writer", "a single, detailed documentation page")
        .text(&format!(
            "Your goal is a comprehensive, clear and well-structured markdown page about the \
             topic **\"{}\"**. You have a Q&A tool that answers questions about the codebase \
             from its source files.",
            page_title
        ))
        .context_item("Repository", &format!("`{}`", repo_name))
        .context_item("Section", &format!("`{}` (frame the explanation within it)", parent_title))
        .objectives(&[
            "Formulate 2-4 detailed questions about the topic that gather all the \
             information the page needs.",
            "Write each question on its own line as a numbered list item (`1. ...`).",
        ])
        .cue("QUESTIONS:")
        .build()
}

pub fn synthesize_page(page_title: &str, research_notes: &str) -> String {
    PromptBuilder::new()
        .role("technical writer", "synthesizing research into documentation")
        .text(&format!(
            "Synthesize the research notes below into a final, comprehensive markdown \
             document for the page titled \"{}\".",
            page_title
        ))
        .rules(&[
            "Preserve the source file citations from the notes.",
            "Include code blocks where they illustrate key points.",
            &format!(
                "Start directly with the page title as a main heading (`# {}`). Add no other \
                 introductory text.",
                page_title
            ),
        ])
        .section("Research Notes", research_notes)
        .cue("FINAL MARKDOWN DOCUMENT:")
        .build()
}

pub fn diagram(topic: &str, sentinel: &str) -> String {
    PromptBuilder::new()
        .role("system architect", "diagramming one part of a codebase")
        .context_item("Topic to Diagram", &format!("\"{}\"", topic))
        .rules(&[
            "Generate a Mermaid 'graph TD' (top-down) or 'graph LR' (left-to-right) diagram \
             that illustrates the flow or structure of this topic.",
            "Keep the diagram focused and not overly complex.",
            "Output ONLY the raw Mermaid code. Do not include ```mermaid or any other text.",
            &format!(
                "If a diagram is not applicable for this topic, output the single word: \"{}\".",
                sentinel
            ),
        ])
        .build()
}
