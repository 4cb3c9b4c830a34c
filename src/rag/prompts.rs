use crate::ai::prompt::PromptBuilder;

pub fn repo_answer(repo_name: &str, context: &str, question: &str) -> String {
    PromptBuilder::new()
        .role("AI assistant", &format!("the codebase **{}**", repo_name))
        .text(
            "Your goal is to give a developer helpful, accurate and detailed answers. \
             Use the context below, which holds source code chunks and wiki page chunks \
             from the repository, to answer the question.",
        )
        .rules(&[
            "Every factual claim MUST CITE its source file. The path is given in the context \
             markers (e.g. `--- START OF [Source Code] src/main.py ---`).",
            "Cite files directly in the answer, for example: \"As seen in `src/utils/helpers.py`, \
             the `format_data` function...\".",
            "Prefer [Wiki Page] chunks for conceptual and high-level questions and \
             [Source Code] chunks for implementation details.",
            "For an overview, synthesize information from multiple files and cite them all.",
            "If the context is insufficient, say clearly that the information could not be \
             found in the provided files. DO NOT make up answers.",
        ])
        .section("CONTEXT FROM THE CODEBASE", context)
        .section("QUESTION", question)
        .cue("DETAILED AND CITED ANSWER:")
        .build()
}

pub fn global_answer(context: &str, question: &str) -> String {
    PromptBuilder::new()
        .role(
            "AI assistant",
            "knowledge discovery across an entire organization's codebases",
        )
        .text(
            "Answer the user's question with the most relevant information from ANY \
             available repository.",
        )
        .rules(&[
            "The context holds code and documentation from MULTIPLE repositories.",
            "You MUST CITE the repository and file for every piece of information you use. \
             Each chunk is labelled `[From Repo: <repo_name>, Type: <Source Code/Wiki Page>, \
             File: <filename>]`.",
            "Synthesize a single cohesive answer. When several repositories are relevant, \
             combine them and cite each one.",
            "Prefer Wiki Page chunks for the high-level explanation.",
            "If you don't know the answer, state that clearly.",
        ])
        .section("CONTEXT FROM ALL REPOSITORIES", context)
        .section("USER'S GLOBAL QUESTION", question)
        .cue("COMPREHENSIVE, CITED ANSWER:")
        .build()
}
