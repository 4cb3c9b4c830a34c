//! Wiki Command
//!
//! Generate a repository's wiki, or browse one already generated.
//!
//! Usage:
//!   documate wiki generate <repo>
//!   documate wiki show <repo> [--page <file>]

use std::path::Path;

use crate::app::AppContext;
use crate::ai::validation::render_fenced;
use crate::cli::Output;
use crate::types::{DocumateError, Result};
use crate::wiki::WikiGenerationReport;
use crate::wiki::store::{load_structure, read_page, wiki_dir};

pub async fn generate(app: &AppContext, repo_name: &str) -> Result<WikiGenerationReport> {
    let repo_path = app.repos.repo_path(repo_name);
    let report = app.wiki.generate(repo_name, &repo_path).await?;

    let out = Output::new();
    out.success(&format!(
        "Wrote {} pages to {}",
        report.pages_written,
        report.output_dir.display()
    ));
    if report.wiki_indexed {
        out.success("Wiki collection indexed");
    } else {
        out.warning("Wiki collection was not indexed");
    }
    Ok(report)
}

/// Print the navigation tree and one page, defaulting to the first page
pub fn show(wiki_root: &Path, repo_name: &str, page: Option<&str>) -> Result<String> {
    let dir = wiki_dir(wiki_root, repo_name);
    let structure = load_structure(&dir)?;

    let out = Output::new();
    out.wiki_tree(&structure);

    let file = match page {
        Some(file) => {
            if structure.find(file).is_none() {
                return Err(DocumateError::not_found("Wiki page", dir.join(file)));
            }
            file.to_string()
        }
        None => match structure.walk().first() {
            Some((first, _)) => first.file.clone(),
            None => {
                out.info("This wiki has no pages.");
                return Ok(String::new());
            }
        },
    };

    let rendered = render_fenced(&read_page(&dir, &file)?);
    out.section(&file);
    out.body(&rendered);
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::diagram::MARKER;
    use crate::testing::{ScriptedLlm, app_with};
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_generate_then_show() {
        let temp = TempDir::new().unwrap();
        let llm = ScriptedLlm::new()
            .on_json(
                "FLAT LIST",
                json!({
                    "title": "Demo Wiki",
                    "pages": [
                        {"title": "Overview", "file": "01_Overview.md"},
                        {"title": "Flow", "file": "01_01_Flow.md", "parent_file": "01_Overview.md"}
                    ]
                }),
            )
            .on("QUESTIONS:", "1. What happens?")
            .on("page titled \"Overview\"", "# Overview\n\nPlain text.")
            .on("page titled \"Flow\"", "# Flow\n\nThe request flow.\n## Steps\nMore.")
            .on("Topic to Diagram", "graph TD\n    A --> B")
            .with_default("An answer.")
            .into_shared();
        let app = app_with(temp.path(), &llm);

        let repo = app.repos.repo_path("demo");
        std::fs::create_dir_all(repo.join("src")).unwrap();
        std::fs::write(repo.join("src/lib.rs"), "pub fn demo() {}").unwrap();
        app.indexer.index_repository(&repo).await.unwrap();

        let report = generate(&app, "demo").await.unwrap();
        assert_eq!(report.pages_written, 2);
        assert!(report.wiki_indexed);

        let first = show(&app.config.paths.wiki_root, "demo", None).unwrap();
        assert_eq!(first, "# Overview\n\nPlain text.");

        let flow = show(&app.config.paths.wiki_root, "demo", Some("01_01_Flow.md")).unwrap();
        assert!(flow.contains("```mermaid\ngraph TD\n    A --> B\n```"));
        assert!(!flow.contains(MARKER));
    }

    #[test]
    fn test_show_missing_wiki_and_page() {
        let temp = TempDir::new().unwrap();
        let wiki_root = temp.path().join("wikis");
        assert!(matches!(
            show(&wiki_root, "ghost", None),
            Err(DocumateError::NotFound { .. })
        ));

        let dir = wiki_dir(&wiki_root, "demo");
        let structure = crate::wiki::WikiStructure {
            title: "Demo".to_string(),
            pages: vec![crate::wiki::Page::leaf("Intro", "01.md")],
        };
        crate::wiki::store::save_structure(&dir, &structure).unwrap();
        assert!(matches!(
            show(&wiki_root, "demo", Some("99.md")),
            Err(DocumateError::NotFound { .. })
        ));
    }
}
