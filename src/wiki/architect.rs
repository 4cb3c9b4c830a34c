//! Wiki architect: plans the page list from the repository's file tree.

use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::prompts;
use super::types::FlatWikiStructure;
use crate::ai::SharedProvider;
use crate::constants::tree::{INDENT, SKIP_DIRS};
use crate::types::{DocumateError, Result};

/// Indented listing of `root`: the root directory first, then each
/// directory's files followed by its sub-directories, all sorted by name.
/// Hidden entries and dependency/cache directories are left out.
pub fn file_tree(root: &Path) -> String {
    let mut lines = Vec::new();
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| root.display().to_string());
    lines.push(format!("{}/", name));
    walk(root, 1, &mut lines);
    lines.join("\n")
}

fn walk(dir: &Path, depth: usize, lines: &mut Vec<String>) {
    let Ok(entries) = fs::read_dir(dir) else {
        debug!("Skipping unreadable directory {}", dir.display());
        return;
    };

    let mut files = Vec::new();
    let mut dirs = Vec::new();
    for entry in entries.filter_map(|e| e.ok()) {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        match entry.file_type() {
            Ok(t) if t.is_dir() => {
                if !SKIP_DIRS.contains(&name.as_str()) {
                    dirs.push(name);
                }
            }
            Ok(_) => files.push(name),
            Err(_) => {}
        }
    }
    files.sort();
    dirs.sort();

    let indent = " ".repeat(INDENT * depth);
    for file in files {
        lines.push(format!("{}{}", indent, file));
    }
    for sub in dirs {
        lines.push(format!("{}{}/", indent, sub));
        walk(&dir.join(&sub), depth + 1, lines);
    }
}

pub struct WikiArchitect {
    llm: SharedProvider,
}

impl WikiArchitect {
    pub fn new(llm: SharedProvider) -> Self {
        Self { llm }
    }

    /// Ask the model for a flat page plan of the repository
    pub async fn plan(&self, repo_name: &str, repo_path: &Path) -> Result<FlatWikiStructure> {
        info!("Designing wiki structure for {}", repo_name);

        let prompt = prompts::architect(&file_tree(repo_path));
        let response = self.llm.generate(&prompt, &FlatWikiStructure::schema()).await?;

        let plan: FlatWikiStructure = serde_json::from_value(response.content).map_err(|e| {
            DocumateError::pipeline("plan_structure", format!("Invalid wiki plan: {}", e))
        })?;

        info!(
            "Flat wiki structure designed for '{}' with {} total pages",
            plan.title,
            plan.pages.len()
        );
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedLlm, shared};
    use serde_json::json;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_file_tree_layout() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("demo");
        touch(&root, "README.md");
        touch(&root, "src/main.rs");
        touch(&root, "src/api/routes.rs");
        touch(&root, ".git/config");
        touch(&root, ".env");
        touch(&root, "node_modules/pkg/index.js");
        touch(&root, "app/__pycache__/x.pyc");

        assert_eq!(
            file_tree(&root),
            "demo/\n    README.md\n    app/\n    src/\n        main.rs\n        api/\n            routes.rs"
        );
    }

    #[tokio::test]
    async fn test_plan_parses_structured_output() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "lib.rs");
        let llm = ScriptedLlm::new()
            .on_json(
                "FLAT LIST",
                json!({"title": "Demo", "pages": [
                    {"title": "Intro", "file": "01_Intro.md"},
                    {"title": "API", "file": "01_01_API.md", "parent_file": "01_Intro.md"}
                ]}),
            )
            .into_shared();

        let plan = WikiArchitect::new(shared(&llm))
            .plan("demo", temp.path())
            .await
            .unwrap();
        assert_eq!(plan.title, "Demo");
        assert_eq!(plan.pages.len(), 2);
        assert!(llm.prompts()[0].contains("lib.rs"));
    }

    #[tokio::test]
    async fn test_plan_schema_failure_propagates() {
        let temp = TempDir::new().unwrap();
        let llm = ScriptedLlm::new()
            .on_json("FLAT LIST", json!({"pages": "not a list"}))
            .into_shared();

        let result = WikiArchitect::new(shared(&llm)).plan("demo", temp.path()).await;
        assert!(matches!(result, Err(DocumateError::Pipeline { .. })));
    }
}
