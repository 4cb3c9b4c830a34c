//! Repos Command
//!
//! List local repositories and the collections each one has.

use crate::cli::Output;
use crate::repo::RepoManager;
use crate::storage::CollectionLayout;
use crate::types::Result;

/// Print each local repository with its collections; returns the rows printed
pub fn run(repos: &RepoManager, layout: &CollectionLayout) -> Result<Vec<(String, String)>> {
    let out = Output::new();
    let names = repos.list_local()?;
    if names.is_empty() {
        out.info("No repositories yet. Run 'documate ingest <url>' to add one.");
        return Ok(Vec::new());
    }

    out.header("Repositories");
    let mut rows = Vec::with_capacity(names.len());
    for name in names {
        let kinds: Vec<&str> = layout
            .available(&name)
            .iter()
            .map(|(kind, _)| kind.label())
            .collect();
        let collections = if kinds.is_empty() {
            "not indexed".to_string()
        } else {
            kinds.join(", ")
        };
        out.field(&name, &collections);
        rows.push((name, collections));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::CollectionKind;
    use crate::testing::seed_collection;
    use tempfile::TempDir;

    #[test]
    fn test_lists_repositories_with_collections() {
        let temp = TempDir::new().unwrap();
        let repos = RepoManager::new(temp.path().join("repos")).unwrap();
        let layout = CollectionLayout::new(temp.path().join("vectors"));
        assert!(run(&repos, &layout).unwrap().is_empty());

        std::fs::create_dir_all(repos.repo_path("alpha")).unwrap();
        std::fs::create_dir_all(repos.repo_path("beta")).unwrap();
        seed_collection(
            &layout.dir("alpha", CollectionKind::Code),
            &[("src/lib.rs", "pub fn alpha() {}")],
        );

        let rows = run(&repos, &layout).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], ("alpha".to_string(), CollectionKind::Code.label().to_string()));
        assert_eq!(rows[1], ("beta".to_string(), "not indexed".to_string()));
    }
}
