//! On-disk collection layout.
//!
//! ```text
//! <vector_root>/<repo>/code/collection.db    source chunks
//! <vector_root>/<repo>/wiki/collection.db    wiki page chunks
//! <vector_root>/<repo>/collection.db         legacy single collection
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use super::collection::Collection;
use crate::constants::layout::{CODE_COLLECTION, WIKI_COLLECTION};
use crate::types::Result;

/// Which content a collection holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Code,
    Wiki,
    /// Pre-split layout: one collection per repository
    Legacy,
}

impl CollectionKind {
    /// Label used when presenting chunks to the model
    pub fn label(&self) -> &'static str {
        match self {
            CollectionKind::Code | CollectionKind::Legacy => "Source Code",
            CollectionKind::Wiki => "Wiki Page",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CollectionLayout {
    vector_root: PathBuf,
}

impl CollectionLayout {
    pub fn new(vector_root: impl Into<PathBuf>) -> Self {
        Self {
            vector_root: vector_root.into(),
        }
    }

    pub fn vector_root(&self) -> &Path {
        &self.vector_root
    }

    pub fn repo_dir(&self, repo: &str) -> PathBuf {
        self.vector_root.join(repo)
    }

    pub fn dir(&self, repo: &str, kind: CollectionKind) -> PathBuf {
        match kind {
            CollectionKind::Code => self.repo_dir(repo).join(CODE_COLLECTION),
            CollectionKind::Wiki => self.repo_dir(repo).join(WIKI_COLLECTION),
            CollectionKind::Legacy => self.repo_dir(repo),
        }
    }

    /// Collections present for `repo`. The legacy layout is only used
    /// when neither split collection exists.
    pub fn available(&self, repo: &str) -> Vec<(CollectionKind, PathBuf)> {
        let split: Vec<_> = [CollectionKind::Code, CollectionKind::Wiki]
            .into_iter()
            .map(|kind| (kind, self.dir(repo, kind)))
            .filter(|(_, dir)| Collection::exists(dir))
            .collect();

        if !split.is_empty() {
            return split;
        }

        let legacy = self.dir(repo, CollectionKind::Legacy);
        if Collection::exists(&legacy) {
            vec![(CollectionKind::Legacy, legacy)]
        } else {
            Vec::new()
        }
    }

    /// Repository directories under the vector root, sorted. A missing
    /// root yields an empty list.
    pub fn repositories(&self) -> Result<Vec<String>> {
        if !self.vector_root.is_dir() {
            return Ok(Vec::new());
        }

        let mut repos = Vec::new();
        for entry in fs::read_dir(&self.vector_root)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if entry.file_type()?.is_dir() && !name.starts_with('.') {
                repos.push(name);
            }
        }
        repos.sort();
        Ok(repos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::collection::EmbeddedChunk;
    use tempfile::TempDir;

    fn make(dir: &Path) {
        let chunk = EmbeddedChunk {
            source: "f".to_string(),
            ordinal: 0,
            content: "c".to_string(),
            embedding: vec![1.0],
        };
        Collection::create(dir, "mock", "m", &[chunk]).unwrap();
    }

    #[test]
    fn test_missing_root_has_no_repositories() {
        let temp = TempDir::new().unwrap();
        let layout = CollectionLayout::new(temp.path().join("absent"));
        assert!(layout.repositories().unwrap().is_empty());
    }

    #[test]
    fn test_split_collections_preferred() {
        let temp = TempDir::new().unwrap();
        let layout = CollectionLayout::new(temp.path());
        make(&layout.dir("r", CollectionKind::Code));
        make(&layout.dir("r", CollectionKind::Wiki));

        let kinds: Vec<_> = layout.available("r").into_iter().map(|(k, _)| k).collect();
        assert_eq!(kinds, vec![CollectionKind::Code, CollectionKind::Wiki]);
        assert_eq!(layout.repositories().unwrap(), vec!["r".to_string()]);
    }

    #[test]
    fn test_legacy_fallback() {
        let temp = TempDir::new().unwrap();
        let layout = CollectionLayout::new(temp.path());
        make(&layout.dir("old", CollectionKind::Legacy));

        let available = layout.available("old");
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].0, CollectionKind::Legacy);
        assert!(layout.available("none").is_empty());
    }

    #[test]
    fn test_labels() {
        assert_eq!(CollectionKind::Wiki.label(), "Wiki Page");
        assert_eq!(CollectionKind::Legacy.label(), "Source Code");
    }
}
