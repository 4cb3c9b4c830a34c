//! Content filter: decides which repository files get indexed.
//!
//! Rules come from a JSON document with two keys:
//!
//! ```json
//! {"allowed_extensions": [".py", ".md"], "excluded_patterns": ["*/node_modules/*"]}
//! ```
//!
//! Extensions are plain filename suffixes. Exclusion patterns are shell
//! globs joined onto the repository root and matched against the full
//! file path, with `*` free to cross directory separators.

use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::types::{DocumateError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileFilters {
    #[serde(default)]
    pub allowed_extensions: Vec<String>,
    #[serde(default)]
    pub excluded_patterns: Vec<String>,
}

impl FileFilters {
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading file filters from: {}", path.display());
        let raw = fs::read_to_string(path).map_err(|e| {
            DocumateError::Config(format!(
                "Cannot read file filters {}: {}",
                path.display(),
                e
            ))
        })?;
        let filters: Self = serde_json::from_str(&raw).map_err(|e| {
            DocumateError::Config(format!("Invalid file filters {}: {}", path.display(), e))
        })?;
        if filters.allowed_extensions.is_empty() {
            warn!("File filters allow no extensions; nothing will be indexed");
        }
        Ok(filters)
    }
}

#[derive(Debug, Clone)]
pub struct ContentFilter {
    filters: FileFilters,
}

impl ContentFilter {
    pub fn new(filters: FileFilters) -> Self {
        Self { filters }
    }

    pub fn filters(&self) -> &FileFilters {
        &self.filters
    }

    /// Files under `root` to index, sorted by path
    pub fn select(&self, root: &Path) -> Vec<PathBuf> {
        let patterns: Vec<glob::Pattern> = self
            .filters
            .excluded_patterns
            .iter()
            .filter_map(|pattern| {
                match glob::Pattern::new(&rooted_pattern(root, pattern)) {
                    Ok(p) => Some(p),
                    Err(e) => {
                        warn!("Ignoring invalid exclude pattern '{}': {}", pattern, e);
                        None
                    }
                }
            })
            .collect();

        // Plain directory walk: no ignore files, hidden entries included
        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .follow_links(false)
            .build();

        let mut selected: Vec<PathBuf> = walker
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
            .map(|entry| entry.into_path())
            .filter(|path| {
                let full = path.to_string_lossy();
                if patterns.iter().any(|p| p.matches(&full)) {
                    return false;
                }
                self.is_allowed(path)
            })
            .collect();

        selected.sort();
        debug!(
            "Found {} files to analyze after filtering {}",
            selected.len(),
            root.display()
        );
        selected
    }

    fn is_allowed(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
            return false;
        };
        self.filters
            .allowed_extensions
            .iter()
            .any(|ext| name.ends_with(ext.as_str()))
    }
}

/// `pattern` anchored at `root`, with glob syntax in the root taken literally
fn rooted_pattern(root: &Path, pattern: &str) -> String {
    let escaped = glob::Pattern::escape(&root.to_string_lossy());
    Path::new(&escaped).join(pattern).to_string_lossy().to_string()
}
