//! Index Command
//!
//! Rebuild the code collection of a repository already under the clone
//! root.

use crate::app::AppContext;
use crate::cli::Output;
use crate::types::{DocumateError, Result};

pub async fn run(app: &AppContext, repo_name: &str) -> Result<bool> {
    let repo_path = app.repos.repo_path(repo_name);
    if !repo_path.is_dir() {
        return Err(DocumateError::not_found("Repository", repo_path));
    }

    let out = Output::new();
    let indexed = app.indexer.index_repository(&repo_path).await?;
    if indexed {
        out.success(&format!("Indexed '{}'", repo_name));
    } else {
        out.warning(&format!("No indexable files in '{}'", repo_name));
    }
    Ok(indexed)
}
