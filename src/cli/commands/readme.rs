//! Readme Command
//!
//! Run the documentation agent for a repository and print or save the
//! README it writes.

use std::path::Path;

use crate::app::AppContext;
use crate::cli::Output;
use crate::types::Result;

pub async fn run(app: &AppContext, repo_name: &str, output: Option<&Path>) -> Result<String> {
    let document = app.docs.generate(repo_name).await?;
    let out = Output::new();

    match output {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, &document).await?;
            out.success(&format!("README written to {}", path.display()));
        }
        None => out.body(&document),
    }
    Ok(document)
}
