//! Ingest Command
//!
//! Bring a repository under the clone root, from a git URL or a ZIP
//! archive, then index its code collection.
//!
//! Usage:
//!   documate ingest <url> [--pat <token>] [--no-index]
//!   documate ingest --zip <file> [--no-index]

use secrecy::SecretString;
use std::path::{Path, PathBuf};

use crate::app::AppContext;
use crate::cli::Output;
use crate::types::{DocumateError, Result};

pub enum IngestSource {
    Git { url: String, pat: Option<SecretString> },
    Zip(PathBuf),
}

pub async fn run(app: &AppContext, source: IngestSource, index: bool) -> Result<PathBuf> {
    let out = Output::new();

    let repo_path = match &source {
        IngestSource::Git { url, pat } => app.repos.clone_repo(url, pat.as_ref()).await,
        IngestSource::Zip(file) => {
            let bytes = tokio::fs::read(file).await?;
            app.repos.extract_zip(&bytes, &archive_name(file))
        }
    }
    .ok_or_else(|| DocumateError::Ingestion(format!("could not ingest {}", describe(&source))))?;

    out.success(&format!("Repository ready at {}", repo_path.display()));

    if index {
        if app.indexer.index_repository(&repo_path).await? {
            out.success("Code collection indexed");
        } else {
            out.warning("No indexable files found; nothing was indexed");
        }
    }
    Ok(repo_path)
}

fn archive_name(file: &Path) -> String {
    file.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn describe(source: &IngestSource) -> String {
    match source {
        IngestSource::Git { url, .. } => url.clone(),
        IngestSource::Zip(file) => file.display().to_string(),
    }
}
