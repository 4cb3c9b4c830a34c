//! Repository manager: fetches repositories into the clone root.
//!
//! Git URLs are cloned with libgit2; ZIP archives are extracted in place.
//! Both always start from a clean destination. Failures are logged and
//! reported as `None` so callers can surface a simple message.

use secrecy::{ExposeSecret, SecretString};
use std::fs;
use std::io::{self, Cursor, Read};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::types::{DocumateError, Result};

const TOKEN_USER: &str = "x-token-auth";

#[derive(Debug, Clone)]
pub struct RepoManager {
    clone_root: PathBuf,
}

impl RepoManager {
    /// Create the manager, creating `clone_root` if needed
    pub fn new(clone_root: impl Into<PathBuf>) -> Result<Self> {
        let clone_root = clone_root.into();
        fs::create_dir_all(&clone_root)?;
        let clone_root = clone_root.canonicalize().unwrap_or(clone_root);
        info!("Repositories will be stored in: {}", clone_root.display());
        Ok(Self { clone_root })
    }

    pub fn clone_root(&self) -> &Path {
        &self.clone_root
    }

    pub fn repo_path(&self, name: &str) -> PathBuf {
        self.clone_root.join(name)
    }

    /// Local directory name for a repository URL.
    ///
    /// `https://github.com/owner/repo.git` becomes `owner_repo`.
    pub fn repo_name_from_url(url: &str) -> String {
        let path = Url::parse(url)
            .map(|u| u.path().to_string())
            .unwrap_or_else(|_| url.to_string());
        let path = path.trim_start_matches('/').trim_end_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        path.replace('/', "_")
    }

    /// Clone `url` into a fresh directory under the clone root.
    ///
    /// With a personal access token the URL is rewritten to carry
    /// `x-token-auth:<pat>` credentials.
    pub async fn clone_repo(&self, url: &str, pat: Option<&SecretString>) -> Option<PathBuf> {
        let name = Self::repo_name_from_url(url);
        if name.is_empty() {
            error!("Cannot derive a repository name from '{}'", url);
            return None;
        }
        let destination = self.repo_path(&name);

        let clone_url = match pat {
            Some(pat) => match authenticated_url(url, pat) {
                Ok(u) => u,
                Err(e) => {
                    error!("Error cloning repository: {}", e);
                    return None;
                }
            },
            None => url.to_string(),
        };

        info!("Cloning '{}' into '{}'", url, destination.display());
        let target = destination.clone();
        let outcome = tokio::task::spawn_blocking(move || clone_fresh(&clone_url, &target)).await;

        match outcome {
            Ok(Ok(())) => {
                info!("Successfully cloned repository to: {}", destination.display());
                Some(destination)
            }
            Ok(Err(e)) => {
                error!("Error cloning repository: {}", e);
                remove_if_exists(&destination);
                None
            }
            Err(e) => {
                error!("Clone task failed: {}", e);
                remove_if_exists(&destination);
                None
            }
        }
    }

    /// Extract an uploaded ZIP archive into a fresh directory named after
    /// the file (without `.zip`, spaces replaced by `_`).
    ///
    /// When every entry lives under one top-level directory, that directory's
    /// contents become the repository root.
    pub fn extract_zip(&self, bytes: &[u8], original_filename: &str) -> Option<PathBuf> {
        let name = zip_dir_name(original_filename);
        if name.is_empty() || name == "." || name == ".." {
            error!("Cannot derive a directory name from '{}'", original_filename);
            return None;
        }
        let destination = self.repo_path(&name);
        info!("Extracting '{}' to '{}'", original_filename, destination.display());

        match extract_fresh(bytes, &destination) {
            Ok(written) => {
                info!(
                    "Successfully extracted {} entries to: {}",
                    written,
                    destination.display()
                );
                Some(destination)
            }
            Err(e) => {
                error!("Error extracting archive: {}", e);
                remove_if_exists(&destination);
                None
            }
        }
    }

    /// Names of the repositories present under the clone root, sorted
    pub fn list_local(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = fs::read_dir(&self.clone_root)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .filter(|name| !name.starts_with('.'))
            .collect();
        names.sort();
        Ok(names)
    }
}

fn authenticated_url(url: &str, pat: &SecretString) -> Result<String> {
    let mut parsed = Url::parse(url)
        .map_err(|e| DocumateError::Ingestion(format!("Invalid repository URL '{}': {}", url, e)))?;
    parsed
        .set_username(TOKEN_USER)
        .and_then(|_| parsed.set_password(Some(pat.expose_secret())))
        .map_err(|_| {
            DocumateError::Ingestion(format!("Cannot attach credentials to URL '{}'", url))
        })?;
    Ok(parsed.to_string())
}

fn clone_fresh(url: &str, destination: &Path) -> Result<()> {
    if destination.exists() {
        info!(
            "Found existing directory. Removing '{}' for a fresh start",
            destination.display()
        );
        fs::remove_dir_all(destination)?;
    }
    git2::Repository::clone(url, destination)?;
    Ok(())
}

fn zip_dir_name(original_filename: &str) -> String {
    let file_name = Path::new(original_filename)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let stem = file_name.strip_suffix(".zip").unwrap_or(&file_name);
    stem.replace(' ', "_")
}

fn extract_fresh(bytes: &[u8], destination: &Path) -> Result<usize> {
    if destination.exists() {
        info!(
            "Found existing directory. Removing '{}' for a fresh extraction",
            destination.display()
        );
        fs::remove_dir_all(destination)?;
    }
    fs::create_dir_all(destination)?;

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;

    let mut entries: Vec<(usize, PathBuf)> = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        match normalized(entry.enclosed_name()) {
            Some(path) => entries.push((i, path)),
            None => warn!("Skipping unsafe archive entry: {}", entry.name()),
        }
    }

    let hoist = single_top_level_dir(&entries, &mut archive)?;
    if let Some(top) = &hoist {
        debug!("Hoisting single top-level directory '{}'", top);
    }

    let mut written = 0;
    for (i, path) in entries {
        let relative = match &hoist {
            Some(_) => path.components().skip(1).collect::<PathBuf>(),
            None => path,
        };
        if relative.as_os_str().is_empty() {
            continue;
        }

        let mut entry = archive.by_index(i)?;
        let out_path = destination.join(&relative);
        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Stream: header sizes come from the archive and are not trusted
        io::copy(&mut entry, &mut fs::File::create(&out_path)?)?;
        written += 1;
    }

    Ok(written)
}

/// `enclosed_name` already refuses absolute and escaping paths; this
/// drops `.` and folds the remaining `..` so hoisting sees plain components
fn normalized(enclosed: Option<PathBuf>) -> Option<PathBuf> {
    let mut path = PathBuf::new();
    for component in enclosed?.components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::ParentDir => {
                path.pop();
            }
            _ => {}
        }
    }
    (!path.as_os_str().is_empty()).then_some(path)
}

/// The shared top-level directory name when every entry lives under it
fn single_top_level_dir<R: Read + std::io::Seek>(
    entries: &[(usize, PathBuf)],
    archive: &mut zip::ZipArchive<R>,
) -> Result<Option<String>> {
    let mut top: Option<String> = None;
    let mut is_directory = false;

    for (i, path) in entries {
        let Some(first) = path.components().next() else {
            continue;
        };
        let first = first.as_os_str().to_string_lossy().to_string();
        match &top {
            Some(existing) if *existing != first => return Ok(None),
            Some(_) => {}
            None => top = Some(first),
        }
        if path.components().count() > 1 || archive.by_index(*i)?.is_dir() {
            is_directory = true;
        }
    }

    Ok(top.filter(|_| is_directory))
}

fn remove_if_exists(path: &Path) {
    if path.exists()
        && let Err(e) = fs::remove_dir_all(path)
    {
        warn!("Failed to clean up {}: {}", path.display(), e);
    }
}
