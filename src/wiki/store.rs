//! Generated wiki on disk: `<wiki_root>/<repo>/structure.json` plus one
//! markdown file per page.

use std::fs;
use std::path::{Component, Path, PathBuf};

use super::types::WikiStructure;
use crate::constants::layout::STRUCTURE_FILE;
use crate::types::{DocumateError, Result};

pub fn wiki_dir(wiki_root: &Path, repo_name: &str) -> PathBuf {
    wiki_root.join(repo_name)
}

/// Where a page file lives inside `dir`. Only plain file names are
/// accepted; anything with separators or parent references is `None`.
pub fn page_path(dir: &Path, file: &str) -> Option<PathBuf> {
    let mut components = Path::new(file).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) => Some(dir.join(name)),
        _ => None,
    }
}

/// Whether `file` can be stored as a page inside a wiki directory
pub fn is_page_file(file: &str) -> bool {
    page_path(Path::new(""), file).is_some()
}

/// Replace `dir` with a fresh directory holding only `structure.json`
pub fn save_structure(dir: &Path, structure: &WikiStructure) -> Result<PathBuf> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)?;
    let path = dir.join(STRUCTURE_FILE);
    fs::write(&path, serde_json::to_string_pretty(structure)?)?;
    Ok(path)
}

pub fn load_structure(dir: &Path) -> Result<WikiStructure> {
    let path = dir.join(STRUCTURE_FILE);
    if !path.is_file() {
        return Err(DocumateError::not_found("Wiki structure", path));
    }
    Ok(serde_json::from_str(&fs::read_to_string(&path)?)?)
}

pub fn read_page(dir: &Path, file: &str) -> Result<String> {
    let path = page_path(dir, file)
        .ok_or_else(|| DocumateError::not_found("Wiki page", dir.join(file)))?;
    if !path.is_file() {
        return Err(DocumateError::not_found("Wiki page", path));
    }
    Ok(fs::read_to_string(path)?)
}
