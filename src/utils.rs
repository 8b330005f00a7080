use crate::Result;
use anyhow::Context;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Write a file.
pub(crate) async fn write(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::write(path, contents)
        .await
        .context(format!("Unable to write to {}", path.to_string_lossy()))
}

/// Read a file to a `String`.
pub(crate) async fn read(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file at {}", path.display()))
}

/// Create a directory and all of its parents.
pub(crate) async fn make_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::create_dir_all(path)
        .await
        .with_context(|| format!("Unable to create directory at {}", path.to_string_lossy()))
}

/// Remove a file.
pub(crate) async fn remove(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::remove_file(path)
        .await
        .with_context(|| format!("Unable to remove file {}", path.display()))
}

pub(crate) async fn read_dir(path: impl AsRef<Path>) -> Result<tokio::fs::ReadDir> {
    let path = path.as_ref();
    tokio::fs::read_dir(path)
        .await
        .with_context(|| format!("Unable to read directory {}", path.display()))
}

/// Flushes an in-memory CSV writer and returns its bytes.
pub(crate) fn csv_bytes(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Unable to flush CSV output: {}", e.error()))
}

/// Removes every file under `folder` that matches `pattern`, where `*` stands for any run of
/// characters in the file name. The pattern may contain leading directories, relative to
/// `folder`. A missing directory is not an error. Returns the removed paths, sorted.
pub(crate) async fn remove_matching(folder: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let full = folder.join(pattern);
    let dir = match full.parent() {
        Some(parent) => parent.to_path_buf(),
        None => folder.to_path_buf(),
    };
    let file_pattern = full
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .with_context(|| format!("The pattern '{pattern}' has no file name"))?;
    let re = wildcard(&file_pattern)?;

    let mut removed = Vec::new();
    if !dir.is_dir() {
        return Ok(removed);
    }
    let mut entries = read_dir(&dir).await?;
    while let Some(entry) = entries
        .next_entry()
        .await
        .context("Failed to read directory entry")?
    {
        let path = entry.path();
        let name = entry.file_name();
        if path.is_file() && re.is_match(&name.to_string_lossy()) {
            remove(&path).await?;
            removed.push(path);
        }
    }
    removed.sort();
    Ok(removed)
}

/// Compiles a `*` wildcard into an anchored regular expression.
pub(crate) fn wildcard(pattern: &str) -> Result<Regex> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^{body}$"))
        .with_context(|| format!("Unable to compile the file pattern '{pattern}'"))
}
