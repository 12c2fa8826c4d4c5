//! Input files from a directory tree

use crate::pipeline::{Contents, InputFile};
use anyhow::{Context, Result};
use futures::{Stream, StreamExt, stream};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Regular files under `dir`, sorted by name
///
/// # Errors
///
/// Will return `Err` if a directory can not be read
pub fn walk(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = entry.with_context(|| format!("unable to walk {}", dir.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Read every file in memory, a file that can't be read has no contents
pub fn buffered(base: &Path, paths: Vec<PathBuf>) -> impl Stream<Item = InputFile> + Send + 'static {
    let base = base.to_path_buf();

    stream::iter(paths).then(move |path| {
        let base = base.clone();
        async move {
            match tokio::fs::read(&path).await {
                Ok(contents) => InputFile::buffered(path, base, contents),
                Err(err) => {
                    log::warn!("unable to read {}: {err}", path.display());
                    InputFile::new(path, base, Contents::Null)
                }
            }
        }
    })
}

/// Files without contents, enough for the keys
pub fn keys_only(base: &Path, paths: Vec<PathBuf>) -> impl Stream<Item = InputFile> + Send + 'static {
    let base = base.to_path_buf();
    stream::iter(paths).map(move |path| InputFile::new(path, base.clone(), Contents::Null))
}
