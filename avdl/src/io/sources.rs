//! Candidate source discovery on disk.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Expand source roots into a sorted, de-duplicated candidate list.
///
/// A file root is a candidate as-is. A directory root contributes every
/// regular file beneath it; hidden files and directories are skipped.
pub fn discover_candidates(roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut candidates = BTreeSet::new();
    for root in roots {
        if root.is_file() {
            candidates.insert(root.clone());
            continue;
        }
        if !root.is_dir() {
            return Err(anyhow!("source path not found: {}", root.display()));
        }
        for entry in WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
        {
            let entry = entry.with_context(|| format!("walk {}", root.display()))?;
            if entry.file_type().is_file() {
                candidates.insert(entry.into_path());
            }
        }
    }
    debug!(count = candidates.len(), "discovered candidate sources");
    Ok(candidates.into_iter().collect())
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

/// Resolve `path` against `base` unless it is already absolute.
pub fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
