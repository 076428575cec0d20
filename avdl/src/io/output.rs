//! Protocol file output.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Write protocol text to `path` as UTF-8, replacing any existing file.
///
/// JSON's default encoding is UTF-8, so the bytes are written as-is without
/// consulting the host locale. The parent directory is created if needed.
pub fn write_protocol_file(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir {}", parent.display()))?;
    }
    fs::write(path, text.as_bytes()).with_context(|| format!("write {}", path.display()))
}
