//! Source selection: extension filtering and output naming.

use std::path::{Path, PathBuf};

/// Extension of accepted IDL sources.
pub const IDL_EXTENSION: &str = "avdl";
/// Extension of generated protocol files.
pub const PROTOCOL_EXTENSION: &str = "avpr";

/// An accepted IDL source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// File name without its final extension.
    pub base_name: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let base_name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, base_name }
    }

    /// `<output_dir>/<base_name>.avpr`
    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{}.{}", self.base_name, PROTOCOL_EXTENSION))
    }
}

/// Candidates split by whether they carry the IDL extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub accepted: Vec<SourceFile>,
    pub rejected: Vec<PathBuf>,
}

/// True when `path` ends in exactly `.avdl` (case-sensitive).
pub fn has_idl_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == IDL_EXTENSION)
}

/// Partition candidates, preserving input order within each side.
pub fn partition_sources(candidates: &[PathBuf]) -> Selection {
    let mut selection = Selection::default();
    for candidate in candidates {
        if has_idl_extension(candidate) {
            selection.accepted.push(SourceFile::new(candidate));
        } else {
            selection.rejected.push(candidate.clone());
        }
    }
    selection
}

/// Human-readable message listing every rejected path.
pub fn unsupported_files_message(rejected: &[PathBuf]) -> String {
    let listed: Vec<String> = rejected.iter().map(|p| p.display().to_string()).collect();
    format!(
        "Unsupported file extension for the following files: [{}]",
        listed.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_splits_by_extension() {
        let candidates = vec![
            PathBuf::from("a/foo.avdl"),
            PathBuf::from("a/bar.avsc"),
            PathBuf::from("a/baz.AVDL"),
            PathBuf::from("a/README"),
            PathBuf::from("b/qux.avdl"),
        ];
        let selection = partition_sources(&candidates);
        let accepted: Vec<&str> = selection
            .accepted
            .iter()
            .map(|s| s.base_name.as_str())
            .collect();
        assert_eq!(accepted, vec!["foo", "qux"]);
        assert_eq!(
            selection.rejected,
            vec![
                PathBuf::from("a/bar.avsc"),
                PathBuf::from("a/baz.AVDL"),
                PathBuf::from("a/README"),
            ]
        );
    }

    #[test]
    fn empty_candidates_yield_empty_selection() {
        assert_eq!(partition_sources(&[]), Selection::default());
    }

    #[test]
    fn output_path_strips_only_final_extension() {
        let source = SourceFile::new("idl/com.example.v1.avdl");
        assert_eq!(source.base_name, "com.example.v1");
        assert_eq!(
            source.output_path(Path::new("/out")),
            PathBuf::from("/out/com.example.v1.avpr")
        );
    }

    #[test]
    fn unsupported_message_lists_every_path() {
        let message = unsupported_files_message(&[
            PathBuf::from("x/one.txt"),
            PathBuf::from("x/two.json"),
        ]);
        assert!(message.starts_with("Unsupported file extension"));
        assert!(message.contains("x/one.txt"));
        assert!(message.contains("x/two.json"));
    }
}
