//! Language registry: file path -> language tag.
//!
//! Mapping is by lowercased extension; several extensions alias to one
//! language. `Unknown` disables semantic analysis and routes the file to a
//! raw-text "Text Conflict" fallback (handled by the classifier, not here).

use serde::{Deserialize, Serialize};
use std::path::Path;

/// A byte stream is binary if any NUL byte appears within this many bytes.
pub const BINARY_SCAN_WINDOW: usize = 8000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Go,
    Rust,
    Yaml,
    Json,
    Unknown,
}

impl Language {
    /// Detect a language tag from a file path by lowercased extension.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("py") | Some("pyi") => Language::Python,
            Some("js") | Some("mjs") | Some("cjs") | Some("jsx") => Language::JavaScript,
            Some("ts") | Some("tsx") | Some("mts") | Some("cts") => Language::TypeScript,
            Some("go") => Language::Go,
            Some("rs") => Language::Rust,
            Some("yaml") | Some("yml") => Language::Yaml,
            Some("json") => Language::Json,
            _ => Language::Unknown,
        }
    }

    /// Whether this language has a registered extractor. `Unknown` languages
    /// and mapping-keyed formats are handled separately by the pipeline.
    pub fn is_known(&self) -> bool {
        !matches!(self, Language::Unknown)
    }
}

/// A byte stream is declared binary if a NUL byte occurs in the first
/// [`BINARY_SCAN_WINDOW`] bytes.
pub fn looks_binary(content: &[u8]) -> bool {
    let window = &content[..content.len().min(BINARY_SCAN_WINDOW)];
    window.contains(&0u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn aliases_map_to_one_language() {
        for ext in ["js", "mjs", "cjs", "jsx"] {
            assert_eq!(
                Language::from_path(&PathBuf::from(format!("a.{ext}"))),
                Language::JavaScript
            );
        }
    }

    #[test]
    fn unknown_extension() {
        assert_eq!(Language::from_path(&PathBuf::from("a.xyz")), Language::Unknown);
        assert!(!Language::Unknown.is_known());
    }

    #[test]
    fn case_insensitive_extension() {
        assert_eq!(Language::from_path(&PathBuf::from("a.PY")), Language::Python);
    }

    #[test]
    fn binary_detection_scans_only_window() {
        let mut content = vec![b'a'; BINARY_SCAN_WINDOW + 10];
        content[BINARY_SCAN_WINDOW + 5] = 0;
        assert!(!looks_binary(&content));

        content[10] = 0;
        assert!(looks_binary(&content));
    }

    #[test]
    fn empty_content_not_binary() {
        assert!(!looks_binary(b""));
    }
}
