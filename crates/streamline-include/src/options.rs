//! Resolution options.

use serde::{Deserialize, Serialize};

/// What an include does when the fetched document is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyDocumentPolicy {
    /// An empty (or whitespace-only) document resolves to `{}`.
    #[default]
    EmptyMapping,

    /// An empty document fails with `Error::EmptyDocument`.
    Reject,
}

/// Options for a resolution session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ResolveOptions {
    pub empty_document: EmptyDocumentPolicy,

    /// Fail with `Error::Cycle` when a document includes one of its own
    /// ancestors (default: true).
    pub detect_cycles: bool,

    /// Maximum include nesting (default: 64).
    ///
    /// Resolution fails with `Error::IncludeTooDeep` past this depth, which
    /// also bounds recursion when cycle detection is off.
    pub max_include_depth: usize,

    /// File name of the manifest read by directory includes
    /// (default: `manifest.json`).
    pub manifest_name: String,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            empty_document: EmptyDocumentPolicy::EmptyMapping,
            detect_cycles: true,
            max_include_depth: 64,
            manifest_name: "manifest.json".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ResolveOptions::default();
        assert_eq!(options.empty_document, EmptyDocumentPolicy::EmptyMapping);
        assert!(options.detect_cycles);
        assert_eq!(options.max_include_depth, 64);
        assert_eq!(options.manifest_name, "manifest.json");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let options: ResolveOptions =
            serde_json::from_str(r#"{"empty-document": "reject", "max-include-depth": 8}"#)
                .unwrap();
        assert_eq!(options.empty_document, EmptyDocumentPolicy::Reject);
        assert_eq!(options.max_include_depth, 8);
        assert!(options.detect_cycles);
    }
}
