//! Where a node came from.

use serde::{Deserialize, Serialize};

/// A position in a YAML document, used to point errors at the directive or
/// key that caused them.
///
/// `file` holds the URL the document was fetched from, when there is one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub file: Option<String>,
    /// Byte offset of the first character
    pub offset: usize,
    /// 1-based
    pub line: usize,
    /// 1-based, counted in characters
    pub col: usize,
    /// Byte length; approximate for scalars
    pub len: usize,
}

impl SourceInfo {
    pub fn new(file: Option<String>, offset: usize, line: usize, col: usize, len: usize) -> Self {
        SourceInfo { file, offset, line, col, len }
    }

    /// Position of a parser event. yaml-rust2 lines are already 1-based;
    /// its columns start at 0.
    pub fn from_marker(marker: &yaml_rust2::scanner::Marker, len: usize) -> Self {
        SourceInfo::new(None, marker.index(), marker.line(), marker.col() + 1, len)
    }

    pub fn with_file(self, file: impl Into<String>) -> Self {
        SourceInfo {
            file: Some(file.into()),
            ..self
        }
    }

    /// Byte offset just past the end.
    pub fn end_offset(&self) -> usize {
        self.offset + self.len
    }
}

/// The start of an unnamed document.
impl Default for SourceInfo {
    fn default() -> Self {
        SourceInfo::new(None, 0, 1, 1, 0)
    }
}

impl std::fmt::Display for SourceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}:{}", file, self.line, self.col),
            None => write!(f, "{}:{}", self.line, self.col),
        }
    }
}
