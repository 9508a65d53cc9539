//! Error types for YAML parsing.

use crate::SourceInfo;

/// Result type alias for streamline-yaml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a node tree.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// YAML syntax error reported by the scanner
    #[error("YAML parse error: {message}")]
    Parse {
        message: String,
        location: Option<SourceInfo>,
    },

    /// An alias (`*name`) that refers to no earlier anchor
    #[error("Alias refers to an unknown anchor at line {}", location.line)]
    UnknownAlias { location: SourceInfo },

    /// A local tag placed on a mapping or sequence.
    ///
    /// Directives take a scalar payload, so `!tag` on a collection has no
    /// meaning here.
    #[error("Tag '!{tag}' at line {} must be applied to a scalar", location.line)]
    TaggedCollection { tag: String, location: SourceInfo },
}

impl Error {
    /// Source location of the error, when known.
    pub fn location(&self) -> Option<&SourceInfo> {
        match self {
            Error::Parse { location, .. } => location.as_ref(),
            Error::UnknownAlias { location } | Error::TaggedCollection { location, .. } => {
                Some(location)
            }
        }
    }
}

impl From<yaml_rust2::ScanError> for Error {
    fn from(err: yaml_rust2::ScanError) -> Self {
        Error::Parse {
            message: err.info().to_string(),
            location: Some(SourceInfo::from_marker(err.marker(), 0)),
        }
    }
}
