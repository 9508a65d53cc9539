//! Error types for include resolution.

use streamline_source::SourceError;
use streamline_yaml::SourceInfo;

/// Errors that abort a resolution.
///
/// Nothing is recovered from internally: the first error raised anywhere in
/// the document tree, including inside nested includes, is the error the
/// caller sees.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The document source answered with a failing status.
    #[error("Failed to fetch {url}: {status} {status_text}")]
    Fetch {
        url: String,
        status: u16,
        status_text: String,
    },

    /// The document source could not produce a response at all.
    #[error("Failed to fetch {url}: {source}")]
    Source {
        url: String,
        #[source]
        source: SourceError,
    },

    /// An included document was empty and empty documents are rejected.
    #[error("Included document {url} is empty")]
    EmptyDocument { url: String },

    /// A directory manifest was missing or not a JSON array of file names.
    #[error("Invalid manifest {url}: {message}")]
    Manifest { url: String, message: String },

    /// A tag with no registered directive handler.
    #[error("Unknown directive '!{name}' at {location}")]
    UnknownDirective { name: String, location: SourceInfo },

    /// The document text is not valid YAML.
    #[error("Failed to parse {}: {source}", url.as_deref().unwrap_or("document"))]
    Parse {
        url: Option<String>,
        #[source]
        source: streamline_yaml::Error,
    },

    /// A mapping key that is a collection or a directive.
    #[error("Mapping key at {location} must be a scalar")]
    InvalidKey { location: SourceInfo },

    #[error("Base URL '{0}' must end with '/'")]
    InvalidBaseUrl(String),

    /// A document includes one of the documents that (transitively) includes it.
    #[error("Include cycle detected: {}", chain.join(" -> "))]
    Cycle { url: String, chain: Vec<String> },

    #[error("Including {url} exceeds the maximum include depth of {max_depth}")]
    IncludeTooDeep { url: String, max_depth: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
