/*
 * traits.rs
 *
 * Defines the DocumentSource trait and its response/error types.
 */

use async_trait::async_trait;
use std::io;
use std::sync::Arc;

/// Result type for source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// A document source shared between concurrent include branches.
pub type SharedSource = Arc<dyn DocumentSource>;

/// Transport-level failures.
///
/// A response with a failing HTTP status is *not* a `SourceError`: it is
/// returned as a [`FetchResponse`] so that callers decide which statuses they
/// tolerate.
#[derive(Debug)]
pub enum SourceError {
    /// Standard I/O error
    Io(io::Error),

    /// Network operation failed
    Network(String),

    /// URL is outside the allowed scope (see `ScopedSource`)
    Denied(String),

    /// URL cannot be served by this source (e.g. a scheme it does not speak)
    NotSupported(String),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Io(e) => write!(f, "I/O error: {}", e),
            SourceError::Network(msg) => write!(f, "Network error: {}", msg),
            SourceError::Denied(msg) => write!(f, "Access denied: {}", msg),
            SourceError::NotSupported(msg) => write!(f, "Operation not supported: {}", msg),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for SourceError {
    fn from(e: io::Error) -> Self {
        SourceError::Io(e)
    }
}

/// A response from a document source.
///
/// Mirrors the parts of a fetch() response the resolver looks at. A status of
/// `0` means the transport reported no status at all (opaque or `file:`
/// responses in browsers).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl FetchResponse {
    pub fn new(status: u16, status_text: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body: body.into(),
        }
    }

    /// A `200 OK` response with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, "OK", body)
    }

    /// A `404 Not Found` response with an empty body.
    pub fn not_found() -> Self {
        Self::new(404, "Not Found", "")
    }

    /// Whether the status is in the 2xx range.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether this is a hard failure: not ok, and a real status was given.
    pub fn is_failure(&self) -> bool {
        !self.is_ok() && self.status != 0
    }

    /// Whether the body holds nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.body.trim().is_empty()
    }
}

/// Retrieves document text for a URL.
///
/// Implementations must be safe to call concurrently: the resolver issues
/// fetches for sibling includes at the same time.
///
/// ## Async Trait Send Bounds
///
/// On native targets, `fetch` produces `Send` futures so resolution can run on
/// a multi-threaded runtime. On WASM it produces `?Send` futures because
/// `JsFuture` is not `Send`.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait DocumentSource: Send + Sync {
    /// Fetch the document at `url`.
    async fn fetch(&self, url: &str) -> SourceResult<FetchResponse>;

    /// Short name of the source, for logging.
    fn name(&self) -> &'static str;
}
