//! # streamline-include
//!
//! Resolves YAML documents whose local tags pull in other documents.
//!
//! A document such as
//!
//! ```yaml
//! header: !include-one header.yaml
//! cards: !include-dir-named cards
//! ```
//!
//! is parsed with its tags intact (see `streamline-yaml`), then every
//! directive is replaced by the value its handler constructs:
//!
//! - `!include-one <path>` (alias `!include`) fetches `<base><path>` and
//!   resolves it recursively, against the included document's own directory.
//! - `!include-dir-named <dir>` (alias `!include_dir_named`) reads
//!   `<base><dir>/manifest.json`, a JSON array of file names, and produces a
//!   mapping from each name without its extension to the resolved document.
//!
//! Sibling values resolve concurrently. The result is plain data
//! ([`ResolvedValue`]) with mapping keys in source order.
//!
//! Documents come from a [`DocumentSource`]; see `streamline-source` for the
//! in-memory, file, HTTP and browser implementations.

mod error;
mod evaluator;
mod include;
mod options;
mod path;
mod registry;
mod resolver;
mod value;

pub use error::{Error, Result};
pub use evaluator::{Evaluator, EvaluatorBuilder, Scope};
pub use include::{IncludeDirNamed, IncludeOne};
pub use options::{EmptyDocumentPolicy, ResolveOptions};
pub use path::{BaseUrl, DEFAULT_BASE_URL, resolve_path, strip_extension};
pub use registry::{DirectiveHandler, DirectiveRegistry};
pub use resolver::{Resolve, ResolveFuture, Resolver};
pub use value::ResolvedValue;

pub use streamline_source::{
    DocumentSource, FetchResponse, MemorySource, SharedSource, SourceError,
};
pub use streamline_yaml::SourceInfo;

/// Resolve `text` with the default options and built-in directives.
///
/// Shorthand for `Evaluator::new(source).evaluate_document(text, base_url)`.
pub async fn evaluate_document(
    text: &str,
    base_url: &str,
    source: SharedSource,
) -> Result<ResolvedValue> {
    Evaluator::new(source).evaluate_document(text, base_url).await
}
