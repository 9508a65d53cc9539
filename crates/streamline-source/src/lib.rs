/*
 * streamline-source
 *
 * Document sources for include resolution.
 *
 * A document source turns a URL into the text of a YAML document. The
 * resolver only sees the `DocumentSource` trait, so the same include logic
 * runs against different transports:
 *
 * - MemorySource: in-memory documents (tests, embedding)
 * - FileSource: URL paths mapped onto a local directory (native targets)
 * - HttpSource: HTTP(S) via reqwest (native targets)
 * - BrowserSource: the browser's fetch() (WASM targets)
 * - ScopedSource: restricts any source to allowed URL prefixes (decorator)
 */

mod memory;
mod scoped;
mod traits;

#[cfg(not(target_arch = "wasm32"))]
mod file;
#[cfg(not(target_arch = "wasm32"))]
mod http;

// Browser source is only compiled for WASM targets
#[cfg(target_arch = "wasm32")]
mod wasm;

pub use traits::{DocumentSource, FetchResponse, SharedSource, SourceError, SourceResult};

pub use memory::MemorySource;
pub use scoped::{ScopedSource, SourcePolicy, UrlPattern};

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileSource;
#[cfg(not(target_arch = "wasm32"))]
pub use http::HttpSource;

#[cfg(target_arch = "wasm32")]
pub use wasm::BrowserSource;
