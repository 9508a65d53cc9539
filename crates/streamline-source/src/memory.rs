/*
 * memory.rs
 *
 * In-memory document source.
 */

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::traits::{DocumentSource, FetchResponse, SourceResult};

/// Serves documents from an in-memory table keyed by URL.
///
/// Unknown URLs answer `404 Not Found`. Every requested URL is recorded in
/// request order, which makes the source useful for checking what a
/// resolution actually fetched.
#[derive(Debug, Default)]
pub struct MemorySource {
    responses: HashMap<String, FetchResponse>,
    requests: Mutex<Vec<String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` with status 200 at `url`.
    pub fn with_document(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.with_response(url, FetchResponse::ok(body))
    }

    /// Serve an arbitrary response at `url`.
    pub fn with_response(mut self, url: impl Into<String>, response: FetchResponse) -> Self {
        self.responses.insert(url.into(), response);
        self
    }

    /// URLs requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl DocumentSource for MemorySource {
    async fn fetch(&self, url: &str) -> SourceResult<FetchResponse> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());

        Ok(self
            .responses
            .get(url)
            .cloned()
            .unwrap_or_else(FetchResponse::not_found))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
