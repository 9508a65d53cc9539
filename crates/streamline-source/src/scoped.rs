/*
 * scoped.rs
 *
 * ScopedSource: restricts which URLs a wrapped source may fetch.
 *
 * Includes are written by whoever edits the dashboard configuration, so a
 * host may want to keep them inside the card's own directory. This source:
 * - Wraps any DocumentSource (decorator pattern)
 * - Checks each URL against deny patterns, then allow patterns
 * - Fails denied fetches with SourceError::Denied
 */

use async_trait::async_trait;
use tracing::warn;

use crate::traits::{DocumentSource, FetchResponse, SharedSource, SourceError, SourceResult};

/// A URL pattern.
///
/// Supports:
/// - `*`: matches everything
/// - Prefixes with a wildcard: `/hacsfiles/*` (everything starting with `/hacsfiles/`)
/// - Directory prefixes: `/hacsfiles/card/` (everything under it)
/// - Exact URLs: `/local/dashboard.yaml`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlPattern(String);

impl UrlPattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    /// Check if a URL matches this pattern.
    pub fn matches(&self, url: &str) -> bool {
        let pattern = self.0.as_str();

        if pattern == "*" {
            return true;
        }

        if let Some((prefix, _)) = pattern.split_once('*') {
            url.starts_with(prefix)
        } else if pattern.ends_with('/') {
            url.starts_with(pattern)
        } else {
            url == pattern
        }
    }
}

/// Which URLs a [`ScopedSource`] may fetch.
///
/// Deny patterns take precedence over allow patterns. An empty allow list
/// allows nothing.
#[derive(Debug, Clone, Default)]
pub struct SourcePolicy {
    pub allow: Vec<UrlPattern>,
    pub deny: Vec<UrlPattern>,
}

impl SourcePolicy {
    /// Fully permissive policy.
    pub fn allow_all() -> Self {
        Self {
            allow: vec![UrlPattern::new("*")],
            deny: Vec::new(),
        }
    }

    /// Allow everything below one URL prefix.
    pub fn allow_prefix(prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        Self {
            allow: vec![UrlPattern::new(prefix)],
            deny: Vec::new(),
        }
    }

    /// Add a deny pattern.
    pub fn deny(mut self, pattern: impl Into<String>) -> Self {
        self.deny.push(UrlPattern::new(pattern));
        self
    }

    pub fn permits(&self, url: &str) -> bool {
        // `..` segments could walk out of an allowed prefix.
        if url.split('/').any(|segment| segment == "..") {
            return false;
        }
        !self.deny.iter().any(|p| p.matches(url)) && self.allow.iter().any(|p| p.matches(url))
    }
}

/// A document source that enforces a [`SourcePolicy`] before delegating.
pub struct ScopedSource {
    inner: SharedSource,
    policy: SourcePolicy,
}

impl ScopedSource {
    pub fn new(inner: SharedSource, policy: SourcePolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &SourcePolicy {
        &self.policy
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl DocumentSource for ScopedSource {
    async fn fetch(&self, url: &str) -> SourceResult<FetchResponse> {
        if !self.policy.permits(url) {
            warn!(url, "Fetch denied by source policy");
            return Err(SourceError::Denied(format!(
                "{} is outside the allowed scope",
                url
            )));
        }
        self.inner.fetch(url).await
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
