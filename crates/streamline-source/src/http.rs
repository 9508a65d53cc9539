/*
 * http.rs
 *
 * Document source that fetches over HTTP(S).
 */

use async_trait::async_trait;
use tracing::debug;

use crate::traits::{DocumentSource, FetchResponse, SourceError, SourceResult};

/// Fetches documents with `reqwest`.
///
/// Include URLs are usually server-relative (`/hacsfiles/...`), the way a
/// browser would resolve them against the page. Outside a browser there is
/// no page, so relative URLs are joined onto a configured origin.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    origin: Option<String>,
}

impl HttpSource {
    /// A source that only accepts absolute `http(s)://` URLs.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            origin: None,
        }
    }

    /// A source that resolves server-relative URLs against `origin`
    /// (e.g. `http://homeassistant.local:8123`).
    pub fn with_origin(origin: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            origin: Some(origin.into().trim_end_matches('/').to_string()),
        }
    }

    fn absolute_url(&self, url: &str) -> SourceResult<String> {
        if url.starts_with("http://") || url.starts_with("https://") {
            return Ok(url.to_string());
        }
        match &self.origin {
            Some(origin) if url.starts_with('/') => Ok(format!("{}{}", origin, url)),
            Some(origin) => Ok(format!("{}/{}", origin, url)),
            None => Err(SourceError::NotSupported(format!(
                "relative URL {} requires an origin",
                url
            ))),
        }
    }
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    async fn fetch(&self, url: &str) -> SourceResult<FetchResponse> {
        let absolute = self.absolute_url(url)?;
        debug!(url = %absolute, "Fetching document over HTTP");

        let response = self
            .client
            .get(&absolute)
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("{}: {}", absolute, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Network(format!("{}: {}", absolute, e)))?;

        Ok(FetchResponse::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
            body,
        ))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_urls_pass_through() {
        let source = HttpSource::with_origin("http://ha.local:8123");
        assert_eq!(
            source.absolute_url("https://cdn.example.com/a.yaml").unwrap(),
            "https://cdn.example.com/a.yaml"
        );
    }

    #[test]
    fn test_relative_urls_join_origin() {
        let source = HttpSource::with_origin("http://ha.local:8123/");
        assert_eq!(
            source.absolute_url("/hacsfiles/card/a.yaml").unwrap(),
            "http://ha.local:8123/hacsfiles/card/a.yaml"
        );
        assert_eq!(
            source.absolute_url("local/a.yaml").unwrap(),
            "http://ha.local:8123/local/a.yaml"
        );
    }

    #[test]
    fn test_relative_url_without_origin() {
        let source = HttpSource::new();
        assert!(matches!(
            source.absolute_url("/a.yaml"),
            Err(SourceError::NotSupported(_))
        ));
    }
}
