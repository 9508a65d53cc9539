//! The built-in include directives.

use async_trait::async_trait;
use futures::future::try_join_all;
use indexmap::IndexMap;
use tracing::debug;

use crate::evaluator::Scope;
use crate::path::{resolve_path, strip_extension};
use crate::registry::DirectiveHandler;
use crate::{EmptyDocumentPolicy, Error, ResolvedValue, Result};

/// `!include-one <path>`: splice in one document.
///
/// Also registered as `!include`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeOne;

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl DirectiveHandler for IncludeOne {
    fn name(&self) -> &str {
        "include-one"
    }

    fn aliases(&self) -> &[&str] {
        &["include"]
    }

    async fn construct(&self, payload: &str, scope: &Scope<'_>) -> Result<ResolvedValue> {
        let url = resolve_path(scope.base_url(), payload.trim());
        scope.include(&url).await
    }
}

/// `!include-dir-named <dir>`: splice in every document listed in the
/// directory's manifest, keyed by file name without extension.
///
/// Also registered as `!include_dir_named`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeDirNamed;

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl DirectiveHandler for IncludeDirNamed {
    fn name(&self) -> &str {
        "include-dir-named"
    }

    fn aliases(&self) -> &[&str] {
        &["include_dir_named"]
    }

    async fn construct(&self, payload: &str, scope: &Scope<'_>) -> Result<ResolvedValue> {
        let directory = scope.base_url().join_dir(payload.trim());
        let manifest_url = resolve_path(&directory, &scope.options().manifest_name);
        let names = fetch_manifest(scope, &manifest_url).await?;
        debug!(directory = %directory, count = names.len(), "Including directory");

        let values = try_join_all(names.iter().map(|name| {
            let url = resolve_path(&directory, name);
            async move { scope.include(&url).await }
        }))
        .await?;

        let entries: IndexMap<String, ResolvedValue> = names
            .iter()
            .map(|name| strip_extension(name).to_string())
            .zip(values)
            .collect();
        Ok(ResolvedValue::Mapping(entries))
    }
}

impl Scope<'_> {
    /// Fetch the document at `url` and resolve it as a child of this document.
    ///
    /// The child resolves its own includes against its own directory. A
    /// failing status is an error; an empty body is handled according to
    /// [`EmptyDocumentPolicy`].
    pub async fn include(&self, url: &str) -> Result<ResolvedValue> {
        let child = self.enter(url)?;
        debug!(
            url,
            depth = child.depth(),
            source = self.source().name(),
            "Fetching included document"
        );

        let response = self
            .source()
            .fetch(url)
            .await
            .map_err(|source| Error::Source {
                url: url.to_string(),
                source,
            })?;

        if response.is_failure() {
            return Err(Error::Fetch {
                url: url.to_string(),
                status: response.status,
                status_text: response.status_text,
            });
        }

        if response.is_blank() {
            return match self.options().empty_document {
                EmptyDocumentPolicy::EmptyMapping => {
                    debug!(url, "Included document is empty");
                    Ok(ResolvedValue::empty_mapping())
                }
                EmptyDocumentPolicy::Reject => Err(Error::EmptyDocument {
                    url: url.to_string(),
                }),
            };
        }

        self.evaluator().evaluate_in(&response.body, &child).await
    }
}

/// Fetch and decode a directory manifest: a JSON array of file names.
async fn fetch_manifest(scope: &Scope<'_>, url: &str) -> Result<Vec<String>> {
    let manifest_error = |message: String| Error::Manifest {
        url: url.to_string(),
        message,
    };

    let response = scope
        .source()
        .fetch(url)
        .await
        .map_err(|e| manifest_error(e.to_string()))?;

    if response.is_failure() {
        return Err(manifest_error(format!(
            "{} {}",
            response.status, response.status_text
        )));
    }
    if response.is_blank() {
        return Err(manifest_error("manifest is empty".to_string()));
    }

    serde_json::from_str(&response.body).map_err(|e| manifest_error(e.to_string()))
}
