/*
 * file.rs
 *
 * Document source backed by a local directory.
 */

use async_trait::async_trait;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::traits::{DocumentSource, FetchResponse, SourceError, SourceResult};

/// Maps server-relative URLs onto files below a root directory.
///
/// `/cards/main.yaml` is read from `<root>/cards/main.yaml`. Missing files
/// answer `404 Not Found`, like a static file server would. `..` segments
/// are resolved lexically; URLs with a scheme, or paths whose `..` segments
/// climb above the root, are refused.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, url: &str) -> SourceResult<PathBuf> {
        if url.contains("://") {
            return Err(SourceError::NotSupported(format!(
                "file source cannot fetch absolute URL {}",
                url
            )));
        }

        // Normalize `.` and `..` the way a web server would, but never
        // above the root.
        let escapes = || SourceError::Denied(format!("{} escapes the source root", url));
        let mut relative = PathBuf::new();
        for component in Path::new(url.trim_start_matches('/')).components() {
            match component {
                Component::Normal(segment) => relative.push(segment),
                Component::CurDir => {}
                Component::ParentDir => {
                    if !relative.pop() {
                        return Err(escapes());
                    }
                }
                Component::RootDir | Component::Prefix(_) => return Err(escapes()),
            }
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl DocumentSource for FileSource {
    async fn fetch(&self, url: &str) -> SourceResult<FetchResponse> {
        let path = self.path_for(url)?;
        debug!(url, path = %path.display(), "Reading document from disk");

        match tokio::fs::read_to_string(&path).await {
            Ok(body) => Ok(FetchResponse::ok(body)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(FetchResponse::not_found()),
            Err(e) => Err(SourceError::Io(e)),
        }
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
