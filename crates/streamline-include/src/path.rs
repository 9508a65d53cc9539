//! URL rules for relative includes.
//!
//! Include paths are joined by plain concatenation: there is no `.`/`..`
//! normalization and no scheme handling. Every document resolves its own
//! includes against the directory it was fetched from.

use std::fmt;

use crate::{Error, Result};

/// Base URL used when the caller does not supply one.
pub const DEFAULT_BASE_URL: &str = "/hacsfiles/streamline-card/";

/// The directory context a document's relative includes resolve against.
///
/// Always ends with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BaseUrl(String);

impl BaseUrl {
    /// Validate a caller-supplied base URL.
    pub fn parse(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if url.ends_with('/') {
            Ok(Self(url))
        } else {
            Err(Error::InvalidBaseUrl(url))
        }
    }

    /// The directory of a fetched document: `url` truncated after its last `/`.
    pub fn of_document(url: &str) -> Result<Self> {
        match url.rfind('/') {
            Some(idx) => Ok(Self(url[..=idx].to_string())),
            None => Err(Error::InvalidBaseUrl(url.to_string())),
        }
    }

    /// Resolve a relative path against this base.
    pub fn join(&self, relative: &str) -> String {
        format!("{}{}", self.0, relative)
    }

    /// Resolve a relative directory against this base.
    pub fn join_dir(&self, relative: &str) -> BaseUrl {
        let mut url = self.join(relative);
        if !url.ends_with('/') {
            url.push('/');
        }
        BaseUrl(url)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BaseUrl {
    fn default() -> Self {
        Self(DEFAULT_BASE_URL.to_string())
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Compute the absolute fetch URL for a path relative to `base`.
pub fn resolve_path(base: &BaseUrl, relative: &str) -> String {
    base.join(relative)
}

/// Strip the extension from the last segment of a file name.
///
/// `one.yaml` → `one`, `a.b.yml` → `a.b`. Names without an extension and
/// dot-files such as `.hidden` are returned unchanged.
pub fn strip_extension(name: &str) -> &str {
    let segment_start = name.rfind('/').map_or(0, |idx| idx + 1);
    match name[segment_start..].rfind('.') {
        Some(dot) if dot > 0 => &name[..segment_start + dot],
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_must_end_with_slash() {
        assert!(BaseUrl::parse("/a/").is_ok());
        assert!(matches!(BaseUrl::parse("/a"), Err(Error::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_resolve_is_concatenation() {
        let base = BaseUrl::parse("/a/").unwrap();
        assert_eq!(resolve_path(&base, "b.yaml"), "/a/b.yaml");
        assert_eq!(resolve_path(&base, "c/d.yaml"), "/a/c/d.yaml");
        // No normalization.
        assert_eq!(resolve_path(&base, "../e.yaml"), "/a/../e.yaml");
    }

    #[test]
    fn test_document_directory() {
        assert_eq!(
            BaseUrl::of_document("/a/c/d.yaml").unwrap().as_str(),
            "/a/c/"
        );
        assert_eq!(
            BaseUrl::of_document("https://ha.local/x.yaml").unwrap().as_str(),
            "https://ha.local/"
        );
        assert!(BaseUrl::of_document("x.yaml").is_err());
    }

    #[test]
    fn test_join_dir_adds_trailing_slash() {
        let base = BaseUrl::parse("/a/").unwrap();
        assert_eq!(base.join_dir("pkgs").as_str(), "/a/pkgs/");
        assert_eq!(base.join_dir("pkgs/").as_str(), "/a/pkgs/");
    }

    #[test]
    fn test_strip_extension() {
        assert_eq!(strip_extension("one.yaml"), "one");
        assert_eq!(strip_extension("two.yml"), "two");
        assert_eq!(strip_extension("a.b.yaml"), "a.b");
        assert_eq!(strip_extension("noext"), "noext");
        assert_eq!(strip_extension(".hidden"), ".hidden");
        assert_eq!(strip_extension("v1.2/card"), "v1.2/card");
        assert_eq!(strip_extension("sub/card.yaml"), "sub/card");
    }

    #[test]
    fn test_default_base_url() {
        assert_eq!(BaseUrl::default().as_str(), DEFAULT_BASE_URL);
    }
}
