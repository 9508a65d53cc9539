//! Directive handlers and the table that dispatches to them.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::evaluator::Scope;
use crate::include::{IncludeDirNamed, IncludeOne};
use crate::{ResolvedValue, Result};

/// Produces the value that replaces a directive node.
///
/// Handlers are stateless; everything they need about the document being
/// resolved comes from the [`Scope`]. A handler that includes other documents
/// should go through [`Scope::include`] so that nested documents get their
/// own base URL and cycle tracking.
///
/// ```rust,ignore
/// struct Env;
///
/// #[async_trait]
/// impl DirectiveHandler for Env {
///     fn name(&self) -> &str {
///         "env"
///     }
///
///     async fn construct(&self, payload: &str, _scope: &Scope<'_>) -> Result<ResolvedValue> {
///         Ok(ResolvedValue::String(std::env::var(payload.trim()).unwrap_or_default()))
///     }
/// }
/// ```
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait DirectiveHandler: Send + Sync {
    /// Tag name without the leading `!`.
    fn name(&self) -> &str;

    /// Additional tag names for the same directive.
    fn aliases(&self) -> &[&str] {
        &[]
    }

    /// Build the value for a directive with the given payload.
    ///
    /// The result is used as-is; it is not resolved again.
    async fn construct(&self, payload: &str, scope: &Scope<'_>) -> Result<ResolvedValue>;
}

/// Tag name → handler table.
///
/// A fresh registry is built for every document evaluated, so no state is
/// shared between resolutions.
#[derive(Clone, Default)]
pub struct DirectiveRegistry {
    handlers: HashMap<String, Arc<dyn DirectiveHandler>>,
}

impl DirectiveRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in include directives.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(IncludeOne));
        registry.register(Arc::new(IncludeDirNamed));
        registry
    }

    /// Register a handler under its name and aliases.
    ///
    /// A later registration replaces an earlier one with the same name.
    pub fn register(&mut self, handler: Arc<dyn DirectiveHandler>) {
        for alias in handler.aliases() {
            self.handlers.insert(alias.to_string(), Arc::clone(&handler));
        }
        self.handlers.insert(handler.name().to_string(), handler);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn DirectiveHandler>> {
        self.handlers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered tag names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for DirectiveRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectiveRegistry")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant;

    #[cfg_attr(not(target_arch = "wasm32"), async_trait)]
    #[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
    impl DirectiveHandler for Constant {
        fn name(&self) -> &str {
            "include-one"
        }

        async fn construct(&self, _payload: &str, _scope: &Scope<'_>) -> Result<ResolvedValue> {
            Ok(ResolvedValue::Integer(7))
        }
    }

    #[test]
    fn test_standard_names() {
        let registry = DirectiveRegistry::standard();
        assert_eq!(
            registry.names(),
            vec!["include", "include-dir-named", "include-one", "include_dir_named"]
        );
    }

    #[test]
    fn test_later_registration_replaces() {
        let mut registry = DirectiveRegistry::standard();
        registry.register(Arc::new(Constant));
        assert!(registry.contains("include-one"));
        // The alias still points at the built-in handler.
        assert_eq!(
            registry.get("include").map(|h| h.name().to_string()),
            Some("include-one".to_string())
        );
    }

    #[test]
    fn test_unknown_name() {
        assert!(DirectiveRegistry::new().get("include-one").is_none());
        assert!(format!("{:?}", DirectiveRegistry::new()).contains("DirectiveRegistry"));
    }
}
