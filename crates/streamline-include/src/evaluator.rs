//! Resolution sessions.
//!
//! An [`Evaluator`] owns the document source, the options and any extra
//! directive handlers. Each call to [`Evaluator::evaluate_document`] (or one
//! of its siblings) is an independent resolution: it builds a fresh
//! [`DirectiveRegistry`] and a root [`Scope`], and shares nothing mutable with
//! other calls.

use std::sync::Arc;

use streamline_source::{DocumentSource, SharedSource};
use tracing::debug;

use crate::options::{EmptyDocumentPolicy, ResolveOptions};
use crate::path::BaseUrl;
use crate::registry::{DirectiveHandler, DirectiveRegistry};
use crate::resolver::{Resolve, Resolver};
use crate::{Error, ResolvedValue, Result};

/// Where a document sits in the include tree.
///
/// Handed to every [`DirectiveHandler`]. The base URL is the directory of the
/// document currently being resolved; `ancestors` lists the URLs of the
/// documents that led here, outermost first.
#[derive(Debug, Clone)]
pub struct Scope<'a> {
    evaluator: &'a Evaluator,
    base_url: BaseUrl,
    document_url: Option<String>,
    ancestors: Vec<String>,
}

impl<'a> Scope<'a> {
    pub(crate) fn root(evaluator: &'a Evaluator, base_url: BaseUrl) -> Self {
        Self {
            evaluator,
            base_url,
            document_url: None,
            ancestors: Vec::new(),
        }
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// URL of the document being resolved, `None` for the top-level text.
    pub fn document_url(&self) -> Option<&str> {
        self.document_url.as_deref()
    }

    pub fn ancestors(&self) -> &[String] {
        &self.ancestors
    }

    /// Include nesting depth. The top-level document is at depth 0.
    pub fn depth(&self) -> usize {
        self.ancestors.len()
    }

    pub fn source(&self) -> &dyn DocumentSource {
        self.evaluator.source.as_ref()
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.evaluator.options
    }

    pub fn evaluator(&self) -> &'a Evaluator {
        self.evaluator
    }

    /// The scope of a document included from this one.
    pub(crate) fn enter(&self, url: &str) -> Result<Scope<'a>> {
        let options = self.options();

        if options.detect_cycles && self.ancestors.iter().any(|a| a == url) {
            let mut chain = self.ancestors.clone();
            chain.push(url.to_string());
            return Err(Error::Cycle {
                url: url.to_string(),
                chain,
            });
        }

        if self.ancestors.len() >= options.max_include_depth {
            return Err(Error::IncludeTooDeep {
                url: url.to_string(),
                max_depth: options.max_include_depth,
            });
        }

        let mut ancestors = self.ancestors.clone();
        ancestors.push(url.to_string());
        Ok(Scope {
            evaluator: self.evaluator,
            base_url: BaseUrl::of_document(url)?,
            document_url: Some(url.to_string()),
            ancestors,
        })
    }
}

/// Resolves YAML documents with include directives into plain data.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use streamline_include::{Evaluator, MemorySource};
///
/// # async fn run() -> streamline_include::Result<()> {
/// let source = MemorySource::new().with_document("/cards/light.yaml", "type: light");
/// let evaluator = Evaluator::new(Arc::new(source));
/// let value = evaluator
///     .evaluate_document("card: !include light.yaml", "/cards/")
///     .await?;
/// assert_eq!(value.get("card").and_then(|c| c.get("type")).and_then(|t| t.as_str()), Some("light"));
/// # Ok(())
/// # }
/// ```
pub struct Evaluator {
    source: SharedSource,
    options: ResolveOptions,
    handlers: Vec<Arc<dyn DirectiveHandler>>,
}

impl Evaluator {
    /// An evaluator with default options and the built-in directives.
    pub fn new(source: SharedSource) -> Self {
        Self::builder(source).build()
    }

    pub fn builder(source: SharedSource) -> EvaluatorBuilder {
        EvaluatorBuilder {
            source,
            options: ResolveOptions::default(),
            handlers: Vec::new(),
        }
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// A fresh registry: the built-in directives plus any registered with
    /// [`EvaluatorBuilder::directive`].
    pub fn registry(&self) -> DirectiveRegistry {
        let mut registry = DirectiveRegistry::standard();
        for handler in &self.handlers {
            registry.register(Arc::clone(handler));
        }
        registry
    }

    /// Parse `text` and resolve every directive in it.
    ///
    /// Relative includes in `text` resolve against `base_url`, which must end
    /// with `/`. Included documents resolve their own includes against their
    /// own directory.
    pub async fn evaluate_document(&self, text: &str, base_url: &str) -> Result<ResolvedValue> {
        let scope = Scope::root(self, BaseUrl::parse(base_url)?);
        self.evaluate_in(text, &scope).await
    }

    /// Fetch the document at `url` and resolve it.
    ///
    /// The document is fetched exactly as an include would fetch it, so a
    /// failing status, an empty body, and cycles back to `url` are handled
    /// the same way.
    pub async fn evaluate_url(&self, url: &str) -> Result<ResolvedValue> {
        let scope = Scope::root(self, BaseUrl::of_document(url)?);
        scope.include(url).await
    }

    /// Resolve a parsed [`Node`](streamline_yaml::Node) tree or an already
    /// resolved value.
    pub async fn resolve<T: Resolve + ?Sized>(
        &self,
        input: &T,
        base_url: &str,
    ) -> Result<ResolvedValue> {
        let scope = Scope::root(self, BaseUrl::parse(base_url)?);
        let registry = self.registry();
        let resolver = Resolver::new(&registry, &scope);
        input.resolve_with(&resolver).await
    }

    pub(crate) async fn evaluate_in(&self, text: &str, scope: &Scope<'_>) -> Result<ResolvedValue> {
        let document_url = scope.document_url();
        let parsed = match document_url {
            Some(url) => streamline_yaml::parse_file(text, url),
            None => streamline_yaml::parse(text),
        };
        let root = parsed.map_err(|source| Error::Parse {
            url: document_url.map(str::to_string),
            source,
        })?;

        debug!(
            url = document_url.unwrap_or("<document>"),
            base_url = %scope.base_url(),
            "Resolving document"
        );

        let registry = self.registry();
        let resolver = Resolver::new(&registry, scope);
        resolver.resolve_node(&root).await
    }
}

impl std::fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator")
            .field("source", &self.source.name())
            .field("options", &self.options)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// Builder for [`Evaluator`].
pub struct EvaluatorBuilder {
    source: SharedSource,
    options: ResolveOptions,
    handlers: Vec<Arc<dyn DirectiveHandler>>,
}

impl EvaluatorBuilder {
    /// Replace all options at once.
    pub fn options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    pub fn empty_document(mut self, policy: EmptyDocumentPolicy) -> Self {
        self.options.empty_document = policy;
        self
    }

    pub fn detect_cycles(mut self, enabled: bool) -> Self {
        self.options.detect_cycles = enabled;
        self
    }

    pub fn max_include_depth(mut self, depth: usize) -> Self {
        self.options.max_include_depth = depth;
        self
    }

    pub fn manifest_name(mut self, name: impl Into<String>) -> Self {
        self.options.manifest_name = name.into();
        self
    }

    /// Register an additional directive. Replaces a built-in directive with
    /// the same name.
    pub fn directive(mut self, handler: Arc<dyn DirectiveHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn build(self) -> Evaluator {
        Evaluator {
            source: self.source,
            options: self.options,
            handlers: self.handlers,
        }
    }
}
