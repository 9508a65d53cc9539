//! Tree resolution: turns a parsed [`Node`] tree into a [`ResolvedValue`].
//!
//! Siblings (mapping values, sequence items) are resolved concurrently with
//! `try_join_all`; a parent completes only once all of its children have.
//! The first failing child fails the parent, and the futures of its siblings
//! are dropped, which cancels any fetch they still had in flight.

use futures::future::try_join_all;
use indexmap::IndexMap;
use streamline_yaml::{Directive, Node, NodeKind};
use tracing::debug;

use crate::evaluator::Scope;
use crate::registry::DirectiveRegistry;
use crate::{Error, ResolvedValue, Result};

/// Boxed future returned by the recursive resolution steps.
#[cfg(not(target_arch = "wasm32"))]
pub type ResolveFuture<'a, T> = futures::future::BoxFuture<'a, T>;

/// Boxed future returned by the recursive resolution steps.
#[cfg(target_arch = "wasm32")]
pub type ResolveFuture<'a, T> = futures::future::LocalBoxFuture<'a, T>;

/// Walks one document with one registry.
pub struct Resolver<'r> {
    registry: &'r DirectiveRegistry,
    scope: &'r Scope<'r>,
}

impl<'r> Resolver<'r> {
    pub(crate) fn new(registry: &'r DirectiveRegistry, scope: &'r Scope<'r>) -> Self {
        Self { registry, scope }
    }

    /// Resolve a parsed node.
    pub fn resolve_node<'n>(&'n self, node: &'n Node) -> ResolveFuture<'n, Result<ResolvedValue>> {
        Box::pin(async move {
            match &node.kind {
                NodeKind::Scalar(scalar) => Ok(ResolvedValue::from(scalar.clone())),

                NodeKind::Sequence(items) => {
                    let values = try_join_all(items.iter().map(|item| self.resolve_node(item))).await?;
                    Ok(ResolvedValue::Sequence(values))
                }

                NodeKind::Mapping(entries) => {
                    // Keys are coerced up front and never resolved.
                    let keys = entries
                        .iter()
                        .map(|entry| mapping_key(&entry.key))
                        .collect::<Result<Vec<_>>>()?;
                    let values =
                        try_join_all(entries.iter().map(|entry| self.resolve_node(&entry.value)))
                            .await?;

                    // A repeated key keeps its first position and its last value.
                    let mut map = IndexMap::with_capacity(keys.len());
                    for (key, value) in keys.into_iter().zip(values) {
                        map.insert(key, value);
                    }
                    Ok(ResolvedValue::Mapping(map))
                }

                NodeKind::Directive(directive) => self.resolve_directive(directive).await,
            }
        })
    }

    /// Walk already-resolved data. Returns an equal value.
    pub fn resolve_value<'n>(
        &'n self,
        value: &'n ResolvedValue,
    ) -> ResolveFuture<'n, Result<ResolvedValue>> {
        Box::pin(async move {
            match value {
                ResolvedValue::Sequence(items) => {
                    let values = try_join_all(items.iter().map(|item| self.resolve_value(item))).await?;
                    Ok(ResolvedValue::Sequence(values))
                }
                ResolvedValue::Mapping(entries) => {
                    let values =
                        try_join_all(entries.values().map(|v| self.resolve_value(v))).await?;
                    Ok(ResolvedValue::Mapping(
                        entries.keys().cloned().zip(values).collect(),
                    ))
                }
                primitive => Ok(primitive.clone()),
            }
        })
    }

    async fn resolve_directive(&self, directive: &Directive) -> Result<ResolvedValue> {
        let handler = self
            .registry
            .get(&directive.name)
            .ok_or_else(|| Error::UnknownDirective {
                name: directive.name.clone(),
                location: directive.tag_source.clone(),
            })?;

        debug!(
            directive = %directive.name,
            payload = %directive.payload,
            base_url = %self.scope.base_url(),
            "Resolving directive"
        );
        handler.construct(&directive.payload, self.scope).await
    }
}

/// Coerce a mapping key node to its output key.
fn mapping_key(key: &Node) -> Result<String> {
    match &key.kind {
        NodeKind::Scalar(scalar) => Ok(scalar.to_key_string()),
        _ => Err(Error::InvalidKey {
            location: key.source_info.clone(),
        }),
    }
}

/// Input the resolver accepts: parsed nodes, or data that is already resolved.
pub trait Resolve {
    fn resolve_with<'n>(&'n self, resolver: &'n Resolver<'_>) -> ResolveFuture<'n, Result<ResolvedValue>>;
}

impl Resolve for Node {
    fn resolve_with<'n>(&'n self, resolver: &'n Resolver<'_>) -> ResolveFuture<'n, Result<ResolvedValue>> {
        resolver.resolve_node(self)
    }
}

impl Resolve for ResolvedValue {
    fn resolve_with<'n>(&'n self, resolver: &'n Resolver<'_>) -> ResolveFuture<'n, Result<ResolvedValue>> {
        resolver.resolve_value(self)
    }
}
