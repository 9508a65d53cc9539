//! Parsed YAML nodes with source location tracking.

use crate::SourceInfo;

/// A node of a parsed YAML document.
///
/// Unlike `yaml_rust2::Yaml`, a node never resolves local tags: a scalar
/// written as `!name payload` is kept as a [`NodeKind::Directive`] so that a
/// later pass can decide what the tag means.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// What this node is.
    pub kind: NodeKind,

    /// Source location for this node.
    pub source_info: SourceInfo,
}

/// The shape of a [`Node`].
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Key/value pairs in source order
    Mapping(Vec<NodeEntry>),

    /// Items in source order
    Sequence(Vec<Node>),

    /// A plain or quoted scalar
    Scalar(Scalar),

    /// A scalar carrying a local tag
    Directive(Directive),
}

/// A primitive YAML value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    String(String),
}

/// A locally tagged scalar, e.g. `!include-one cards.yaml`.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    /// Tag suffix without the leading `!` (e.g. "include-one")
    pub name: String,

    /// Raw scalar text following the tag
    pub payload: String,

    /// Source location of the tagged scalar
    pub tag_source: SourceInfo,
}

/// A key-value pair in a YAML mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeEntry {
    pub key: Node,
    pub value: Node,

    /// Source location of the entire entry (key + value)
    pub entry_span: SourceInfo,
}

impl Node {
    pub fn new(kind: NodeKind, source_info: SourceInfo) -> Self {
        Self { kind, source_info }
    }

    /// Create a scalar node.
    pub fn scalar(scalar: Scalar, source_info: SourceInfo) -> Self {
        Self::new(NodeKind::Scalar(scalar), source_info)
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self.kind, NodeKind::Mapping(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self.kind, NodeKind::Sequence(_))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.kind, NodeKind::Scalar(_))
    }

    pub fn is_directive(&self) -> bool {
        matches!(self.kind, NodeKind::Directive(_))
    }

    pub fn as_mapping(&self) -> Option<&[NodeEntry]> {
        match &self.kind {
            NodeKind::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match &self.kind {
            NodeKind::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match &self.kind {
            NodeKind::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// Get a mapping value by key (string comparison).
    ///
    /// Returns None if this is not a mapping or the key is not found. When a
    /// key is repeated, the last occurrence wins, as it does in resolution.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_mapping()?
            .iter()
            .rev()
            .find(|entry| entry.key.as_scalar().and_then(Scalar::as_str) == Some(key))
            .map(|entry| &entry.value)
    }

    /// Number of children (sequence length or mapping entry count).
    pub fn len(&self) -> usize {
        match &self.kind {
            NodeKind::Mapping(entries) => entries.len(),
            NodeKind::Sequence(items) => items.len(),
            NodeKind::Scalar(_) | NodeKind::Directive(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Scalar {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    /// Render the scalar as text, the way it is used as a mapping key.
    pub fn to_key_string(&self) -> String {
        match self {
            Scalar::Null => "null".to_string(),
            Scalar::Boolean(b) => b.to_string(),
            Scalar::Integer(i) => i.to_string(),
            Scalar::Real(f) => f.to_string(),
            Scalar::String(s) => s.clone(),
        }
    }
}

impl NodeEntry {
    pub fn new(key: Node, value: Node, entry_span: SourceInfo) -> Self {
        Self {
            key,
            value,
            entry_span,
        }
    }
}
