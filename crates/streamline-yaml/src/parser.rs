//! YAML parser that builds [`Node`] trees.

use std::collections::HashMap;

use crate::{Directive, Error, Node, NodeEntry, NodeKind, Result, Scalar, SourceInfo};
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser, Tag};
use yaml_rust2::scanner::{Marker, TScalarStyle};

/// Tag handle yaml-rust2 reports for `!!` core tags.
const CORE_TAG_PREFIX: &str = "tag:yaml.org,2002:";

/// Parse YAML from a string, producing a [`Node`] tree.
///
/// The stream must hold at most one document. An empty stream produces a
/// `Null` scalar.
///
/// # Example
///
/// ```rust
/// use streamline_yaml::parse;
///
/// let root = parse("title: My Dashboard").unwrap();
/// assert!(root.is_mapping());
/// ```
///
/// # Errors
///
/// Returns an error if the YAML is malformed, if the stream holds more than
/// one document, if an alias refers to an unknown anchor, or if a local tag
/// is applied to a collection.
pub fn parse(content: &str) -> Result<Node> {
    parse_impl(content, None)
}

/// Parse YAML from a string with an associated filename or URL.
///
/// The name is attached to every node's source location.
///
/// ```rust
/// use streamline_yaml::parse_file;
///
/// let root = parse_file("title: My Dashboard", "/cards/main.yaml").unwrap();
/// assert_eq!(root.source_info.file, Some("/cards/main.yaml".into()));
/// ```
pub fn parse_file(content: &str, filename: &str) -> Result<Node> {
    parse_impl(content, Some(filename))
}

fn parse_impl(content: &str, filename: Option<&str>) -> Result<Node> {
    let mut parser = Parser::new_from_str(content);
    let mut builder = NodeBuilder::new(filename);

    parser
        .load(&mut builder, true)
        .map_err(|e| builder.locate(Error::from(e)))?;

    builder.result()
}

/// Builder that implements MarkedEventReceiver to construct a Node tree.
struct NodeBuilder {
    filename: Option<String>,

    /// Stack of collections being constructed
    stack: Vec<BuildNode>,

    /// Completed anchored nodes, keyed by yaml-rust2 anchor id
    anchors: HashMap<usize, Node>,

    root: Option<Node>,

    /// Documents started so far
    documents: usize,

    /// First error seen; later events are ignored once set
    error: Option<Error>,
}

/// A collection being constructed during parsing.
enum BuildNode {
    Sequence {
        start_marker: Marker,
        anchor_id: usize,
        items: Vec<Node>,
    },

    Mapping {
        start_marker: Marker,
        anchor_id: usize,
        entries: Vec<(Node, Option<Node>)>,
    },
}

impl NodeBuilder {
    fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(|s| s.to_string()),
            stack: Vec::new(),
            anchors: HashMap::new(),
            root: None,
            documents: 0,
            error: None,
        }
    }

    fn result(self) -> Result<Node> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Ok(self.root.unwrap_or_else(|| {
            let source_info = SourceInfo::new(self.filename.clone(), 0, 1, 1, 0);
            Node::scalar(Scalar::Null, source_info)
        }))
    }

    /// Attach the filename to a scanner error's location.
    fn locate(&self, error: Error) -> Error {
        match (error, &self.filename) {
            (
                Error::Parse {
                    message,
                    location: Some(location),
                },
                Some(file),
            ) => Error::Parse {
                message,
                location: Some(location.with_file(file.clone())),
            },
            (error, _) => error,
        }
    }

    fn fail(&mut self, error: Error) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn push_complete(&mut self, node: Node, anchor_id: usize) {
        if anchor_id != 0 {
            self.anchors.insert(anchor_id, node.clone());
        }

        let Some(parent) = self.stack.last_mut() else {
            self.root = Some(node);
            return;
        };

        match parent {
            BuildNode::Sequence { items, .. } => items.push(node),
            BuildNode::Mapping { entries, .. } => match entries.last_mut() {
                Some((_, value @ None)) => *value = Some(node),
                _ => entries.push((node, None)),
            },
        }
    }

    fn make_source_info(&self, marker: &Marker, len: usize) -> SourceInfo {
        let info = SourceInfo::from_marker(marker, len);
        match &self.filename {
            Some(filename) => info.with_file(filename.clone()),
            None => info,
        }
    }

    fn on_scalar(
        &mut self,
        value: String,
        style: TScalarStyle,
        anchor_id: usize,
        tag: Option<Tag>,
        marker: Marker,
    ) {
        // Scalar length is approximated by the value length; quotes and
        // escapes are not accounted for.
        let source_info = self.make_source_info(&marker, value.len());

        let kind = match tag {
            Some(tag) if is_local(&tag) && !tag.suffix.is_empty() => {
                NodeKind::Directive(Directive {
                    name: tag.suffix,
                    payload: value,
                    tag_source: source_info.clone(),
                })
            }
            // `! value` is the non-specific tag: always a string.
            Some(tag) if is_local(&tag) => NodeKind::Scalar(Scalar::String(value)),
            Some(tag) if is_core(&tag) && tag.suffix == "str" => {
                NodeKind::Scalar(Scalar::String(value))
            }
            _ if matches!(style, TScalarStyle::Plain) => {
                NodeKind::Scalar(parse_scalar_value(&value))
            }
            _ => NodeKind::Scalar(Scalar::String(value)),
        };

        self.push_complete(Node::new(kind, source_info), anchor_id);
    }

    fn check_collection_tag(&mut self, tag: Option<&Tag>, marker: &Marker) {
        if let Some(tag) = tag.filter(|t| is_local(t) && !t.suffix.is_empty()) {
            let location = self.make_source_info(marker, 0);
            self.fail(Error::TaggedCollection {
                tag: tag.suffix.clone(),
                location,
            });
        }
    }

    fn finish_mapping(
        &mut self,
        start_marker: Marker,
        anchor_id: usize,
        entries: Vec<(Node, Option<Node>)>,
        end_marker: &Marker,
    ) {
        let len = end_marker.index().saturating_sub(start_marker.index());
        let source_info = self.make_source_info(&start_marker, len);

        let mut node_entries = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            // A key without a value only happens in a truncated stream;
            // YAML reads a missing value as null.
            let value = value.unwrap_or_else(|| {
                Node::scalar(Scalar::Null, self.make_source_info(end_marker, 0))
            });

            let entry_start = key.source_info.offset;
            let entry_len = value.source_info.end_offset().saturating_sub(entry_start);
            let entry_span = SourceInfo::new(
                self.filename.clone(),
                entry_start,
                key.source_info.line,
                key.source_info.col,
                entry_len,
            );
            node_entries.push(NodeEntry::new(key, value, entry_span));
        }

        let node = Node::new(NodeKind::Mapping(node_entries), source_info);
        self.push_complete(node, anchor_id);
    }
}

impl MarkedEventReceiver for NodeBuilder {
    fn on_event(&mut self, ev: Event, marker: Marker) {
        if self.error.is_some() {
            return;
        }

        match ev {
            Event::Nothing | Event::StreamStart | Event::StreamEnd | Event::DocumentEnd => {}

            Event::DocumentStart => {
                self.documents += 1;
                if self.documents > 1 {
                    let location = self.make_source_info(&marker, 0);
                    self.fail(Error::Parse {
                        message: "expected a single document, found more than one".into(),
                        location: Some(location),
                    });
                }
            }

            Event::Scalar(value, style, anchor_id, tag) => {
                self.on_scalar(value, style, anchor_id, tag, marker);
            }

            Event::SequenceStart(anchor_id, tag) => {
                self.check_collection_tag(tag.as_ref(), &marker);
                self.stack.push(BuildNode::Sequence {
                    start_marker: marker,
                    anchor_id,
                    items: Vec::new(),
                });
            }

            Event::SequenceEnd => match self.stack.pop() {
                Some(BuildNode::Sequence {
                    start_marker,
                    anchor_id,
                    items,
                }) => {
                    let len = marker.index().saturating_sub(start_marker.index());
                    let source_info = self.make_source_info(&start_marker, len);
                    self.push_complete(Node::new(NodeKind::Sequence(items), source_info), anchor_id);
                }
                _ => self.fail(Error::Parse {
                    message: "sequence end without a matching start".into(),
                    location: Some(self.make_source_info(&marker, 0)),
                }),
            },

            Event::MappingStart(anchor_id, tag) => {
                self.check_collection_tag(tag.as_ref(), &marker);
                self.stack.push(BuildNode::Mapping {
                    start_marker: marker,
                    anchor_id,
                    entries: Vec::new(),
                });
            }

            Event::MappingEnd => match self.stack.pop() {
                Some(BuildNode::Mapping {
                    start_marker,
                    anchor_id,
                    entries,
                }) => self.finish_mapping(start_marker, anchor_id, entries, &marker),
                _ => self.fail(Error::Parse {
                    message: "mapping end without a matching start".into(),
                    location: Some(self.make_source_info(&marker, 0)),
                }),
            },

            Event::Alias(anchor_id) => match self.anchors.get(&anchor_id) {
                Some(node) => {
                    let node = node.clone();
                    self.push_complete(node, 0);
                }
                None => {
                    let location = self.make_source_info(&marker, 0);
                    self.fail(Error::UnknownAlias { location });
                }
            },
        }
    }
}

fn is_local(tag: &Tag) -> bool {
    tag.handle == "!"
}

fn is_core(tag: &Tag) -> bool {
    tag.handle == "!!" || tag.handle == CORE_TAG_PREFIX
}

/// Parse a plain scalar into the appropriate primitive.
///
/// Follows the YAML 1.2 core schema: integers (decimal, `0x`, `0o`), floats
/// (including `.inf` and `.nan`), booleans, null, and strings otherwise.
fn parse_scalar_value(value: &str) -> Scalar {
    match value {
        "true" | "True" | "TRUE" => return Scalar::Boolean(true),
        "false" | "False" | "FALSE" => return Scalar::Boolean(false),
        "null" | "Null" | "NULL" | "~" | "" => return Scalar::Null,
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => {
            return Scalar::Real(f64::INFINITY);
        }
        "-.inf" | "-.Inf" | "-.INF" => return Scalar::Real(f64::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" => return Scalar::Real(f64::NAN),
        _ => {}
    }

    // `from_str_radix` accepts a sign; the core schema does not.
    let unsigned = |digits: &str| !digits.starts_with(['+', '-']);

    if let Some(hex) = value.strip_prefix("0x").filter(|d| unsigned(*d)) {
        if let Ok(i) = i64::from_str_radix(hex, 16) {
            return Scalar::Integer(i);
        }
    }
    if let Some(oct) = value.strip_prefix("0o").filter(|d| unsigned(*d)) {
        if let Ok(i) = i64::from_str_radix(oct, 8) {
            return Scalar::Integer(i);
        }
    }

    if let Ok(i) = value.parse::<i64>() {
        return Scalar::Integer(i);
    }

    // Rust accepts "inf" and "NaN" as floats; YAML does not.
    let numeric = value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
        && value.chars().any(|c| c.is_ascii_digit());
    if numeric {
        if let Ok(f) = value.parse::<f64>() {
            return Scalar::Real(f);
        }
    }

    Scalar::String(value.to_string())
}
