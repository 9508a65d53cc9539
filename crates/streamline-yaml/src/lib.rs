//! # streamline-yaml
//!
//! YAML parsing into node trees that keep local tags.
//!
//! Most YAML loaders resolve tags while building their value tree, which
//! loses `!include-one other.yaml` style directives before anything can act
//! on them. This crate builds a [`Node`] tree straight from the `yaml-rust2`
//! event stream instead, so a scalar carrying a local tag becomes a
//! [`NodeKind::Directive`] with its raw payload left untouched. Every node
//! carries a [`SourceInfo`] for error reporting.
//!
//! ## Example
//!
//! ```rust
//! use streamline_yaml::{parse, NodeKind};
//!
//! let root = parse("cards: !include-one cards.yaml").unwrap();
//! let cards = root.get("cards").unwrap();
//! match &cards.kind {
//!     NodeKind::Directive(directive) => {
//!         assert_eq!(directive.name, "include-one");
//!         assert_eq!(directive.payload, "cards.yaml");
//!     }
//!     other => panic!("expected a directive, got {:?}", other),
//! }
//! ```

mod error;
mod node;
mod parser;
mod source_info;

pub use error::{Error, Result};
pub use node::{Directive, Node, NodeEntry, NodeKind, Scalar};
pub use parser::{parse, parse_file};
pub use source_info::SourceInfo;
