//! Resolved IR nodes.
//!
//! Each node carries the place expression it reads from and writes to, plus
//! every temporary name its emitter declares. Emitters never derive names
//! on their own, so nested output composes purely textually.

use std::fmt;

use super::shape::{LimitDirective, Place, PrimitiveKind};
use crate::code_builder::CodeBuilder;

/// Discriminant of [`IrNode`], used to look emitters up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrKind {
    Primitive,
    Enum,
    Optional,
    Array,
    List,
    Map,
    Tuple,
    Record,
    External,
}

impl fmt::Display for IrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IrKind::Primitive => "primitive",
            IrKind::Enum => "enum",
            IrKind::Optional => "optional",
            IrKind::Array => "array",
            IrKind::List => "list",
            IrKind::Map => "map",
            IrKind::Tuple => "tuple",
            IrKind::Record => "record",
            IrKind::External => "external",
        };
        f.write_str(name)
    }
}

/// One element of a tuple node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleElement {
    /// Local the element is destructured into or built in.
    pub name: String,
    pub type_name: String,
    pub node: IrNode,
}

/// How one member (or sub-element) goes over the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrNode {
    Primitive {
        place: Place,
        kind: PrimitiveKind,
    },
    Enum {
        place: Place,
        enum_name: String,
        repr: PrimitiveKind,
    },
    Optional {
        place: Place,
        /// Local bound to the present value.
        temp: String,
        inner_type: String,
        inner: Box<IrNode>,
    },
    Array {
        place: Place,
        rank: usize,
        element_type: String,
        limit: Option<LimitDirective>,
        /// One index variable per dimension.
        indices: Vec<String>,
        /// One count variable per dimension.
        sizes: Vec<String>,
        inner: Box<IrNode>,
    },
    List {
        place: Place,
        element_type: String,
        element: String,
        size: String,
        limit: Option<LimitDirective>,
        immutable_binding: bool,
        inner: Box<IrNode>,
    },
    Map {
        place: Place,
        limit: Option<LimitDirective>,
        size: String,
        key_name: String,
        key_type: String,
        key: Box<IrNode>,
        value_name: String,
        value_type: String,
        value: Box<IrNode>,
        immutable_binding: bool,
    },
    Tuple {
        place: Place,
        elements: Vec<TupleElement>,
    },
    Record {
        place: Place,
        type_name: String,
        /// By-value record behind an accessor: load, fill, store back.
        must_reassign: bool,
        temp: String,
    },
    External {
        place: Place,
        serialize_fn: String,
        deserialize_fn: String,
    },
}

impl IrNode {
    pub fn kind(&self) -> IrKind {
        match self {
            IrNode::Primitive { .. } => IrKind::Primitive,
            IrNode::Enum { .. } => IrKind::Enum,
            IrNode::Optional { .. } => IrKind::Optional,
            IrNode::Array { .. } => IrKind::Array,
            IrNode::List { .. } => IrKind::List,
            IrNode::Map { .. } => IrKind::Map,
            IrNode::Tuple { .. } => IrKind::Tuple,
            IrNode::Record { .. } => IrKind::Record,
            IrNode::External { .. } => IrKind::External,
        }
    }

    pub fn place(&self) -> &Place {
        match self {
            IrNode::Primitive { place, .. }
            | IrNode::Enum { place, .. }
            | IrNode::Optional { place, .. }
            | IrNode::Array { place, .. }
            | IrNode::List { place, .. }
            | IrNode::Map { place, .. }
            | IrNode::Tuple { place, .. }
            | IrNode::Record { place, .. }
            | IrNode::External { place, .. } => place,
        }
    }

    /// True when building this node's value mutates its local after the
    /// first assignment, so a deferred local must be declared `mut`.
    pub fn fills_in_place(&self) -> bool {
        matches!(self, IrNode::Array { .. } | IrNode::List { .. } | IrNode::Map { .. })
    }

    /// True when every encoding of this node takes at least one byte.
    /// Records and external codecs may write nothing.
    pub fn always_encodes_bytes(&self) -> bool {
        match self {
            IrNode::Primitive { .. }
            | IrNode::Enum { .. }
            | IrNode::Optional { .. }
            | IrNode::Array { .. }
            | IrNode::List { .. }
            | IrNode::Map { .. } => true,
            IrNode::Tuple { elements, .. } => elements.iter().any(|e| e.node.always_encodes_bytes()),
            IrNode::Record { .. } | IrNode::External { .. } => false,
        }
    }

    /// Writes an indented, human-readable outline of this node.
    pub fn describe(&self, label: &str, out: &mut CodeBuilder) {
        match self {
            IrNode::Primitive { place, kind } => {
                out.line(format!("{}: {} <- {}", label, kind.rust_name(), place));
            }
            IrNode::Enum { place, enum_name, repr } => {
                out.line(format!("{}: enum {} as {} <- {}", label, enum_name, repr.rust_name(), place));
            }
            IrNode::Optional { place, inner, .. } => {
                out.line(format!("{}: optional <- {}", label, place));
                out.indented(|out| inner.describe("some", out));
            }
            IrNode::Array { place, rank, limit, indices, inner, .. } => {
                out.line(format!(
                    "{}: array rank {}{} <- {} [{}]",
                    label,
                    rank,
                    describe_limit(limit),
                    place,
                    indices.join(", ")
                ));
                out.indented(|out| inner.describe("element", out));
            }
            IrNode::List { place, limit, inner, .. } => {
                out.line(format!("{}: list{} <- {}", label, describe_limit(limit), place));
                out.indented(|out| inner.describe("element", out));
            }
            IrNode::Map { place, limit, key, value, .. } => {
                out.line(format!("{}: map{} <- {}", label, describe_limit(limit), place));
                out.indented(|out| {
                    key.describe("key", out);
                    value.describe("value", out);
                });
            }
            IrNode::Tuple { place, elements } => {
                out.line(format!("{}: tuple of {} <- {}", label, elements.len(), place));
                out.indented(|out| {
                    for element in elements {
                        element.node.describe(&element.name, out);
                    }
                });
            }
            IrNode::Record { place, type_name, must_reassign, .. } => {
                let reassign = if *must_reassign { " (load/store)" } else { "" };
                out.line(format!("{}: record {}{} <- {}", label, type_name, reassign, place));
            }
            IrNode::External { place, serialize_fn, deserialize_fn } => {
                out.line(format!(
                    "{}: external {} / {} <- {}",
                    label, serialize_fn, deserialize_fn, place
                ));
            }
        }
    }
}

fn describe_limit(limit: &Option<LimitDirective>) -> String {
    match limit {
        Some(limit) => format!(" (limit {} {:?})", limit.max, limit.policy).to_lowercase(),
        None => String::new(),
    }
}
