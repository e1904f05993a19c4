//! Emitters for counted collections: lists, maps and arrays.

use super::size::{read_size, write_size};
use super::{declare_local, EmitContext, EmitterRegistry, ShapeEmitter};
use crate::code_builder::CodeBuilder;
use crate::diagnostic::CompilerError;
use crate::ir::{IrKind, IrNode};

fn unexpected(expected: IrKind, node: &IrNode) -> CompilerError {
    CompilerError::MissingEmitter {
        kind: format!("{} (dispatched to the {} emitter)", node.kind(), expected),
    }
}

// =============================================================================
// Lists
// =============================================================================

pub struct ListEmitter;

impl ListEmitter {
    /// Reads `size` elements and pushes each onto the list at `target`.
    fn fill(
        node: &IrNode,
        target: &str,
        ctx: EmitContext,
        out: &mut CodeBuilder,
        emitters: &EmitterRegistry,
    ) -> Result<(), CompilerError> {
        let IrNode::List { element_type, element, size, inner, .. } = node else {
            return Err(unexpected(IrKind::List, node));
        };
        out.open(format!("for _ in 0..{}", size));
        declare_local(out, element, element_type, inner);
        emitters.construct(inner, ctx.nested(), out)?;
        out.line(format!("{}.push({});", target, element));
        out.close();
        Ok(())
    }
}

impl ShapeEmitter for ListEmitter {
    fn kind(&self) -> IrKind {
        IrKind::List
    }

    fn construct(
        &self,
        node: &IrNode,
        ctx: EmitContext,
        out: &mut CodeBuilder,
        emitters: &EmitterRegistry,
    ) -> Result<(), CompilerError> {
        let IrNode::List { place, size, limit, .. } = node else {
            return Err(unexpected(IrKind::List, node));
        };
        out.scoped(ctx.can_have_neighbors, |out| {
            read_size(out, emitters.runtime(), size, *limit);
            out.line(place.assign(&format!(
                "Vec::with_capacity({}::preallocation({}))",
                emitters.runtime(),
                size
            )));
            Self::fill(node, place.write(), ctx, out, emitters)
        })
    }

    fn serialize(
        &self,
        node: &IrNode,
        ctx: EmitContext,
        out: &mut CodeBuilder,
        emitters: &EmitterRegistry,
    ) -> Result<(), CompilerError> {
        let IrNode::List { place, element, size, limit, inner, .. } = node else {
            return Err(unexpected(IrKind::List, node));
        };
        out.scoped(ctx.can_have_neighbors, |out| {
            write_size(out, emitters.runtime(), size, &format!("{}.len()", place.read()), *limit);
            out.open(format!("for {} in {}.iter().take({})", element, place.read(), size));
            emitters.serialize(inner, ctx.nested(), out)?;
            out.close();
            Ok(())
        })
    }

    fn deserialize(
        &self,
        node: &IrNode,
        ctx: EmitContext,
        out: &mut CodeBuilder,
        emitters: &EmitterRegistry,
    ) -> Result<(), CompilerError> {
        let IrNode::List { place, size, limit, .. } = node else {
            return Err(unexpected(IrKind::List, node));
        };
        // Lists are refilled in place, which also covers read-only bindings.
        out.scoped(ctx.can_have_neighbors, |out| {
            read_size(out, emitters.runtime(), size, *limit);
            out.line(format!("{}.clear();", place.write()));
            out.line(format!(
                "{}.reserve({}::preallocation({}));",
                place.write(),
                emitters.runtime(),
                size
            ));
            Self::fill(node, place.write(), ctx, out, emitters)
        })
    }
}

// =============================================================================
// Maps
// =============================================================================

pub struct MapEmitter;

impl MapEmitter {
    fn fill(
        node: &IrNode,
        target: &str,
        ctx: EmitContext,
        out: &mut CodeBuilder,
        emitters: &EmitterRegistry,
    ) -> Result<(), CompilerError> {
        let IrNode::Map { size, key_name, key_type, key, value_name, value_type, value, .. } = node
        else {
            return Err(unexpected(IrKind::Map, node));
        };
        out.open(format!("for _ in 0..{}", size));
        declare_local(out, key_name, key_type, key);
        emitters.construct(key, ctx.beside_siblings(), out)?;
        declare_local(out, value_name, value_type, value);
        emitters.construct(value, ctx.beside_siblings(), out)?;
        out.line(format!("{}.insert({}, {});", target, key_name, value_name));
        out.close();
        Ok(())
    }
}

impl ShapeEmitter for MapEmitter {
    fn kind(&self) -> IrKind {
        IrKind::Map
    }

    fn construct(
        &self,
        node: &IrNode,
        ctx: EmitContext,
        out: &mut CodeBuilder,
        emitters: &EmitterRegistry,
    ) -> Result<(), CompilerError> {
        let IrNode::Map { place, size, limit, .. } = node else {
            return Err(unexpected(IrKind::Map, node));
        };
        out.scoped(ctx.can_have_neighbors, |out| {
            read_size(out, emitters.runtime(), size, *limit);
            out.line(place.assign("::core::default::Default::default()"));
            Self::fill(node, place.write(), ctx, out, emitters)
        })
    }

    fn serialize(
        &self,
        node: &IrNode,
        ctx: EmitContext,
        out: &mut CodeBuilder,
        emitters: &EmitterRegistry,
    ) -> Result<(), CompilerError> {
        let IrNode::Map { place, size, limit, key_name, key, value_name, value, .. } = node else {
            return Err(unexpected(IrKind::Map, node));
        };
        out.scoped(ctx.can_have_neighbors, |out| {
            write_size(out, emitters.runtime(), size, &format!("{}.len()", place.read()), *limit);
            out.open(format!(
                "for ({}, {}) in {}.iter().take({})",
                key_name,
                value_name,
                place.read(),
                size
            ));
            emitters.serialize(key, ctx.beside_siblings(), out)?;
            emitters.serialize(value, ctx.beside_siblings(), out)?;
            out.close();
            Ok(())
        })
    }

    fn deserialize(
        &self,
        node: &IrNode,
        ctx: EmitContext,
        out: &mut CodeBuilder,
        emitters: &EmitterRegistry,
    ) -> Result<(), CompilerError> {
        let IrNode::Map { place, size, limit, .. } = node else {
            return Err(unexpected(IrKind::Map, node));
        };
        out.scoped(ctx.can_have_neighbors, |out| {
            read_size(out, emitters.runtime(), size, *limit);
            out.line(format!("{}.clear();", place.write()));
            Self::fill(node, place.write(), ctx, out, emitters)
        })
    }
}

// =============================================================================
// Arrays
// =============================================================================

/// Rank-1 arrays are `Box<[T]>`; higher ranks are the runtime's `NdArray`.
pub struct ArrayEmitter;

impl ArrayEmitter {
    /// Nested `for` loops over every dimension, innermost running `body`.
    fn each_index(
        indices: &[String],
        sizes: &[String],
        out: &mut CodeBuilder,
        body: impl FnOnce(&mut CodeBuilder) -> Result<(), CompilerError>,
    ) -> Result<(), CompilerError> {
        for (index, size) in indices.iter().zip(sizes) {
            out.open(format!("for {} in 0..{}", index, size));
        }
        body(out)?;
        for _ in indices {
            out.close();
        }
        Ok(())
    }

    fn dims_literal(sizes: &[String]) -> String {
        format!("[{}]", sizes.join(", "))
    }

    /// Reads every dimension's count, then rejects element totals the
    /// reader cannot possibly hold before anything is allocated.
    fn read_sizes(node: &IrNode, runtime: &str, out: &mut CodeBuilder) -> Result<(), CompilerError> {
        let IrNode::Array { limit, sizes, inner, .. } = node else {
            return Err(unexpected(IrKind::Array, node));
        };
        for size in sizes {
            read_size(out, runtime, size, *limit);
        }
        if inner.always_encodes_bytes() {
            let total = sizes
                .iter()
                .skip(1)
                .fold(sizes[0].clone(), |acc, size| format!("{}.saturating_mul({})", acc, size));
            out.line(format!("{}::ensure_available(&*reader, {})?;", runtime, total));
        }
        Ok(())
    }
}

impl ShapeEmitter for ArrayEmitter {
    fn kind(&self) -> IrKind {
        IrKind::Array
    }

    fn construct(
        &self,
        node: &IrNode,
        ctx: EmitContext,
        out: &mut CodeBuilder,
        emitters: &EmitterRegistry,
    ) -> Result<(), CompilerError> {
        let IrNode::Array { place, rank, indices, sizes, inner, .. } = node else {
            return Err(unexpected(IrKind::Array, node));
        };
        let runtime = emitters.runtime();
        out.scoped(ctx.can_have_neighbors, |out| {
            Self::read_sizes(node, runtime, out)?;
            if *rank == 1 {
                out.line(place.assign(&format!("{}::default_boxed_slice({})", runtime, sizes[0])));
            } else {
                out.line(place.assign(&format!(
                    "{}::NdArray::new({})?",
                    runtime,
                    Self::dims_literal(sizes)
                )));
            }
            Self::each_index(indices, sizes, out, |out| {
                emitters.construct(inner, ctx.nested(), out)
            })
        })
    }

    fn serialize(
        &self,
        node: &IrNode,
        ctx: EmitContext,
        out: &mut CodeBuilder,
        emitters: &EmitterRegistry,
    ) -> Result<(), CompilerError> {
        let IrNode::Array { place, rank, limit, indices, sizes, inner, .. } = node else {
            return Err(unexpected(IrKind::Array, node));
        };
        let runtime = emitters.runtime();
        out.scoped(ctx.can_have_neighbors, |out| {
            if *rank == 1 {
                write_size(out, runtime, &sizes[0], &format!("{}.len()", place.read()), *limit);
            } else {
                for (axis, size) in sizes.iter().enumerate() {
                    let len = format!("{}.dims()[{}]", place.read(), axis);
                    write_size(out, runtime, size, &len, *limit);
                }
            }
            Self::each_index(indices, sizes, out, |out| {
                emitters.serialize(inner, ctx.nested(), out)
            })
        })
    }

    fn deserialize(
        &self,
        node: &IrNode,
        ctx: EmitContext,
        out: &mut CodeBuilder,
        emitters: &EmitterRegistry,
    ) -> Result<(), CompilerError> {
        let IrNode::Array { place, rank, indices, sizes, inner, .. } = node else {
            return Err(unexpected(IrKind::Array, node));
        };
        let runtime = emitters.runtime();
        out.scoped(ctx.can_have_neighbors, |out| {
            Self::read_sizes(node, runtime, out)?;
            // Storage is only reallocated when the incoming shape differs.
            if *rank == 1 {
                out.line(format!(
                    "{}::resize_boxed_slice(&mut {}, {});",
                    runtime,
                    place.write(),
                    sizes[0]
                ));
            } else {
                out.line(format!(
                    "{}.reshape({})?;",
                    place.write(),
                    Self::dims_literal(sizes)
                ));
            }
            Self::each_index(indices, sizes, out, |out| {
                emitters.construct(inner, ctx.nested(), out)
            })
        })
    }
}
