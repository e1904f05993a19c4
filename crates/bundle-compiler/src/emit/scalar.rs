//! Emitters for shapes that read and write as a single value.

use super::{EmitContext, EmitterRegistry, ShapeEmitter};
use crate::code_builder::CodeBuilder;
use crate::diagnostic::CompilerError;
use crate::ir::{IrKind, IrNode};

fn unexpected(expected: IrKind, node: &IrNode) -> CompilerError {
    CompilerError::MissingEmitter {
        kind: format!("{} (dispatched to the {} emitter)", node.kind(), expected),
    }
}

pub struct PrimitiveEmitter;

impl ShapeEmitter for PrimitiveEmitter {
    fn kind(&self) -> IrKind {
        IrKind::Primitive
    }

    fn construct(
        &self,
        node: &IrNode,
        ctx: EmitContext,
        out: &mut CodeBuilder,
        emitters: &EmitterRegistry,
    ) -> Result<(), CompilerError> {
        self.deserialize(node, ctx, out, emitters)
    }

    fn serialize(
        &self,
        node: &IrNode,
        _ctx: EmitContext,
        out: &mut CodeBuilder,
        _emitters: &EmitterRegistry,
    ) -> Result<(), CompilerError> {
        let IrNode::Primitive { place, kind } = node else {
            return Err(unexpected(IrKind::Primitive, node));
        };
        let value = if kind.is_string() {
            format!("&{}", place.read())
        } else {
            place.read().to_string()
        };
        out.line(format!("writer.write_{}({})?;", kind.wire_tag(), value));
        Ok(())
    }

    fn deserialize(
        &self,
        node: &IrNode,
        _ctx: EmitContext,
        out: &mut CodeBuilder,
        _emitters: &EmitterRegistry,
    ) -> Result<(), CompilerError> {
        let IrNode::Primitive { place, kind } = node else {
            return Err(unexpected(IrKind::Primitive, node));
        };
        out.line(place.assign(&format!("reader.read_{}()?", kind.wire_tag())));
        Ok(())
    }
}

pub struct EnumEmitter;

impl ShapeEmitter for EnumEmitter {
    fn kind(&self) -> IrKind {
        IrKind::Enum
    }

    fn construct(
        &self,
        node: &IrNode,
        ctx: EmitContext,
        out: &mut CodeBuilder,
        emitters: &EmitterRegistry,
    ) -> Result<(), CompilerError> {
        self.deserialize(node, ctx, out, emitters)
    }

    fn serialize(
        &self,
        node: &IrNode,
        _ctx: EmitContext,
        out: &mut CodeBuilder,
        emitters: &EmitterRegistry,
    ) -> Result<(), CompilerError> {
        let IrNode::Enum { place, enum_name, repr } = node else {
            return Err(unexpected(IrKind::Enum, node));
        };
        out.line(format!(
            "writer.write_{}(<{} as {}::BundleEnum>::to_repr(&{}))?;",
            repr.wire_tag(),
            enum_name,
            emitters.runtime(),
            place.read()
        ));
        Ok(())
    }

    fn deserialize(
        &self,
        node: &IrNode,
        _ctx: EmitContext,
        out: &mut CodeBuilder,
        emitters: &EmitterRegistry,
    ) -> Result<(), CompilerError> {
        let IrNode::Enum { place, enum_name, repr } = node else {
            return Err(unexpected(IrKind::Enum, node));
        };
        out.line(place.assign(&format!(
            "<{} as {}::BundleEnum>::from_repr(reader.read_{}()?)?",
            enum_name,
            emitters.runtime(),
            repr.wire_tag()
        )));
        Ok(())
    }
}

/// Types encoded by user-supplied free functions.
pub struct ExternalEmitter;

impl ShapeEmitter for ExternalEmitter {
    fn kind(&self) -> IrKind {
        IrKind::External
    }

    fn construct(
        &self,
        node: &IrNode,
        ctx: EmitContext,
        out: &mut CodeBuilder,
        emitters: &EmitterRegistry,
    ) -> Result<(), CompilerError> {
        self.deserialize(node, ctx, out, emitters)
    }

    fn serialize(
        &self,
        node: &IrNode,
        _ctx: EmitContext,
        out: &mut CodeBuilder,
        _emitters: &EmitterRegistry,
    ) -> Result<(), CompilerError> {
        let IrNode::External { place, serialize_fn, .. } = node else {
            return Err(unexpected(IrKind::External, node));
        };
        out.line(format!("{}(writer, &{})?;", serialize_fn, place.read()));
        Ok(())
    }

    fn deserialize(
        &self,
        node: &IrNode,
        _ctx: EmitContext,
        out: &mut CodeBuilder,
        _emitters: &EmitterRegistry,
    ) -> Result<(), CompilerError> {
        let IrNode::External { place, deserialize_fn, .. } = node else {
            return Err(unexpected(IrKind::External, node));
        };
        out.line(place.assign(&format!("{}(reader)?", deserialize_fn)));
        Ok(())
    }
}

/// Nested records, through their own generated (or hand-written) impls.
pub struct RecordEmitter;

impl ShapeEmitter for RecordEmitter {
    fn kind(&self) -> IrKind {
        IrKind::Record
    }

    fn construct(
        &self,
        node: &IrNode,
        _ctx: EmitContext,
        out: &mut CodeBuilder,
        emitters: &EmitterRegistry,
    ) -> Result<(), CompilerError> {
        let IrNode::Record { place, type_name, .. } = node else {
            return Err(unexpected(IrKind::Record, node));
        };
        out.line(place.assign(&format!(
            "<{} as {}::BundleConstruct>::construct_from_reader(reader)?",
            type_name,
            emitters.runtime()
        )));
        Ok(())
    }

    fn serialize(
        &self,
        node: &IrNode,
        _ctx: EmitContext,
        out: &mut CodeBuilder,
        emitters: &EmitterRegistry,
    ) -> Result<(), CompilerError> {
        let IrNode::Record { place, type_name, .. } = node else {
            return Err(unexpected(IrKind::Record, node));
        };
        out.line(format!(
            "<{} as {}::BundleSerializable>::serialize(&{}, writer)?;",
            type_name,
            emitters.runtime(),
            place.read()
        ));
        Ok(())
    }

    fn deserialize(
        &self,
        node: &IrNode,
        ctx: EmitContext,
        out: &mut CodeBuilder,
        emitters: &EmitterRegistry,
    ) -> Result<(), CompilerError> {
        let IrNode::Record { place, type_name, must_reassign, temp } = node else {
            return Err(unexpected(IrKind::Record, node));
        };
        let runtime = emitters.runtime();
        if !must_reassign {
            out.line(format!(
                "<{} as {}::BundleSerializable>::deserialize(&mut {}, reader)?;",
                type_name,
                runtime,
                place.write()
            ));
            return Ok(());
        }
        // The accessor hands out a copy: fill the copy, then store it back.
        out.scoped(ctx.can_have_neighbors, |out| {
            out.line(format!("let mut {} = {};", temp, place.read()));
            out.line(format!(
                "<{} as {}::BundleSerializable>::deserialize(&mut {}, reader)?;",
                type_name, runtime, temp
            ));
            out.line(place.assign(temp));
        });
        Ok(())
    }
}
