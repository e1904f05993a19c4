//! Emitters for optionals and tuples.

use super::{declare_local, EmitContext, EmitterRegistry, ShapeEmitter};
use crate::code_builder::CodeBuilder;
use crate::diagnostic::CompilerError;
use crate::ir::{IrKind, IrNode, TupleElement};

fn unexpected(expected: IrKind, node: &IrNode) -> CompilerError {
    CompilerError::MissingEmitter {
        kind: format!("{} (dispatched to the {} emitter)", node.kind(), expected),
    }
}

/// `Option<T>`: one presence byte, then the value when present.
pub struct OptionalEmitter;

impl OptionalEmitter {
    /// Builds a fresh inner value into `temp` and stores `Some(temp)`.
    fn construct_some(
        node: &IrNode,
        ctx: EmitContext,
        out: &mut CodeBuilder,
        emitters: &EmitterRegistry,
    ) -> Result<(), CompilerError> {
        let IrNode::Optional { place, temp, inner_type, inner } = node else {
            return Err(unexpected(IrKind::Optional, node));
        };
        declare_local(out, temp, inner_type, inner);
        emitters.construct(inner, ctx.nested(), out)?;
        out.line(place.assign(&format!("::core::option::Option::Some({})", temp)));
        Ok(())
    }
}

impl ShapeEmitter for OptionalEmitter {
    fn kind(&self) -> IrKind {
        IrKind::Optional
    }

    fn construct(
        &self,
        node: &IrNode,
        ctx: EmitContext,
        out: &mut CodeBuilder,
        emitters: &EmitterRegistry,
    ) -> Result<(), CompilerError> {
        let IrNode::Optional { place, .. } = node else {
            return Err(unexpected(IrKind::Optional, node));
        };
        out.open("if reader.read_bool()?");
        Self::construct_some(node, ctx, out, emitters)?;
        out.reopen("else");
        out.line(place.assign("::core::option::Option::None"));
        out.close();
        Ok(())
    }

    fn serialize(
        &self,
        node: &IrNode,
        ctx: EmitContext,
        out: &mut CodeBuilder,
        emitters: &EmitterRegistry,
    ) -> Result<(), CompilerError> {
        let IrNode::Optional { place, temp, inner, .. } = node else {
            return Err(unexpected(IrKind::Optional, node));
        };
        out.open(format!(
            "if let ::core::option::Option::Some({}) = &{}",
            temp,
            place.read()
        ));
        out.line("writer.write_bool(true)?;");
        emitters.serialize(inner, ctx.nested(), out)?;
        out.reopen("else");
        out.line("writer.write_bool(false)?;");
        out.close();
        Ok(())
    }

    fn deserialize(
        &self,
        node: &IrNode,
        ctx: EmitContext,
        out: &mut CodeBuilder,
        emitters: &EmitterRegistry,
    ) -> Result<(), CompilerError> {
        let IrNode::Optional { place, temp, inner, .. } = node else {
            return Err(unexpected(IrKind::Optional, node));
        };
        out.open("if reader.read_bool()?");
        // An existing value is refilled, so nested storage is reused.
        out.open(format!("match {}.take()", place.write()));
        out.open(format!("::core::option::Option::Some(mut {}) =>", temp));
        emitters.deserialize(inner, ctx.nested(), out)?;
        out.line(place.assign(&format!("::core::option::Option::Some({})", temp)));
        out.close();
        out.open("::core::option::Option::None =>");
        Self::construct_some(node, ctx, out, emitters)?;
        out.close();
        out.close();
        out.reopen("else");
        out.line(place.assign("::core::option::Option::None"));
        out.close();
        Ok(())
    }
}

/// Tuples: elements back to back, rebuilt as a whole on read.
pub struct TupleEmitter;

impl TupleEmitter {
    fn names(elements: &[TupleElement]) -> String {
        let names: Vec<&str> = elements.iter().map(|e| e.name.as_str()).collect();
        if names.len() == 1 {
            format!("({},)", names[0])
        } else {
            format!("({})", names.join(", "))
        }
    }
}

impl ShapeEmitter for TupleEmitter {
    fn kind(&self) -> IrKind {
        IrKind::Tuple
    }

    fn construct(
        &self,
        node: &IrNode,
        ctx: EmitContext,
        out: &mut CodeBuilder,
        emitters: &EmitterRegistry,
    ) -> Result<(), CompilerError> {
        let IrNode::Tuple { place, elements } = node else {
            return Err(unexpected(IrKind::Tuple, node));
        };
        out.scoped(ctx.can_have_neighbors, |out| {
            for element in elements {
                declare_local(out, &element.name, &element.type_name, &element.node);
                emitters.construct(&element.node, ctx.beside_siblings(), out)?;
            }
            out.line(place.assign(&Self::names(elements)));
            Ok(())
        })
    }

    fn serialize(
        &self,
        node: &IrNode,
        ctx: EmitContext,
        out: &mut CodeBuilder,
        emitters: &EmitterRegistry,
    ) -> Result<(), CompilerError> {
        let IrNode::Tuple { place, elements } = node else {
            return Err(unexpected(IrKind::Tuple, node));
        };
        out.scoped(ctx.can_have_neighbors, |out| {
            out.line(format!("let {} = &{};", Self::names(elements), place.read()));
            for element in elements {
                emitters.serialize(&element.node, ctx.beside_siblings(), out)?;
            }
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
        self.construct(node, ctx, out, emitters)
    }
}
