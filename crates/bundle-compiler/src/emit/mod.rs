//! Emission registry.
//!
//! Every [`IrKind`] has one [`ShapeEmitter`] producing three fragments:
//!
//! - **serialize**: write the value at the node's place to `writer`
//! - **deserialize**: refill the value at the place from `reader`, reusing
//!   existing storage where the shape allows it
//! - **construct**: build a fresh value from `reader` and assign it to the
//!   place, which may be an uninitialized local
//!
//! Composite emitters recurse through the registry for their children, so
//! a custom emitter registered for a kind is used at every nesting level.

mod collection;
mod scalar;
mod size;
mod wrapper;

pub use collection::{ArrayEmitter, ListEmitter, MapEmitter};
pub use scalar::{EnumEmitter, ExternalEmitter, PrimitiveEmitter, RecordEmitter};
pub use wrapper::{OptionalEmitter, TupleEmitter};

use std::collections::HashMap;

use crate::code_builder::CodeBuilder;
use crate::diagnostic::CompilerError;
use crate::ir::{IrKind, IrNode};

/// Position of a fragment relative to its surroundings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitContext {
    pub depth: usize,
    /// Other fragments share the enclosing scope, so locals this fragment
    /// declares must be kept inside a block of its own.
    pub can_have_neighbors: bool,
}

impl EmitContext {
    /// Context for a member fragment emitted on its own.
    pub fn top_level() -> Self {
        Self {
            depth: 0,
            can_have_neighbors: false,
        }
    }

    /// Context for a member emitted into a method body shared with the
    /// record's other members.
    pub fn record_member() -> Self {
        Self {
            depth: 0,
            can_have_neighbors: true,
        }
    }

    /// Context for a child that owns its enclosing scope, such as a loop body.
    pub fn nested(self) -> Self {
        Self {
            depth: self.depth + 1,
            can_have_neighbors: false,
        }
    }

    /// Context for a child emitted next to siblings in the same scope.
    pub fn beside_siblings(self) -> Self {
        Self {
            depth: self.depth + 1,
            can_have_neighbors: true,
        }
    }
}

/// Generates the code for one IR kind.
pub trait ShapeEmitter: Send + Sync {
    fn kind(&self) -> IrKind;

    fn construct(
        &self,
        node: &IrNode,
        ctx: EmitContext,
        out: &mut CodeBuilder,
        emitters: &EmitterRegistry,
    ) -> Result<(), CompilerError>;

    fn serialize(
        &self,
        node: &IrNode,
        ctx: EmitContext,
        out: &mut CodeBuilder,
        emitters: &EmitterRegistry,
    ) -> Result<(), CompilerError>;

    fn deserialize(
        &self,
        node: &IrNode,
        ctx: EmitContext,
        out: &mut CodeBuilder,
        emitters: &EmitterRegistry,
    ) -> Result<(), CompilerError>;
}

/// The three code fragments for one record member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberFragments {
    pub serialize: String,
    pub deserialize: String,
    pub construct: String,
}

/// Emitters keyed by IR kind. Built once, then only read.
pub struct EmitterRegistry {
    emitters: HashMap<IrKind, Box<dyn ShapeEmitter>>,
    runtime: String,
    indent_width: usize,
}

impl EmitterRegistry {
    /// A registry with no emitters.
    pub fn empty(runtime: impl Into<String>, indent_width: usize) -> Self {
        Self {
            emitters: HashMap::new(),
            runtime: runtime.into(),
            indent_width,
        }
    }

    /// The built-in emitters, one per IR kind.
    pub fn with_defaults(runtime: impl Into<String>, indent_width: usize) -> Self {
        let mut registry = Self::empty(runtime, indent_width);
        registry.register(PrimitiveEmitter);
        registry.register(EnumEmitter);
        registry.register(ExternalEmitter);
        registry.register(RecordEmitter);
        registry.register(OptionalEmitter);
        registry.register(ListEmitter);
        registry.register(MapEmitter);
        registry.register(ArrayEmitter);
        registry.register(TupleEmitter);
        registry
    }

    /// Registers an emitter, replacing any previous one for the same kind.
    pub fn register(&mut self, emitter: impl ShapeEmitter + 'static) {
        self.emitters.insert(emitter.kind(), Box::new(emitter));
    }

    /// Path generated code uses for the runtime crate.
    pub fn runtime(&self) -> &str {
        &self.runtime
    }

    fn lookup(&self, node: &IrNode) -> Result<&dyn ShapeEmitter, CompilerError> {
        self.emitters
            .get(&node.kind())
            .map(|e| e.as_ref())
            .ok_or_else(|| CompilerError::MissingEmitter {
                kind: node.kind().to_string(),
            })
    }

    pub fn construct(
        &self,
        node: &IrNode,
        ctx: EmitContext,
        out: &mut CodeBuilder,
    ) -> Result<(), CompilerError> {
        self.lookup(node)?.construct(node, ctx, out, self)
    }

    pub fn serialize(
        &self,
        node: &IrNode,
        ctx: EmitContext,
        out: &mut CodeBuilder,
    ) -> Result<(), CompilerError> {
        self.lookup(node)?.serialize(node, ctx, out, self)
    }

    pub fn deserialize(
        &self,
        node: &IrNode,
        ctx: EmitContext,
        out: &mut CodeBuilder,
    ) -> Result<(), CompilerError> {
        self.lookup(node)?.deserialize(node, ctx, out, self)
    }

    /// Emits all three fragments for a top-level member node.
    pub fn emit_member(&self, node: &IrNode) -> Result<MemberFragments, CompilerError> {
        let ctx = EmitContext::top_level();
        let mut serialize = CodeBuilder::new(self.indent_width);
        let mut deserialize = CodeBuilder::new(self.indent_width);
        let mut construct = CodeBuilder::new(self.indent_width);
        self.serialize(node, ctx, &mut serialize)?;
        self.deserialize(node, ctx, &mut deserialize)?;
        self.construct(node, ctx, &mut construct)?;
        Ok(MemberFragments {
            serialize: serialize.finish(),
            deserialize: deserialize.finish(),
            construct: construct.finish(),
        })
    }
}

/// Declares a local that a construct fragment assigns later.
pub(crate) fn declare_local(out: &mut CodeBuilder, name: &str, type_name: &str, node: &IrNode) {
    let binding = if node.fills_in_place() { "let mut" } else { "let" };
    out.line(format!("{} {}: {};", binding, name, type_name));
}
