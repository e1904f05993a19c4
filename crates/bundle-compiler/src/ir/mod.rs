//! Language-agnostic intermediate representation.
//!
//! Front ends produce [`RecordSkeleton`]s whose members carry a
//! [`TypeExpr`]. Resolution turns every member into an [`IrNode`] tree and
//! the skeleton into a [`RecordDescriptor`], which code generation consumes.

mod node;
mod record;
mod shape;

pub use node::{IrKind, IrNode, TupleElement};
pub use record::{
    BaseRecord, ConstructorKind, ConstructorShape, EnclosingType, ExternalCodec, KnownEnum,
    KnownRecord, MemberAccess, MemberSkeleton, RecordDescriptor, RecordSkeleton, ResolvedMember,
    TypeCategory, TypeTable,
};
pub use shape::{LimitDirective, LimitPolicy, Place, PrimitiveKind, ShapeDescriptor, TypeExpr};

use std::path::PathBuf;

use crate::config::GeneratorConfig;

/// Everything a front end extracted from one schema source.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub records: Vec<RecordSkeleton>,
    pub types: TypeTable,
    /// Generator options embedded in the schema, if any.
    pub options: Option<GeneratorConfig>,
    pub source: PathBuf,
}
