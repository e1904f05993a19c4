//! Record skeletons, resolved record descriptors and the table of types a
//! schema knows about.

use std::collections::HashMap;

use serde::Deserialize;

use super::node::IrNode;
use super::shape::{LimitDirective, PrimitiveKind, TypeExpr};
use crate::diagnostic::CompilerError;

/// Structural category of a record or enclosing type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeCategory {
    /// Small, copyable; accessors hand out copies.
    Value,
    /// Owned and mutated in place.
    #[default]
    Reference,
    Other,
}

/// How a record can be built from scratch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConstructorShape {
    /// No construct path. The record can only be deserialized in place.
    None,
    /// `Default::default()` followed by an in-place deserialize.
    #[default]
    Default,
    /// A function taking every serialized member by value.
    AllFields { function: String, params: Vec<String> },
}

impl ConstructorShape {
    pub fn is_constructible(&self) -> bool {
        !matches!(self, ConstructorShape::None)
    }
}

/// Coarse constructor kind for types outside the schema's records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructorKind {
    None,
    #[default]
    Default,
    AllFields,
}

impl From<&ConstructorShape> for ConstructorKind {
    fn from(shape: &ConstructorShape) -> Self {
        match shape {
            ConstructorShape::None => ConstructorKind::None,
            ConstructorShape::Default => ConstructorKind::Default,
            ConstructorShape::AllFields { .. } => ConstructorKind::AllFields,
        }
    }
}

/// How generated code reaches a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberAccess {
    /// `self.name`
    #[default]
    Field,
    /// `self.name()`, `self.name_mut()`, `self.set_name(..)`
    Accessor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnclosingType {
    pub name: String,
    pub category: TypeCategory,
}

/// Serializable base a record delegates to first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseRecord {
    /// Field holding the base value.
    pub field: String,
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSkeleton {
    pub name: String,
    pub ty: TypeExpr,
    pub type_text: String,
    pub access: MemberAccess,
    pub read_only: bool,
    pub limit: Option<LimitDirective>,
    pub skip: bool,
}

/// A record as described by the front end, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSkeleton {
    pub name: String,
    pub namespace: Vec<String>,
    pub enclosing: Vec<EnclosingType>,
    pub category: TypeCategory,
    pub constructor: ConstructorShape,
    pub base: Option<BaseRecord>,
    pub sealed: bool,
    pub members: Vec<MemberSkeleton>,
}

impl RecordSkeleton {
    /// Fully qualified path: namespace, enclosing types, then the name.
    pub fn path(&self) -> String {
        qualify(&self.namespace, self.enclosing.iter().map(|e| e.name.as_str()), &self.name)
    }
}

pub(crate) fn qualify<'a>(
    namespace: &'a [String],
    enclosing: impl Iterator<Item = &'a str>,
    name: &'a str,
) -> String {
    namespace
        .iter()
        .map(String::as_str)
        .chain(enclosing)
        .chain(std::iter::once(name))
        .collect::<Vec<_>>()
        .join("::")
}

/// A member after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMember {
    pub name: String,
    pub type_name: String,
    /// Node reading and writing the member on `self`.
    pub node: IrNode,
    /// Node building the member into a constructor local, for records with
    /// an all-fields constructor.
    pub construct_node: Option<IrNode>,
}

/// A fully resolved record, consumed by the assembly driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDescriptor {
    pub name: String,
    pub namespace: Vec<String>,
    pub enclosing: Vec<EnclosingType>,
    pub category: TypeCategory,
    pub constructor: ConstructorShape,
    pub base: Option<BaseRecord>,
    pub sealed: bool,
    pub members: Vec<ResolvedMember>,
}

impl RecordDescriptor {
    pub fn path(&self) -> String {
        qualify(&self.namespace, self.enclosing.iter().map(|e| e.name.as_str()), &self.name)
    }

    pub fn inherits_serializable(&self) -> bool {
        self.base.is_some()
    }
}

// =============================================================================
// Known types
// =============================================================================

/// A type implementing the record contract, generated or written by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownRecord {
    pub name: String,
    pub path: String,
    pub category: TypeCategory,
    pub constructor: ConstructorKind,
    pub generated: bool,
}

impl KnownRecord {
    /// Whether generated code can build a fresh instance from a stream.
    pub fn is_constructible(&self) -> bool {
        self.constructor != ConstructorKind::None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownEnum {
    pub name: String,
    pub path: String,
    pub repr: PrimitiveKind,
}

/// Free-standing serialize/deserialize functions for one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCodec {
    pub type_name: String,
    pub serialize: String,
    pub deserialize: String,
}

/// Every type a schema declares, looked up by simple name or full path.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    records: Vec<KnownRecord>,
    enums: Vec<KnownEnum>,
    codecs: Vec<ExternalCodec>,
    index: HashMap<String, TypeRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeRef {
    Record(usize),
    Enum(usize),
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_record(&mut self, record: KnownRecord) -> Result<(), CompilerError> {
        let slot = TypeRef::Record(self.records.len());
        self.claim(&[&record.name, &record.path], slot)?;
        self.records.push(record);
        Ok(())
    }

    pub fn add_enum(&mut self, known: KnownEnum) -> Result<(), CompilerError> {
        let slot = TypeRef::Enum(self.enums.len());
        self.claim(&[&known.name, &known.path], slot)?;
        self.enums.push(known);
        Ok(())
    }

    /// Registers an external codec. A codec for a type that is also a
    /// record takes precedence during resolution.
    pub fn add_codec(&mut self, codec: ExternalCodec) -> Result<(), CompilerError> {
        if self.codecs.iter().any(|c| c.type_name == codec.type_name) {
            return Err(CompilerError::DuplicateType {
                name: codec.type_name,
            });
        }
        self.codecs.push(codec);
        Ok(())
    }

    fn claim(&mut self, keys: &[&String], slot: TypeRef) -> Result<(), CompilerError> {
        for key in keys {
            if let Some(existing) = self.index.get(*key) {
                if *existing != slot {
                    return Err(CompilerError::DuplicateType {
                        name: (*key).clone(),
                    });
                }
            }
        }
        for key in keys {
            self.index.insert((*key).clone(), slot);
        }
        Ok(())
    }

    pub fn record(&self, name: &str) -> Option<&KnownRecord> {
        match self.index.get(name) {
            Some(TypeRef::Record(i)) => self.records.get(*i),
            _ => None,
        }
    }

    pub fn enumeration(&self, name: &str) -> Option<&KnownEnum> {
        match self.index.get(name) {
            Some(TypeRef::Enum(i)) => self.enums.get(*i),
            _ => None,
        }
    }

    /// Codec registered for exactly this type name.
    pub fn codec(&self, type_name: &str) -> Option<&ExternalCodec> {
        self.codecs.iter().find(|c| c.type_name == type_name)
    }

    pub fn records(&self) -> &[KnownRecord] {
        &self.records
    }

    /// Path a named type renders as in generated code.
    pub fn render_named<'a>(&'a self, name: &'a str) -> &'a str {
        match self.index.get(name) {
            Some(TypeRef::Record(i)) => &self.records[*i].path,
            Some(TypeRef::Enum(i)) => &self.enums[*i].path,
            _ => name,
        }
    }
}
