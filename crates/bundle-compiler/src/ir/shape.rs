//! Member shapes as handed over by a front end.

use std::fmt;

use serde::Deserialize;

/// Wire-level primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    U128,
    I128,
    F32,
    F64,
    Char,
    String,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 15] = [
        PrimitiveKind::Bool,
        PrimitiveKind::U8,
        PrimitiveKind::I8,
        PrimitiveKind::U16,
        PrimitiveKind::I16,
        PrimitiveKind::U32,
        PrimitiveKind::I32,
        PrimitiveKind::U64,
        PrimitiveKind::I64,
        PrimitiveKind::U128,
        PrimitiveKind::I128,
        PrimitiveKind::F32,
        PrimitiveKind::F64,
        PrimitiveKind::Char,
        PrimitiveKind::String,
    ];

    /// Looks a primitive up by its Rust type name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.strip_prefix("std::string::").unwrap_or(name);
        Self::ALL.into_iter().find(|kind| kind.rust_name() == name)
    }

    pub fn rust_name(self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::U8 => "u8",
            PrimitiveKind::I8 => "i8",
            PrimitiveKind::U16 => "u16",
            PrimitiveKind::I16 => "i16",
            PrimitiveKind::U32 => "u32",
            PrimitiveKind::I32 => "i32",
            PrimitiveKind::U64 => "u64",
            PrimitiveKind::I64 => "i64",
            PrimitiveKind::U128 => "u128",
            PrimitiveKind::I128 => "i128",
            PrimitiveKind::F32 => "f32",
            PrimitiveKind::F64 => "f64",
            PrimitiveKind::Char => "char",
            PrimitiveKind::String => "String",
        }
    }

    /// Suffix of the `write_*` / `read_*` method pair for this primitive.
    pub fn wire_tag(self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            other => other.rust_name(),
        }
    }

    /// Integer types an enum may use as its representation.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            PrimitiveKind::U8
                | PrimitiveKind::I8
                | PrimitiveKind::U16
                | PrimitiveKind::I16
                | PrimitiveKind::U32
                | PrimitiveKind::I32
                | PrimitiveKind::U64
                | PrimitiveKind::I64
        )
    }

    /// Strings are passed by reference when written.
    pub fn is_string(self) -> bool {
        self == PrimitiveKind::String
    }
}

/// A parsed member type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Primitive(PrimitiveKind),
    /// A record, enum or externally-encoded type, by path.
    Named(String),
    Option(Box<TypeExpr>),
    List(Box<TypeExpr>),
    Map {
        container: String,
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    /// `Box<[T]>` for rank 1, `NdArray<T, N>` above.
    Array {
        rank: usize,
        element: Box<TypeExpr>,
    },
    Tuple(Vec<TypeExpr>),
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Primitive(kind) => f.write_str(kind.rust_name()),
            TypeExpr::Named(name) => f.write_str(name),
            TypeExpr::Option(inner) => write!(f, "Option<{}>", inner),
            TypeExpr::List(inner) => write!(f, "Vec<{}>", inner),
            TypeExpr::Map { container, key, value } => write!(f, "{}<{}, {}>", container, key, value),
            TypeExpr::Array { rank: 1, element } => write!(f, "Box<[{}]>", element),
            TypeExpr::Array { rank, element } => write!(f, "NdArray<{}, {}>", element, rank),
            TypeExpr::Tuple(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                if items.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// What happens when a limited collection holds too many elements on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitPolicy {
    /// Fail the serialize call.
    Throw,
    /// Write only the first `max` elements.
    Clamp,
}

/// Maximum element count for a collection member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitDirective {
    pub max: usize,
    #[serde(default = "default_policy")]
    pub policy: LimitPolicy,
}

fn default_policy() -> LimitPolicy {
    LimitPolicy::Throw
}

impl LimitDirective {
    pub fn new(max: usize, policy: LimitPolicy) -> Self {
        Self { max, policy }
    }

    /// Counts under a one-byte limit are written as a single raw byte.
    pub fn fits_in_byte(&self) -> bool {
        self.max <= u8::MAX as usize
    }
}

/// A readable and assignable location in generated code.
///
/// Plain fields and locals read and write through the same expression.
/// Accessor members read through `x()`, mutate in place through
/// `x_mut()` and are assigned through `set_x(..)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Place {
    read: String,
    write: String,
    setter: Option<String>,
}

impl Place {
    pub fn local(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            read: name.clone(),
            write: name,
            setter: None,
        }
    }

    pub fn field(receiver: &str, name: &str) -> Self {
        Self::local(format!("{}.{}", receiver, name))
    }

    pub fn accessor(receiver: &str, name: &str) -> Self {
        Self {
            read: format!("{}.{}()", receiver, name),
            write: format!("(*{}.{}_mut())", receiver, name),
            setter: Some(format!("{}.set_{}", receiver, name)),
        }
    }

    /// Expression that reads the current value.
    pub fn read(&self) -> &str {
        &self.read
    }

    /// Place expression for in-place mutation.
    pub fn write(&self) -> &str {
        &self.write
    }

    /// Statement storing `value` into this place.
    pub fn assign(&self, value: &str) -> String {
        match &self.setter {
            Some(setter) => format!("{}({});", setter, value),
            None => format!("{} = {};", self.write, value),
        }
    }

    /// Element of an indexable place.
    pub fn index(&self, index: &str) -> Place {
        Self {
            read: format!("{}[{}]", self.read, index),
            write: format!("{}[{}]", self.write, index),
            setter: None,
        }
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.read)
    }
}

/// One member's declared shape, ready for resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeDescriptor {
    pub ty: TypeExpr,
    pub place: Place,
    /// 0 at top level, plus one per composite layer.
    pub depth: usize,
    /// Reached only through accessor methods.
    pub accessor: bool,
    pub limit: Option<LimitDirective>,
    pub read_only: bool,
    /// Storage is created fresh (construct path) rather than overwritten.
    pub constructed: bool,
}

impl ShapeDescriptor {
    /// Descriptor for a top-level record member.
    pub fn member(ty: TypeExpr, place: Place) -> Self {
        Self {
            ty,
            place,
            depth: 0,
            accessor: false,
            limit: None,
            read_only: false,
            constructed: false,
        }
    }

    /// Descriptor for an element, key, value or inner shape one level down.
    pub fn derive(&self, ty: TypeExpr, place: Place) -> Self {
        Self {
            ty,
            place,
            depth: self.depth + 1,
            accessor: false,
            limit: None,
            read_only: false,
            constructed: true,
        }
    }

    /// Same position, different type.
    pub fn retype(&self, ty: TypeExpr) -> Self {
        Self { ty, ..self.clone() }
    }
}
