//! Built-in shape matchers.

use super::naming::{
    dimension_size_var, index_vars, key_var, size_var, temp_var, tuple_element_var, value_var,
};
use super::{ResolveContext, ShapeMatcher, ShapeRegistry};
use crate::diagnostic::CompilerError;
use crate::ir::{IrNode, Place, ShapeDescriptor, TupleElement, TypeCategory, TypeExpr};

/// Types with registered free-standing codec functions.
///
/// Runs first so a codec wins over structural matching of the same type.
pub struct ExternalCodecMatcher;

impl ShapeMatcher for ExternalCodecMatcher {
    fn name(&self) -> &'static str {
        "external"
    }

    fn try_resolve(
        &self,
        shape: &ShapeDescriptor,
        ctx: &ResolveContext<'_>,
        _registry: &ShapeRegistry,
    ) -> Result<Option<IrNode>, CompilerError> {
        let TypeExpr::Named(name) = &shape.ty else {
            return Ok(None);
        };
        if shape.read_only {
            return Ok(None);
        }
        let codec = ctx
            .types
            .codec(name)
            .or_else(|| ctx.types.codec(ctx.types.render_named(name)));
        Ok(codec.map(|codec| IrNode::External {
            place: shape.place.clone(),
            serialize_fn: codec.serialize.clone(),
            deserialize_fn: codec.deserialize.clone(),
        }))
    }
}

/// `Option<T>`. Must run before the primitive matcher.
pub struct OptionalMatcher;

impl ShapeMatcher for OptionalMatcher {
    fn name(&self) -> &'static str {
        "optional"
    }

    fn try_resolve(
        &self,
        shape: &ShapeDescriptor,
        ctx: &ResolveContext<'_>,
        registry: &ShapeRegistry,
    ) -> Result<Option<IrNode>, CompilerError> {
        let TypeExpr::Option(inner_ty) = &shape.ty else {
            return Ok(None);
        };
        if shape.read_only {
            return Ok(None);
        }
        let temp = temp_var(shape.depth);
        let inner_shape = ShapeDescriptor {
            // A limit on `Option<Vec<T>>` applies to the collection inside.
            limit: shape.limit,
            ..shape.derive((**inner_ty).clone(), Place::local(&temp))
        };
        let Some(inner) = registry.resolve(&inner_shape, ctx)? else {
            return Ok(None);
        };
        Ok(Some(IrNode::Optional {
            place: shape.place.clone(),
            temp,
            inner_type: ctx.render_type(inner_ty),
            inner: Box::new(inner),
        }))
    }
}

/// Fixed-width values and strings.
pub struct PrimitiveMatcher;

impl ShapeMatcher for PrimitiveMatcher {
    fn name(&self) -> &'static str {
        "primitive"
    }

    fn try_resolve(
        &self,
        shape: &ShapeDescriptor,
        _ctx: &ResolveContext<'_>,
        _registry: &ShapeRegistry,
    ) -> Result<Option<IrNode>, CompilerError> {
        match &shape.ty {
            TypeExpr::Primitive(kind) if !shape.read_only => Ok(Some(IrNode::Primitive {
                place: shape.place.clone(),
                kind: *kind,
            })),
            _ => Ok(None),
        }
    }
}

/// Enums, written as their integer representation.
pub struct EnumMatcher;

impl ShapeMatcher for EnumMatcher {
    fn name(&self) -> &'static str {
        "enum"
    }

    fn try_resolve(
        &self,
        shape: &ShapeDescriptor,
        ctx: &ResolveContext<'_>,
        registry: &ShapeRegistry,
    ) -> Result<Option<IrNode>, CompilerError> {
        let TypeExpr::Named(name) = &shape.ty else {
            return Ok(None);
        };
        let Some(known) = ctx.types.enumeration(name) else {
            return Ok(None);
        };
        // The representation goes through the primitive matcher like any
        // other member, which also applies its read-only rule.
        let underlying = registry.resolve(&shape.retype(TypeExpr::Primitive(known.repr)), ctx)?;
        match underlying {
            Some(IrNode::Primitive { kind, .. }) => Ok(Some(IrNode::Enum {
                place: shape.place.clone(),
                enum_name: known.path.clone(),
                repr: kind,
            })),
            _ => Ok(None),
        }
    }
}

/// Records implementing the serialization contract.
pub struct RecordMatcher;

impl ShapeMatcher for RecordMatcher {
    fn name(&self) -> &'static str {
        "record"
    }

    fn try_resolve(
        &self,
        shape: &ShapeDescriptor,
        ctx: &ResolveContext<'_>,
        _registry: &ShapeRegistry,
    ) -> Result<Option<IrNode>, CompilerError> {
        let TypeExpr::Named(name) = &shape.ty else {
            return Ok(None);
        };
        let Some(known) = ctx.types.record(name) else {
            return Ok(None);
        };
        if shape.constructed && !known.is_constructible() {
            return Err(CompilerError::NotConstructible {
                record: ctx.record.to_string(),
                member: ctx.member.to_string(),
                type_name: known.path.clone(),
            });
        }
        let must_reassign = shape.accessor && known.category == TypeCategory::Value;
        if must_reassign && shape.read_only {
            return Ok(None);
        }
        Ok(Some(IrNode::Record {
            place: shape.place.clone(),
            type_name: known.path.clone(),
            must_reassign,
            temp: temp_var(shape.depth),
        }))
    }
}

/// `Box<[T]>` and `NdArray<T, N>`.
pub struct ArrayMatcher;

impl ShapeMatcher for ArrayMatcher {
    fn name(&self) -> &'static str {
        "array"
    }

    fn try_resolve(
        &self,
        shape: &ShapeDescriptor,
        ctx: &ResolveContext<'_>,
        registry: &ShapeRegistry,
    ) -> Result<Option<IrNode>, CompilerError> {
        let TypeExpr::Array { rank, element } = &shape.ty else {
            return Ok(None);
        };
        // Deserializing may reallocate the storage.
        if shape.read_only {
            return Ok(None);
        }
        let indices = index_vars(shape.depth, *rank);
        let (sizes, index_expr) = if *rank == 1 {
            (vec![size_var(shape.depth)], indices[0].clone())
        } else {
            (
                indices.iter().map(|i| dimension_size_var(i)).collect(),
                format!("[{}]", indices.join(", ")),
            )
        };
        let element_shape = shape.derive((**element).clone(), shape.place.index(&index_expr));
        let Some(inner) = registry.resolve(&element_shape, ctx)? else {
            return Ok(None);
        };
        Ok(Some(IrNode::Array {
            place: shape.place.clone(),
            rank: *rank,
            element_type: ctx.render_type(element),
            limit: shape.limit,
            indices,
            sizes,
            inner: Box::new(inner),
        }))
    }
}

/// `Vec<T>`.
pub struct ListMatcher;

impl ShapeMatcher for ListMatcher {
    fn name(&self) -> &'static str {
        "list"
    }

    fn try_resolve(
        &self,
        shape: &ShapeDescriptor,
        ctx: &ResolveContext<'_>,
        registry: &ShapeRegistry,
    ) -> Result<Option<IrNode>, CompilerError> {
        let TypeExpr::List(element) = &shape.ty else {
            return Ok(None);
        };
        let temp = temp_var(shape.depth);
        let element_shape = shape.derive((**element).clone(), Place::local(&temp));
        let Some(inner) = registry.resolve(&element_shape, ctx)? else {
            return Ok(None);
        };
        Ok(Some(IrNode::List {
            place: shape.place.clone(),
            element_type: ctx.render_type(element),
            element: temp,
            size: size_var(shape.depth),
            limit: shape.limit,
            immutable_binding: shape.read_only,
            inner: Box::new(inner),
        }))
    }
}

/// `HashMap<K, V>`, `BTreeMap<K, V>` and other map containers.
pub struct MapMatcher;

impl ShapeMatcher for MapMatcher {
    fn name(&self) -> &'static str {
        "map"
    }

    fn try_resolve(
        &self,
        shape: &ShapeDescriptor,
        ctx: &ResolveContext<'_>,
        registry: &ShapeRegistry,
    ) -> Result<Option<IrNode>, CompilerError> {
        let TypeExpr::Map { key, value, .. } = &shape.ty else {
            return Ok(None);
        };
        let key_name = key_var(shape.depth);
        let value_name = value_var(shape.depth);

        let key_shape = shape.derive((**key).clone(), Place::local(&key_name));
        let Some(key_node) = registry.resolve(&key_shape, ctx)? else {
            return Ok(None);
        };
        let value_shape = shape.derive((**value).clone(), Place::local(&value_name));
        let Some(value_node) = registry.resolve(&value_shape, ctx)? else {
            return Ok(None);
        };

        Ok(Some(IrNode::Map {
            place: shape.place.clone(),
            limit: shape.limit,
            size: size_var(shape.depth),
            key_name,
            key_type: ctx.render_type(key),
            key: Box::new(key_node),
            value_name,
            value_type: ctx.render_type(value),
            value: Box::new(value_node),
            immutable_binding: shape.read_only,
        }))
    }
}

/// Tuples, rebuilt as a whole after every element is read.
pub struct TupleMatcher;

impl ShapeMatcher for TupleMatcher {
    fn name(&self) -> &'static str {
        "tuple"
    }

    fn try_resolve(
        &self,
        shape: &ShapeDescriptor,
        ctx: &ResolveContext<'_>,
        registry: &ShapeRegistry,
    ) -> Result<Option<IrNode>, CompilerError> {
        let TypeExpr::Tuple(items) = &shape.ty else {
            return Ok(None);
        };
        if shape.read_only || items.is_empty() {
            return Ok(None);
        }
        let mut elements = Vec::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            let name = tuple_element_var(position, shape.depth);
            let element_shape = shape.derive(item.clone(), Place::local(&name));
            let Some(node) = registry.resolve(&element_shape, ctx)? else {
                return Ok(None);
            };
            elements.push(TupleElement {
                name,
                type_name: ctx.render_type(item),
                node,
            });
        }
        Ok(Some(IrNode::Tuple {
            place: shape.place.clone(),
            elements,
        }))
    }
}
