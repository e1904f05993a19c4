//! Type-shape registry and resolver.
//!
//! Resolution walks a member's [`TypeExpr`] depth first. The registry tries
//! its matchers in registration order and the first one that recognizes the
//! shape wins; composite matchers call back into the registry for their
//! element, key, value or inner shapes with a derived descriptor one level
//! deeper.
//!
//! ```text
//! Vec<Option<(u8, Item)>>          depth
//!   List        self.items           0
//!   Optional    temp                 1
//!   Tuple       temp1                2
//!     Primitive item0_temp2          3
//!     Record    item1_temp2          3
//! ```
//!
//! A member no matcher accepts is skipped and recorded in the
//! [`ResolutionReport`]; it is not an error.

mod matchers;
pub mod naming;

pub use matchers::{
    ArrayMatcher, EnumMatcher, ExternalCodecMatcher, ListMatcher, MapMatcher, OptionalMatcher,
    PrimitiveMatcher, RecordMatcher, TupleMatcher,
};

use std::collections::HashSet;
use std::fmt;

use crate::config::GeneratorConfig;
use crate::diagnostic::CompilerError;
use crate::ir::{
    ConstructorShape, IrKind, IrNode, MemberAccess, Place, RecordDescriptor, RecordSkeleton,
    ResolvedMember, ShapeDescriptor, TypeExpr, TypeTable,
};

/// Read-only state shared by every matcher during one member's resolution.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub types: &'a TypeTable,
    pub config: &'a GeneratorConfig,
    /// Record and member being resolved, for error messages.
    pub record: &'a str,
    pub member: &'a str,
}

impl ResolveContext<'_> {
    /// Renders a type the way generated code spells it.
    pub fn render_type(&self, ty: &TypeExpr) -> String {
        match ty {
            TypeExpr::Primitive(kind) => kind.rust_name().to_string(),
            TypeExpr::Named(name) => self.types.render_named(name).to_string(),
            TypeExpr::Option(inner) => format!("Option<{}>", self.render_type(inner)),
            TypeExpr::List(inner) => format!("Vec<{}>", self.render_type(inner)),
            TypeExpr::Map { container, key, value } => {
                let container = match container.as_str() {
                    "HashMap" => "::std::collections::HashMap",
                    "BTreeMap" => "::std::collections::BTreeMap",
                    other => other,
                };
                format!(
                    "{}<{}, {}>",
                    container,
                    self.render_type(key),
                    self.render_type(value)
                )
            }
            TypeExpr::Array { rank: 1, element } => format!("Box<[{}]>", self.render_type(element)),
            TypeExpr::Array { rank, element } => format!(
                "{}::NdArray<{}, {}>",
                self.config.runtime_path,
                self.render_type(element),
                rank
            ),
            TypeExpr::Tuple(items) => {
                let rendered: Vec<String> = items.iter().map(|t| self.render_type(t)).collect();
                if rendered.len() == 1 {
                    format!("({},)", rendered[0])
                } else {
                    format!("({})", rendered.join(", "))
                }
            }
        }
    }
}

/// Recognizes one structural category of shape.
pub trait ShapeMatcher: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns `Ok(None)` when the shape is not this matcher's concern.
    fn try_resolve(
        &self,
        shape: &ShapeDescriptor,
        ctx: &ResolveContext<'_>,
        registry: &ShapeRegistry,
    ) -> Result<Option<IrNode>, CompilerError>;
}

/// Ordered list of shape matchers. Built once, then only read.
pub struct ShapeRegistry {
    matchers: Vec<Box<dyn ShapeMatcher>>,
}

impl Default for ShapeRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ShapeRegistry {
    /// A registry with no matchers.
    pub fn empty() -> Self {
        Self { matchers: Vec::new() }
    }

    /// The built-in matchers, in priority order.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(ExternalCodecMatcher);
        registry.register(OptionalMatcher);
        registry.register(PrimitiveMatcher);
        registry.register(EnumMatcher);
        registry.register(RecordMatcher);
        registry.register(ArrayMatcher);
        registry.register(ListMatcher);
        registry.register(MapMatcher);
        registry.register(TupleMatcher);
        registry
    }

    /// Appends a matcher after the existing ones.
    pub fn register(&mut self, matcher: impl ShapeMatcher + 'static) {
        self.matchers.push(Box::new(matcher));
    }

    /// Inserts a matcher ahead of every existing one.
    pub fn register_first(&mut self, matcher: impl ShapeMatcher + 'static) {
        self.matchers.insert(0, Box::new(matcher));
    }

    pub fn matcher_names(&self) -> Vec<&'static str> {
        self.matchers.iter().map(|m| m.name()).collect()
    }

    /// Resolves one shape, or returns `Ok(None)` if no matcher claims it.
    pub fn resolve(
        &self,
        shape: &ShapeDescriptor,
        ctx: &ResolveContext<'_>,
    ) -> Result<Option<IrNode>, CompilerError> {
        if shape.depth > ctx.config.max_depth {
            return Err(CompilerError::NestingTooDeep {
                record: ctx.record.to_string(),
                member: ctx.member.to_string(),
                depth: shape.depth,
                max: ctx.config.max_depth,
            });
        }
        for matcher in &self.matchers {
            if let Some(node) = matcher.try_resolve(shape, ctx, self)? {
                tracing::trace!(
                    matcher = matcher.name(),
                    depth = shape.depth,
                    place = %shape.place,
                    "shape resolved"
                );
                return Ok(Some(node));
            }
        }
        Ok(None)
    }

    /// Resolves every member of a record.
    ///
    /// Members no matcher accepts are left out and listed in `report`. Any
    /// error aborts the whole record.
    #[tracing::instrument(level = "debug", skip_all, fields(record = %skeleton.name))]
    pub fn resolve_members(
        &self,
        skeleton: &RecordSkeleton,
        types: &TypeTable,
        config: &GeneratorConfig,
        report: &mut ResolutionReport,
    ) -> Result<RecordDescriptor, CompilerError> {
        let all_fields = matches!(skeleton.constructor, ConstructorShape::AllFields { .. });

        if let Some(base) = &skeleton.base {
            let known = types.record(&base.type_name).ok_or_else(|| CompilerError::UnknownBase {
                record: skeleton.name.clone(),
                base: base.type_name.clone(),
            })?;
            if all_fields && !known.is_constructible() {
                return Err(CompilerError::NotConstructible {
                    record: skeleton.name.clone(),
                    member: base.field.clone(),
                    type_name: known.path.clone(),
                });
            }
        }

        let mut seen = HashSet::new();
        let mut members = Vec::new();
        for member in &skeleton.members {
            if !seen.insert(member.name.as_str()) {
                return Err(CompilerError::DuplicateMember {
                    record: skeleton.name.clone(),
                    member: member.name.clone(),
                });
            }
            if member.skip {
                tracing::debug!(member = %member.name, "member marked skip");
                continue;
            }

            let ctx = ResolveContext {
                types,
                config,
                record: &skeleton.name,
                member: &member.name,
            };
            let place = match member.access {
                MemberAccess::Field => Place::field("self", &member.name),
                MemberAccess::Accessor => Place::accessor("self", &member.name),
            };
            let shape = ShapeDescriptor {
                accessor: member.access == MemberAccess::Accessor,
                limit: member.limit,
                // An all-fields constructor sets every member, read-only or not.
                read_only: member.read_only && !all_fields,
                ..ShapeDescriptor::member(member.ty.clone(), place)
            };

            let Some(node) = self.resolve(&shape, &ctx)? else {
                report.skip(&skeleton.name, member, shape.read_only);
                continue;
            };

            let construct_node = if all_fields {
                let local = ShapeDescriptor {
                    limit: member.limit,
                    constructed: true,
                    ..ShapeDescriptor::member(
                        member.ty.clone(),
                        Place::local(naming::constructor_local(&member.name)),
                    )
                };
                match self.resolve(&local, &ctx)? {
                    Some(node) => Some(node),
                    None => {
                        report.skip(&skeleton.name, member, false);
                        continue;
                    }
                }
            } else {
                None
            };

            if member.limit.is_some()
                && !matches!(
                    collection_kind(&node),
                    Some(IrKind::Array | IrKind::List | IrKind::Map)
                )
            {
                tracing::warn!(
                    record = %skeleton.name,
                    member = %member.name,
                    "limit on a member that is not a collection is ignored"
                );
            }

            tracing::debug!(member = %member.name, kind = %node.kind(), "member resolved");
            members.push(ResolvedMember {
                name: member.name.clone(),
                type_name: ctx.render_type(&member.ty),
                node,
                construct_node,
            });
        }

        if let ConstructorShape::AllFields { params, .. } = &skeleton.constructor {
            check_constructor_params(skeleton, params, &members)?;
        }

        Ok(RecordDescriptor {
            name: skeleton.name.clone(),
            namespace: skeleton.namespace.clone(),
            enclosing: skeleton.enclosing.clone(),
            category: skeleton.category,
            constructor: skeleton.constructor.clone(),
            base: skeleton.base.clone(),
            sealed: skeleton.sealed,
            members,
        })
    }
}

/// Kind of the collection a member ends up as, looking through optionals.
fn collection_kind(node: &IrNode) -> Option<IrKind> {
    match node {
        IrNode::Optional { inner, .. } => collection_kind(inner),
        other => Some(other.kind()),
    }
}

fn check_constructor_params(
    skeleton: &RecordSkeleton,
    params: &[String],
    members: &[ResolvedMember],
) -> Result<(), CompilerError> {
    let mut expected: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
    if let Some(base) = &skeleton.base {
        expected.push(&base.field);
    }

    let mismatch = |message: String| CompilerError::ConstructorMismatch {
        record: skeleton.name.clone(),
        message,
    };

    for param in params {
        if !expected.contains(&param.as_str()) {
            return Err(mismatch(format!(
                "parameter '{}' is not a serialized member",
                param
            )));
        }
    }
    for name in expected {
        if !params.iter().any(|p| p == name) {
            return Err(mismatch(format!(
                "member '{}' is serialized but not a constructor parameter",
                name
            )));
        }
    }
    Ok(())
}

// =============================================================================
// Resolution report
// =============================================================================

/// Why a member was left out of serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No matcher recognizes the member's type.
    Unsupported,
    /// The shape could only be filled by assignment, which a read-only
    /// member does not allow.
    ReadOnly,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unsupported => f.write_str("no shape matcher accepts this type"),
            SkipReason::ReadOnly => f.write_str("read-only members of this shape cannot be filled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedMember {
    pub record: String,
    pub member: String,
    pub type_name: String,
    pub reason: SkipReason,
}

/// Members resolution left out, across every record of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionReport {
    pub skipped: Vec<SkippedMember>,
}

impl ResolutionReport {
    fn skip(&mut self, record: &str, member: &crate::ir::MemberSkeleton, read_only: bool) {
        let reason = if read_only {
            SkipReason::ReadOnly
        } else {
            SkipReason::Unsupported
        };
        tracing::warn!(
            record,
            member = %member.name,
            type_name = %member.type_text,
            %reason,
            "member is not serialized"
        );
        self.skipped.push(SkippedMember {
            record: record.to_string(),
            member: member.name.clone(),
            type_name: member.type_text.clone(),
            reason,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn merge(&mut self, other: ResolutionReport) {
        self.skipped.extend(other.skipped);
    }
}

#[cfg(test)]
mod tests;
