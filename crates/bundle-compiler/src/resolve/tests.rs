use super::*;
use crate::ir::{
    BaseRecord, ConstructorKind, ExternalCodec, KnownEnum, KnownRecord, LimitDirective,
    LimitPolicy, MemberSkeleton, PrimitiveKind, TypeCategory,
};

fn prim(kind: PrimitiveKind) -> TypeExpr {
    TypeExpr::Primitive(kind)
}

fn named(name: &str) -> TypeExpr {
    TypeExpr::Named(name.to_string())
}

fn list(inner: TypeExpr) -> TypeExpr {
    TypeExpr::List(Box::new(inner))
}

fn option(inner: TypeExpr) -> TypeExpr {
    TypeExpr::Option(Box::new(inner))
}

fn known(name: &str, category: TypeCategory, constructor: ConstructorKind) -> KnownRecord {
    KnownRecord {
        name: name.to_string(),
        path: format!("crate::model::{}", name),
        category,
        constructor,
        generated: true,
    }
}

fn types() -> TypeTable {
    let mut types = TypeTable::new();
    types
        .add_record(known("Item", TypeCategory::Reference, ConstructorKind::Default))
        .unwrap();
    types
        .add_record(known("Point", TypeCategory::Value, ConstructorKind::Default))
        .unwrap();
    types
        .add_record(known("Handle", TypeCategory::Reference, ConstructorKind::None))
        .unwrap();
    types
        .add_enum(KnownEnum {
            name: "Color".to_string(),
            path: "crate::model::Color".to_string(),
            repr: PrimitiveKind::U8,
        })
        .unwrap();
    types
        .add_codec(ExternalCodec {
            type_name: "Uuid".to_string(),
            serialize: "crate::codecs::write_uuid".to_string(),
            deserialize: "crate::codecs::read_uuid".to_string(),
        })
        .unwrap();
    types
}

fn member(name: &str, ty: TypeExpr) -> MemberSkeleton {
    MemberSkeleton {
        name: name.to_string(),
        type_text: ty.to_string(),
        ty,
        access: MemberAccess::Field,
        read_only: false,
        limit: None,
        skip: false,
    }
}

fn skeleton(members: Vec<MemberSkeleton>) -> RecordSkeleton {
    RecordSkeleton {
        name: "Player".to_string(),
        namespace: vec!["crate".to_string(), "model".to_string()],
        enclosing: Vec::new(),
        category: TypeCategory::Reference,
        constructor: ConstructorShape::Default,
        base: None,
        sealed: false,
        members,
    }
}

fn resolve_one(ty: TypeExpr) -> Result<Option<IrNode>, CompilerError> {
    let types = types();
    let config = GeneratorConfig::default();
    let ctx = ResolveContext {
        types: &types,
        config: &config,
        record: "Player",
        member: "value",
    };
    let shape = ShapeDescriptor::member(ty, Place::field("self", "value"));
    ShapeRegistry::with_defaults().resolve(&shape, &ctx)
}

#[test]
fn test_default_matcher_order() {
    assert_eq!(
        ShapeRegistry::with_defaults().matcher_names(),
        vec!["external", "optional", "primitive", "enum", "record", "array", "list", "map", "tuple"]
    );
}

#[test]
fn test_primitive_and_enum() {
    let node = resolve_one(prim(PrimitiveKind::I32)).unwrap().unwrap();
    assert!(matches!(node, IrNode::Primitive { kind: PrimitiveKind::I32, .. }));

    let node = resolve_one(named("Color")).unwrap().unwrap();
    match node {
        IrNode::Enum { enum_name, repr, .. } => {
            assert_eq!(enum_name, "crate::model::Color");
            assert_eq!(repr, PrimitiveKind::U8);
        }
        other => panic!("expected enum, got {:?}", other),
    }
}

#[test]
fn test_external_codec_wins_over_structure() {
    let node = resolve_one(named("Uuid")).unwrap().unwrap();
    assert!(matches!(
        node,
        IrNode::External { ref serialize_fn, .. } if serialize_fn == "crate::codecs::write_uuid"
    ));
}

#[test]
fn test_list_of_optional_tuple_names() {
    let ty = list(option(TypeExpr::Tuple(vec![prim(PrimitiveKind::U8), named("Item")])));
    let node = resolve_one(ty).unwrap().unwrap();

    let IrNode::List { element, size, inner, .. } = node else {
        panic!("expected list");
    };
    assert_eq!(element, "temp");
    assert_eq!(size, "size");

    let IrNode::Optional { place, temp, inner, .. } = *inner else {
        panic!("expected optional");
    };
    assert_eq!(place.read(), "temp");
    assert_eq!(temp, "temp1");

    let IrNode::Tuple { place, elements } = *inner else {
        panic!("expected tuple");
    };
    assert_eq!(place.read(), "temp1");
    let names: Vec<_> = elements.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["item0_temp2", "item1_temp2"]);
    assert_eq!(elements[1].type_name, "crate::model::Item");
}

#[test]
fn test_map_names_and_container_path() {
    let ty = TypeExpr::Map {
        container: "HashMap".to_string(),
        key: Box::new(prim(PrimitiveKind::String)),
        value: Box::new(list(prim(PrimitiveKind::U16))),
    };
    let node = resolve_one(ty.clone()).unwrap().unwrap();
    let IrNode::Map { key_name, value_name, value, .. } = node else {
        panic!("expected map");
    };
    assert_eq!(key_name, "key_temp");
    assert_eq!(value_name, "value_temp");
    assert!(matches!(*value, IrNode::List { ref element, .. } if element == "temp1"));

    let types = types();
    let config = GeneratorConfig::default();
    let ctx = ResolveContext {
        types: &types,
        config: &config,
        record: "Player",
        member: "value",
    };
    assert_eq!(
        ctx.render_type(&ty),
        "::std::collections::HashMap<String, Vec<u16>>"
    );
}

#[test]
fn test_multi_dimensional_array_indices() {
    let ty = TypeExpr::Array {
        rank: 2,
        element: Box::new(prim(PrimitiveKind::F32)),
    };
    let node = resolve_one(ty).unwrap().unwrap();
    let IrNode::Array { indices, sizes, inner, .. } = node else {
        panic!("expected array");
    };
    assert_eq!(indices, vec!["i", "j"]);
    assert_eq!(sizes, vec!["size_i", "size_j"]);
    assert_eq!(inner.place().read(), "self.value[[i, j]]");
}

#[test]
fn test_unsupported_member_is_reported() {
    let skeleton = skeleton(vec![
        member("id", prim(PrimitiveKind::U32)),
        member("mystery", named("Unknown")),
    ]);
    let mut report = ResolutionReport::default();
    let descriptor = ShapeRegistry::with_defaults()
        .resolve_members(&skeleton, &types(), &GeneratorConfig::default(), &mut report)
        .unwrap();

    assert_eq!(descriptor.members.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].member, "mystery");
    assert_eq!(report.skipped[0].reason, SkipReason::Unsupported);
}

#[test]
fn test_read_only_members() {
    let mut counter = member("counter", prim(PrimitiveKind::U32));
    counter.read_only = true;
    let mut tags = member("tags", list(prim(PrimitiveKind::String)));
    tags.read_only = true;
    let mut grid = member(
        "grid",
        TypeExpr::Array {
            rank: 1,
            element: Box::new(prim(PrimitiveKind::U8)),
        },
    );
    grid.read_only = true;

    let skeleton = skeleton(vec![counter, tags, grid]);
    let mut report = ResolutionReport::default();
    let descriptor = ShapeRegistry::with_defaults()
        .resolve_members(&skeleton, &types(), &GeneratorConfig::default(), &mut report)
        .unwrap();

    assert_eq!(descriptor.members.len(), 1);
    assert!(matches!(
        descriptor.members[0].node,
        IrNode::List { immutable_binding: true, .. }
    ));
    let skipped: Vec<_> = report.skipped.iter().map(|s| (s.member.as_str(), s.reason)).collect();
    assert_eq!(
        skipped,
        vec![("counter", SkipReason::ReadOnly), ("grid", SkipReason::ReadOnly)]
    );
}

#[test]
fn test_accessor_value_record_reassigns() {
    let mut origin = member("origin", named("Point"));
    origin.access = MemberAccess::Accessor;
    let mut item = member("item", named("Item"));
    item.access = MemberAccess::Accessor;

    let mut report = ResolutionReport::default();
    let descriptor = ShapeRegistry::with_defaults()
        .resolve_members(
            &skeleton(vec![origin, item]),
            &types(),
            &GeneratorConfig::default(),
            &mut report,
        )
        .unwrap();

    assert!(matches!(descriptor.members[0].node, IrNode::Record { must_reassign: true, .. }));
    assert!(matches!(descriptor.members[1].node, IrNode::Record { must_reassign: false, .. }));
    assert_eq!(descriptor.members[0].node.place().read(), "self.origin()");
}

#[test]
fn test_constructed_record_without_constructor_fails() {
    // Top level deserializes in place, which is fine.
    assert!(resolve_one(named("Handle")).unwrap().is_some());

    let err = resolve_one(list(named("Handle"))).unwrap_err();
    assert!(matches!(
        err,
        CompilerError::NotConstructible { ref type_name, .. } if type_name == "crate::model::Handle"
    ));
}

#[test]
fn test_limit_reaches_collection_through_optional() {
    let mut scores = member("scores", option(list(prim(PrimitiveKind::U16))));
    scores.limit = Some(LimitDirective::new(5, LimitPolicy::Clamp));

    let mut report = ResolutionReport::default();
    let descriptor = ShapeRegistry::with_defaults()
        .resolve_members(&skeleton(vec![scores]), &types(), &GeneratorConfig::default(), &mut report)
        .unwrap();

    let IrNode::Optional { inner, .. } = &descriptor.members[0].node else {
        panic!("expected optional");
    };
    let IrNode::List { limit, .. } = inner.as_ref() else {
        panic!("expected list");
    };
    assert_eq!(*limit, Some(LimitDirective::new(5, LimitPolicy::Clamp)));
}

#[test]
fn test_nesting_guard() {
    let mut ty = prim(PrimitiveKind::U8);
    for _ in 0..5 {
        ty = list(ty);
    }
    let types = types();
    let config = GeneratorConfig {
        max_depth: 3,
        ..GeneratorConfig::default()
    };
    let ctx = ResolveContext {
        types: &types,
        config: &config,
        record: "Player",
        member: "deep",
    };
    let shape = ShapeDescriptor::member(ty, Place::field("self", "deep"));
    let err = ShapeRegistry::with_defaults().resolve(&shape, &ctx).unwrap_err();
    assert!(matches!(err, CompilerError::NestingTooDeep { depth: 4, max: 3, .. }));
}

#[test]
fn test_self_reference_resolves_by_name() {
    let mut types = types();
    types
        .add_record(known("Node", TypeCategory::Reference, ConstructorKind::Default))
        .unwrap();
    let mut node = skeleton(vec![
        member("value", prim(PrimitiveKind::I32)),
        member("children", list(named("Node"))),
    ]);
    node.name = "Node".to_string();

    let mut report = ResolutionReport::default();
    let descriptor = ShapeRegistry::with_defaults()
        .resolve_members(&node, &types, &GeneratorConfig::default(), &mut report)
        .unwrap();
    assert_eq!(descriptor.members.len(), 2);
    assert!(report.is_empty());
}

#[test]
fn test_all_fields_constructor() {
    let mut record = skeleton(vec![
        member("id", prim(PrimitiveKind::U32)),
        member("name", prim(PrimitiveKind::String)),
    ]);
    record.members[0].read_only = true;
    record.base = Some(BaseRecord {
        field: "base".to_string(),
        type_name: "Item".to_string(),
    });
    record.constructor = ConstructorShape::AllFields {
        function: "new".to_string(),
        params: vec!["base".to_string(), "id".to_string(), "name".to_string()],
    };

    let mut report = ResolutionReport::default();
    let descriptor = ShapeRegistry::with_defaults()
        .resolve_members(&record, &types(), &GeneratorConfig::default(), &mut report)
        .unwrap();

    // Read-only members are set through the constructor.
    assert_eq!(descriptor.members.len(), 2);
    let construct = descriptor.members[0].construct_node.as_ref().unwrap();
    assert_eq!(construct.place().read(), "id_value");
    assert!(descriptor.inherits_serializable());
}

#[test]
fn test_constructor_parameter_mismatch() {
    let mut record = skeleton(vec![member("id", prim(PrimitiveKind::U32))]);
    record.constructor = ConstructorShape::AllFields {
        function: "new".to_string(),
        params: vec!["id".to_string(), "extra".to_string()],
    };

    let mut report = ResolutionReport::default();
    let err = ShapeRegistry::with_defaults()
        .resolve_members(&record, &types(), &GeneratorConfig::default(), &mut report)
        .unwrap_err();
    assert!(matches!(err, CompilerError::ConstructorMismatch { ref message, .. } if message.contains("extra")));
}

#[test]
fn test_unknown_base_and_duplicate_member() {
    let mut record = skeleton(vec![member("id", prim(PrimitiveKind::U32))]);
    record.base = Some(BaseRecord {
        field: "base".to_string(),
        type_name: "Missing".to_string(),
    });
    let mut report = ResolutionReport::default();
    let registry = ShapeRegistry::with_defaults();
    let err = registry
        .resolve_members(&record, &types(), &GeneratorConfig::default(), &mut report)
        .unwrap_err();
    assert!(matches!(err, CompilerError::UnknownBase { .. }));

    let record = skeleton(vec![
        member("id", prim(PrimitiveKind::U32)),
        member("id", prim(PrimitiveKind::U64)),
    ]);
    let err = registry
        .resolve_members(&record, &types(), &GeneratorConfig::default(), &mut report)
        .unwrap_err();
    assert!(matches!(err, CompilerError::DuplicateMember { ref member, .. } if member == "id"));
}

#[test]
fn test_custom_matcher_runs_first() {
    struct Everything;

    impl ShapeMatcher for Everything {
        fn name(&self) -> &'static str {
            "everything"
        }

        fn try_resolve(
            &self,
            shape: &ShapeDescriptor,
            _ctx: &ResolveContext<'_>,
            _registry: &ShapeRegistry,
        ) -> Result<Option<IrNode>, CompilerError> {
            Ok(Some(IrNode::Primitive {
                place: shape.place.clone(),
                kind: PrimitiveKind::Bool,
            }))
        }
    }

    let mut registry = ShapeRegistry::with_defaults();
    registry.register_first(Everything);
    assert_eq!(registry.matcher_names()[0], "everything");

    let types = types();
    let config = GeneratorConfig::default();
    let ctx = ResolveContext {
        types: &types,
        config: &config,
        record: "Player",
        member: "value",
    };
    let shape = ShapeDescriptor::member(named("Item"), Place::field("self", "value"));
    assert!(matches!(
        registry.resolve(&shape, &ctx).unwrap(),
        Some(IrNode::Primitive { kind: PrimitiveKind::Bool, .. })
    ));
}
