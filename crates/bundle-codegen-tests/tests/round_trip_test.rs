//! Round trips through the generated impls.

use std::collections::{BTreeMap, HashMap};

use bundle_codegen_tests::model::*;
use bundle_runtime::{
    BundleBytes, BundleError, BundleReader, BundleSerializable, BundleWriter, NdArray,
    MAX_COLLECTION_SIZE,
};

fn round_trip<T: BundleBytes>(value: &T) -> T {
    let bytes = value.to_bytes().unwrap();
    T::from_bytes(&bytes).unwrap()
}

/// Deserializes `bytes` into an existing value and checks nothing is left over.
fn refill<T: BundleSerializable>(target: &mut T, bytes: &[u8]) {
    let mut reader = BundleReader::new(bytes);
    target.deserialize(&mut reader).unwrap();
    assert!(reader.is_empty(), "{} byte(s) left over", reader.remaining());
}

fn item(id: u32, label: &str) -> Item {
    Item::new(id, label.to_string())
}

fn nested() -> Nested {
    Nested {
        matrix: vec![vec![1, -2, 3], vec![], vec![i32::MAX]],
        index: HashMap::from([
            ("odd".to_string(), vec![1u16, 3, 5]),
            ("none".to_string(), vec![]),
        ]),
        maybe: Some("here".to_string()),
        maybe_items: Some(vec![item(1, "sword"), item(2, "shield")]),
        pair: (7u8, "seven".to_string()),
        single: (0.25f64,),
        samples: vec![-1i16, 0, 1].into_boxed_slice(),
        grid: NdArray::from_vec([2, 3], vec![1u8, 2, 3, 4, 5, 6]).unwrap(),
        tints: vec![Rgb(255, 0, 128), Rgb(1, 2, 3)],
        palette: vec![Color::Blue, Color::Red],
        by_id: BTreeMap::from([(10u32, item(10, "gem")), (3u32, item(3, "key"))]),
        routes: vec![
            ("north".to_string(), Some(vec![1u8, 2].into_boxed_slice())),
            ("south".to_string(), None),
        ],
        swatches: vec![
            vec![Color::Red, Color::Blue].into_boxed_slice(),
            Box::default(),
            vec![Color::Green].into_boxed_slice(),
        ],
        ranks: HashMap::from([
            ("captain".to_string(), (1u8, "Ilse".to_string())),
            ("cook".to_string(), (7u8, String::new())),
        ]),
    }
}

// =============================================================================
// Scalars
// =============================================================================

#[test]
fn test_scalars_round_trip() {
    let scalars = Scalars {
        flag: true,
        byte: 200u8,
        small: -5i8,
        short: -1234i16,
        word: 0xDEAD_BEEFu32,
        long: i64::MIN,
        amount: -170_141_183_460_469_231_731_687_303_715_884_105_728i128,
        ratio: 1.5f32,
        precise: -0.125f64,
        letter: 'é',
        name: "Grüße".to_string(),
        color: Color::Green,
        faction: Faction::Horde,
    };
    assert_eq!(round_trip(&scalars), scalars);
}

#[test]
fn test_scalars_wire_layout() {
    let scalars = Scalars {
        word: 0x0102_0304u32,
        letter: 'a',
        name: "hi".to_string(),
        ..Scalars::default()
    };
    let bytes = scalars.to_bytes().unwrap();

    // bool, u8, i8 and i16 come first, then the u32 little-endian.
    assert_eq!(&bytes[5..9], &[4, 3, 2, 1]);
    // 1+1+1+2+4+8+16+4+8 bytes of fixed-width values precede the char.
    assert_eq!(bytes[45], b'a');
    assert_eq!(&bytes[46..49], b"hi\0");
    // Color::Red = 1, then Faction::Neutral = 0i16.
    assert_eq!(&bytes[49..], &[1, 0, 0]);
}

#[test]
fn test_unknown_enum_discriminant() {
    let mut bytes = Scalars::default().to_bytes().unwrap();
    let color_at = bytes.len() - 3;
    bytes[color_at] = 3;

    let err = Scalars::from_bytes(&bytes).unwrap_err();
    assert!(matches!(
        err,
        BundleError::UnknownDiscriminant { type_name: "Color", value: 3 }
    ));
}

#[test]
fn test_truncated_input() {
    let bytes = Scalars::default().to_bytes().unwrap();
    let err = Scalars::from_bytes(&bytes[..10]).unwrap_err();
    assert!(matches!(err, BundleError::UnexpectedEof { .. }));
}

// =============================================================================
// Limits
// =============================================================================

#[test]
fn test_throw_limit_fails_write() {
    let limits = Limits {
        strict: vec![1u32, 2, 3, 4, 5, 6],
        ..Limits::default()
    };
    let err = limits.to_bytes().unwrap_err();
    assert!(err.is_limit_exceeded());

    // `strict` is the first member, so nothing reaches the writer.
    let mut writer = BundleWriter::new();
    assert!(limits.serialize(&mut writer).unwrap_err().is_limit_exceeded());
    assert_eq!(writer.position(), 0);
}

#[test]
fn test_clamp_limit_truncates_and_keeps_alignment() {
    let limits = Limits {
        strict: vec![9u32; 5],
        clamped: (0..8).map(|i| format!("s{}", i)).collect(),
        lookup: (0..4u16).map(|i| (format!("k{}", i), i)).collect(),
        wide: vec![],
        trailer: 0xABCDu32,
    };
    let bytes = limits.to_bytes().unwrap();
    let copy = Limits::from_bytes(&bytes).unwrap();

    assert_eq!(copy.strict, limits.strict);
    assert_eq!(copy.clamped, vec!["s0", "s1", "s2", "s3", "s4"]);
    let keys: Vec<&str> = copy.lookup.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["k0", "k1", "k2"]);
    assert_eq!(copy.trailer, 0xABCDu32);
}

#[test]
fn test_one_byte_counts_under_small_limits() {
    let limits = Limits {
        strict: vec![7u32],
        ..Limits::default()
    };
    let bytes = limits.to_bytes().unwrap();
    // strict: count byte then one u32, clamped: 0, lookup: 0, wide: 0, trailer.
    assert_eq!(bytes, vec![1, 7, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn test_varint_count_over_a_byte_limit() {
    let limits = Limits {
        wide: vec![0u8; 300],
        ..Limits::default()
    };
    let bytes = limits.to_bytes().unwrap();
    assert_eq!(&bytes[3..5], &[0x82, 0x2C]);
    assert_eq!(Limits::from_bytes(&bytes).unwrap(), limits);

    let too_wide = Limits {
        wide: vec![0u8; 301],
        ..Limits::default()
    };
    assert!(too_wide.to_bytes().unwrap_err().is_limit_exceeded());
}

#[test]
fn test_read_over_limit_fails_even_for_clamped_members() {
    // strict announces 11 elements.
    let err = Limits::from_bytes(&[11]).unwrap_err();
    assert!(matches!(err, BundleError::LimitExceeded { count: 11, limit: 5 }));

    // strict empty, clamped announces 6.
    let err = Limits::from_bytes(&[0, 6]).unwrap_err();
    assert!(matches!(err, BundleError::LimitExceeded { count: 6, limit: 5 }));
}

// =============================================================================
// Composites
// =============================================================================

#[test]
fn test_nested_round_trip() {
    let value = nested();
    let copy = round_trip(&value);
    assert_eq!(copy.swatches[0][..], [Color::Red, Color::Blue]);
    assert_eq!(copy.ranks["captain"], (1u8, "Ilse".to_string()));
    assert_eq!(copy, value);
    assert_eq!(round_trip(&Nested::default()), Nested::default());
}

#[test]
fn test_deserialize_into_populated_instance_is_idempotent() {
    let source = nested();
    let bytes = source.to_bytes().unwrap();

    let mut target = Nested {
        matrix: vec![vec![100; 10]; 4],
        index: HashMap::from([("stale".to_string(), vec![9u16])]),
        maybe: None,
        maybe_items: Some(vec![item(99, "old"); 6]),
        samples: vec![5i16; 8].into_boxed_slice(),
        grid: NdArray::from_vec([1, 1], vec![42u8]).unwrap(),
        by_id: BTreeMap::from([(77u32, item(77, "gone"))]),
        swatches: vec![vec![Color::Blue; 3].into_boxed_slice(); 5],
        ranks: HashMap::from([
            ("stale".to_string(), (9u8, "x".to_string())),
            ("cook".to_string(), (0u8, "old".to_string())),
        ]),
        ..Nested::default()
    };

    refill(&mut target, &bytes);
    assert_eq!(target, source);
    refill(&mut target, &bytes);
    assert_eq!(target, source);
}

#[test]
fn test_present_optional_becomes_absent() {
    let mut target = nested();
    let empty = Nested::default();
    refill(&mut target, &empty.to_bytes().unwrap());
    assert_eq!(target.maybe, None);
    assert_eq!(target.maybe_items, None);
    assert!(target.samples.is_empty());
    assert_eq!(target.grid.dims(), [0, 0]);
}

#[test]
fn test_grid_limit_applies_per_dimension() {
    let value = Nested {
        grid: NdArray::from_vec([1, 17], vec![0u8; 17]).unwrap(),
        ..Nested::default()
    };
    assert!(value.to_bytes().unwrap_err().is_limit_exceeded());

    let ok = Nested {
        grid: NdArray::from_vec([16, 16], vec![3u8; 256]).unwrap(),
        ..Nested::default()
    };
    assert_eq!(round_trip(&ok), ok);
}

#[test]
fn test_huge_counts_fail_without_allocating() {
    let max_count = [0xFF, 0xFF, 0xFF, 0x7F];

    // `matrix` is a list, so it only reserves a bounded capacity and then
    // runs out of input.
    let err = Nested::from_bytes(&max_count).unwrap_err();
    assert!(matches!(err, BundleError::UnexpectedEof { .. }));

    // `samples` is an array and is rejected before the slice is allocated.
    let mut bytes = Nested::default().to_bytes().unwrap();
    let samples_at = 14;
    assert_eq!(bytes[samples_at], 0);
    bytes.splice(samples_at..=samples_at, max_count);
    let err = Nested::from_bytes(&bytes).unwrap_err();
    assert!(matches!(
        err,
        BundleError::UnexpectedEof { needed, .. } if needed == MAX_COLLECTION_SIZE
    ));
}

// =============================================================================
// Constructors, accessors and bases
// =============================================================================

#[test]
fn test_all_fields_constructor() {
    let original = item(42, "lantern");
    let copy = round_trip(&original);
    assert_eq!(copy.id(), 42);
    assert_eq!(copy, original);

    // In-place deserialize rebuilds through the constructor too.
    let mut target = item(1, "placeholder");
    refill(&mut target, &original.to_bytes().unwrap());
    assert_eq!(target, original);
}

#[test]
fn test_accessor_members() {
    let mut transform = Transform::default();
    transform.set_position(Vec2 { x: 1.5, y: -2.0 });
    transform.set_scale(3.0);
    transform.tags_mut().extend(["a".to_string(), "b".to_string()]);

    let copy = round_trip(&transform);
    assert_eq!(copy.position(), Vec2 { x: 1.5, y: -2.0 });
    assert_eq!(copy.scale(), 3.0);
    assert_eq!(copy.tags(), ["a", "b"]);

    let mut target = Transform::default();
    target.tags_mut().push("stale".to_string());
    refill(&mut target, &transform.to_bytes().unwrap());
    assert_eq!(target, transform);
}

#[test]
fn test_base_is_written_first() {
    let monster = Monster {
        entity: Entity {
            id: 3,
            name: "ab".to_string(),
        },
        hp: 9,
        loot: vec![],
    };
    let bytes = monster.to_bytes().unwrap();
    assert_eq!(
        bytes,
        vec![3, 0, 0, 0, 0, 0, 0, 0, b'a', b'b', 0, 9, 0, 0, 0, 0]
    );

    let with_loot = Monster {
        loot: vec![item(1, "fang"), item(2, "hide")],
        ..monster
    };
    assert_eq!(round_trip(&with_loot), with_loot);
}

#[test]
fn test_base_with_all_fields_constructor() {
    let npc = Npc::new(
        Entity {
            id: 8,
            name: "Mira".to_string(),
        },
        "Welcome.".to_string(),
    );
    assert_eq!(round_trip(&npc), npc);

    // Same prefix as a monster with the same base.
    let monster = Monster {
        entity: npc.entity.clone(),
        ..Monster::default()
    };
    let npc_bytes = npc.to_bytes().unwrap();
    let monster_bytes = monster.to_bytes().unwrap();
    assert_eq!(npc_bytes[..13], monster_bytes[..13]);
}

#[test]
fn test_self_referential_tree() {
    let tree = TreeNode {
        value: 1,
        children: vec![
            TreeNode {
                value: 2,
                children: vec![TreeNode {
                    value: 4,
                    children: vec![],
                }],
            },
            TreeNode {
                value: 3,
                children: vec![],
            },
        ],
    };
    assert_eq!(round_trip(&tree), tree);
}

// =============================================================================
// Hand-written members
// =============================================================================

#[test]
fn test_hand_written_members_and_skip() {
    let session = Session {
        handle: Handle {
            slot: 7,
            generation: 2,
        },
        history: vec![
            Handle {
                slot: 1,
                generation: 1,
            },
            Handle::default(),
        ],
        cursor: Cursor {
            offset: 4096,
            loads: 0,
        },
        names: vec!["main".to_string()],
        scratch: vec![1, 2, 3],
    };
    let bytes = session.to_bytes().unwrap();
    assert_eq!(&bytes[..4], &[7, 0, 2, 0]);

    let mut target = Session {
        names: vec!["old".to_string(), "older".to_string()],
        scratch: vec![9],
        ..Session::default()
    };
    refill(&mut target, &bytes);
    assert_eq!(target.handle, session.handle);
    assert_eq!(target.history, session.history);
    assert_eq!(target.cursor.offset, 4096);
    assert_eq!(target.cursor.loads, 1);
    assert_eq!(target.names, session.names);
    // Skipped members are neither written nor touched.
    assert_eq!(target.scratch, vec![9]);
}
