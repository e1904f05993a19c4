//! Record types whose bundle impls are generated by `build.rs`.
//!
//! Fields the generated impls touch directly are at least `pub(crate)`,
//! since the impls are included at the crate root.

use std::collections::{BTreeMap, HashMap};

use bundle_runtime::{
    BundleConstruct, BundleError, BundleRead, BundleSerializable, BundleWrite, NdArray,
};

// =============================================================================
// Enums and external codecs
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Color {
    #[default]
    Red = 1,
    Green = 2,
    Blue = 4,
}

bundle_runtime::bundle_enum!(Color as u8 { Red, Green, Blue });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i16)]
pub enum Faction {
    Horde = -300,
    #[default]
    Neutral = 0,
    Alliance = 300,
}

bundle_runtime::bundle_enum!(Faction as i16 { Horde, Neutral, Alliance });

/// Packed color with its own three-byte codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub fn write_rgb<W: BundleWrite>(writer: &mut W, value: &Rgb) -> Result<(), BundleError> {
    writer.write_bytes(&[value.0, value.1, value.2])
}

pub fn read_rgb<R: BundleRead>(reader: &mut R) -> Result<Rgb, BundleError> {
    let mut buf = [0u8; 3];
    reader.read_bytes(&mut buf)?;
    Ok(Rgb(buf[0], buf[1], buf[2]))
}

// =============================================================================
// Plain records
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scalars {
    pub flag: bool,
    pub byte: u8,
    pub small: i8,
    pub short: i16,
    pub word: u32,
    pub long: i64,
    pub amount: i128,
    pub ratio: f32,
    pub precise: f64,
    pub letter: char,
    pub name: String,
    pub color: Color,
    pub faction: Faction,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Limits {
    /// At most 5; more fails the write.
    pub strict: Vec<u32>,
    /// At most 5 written; the rest is dropped.
    pub clamped: Vec<String>,
    pub lookup: BTreeMap<String, u16>,
    /// Limit above one byte, so the count is a varint.
    pub wide: Vec<u8>,
    pub trailer: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Nested {
    pub matrix: Vec<Vec<i32>>,
    pub index: HashMap<String, Vec<u16>>,
    pub maybe: Option<String>,
    pub maybe_items: Option<Vec<Item>>,
    pub pair: (u8, String),
    pub single: (f64,),
    pub samples: Box<[i16]>,
    pub grid: NdArray<u8, 2>,
    pub tints: Vec<Rgb>,
    pub palette: Vec<Color>,
    pub by_id: BTreeMap<u32, Item>,
    pub routes: Vec<(String, Option<Box<[u8]>>)>,
    pub swatches: Vec<Box<[Color]>>,
    pub ranks: HashMap<String, (u8, String)>,
}

/// Built through [`Item::new`]; `id` never changes after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub(crate) id: u32,
    pub label: String,
}

impl Item {
    pub fn new(id: u32, label: String) -> Self {
        Self { id, label }
    }

    pub fn id(&self) -> u32 {
        self.id
    }
}

// =============================================================================
// Accessor members
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

/// Members are private and reached through accessors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transform {
    position: Vec2,
    scale: f32,
    tags: Vec<String>,
}

impl Transform {
    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale.max(0.0);
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn tags_mut(&mut self) -> &mut Vec<String> {
        &mut self.tags
    }
}

// =============================================================================
// Bases
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entity {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Monster {
    pub entity: Entity,
    pub hp: u32,
    pub loot: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Npc {
    pub entity: Entity,
    pub line: String,
}

impl Npc {
    pub fn new(entity: Entity, line: String) -> Self {
        Self { entity, line }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeNode {
    pub value: i32,
    pub children: Vec<TreeNode>,
}

// =============================================================================
// Hand-written impls
// =============================================================================

/// Slot and generation packed into one `u32`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Handle {
    pub slot: u16,
    pub generation: u16,
}

impl BundleSerializable for Handle {
    fn serialize<W: BundleWrite>(&self, writer: &mut W) -> Result<(), BundleError> {
        writer.write_u32((u32::from(self.generation) << 16) | u32::from(self.slot))
    }

    fn deserialize<R: BundleRead>(&mut self, reader: &mut R) -> Result<(), BundleError> {
        let packed = reader.read_u32()?;
        self.slot = (packed & 0xFFFF) as u16;
        self.generation = (packed >> 16) as u16;
        Ok(())
    }
}

impl BundleConstruct for Handle {
    fn construct_from_reader<R: BundleRead>(reader: &mut R) -> Result<Self, BundleError> {
        let mut handle = Handle::default();
        handle.deserialize(reader)?;
        Ok(handle)
    }
}

/// Can only be refilled in place; there is no construct path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor {
    pub offset: u64,
    /// Bumped on every refill, never written.
    pub loads: u32,
}

impl BundleSerializable for Cursor {
    fn serialize<W: BundleWrite>(&self, writer: &mut W) -> Result<(), BundleError> {
        writer.write_u64(self.offset)
    }

    fn deserialize<R: BundleRead>(&mut self, reader: &mut R) -> Result<(), BundleError> {
        self.offset = reader.read_u64()?;
        self.loads += 1;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub handle: Handle,
    pub history: Vec<Handle>,
    pub cursor: Cursor,
    /// Never reassigned; refilled in place.
    pub names: Vec<String>,
    pub scratch: Vec<u8>,
}
