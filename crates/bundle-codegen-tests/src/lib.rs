//! Consumer crate for `bundle-compiler` output.
//!
//! `build.rs` compiles `schema/` into `OUT_DIR/generated.rs`, which is
//! included here so the impls are type-checked against the real records in
//! [`model`]. The integration tests round-trip those records.

pub mod model;

include!(concat!(env!("OUT_DIR"), "/generated.rs"));
