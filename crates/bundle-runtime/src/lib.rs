//! # Bundle Runtime
//!
//! Support library linked by code that `bundle-compiler` generates. It owns
//! the wire format:
//!
//! - fixed-width primitives, little-endian
//! - NUL-terminated UTF-8 strings
//! - 1 to 4 byte collection sizes (see [`write_collection_size`])
//! - one presence byte in front of optional values
//!
//! Records, tuples and nested records carry no framing of their own. Their
//! members follow each other in declaration order.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bundle_runtime::{BundleBytes, BundleSerializable};
//!
//! let bytes = player.to_bytes()?;
//! let copy = Player::from_bytes(&bytes)?;
//!
//! // Refill an existing instance in place.
//! let mut reader = bundle_runtime::BundleReader::new(&bytes);
//! existing.deserialize(&mut reader)?;
//! ```

pub mod array;
pub mod error;
pub mod io;
pub mod size;
pub mod traits;

pub use array::{default_boxed_slice, resize_boxed_slice, NdArray};
pub use error::BundleError;
pub use io::{BundleRead, BundleReader, BundleWrite, BundleWriter, IoReader, IoWriter};
pub use size::{
    collection_size_len, ensure_available, preallocation, read_collection_size, write_collection_size,
    MAX_COLLECTION_SIZE, MAX_PREALLOCATION,
};
pub use traits::{BundleBytes, BundleConstruct, BundleEnum, BundleSerializable};
