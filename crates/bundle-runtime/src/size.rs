//! # Collection Size Codec
//!
//! Every variable-length collection is prefixed by its element count. Counts
//! are stored as 1 to 4 bytes of 7-bit groups, most significant group first.
//! The high bit of each byte is a continuation flag.
//!
//! ```text
//! 1                    ->  0_0000001
//! 0b0010001_0000001    ->  1_0010001 0_0000001
//! ```
//!
//! Collections limited to at most 255 elements skip this codec and store the
//! count as a single raw byte instead.

use crate::error::BundleError;
use crate::io::{BundleRead, BundleWrite};

/// Largest count the size codec can represent (2^28 - 1).
pub const MAX_COLLECTION_SIZE: usize = (1 << 28) - 1;

const MAX_SIZE_BYTES: usize = 4;

/// Writes a collection count.
///
/// # Errors
///
/// Returns [`BundleError::SizeOutOfRange`] if `size` exceeds
/// [`MAX_COLLECTION_SIZE`].
pub fn write_collection_size<W: BundleWrite>(writer: &mut W, size: usize) -> Result<(), BundleError> {
    if size > MAX_COLLECTION_SIZE {
        return Err(BundleError::SizeOutOfRange { size });
    }
    if size < 0x80 {
        return writer.write_u8(size as u8);
    }
    for group in (1..MAX_SIZE_BYTES).rev() {
        let shift = 7 * group;
        if size >= 1 << shift {
            writer.write_u8(((size >> shift) & 0x7F) as u8 | 0x80)?;
        }
    }
    writer.write_u8((size & 0x7F) as u8)
}

/// Reads a collection count.
///
/// # Errors
///
/// Returns [`BundleError::MalformedSize`] if the fourth byte still has its
/// continuation bit set.
pub fn read_collection_size<R: BundleRead>(reader: &mut R) -> Result<usize, BundleError> {
    let mut size = 0usize;
    for _ in 0..MAX_SIZE_BYTES {
        let byte = reader.read_u8()?;
        size = (size << 7) | usize::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            return Ok(size);
        }
    }
    Err(BundleError::MalformedSize)
}

/// Number of bytes [`write_collection_size`] emits for `size`.
pub fn collection_size_len(size: usize) -> usize {
    match size {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x1F_FFFF => 3,
        _ => 4,
    }
}

/// Most elements a decoded count reserves up front. Larger collections grow
/// while their elements are read.
pub const MAX_PREALLOCATION: usize = 4096;

/// Capacity to reserve for `count` incoming elements.
pub fn preallocation(count: usize) -> usize {
    count.min(MAX_PREALLOCATION)
}

/// Fails early when `count` elements of at least one byte each cannot fit
/// in what `reader` has left. Readers that cannot tell always pass.
///
/// # Errors
///
/// Returns [`BundleError::UnexpectedEof`] when the reader reports fewer than
/// `count` remaining bytes.
pub fn ensure_available<R: BundleRead + ?Sized>(reader: &R, count: usize) -> Result<(), BundleError> {
    match reader.remaining_hint() {
        Some(remaining) if remaining < count => Err(BundleError::UnexpectedEof {
            needed: count,
            remaining,
        }),
        _ => Ok(()),
    }
}
