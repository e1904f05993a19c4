//! # Wire Primitives
//!
//! Fixed-width values are little-endian. A `bool` is a single byte, a `char`
//! is its UTF-8 encoding, and a string is its UTF-8 bytes followed by one
//! zero byte.
//!
//! ```text
//! i32 0x01020304   ->  04 03 02 01
//! "hi"             ->  68 69 00
//! 'é'              ->  c3 a9
//! ```
//!
//! Implementors only supply the raw byte transfer. Every typed method is
//! provided on top of it, so a custom sink or source stays wire compatible.

use std::borrow::Borrow;
use std::io::{Read, Write};

use crate::error::BundleError;

// =============================================================================
// Writing
// =============================================================================

macro_rules! write_le {
    ($($(#[$meta:meta])* $name:ident => $ty:ty),* $(,)?) => {
        $(
            $(#[$meta])*
            fn $name(&mut self, value: impl Borrow<$ty>) -> Result<(), BundleError> {
                self.write_bytes(&value.borrow().to_le_bytes())
            }
        )*
    };
}

/// A sink for bundle-encoded values.
pub trait BundleWrite {
    /// Appends raw bytes to the sink.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), BundleError>;

    fn write_bool(&mut self, value: impl Borrow<bool>) -> Result<(), BundleError> {
        self.write_bytes(&[u8::from(*value.borrow())])
    }

    fn write_u8(&mut self, value: impl Borrow<u8>) -> Result<(), BundleError> {
        self.write_bytes(&[*value.borrow()])
    }

    write_le! {
        write_i8 => i8,
        write_u16 => u16,
        write_i16 => i16,
        write_u32 => u32,
        write_i32 => i32,
        write_u64 => u64,
        write_i64 => i64,
        /// Sixteen-byte slot used for decimal-like values.
        write_u128 => u128,
        /// Sixteen-byte slot used for decimal-like values.
        write_i128 => i128,
        write_f32 => f32,
        write_f64 => f64,
    }

    fn write_char(&mut self, value: impl Borrow<char>) -> Result<(), BundleError> {
        let mut buf = [0u8; 4];
        let encoded = value.borrow().encode_utf8(&mut buf);
        self.write_bytes(encoded.as_bytes())
    }

    /// Writes the UTF-8 bytes of `value` and a zero terminator.
    ///
    /// No escaping is performed, so a string holding a NUL is rejected.
    fn write_string(&mut self, value: &str) -> Result<(), BundleError> {
        if value.as_bytes().contains(&0) {
            return Err(BundleError::EmbeddedNul);
        }
        self.write_bytes(value.as_bytes())?;
        self.write_bytes(&[0])
    }
}

impl<W: BundleWrite + ?Sized> BundleWrite for &mut W {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), BundleError> {
        (**self).write_bytes(bytes)
    }
}

/// In-memory writer backed by a `Vec<u8>`.
#[derive(Debug, Default, Clone)]
pub struct BundleWriter {
    buf: Vec<u8>,
}

impl BundleWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Bytes written so far.
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

impl BundleWrite for BundleWriter {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), BundleError> {
        self.buf.extend_from_slice(bytes);
        Ok(())
    }
}

/// Adapter writing bundles into any [`std::io::Write`].
#[derive(Debug)]
pub struct IoWriter<W> {
    inner: W,
}

impl<W: Write> IoWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> BundleWrite for IoWriter<W> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), BundleError> {
        self.inner.write_all(bytes)?;
        Ok(())
    }
}

// =============================================================================
// Reading
// =============================================================================

macro_rules! read_le {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            fn $name(&mut self) -> Result<$ty, BundleError> {
                let mut buf = [0u8; std::mem::size_of::<$ty>()];
                self.read_bytes(&mut buf)?;
                Ok(<$ty>::from_le_bytes(buf))
            }
        )*
    };
}

/// A source of bundle-encoded values.
pub trait BundleRead {
    /// Fills `buf` completely or fails.
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), BundleError>;

    /// Bytes left in the source, when it knows.
    fn remaining_hint(&self) -> Option<usize> {
        None
    }

    fn read_u8(&mut self) -> Result<u8, BundleError> {
        let mut buf = [0u8; 1];
        self.read_bytes(&mut buf)?;
        Ok(buf[0])
    }

    /// Any non-zero byte reads as `true`.
    fn read_bool(&mut self) -> Result<bool, BundleError> {
        Ok(self.read_u8()? != 0)
    }

    read_le! {
        read_i8 => i8,
        read_u16 => u16,
        read_i16 => i16,
        read_u32 => u32,
        read_i32 => i32,
        read_u64 => u64,
        read_i64 => i64,
        read_u128 => u128,
        read_i128 => i128,
        read_f32 => f32,
        read_f64 => f64,
    }

    fn read_char(&mut self) -> Result<char, BundleError> {
        let lead = self.read_u8()?;
        let width = match lead {
            0x00..=0x7F => 1,
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => return Err(BundleError::InvalidChar { lead }),
        };
        let mut buf = [lead, 0, 0, 0];
        self.read_bytes(&mut buf[1..width])?;
        std::str::from_utf8(&buf[..width])
            .ok()
            .and_then(|s| s.chars().next())
            .ok_or(BundleError::InvalidChar { lead })
    }

    /// Reads UTF-8 bytes up to and including the zero terminator.
    fn read_string(&mut self) -> Result<String, BundleError> {
        let mut bytes = Vec::new();
        loop {
            match self.read_u8()? {
                0 => break,
                byte => bytes.push(byte),
            }
        }
        String::from_utf8(bytes).map_err(|_| BundleError::InvalidUtf8)
    }
}

impl<R: BundleRead + ?Sized> BundleRead for &mut R {
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), BundleError> {
        (**self).read_bytes(buf)
    }

    fn remaining_hint(&self) -> Option<usize> {
        (**self).remaining_hint()
    }

    fn read_string(&mut self) -> Result<String, BundleError> {
        (**self).read_string()
    }
}

/// Reader over a borrowed byte slice.
#[derive(Debug, Clone)]
pub struct BundleReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BundleReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}

impl BundleRead for BundleReader<'_> {
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), BundleError> {
        let remaining = self.remaining();
        if buf.len() > remaining {
            return Err(BundleError::UnexpectedEof {
                needed: buf.len(),
                remaining,
            });
        }
        buf.copy_from_slice(&self.data[self.pos..self.pos + buf.len()]);
        self.pos += buf.len();
        Ok(())
    }

    fn remaining_hint(&self) -> Option<usize> {
        Some(self.remaining())
    }

    fn read_string(&mut self) -> Result<String, BundleError> {
        let rest = &self.data[self.pos..];
        let Some(len) = rest.iter().position(|&b| b == 0) else {
            return Err(BundleError::UnexpectedEof {
                needed: rest.len() + 1,
                remaining: rest.len(),
            });
        };
        let text = std::str::from_utf8(&rest[..len]).map_err(|_| BundleError::InvalidUtf8)?;
        self.pos += len + 1;
        Ok(text.to_string())
    }
}

/// Adapter reading bundles from any [`std::io::Read`].
#[derive(Debug)]
pub struct IoReader<R> {
    inner: R,
}

impl<R: Read> IoReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> BundleRead for IoReader<R> {
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), BundleError> {
        self.inner.read_exact(buf)?;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
