//! Contracts implemented by generated code.

use crate::error::BundleError;
use crate::io::{BundleRead, BundleReader, BundleWrite, BundleWriter};

/// A record whose members are written back-to-back in declaration order.
pub trait BundleSerializable {
    fn serialize<W: BundleWrite>(&self, writer: &mut W) -> Result<(), BundleError>;

    /// Overwrites `self` with the next record in `reader`.
    ///
    /// Collections are cleared and refilled, so deserializing twice into the
    /// same instance yields the same value as deserializing once.
    fn deserialize<R: BundleRead>(&mut self, reader: &mut R) -> Result<(), BundleError>;
}

/// Construct path for a whole record.
pub trait BundleConstruct: Sized {
    fn construct_from_reader<R: BundleRead>(reader: &mut R) -> Result<Self, BundleError>;
}

/// A fieldless enum written as its integer representation.
pub trait BundleEnum: Sized {
    type Repr;

    const TYPE_NAME: &'static str;

    fn to_repr(&self) -> Self::Repr;

    fn from_repr(repr: Self::Repr) -> Result<Self, BundleError>;
}

/// Buffer-level helpers for complete records.
pub trait BundleBytes: BundleSerializable + BundleConstruct {
    fn to_bytes(&self) -> Result<Vec<u8>, BundleError> {
        let mut writer = BundleWriter::new();
        self.serialize(&mut writer)?;
        Ok(writer.into_bytes())
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, BundleError> {
        Self::construct_from_reader(&mut BundleReader::new(bytes))
    }
}

impl<T: BundleSerializable + BundleConstruct> BundleBytes for T {}

/// Implements [`BundleEnum`] for a fieldless enum.
///
/// ```rust
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// #[repr(u8)]
/// enum Suit {
///     Hearts = 1,
///     Spades = 2,
/// }
///
/// bundle_runtime::bundle_enum!(Suit as u8 { Hearts, Spades });
///
/// use bundle_runtime::BundleEnum;
/// assert_eq!(Suit::Spades.to_repr(), 2);
/// assert!(Suit::from_repr(3).is_err());
/// ```
#[macro_export]
macro_rules! bundle_enum {
    ($ty:ident as $repr:ty { $($variant:ident),+ $(,)? }) => {
        impl $crate::BundleEnum for $ty {
            type Repr = $repr;

            const TYPE_NAME: &'static str = stringify!($ty);

            fn to_repr(&self) -> $repr {
                match self {
                    $($ty::$variant => $ty::$variant as $repr,)+
                }
            }

            fn from_repr(repr: $repr) -> Result<Self, $crate::BundleError> {
                $(
                    if repr == $ty::$variant as $repr {
                        return Ok($ty::$variant);
                    }
                )+
                Err($crate::BundleError::UnknownDiscriminant {
                    type_name: <Self as $crate::BundleEnum>::TYPE_NAME,
                    value: repr as i128,
                })
            }
        }
    };
}
