//! Runtime error type shared by readers, writers and generated code.

use thiserror::Error;

/// Errors raised while serializing or deserializing a bundle.
///
/// Every error is fatal to the call that raised it. The stream position
/// afterwards is unspecified, so callers cannot resume reading from it.
#[derive(Error, Debug)]
pub enum BundleError {
    // =========================================================================
    // Collection sizes
    // =========================================================================
    /// A limited collection held more elements than allowed, or a stream
    /// announced more elements than the reader accepts.
    #[error("collection of {count} elements exceeds the limit of {limit}")]
    LimitExceeded { count: usize, limit: usize },

    /// A collection size kept its continuation bit set past the fourth byte.
    #[error("collection size continues past 4 bytes")]
    MalformedSize,

    /// A collection size does not fit the 28-bit size encoding.
    #[error("collection size {size} exceeds the maximum encodable size")]
    SizeOutOfRange { size: usize },

    /// Multi-dimensional array dimensions whose product overflows `usize`.
    #[error("array dimensions {dims:?} overflow the addressable element count")]
    DimensionsOverflow { dims: Vec<usize> },

    // =========================================================================
    // Primitive payloads
    // =========================================================================
    #[error("unexpected end of input: needed {needed} byte(s), {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("strings cannot contain an embedded NUL byte")]
    EmbeddedNul,

    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("invalid UTF-8 lead byte {lead:#04x} for a char")]
    InvalidChar { lead: u8 },

    #[error("{value} is not a valid discriminant for {type_name}")]
    UnknownDiscriminant {
        type_name: &'static str,
        value: i128,
    },

    // =========================================================================
    // Underlying I/O
    // =========================================================================
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BundleError {
    /// Builds the error raised when `count` elements run into `limit`.
    pub fn limit_exceeded(count: usize, limit: usize) -> Self {
        BundleError::LimitExceeded { count, limit }
    }

    /// Returns true if this error came from a collection limit check.
    pub fn is_limit_exceeded(&self) -> bool {
        matches!(self, BundleError::LimitExceeded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_exceeded_message() {
        let err = BundleError::limit_exceeded(6, 5);
        assert!(err.is_limit_exceeded());
        assert_eq!(err.to_string(), "collection of 6 elements exceeds the limit of 5");
    }

    #[test]
    fn test_io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        let err: BundleError = io.into();
        assert!(matches!(err, BundleError::Io(_)));
        assert!(!err.is_limit_exceeded());
    }
}
