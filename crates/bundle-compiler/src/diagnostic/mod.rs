//! Diagnostic types for error reporting.

mod error;
mod location;

pub use error::CompilerError;
pub use location::{json_error_offset, SchemaLocation};
