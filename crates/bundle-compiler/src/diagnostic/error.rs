//! Compiler error types.
#![allow(unused_assignments)]

use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Errors that can occur while loading a schema or generating code.
#[allow(unused_assignments)]
#[derive(Error, Diagnostic, Debug)]
pub enum CompilerError {
    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("Failed to read file '{path}': {message}")]
    #[diagnostic(code(bundle::io::read_error))]
    IoError {
        path: PathBuf,
        message: String,
    },

    #[error("Failed to write file '{path}': {message}")]
    #[diagnostic(code(bundle::io::write_error))]
    WriteError {
        path: PathBuf,
        message: String,
    },

    // =========================================================================
    // Schema Errors
    // =========================================================================
    #[error("Unsupported schema format: {format}")]
    #[diagnostic(
        code(bundle::schema::unsupported_format),
        help("Supported formats: json")
    )]
    UnsupportedFormat {
        format: String,
    },

    #[error("Failed to parse schema: {message}")]
    #[diagnostic(code(bundle::schema::parse_failed))]
    SchemaParse {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("Invalid type '{type_text}' on {record}.{member}: {message}")]
    #[diagnostic(
        code(bundle::schema::type_syntax),
        help("Types look like: u32, String, Option<T>, Vec<T>, HashMap<K, V>, Box<[T]>, NdArray<T, 2>, (A, B), or a declared type name")
    )]
    TypeSyntax {
        record: String,
        member: String,
        type_text: String,
        message: String,
    },

    #[error("Type '{name}' is declared more than once")]
    #[diagnostic(code(bundle::schema::duplicate_type))]
    DuplicateType {
        name: String,
    },

    #[error("Member '{member}' is declared more than once in record '{record}'")]
    #[diagnostic(code(bundle::schema::duplicate_member))]
    DuplicateMember {
        record: String,
        member: String,
    },

    #[error("Enum '{name}' has representation '{repr}', which is not an integer type")]
    #[diagnostic(
        code(bundle::schema::invalid_enum_repr),
        help("Enum representations must be one of u8, i8, u16, i16, u32, i32, u64, i64")
    )]
    InvalidEnumRepr {
        name: String,
        repr: String,
    },

    // =========================================================================
    // Resolution Errors
    // =========================================================================
    #[error("Record '{record}' extends '{base}', which is not a serializable record")]
    #[diagnostic(
        code(bundle::resolve::unknown_base),
        help("Declare the base under `records` or `serializable`")
    )]
    UnknownBase {
        record: String,
        base: String,
    },

    #[error("Constructor of record '{record}' does not match its members: {message}")]
    #[diagnostic(
        code(bundle::resolve::constructor_mismatch),
        help("An all_fields constructor takes every serialized member (and the base field) by name")
    )]
    ConstructorMismatch {
        record: String,
        message: String,
    },

    #[error("{record}.{member} needs to construct '{type_name}', which has no constructor")]
    #[diagnostic(
        code(bundle::resolve::not_constructible),
        help("Give '{type_name}' a `default` or `all_fields` constructor")
    )]
    NotConstructible {
        record: String,
        member: String,
        type_name: String,
    },

    #[error("{record}.{member} nests {depth} levels deep (maximum is {max})")]
    #[diagnostic(
        code(bundle::resolve::nesting_too_deep),
        help("Raise `max_depth` in the schema options if this nesting is intended")
    )]
    NestingTooDeep {
        record: String,
        member: String,
        depth: usize,
        max: usize,
    },

    #[error("Unknown record: {name}")]
    #[diagnostic(code(bundle::resolve::unknown_record))]
    UnknownRecord {
        name: String,
    },

    // =========================================================================
    // Emission Errors
    // =========================================================================
    #[error("No emitter is registered for IR kind '{kind}'")]
    #[diagnostic(
        code(bundle::emit::missing_emitter),
        help("Every shape matcher needs an emitter for the IR kind it produces")
    )]
    MissingEmitter {
        kind: String,
    },

    #[error("Failed to generate {count} record(s)")]
    #[diagnostic(code(bundle::emit::generation_failed))]
    Generation {
        count: usize,
        #[related]
        errors: Vec<CompilerError>,
    },
}

impl CompilerError {
    /// Builds a parse error pointing at `offset` inside `source`.
    pub fn schema_parse(
        path: &std::path::Path,
        source: String,
        offset: usize,
        message: impl Into<String>,
    ) -> Self {
        CompilerError::SchemaParse {
            message: message.into(),
            src: NamedSource::new(path.display().to_string(), source),
            span: (offset, 1).into(),
        }
    }

    /// Collapses a list of per-record failures into a single error.
    pub fn from_failures(mut errors: Vec<CompilerError>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            count => Some(CompilerError::Generation { count, errors }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_failure_is_not_wrapped() {
        let err = CompilerError::from_failures(vec![CompilerError::UnknownRecord {
            name: "Ghost".to_string(),
        }]);
        assert!(matches!(err, Some(CompilerError::UnknownRecord { .. })));
        assert!(CompilerError::from_failures(Vec::new()).is_none());
    }

    #[test]
    fn test_many_failures_are_related() {
        let errors = vec![
            CompilerError::UnknownRecord { name: "A".to_string() },
            CompilerError::UnknownRecord { name: "B".to_string() },
        ];
        let err = CompilerError::from_failures(errors).unwrap();
        assert_eq!(err.to_string(), "Failed to generate 2 record(s)");
        assert_eq!(err.related().map(|r| r.count()), Some(2));
    }
}
