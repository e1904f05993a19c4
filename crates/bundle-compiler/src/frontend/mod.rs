//! Schema frontends.
//!
//! A frontend reads schema sources and produces a [`Schema`]: record
//! skeletons plus the table of every type the generated code may refer to.
//! Everything after this point is format-agnostic.

pub mod json;
pub mod type_expr;

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::diagnostic::CompilerError;
use crate::ir::Schema;

/// Trait for schema frontends.
pub trait Frontend {
    /// Returns the format name (e.g., "json").
    fn format(&self) -> &str;

    /// Returns file extensions this frontend handles (e.g., ["json"]).
    fn extensions(&self) -> &[&str];

    /// Parses schema text. `path` is used for diagnostics only.
    fn parse_str(&self, source: &str, path: &Path) -> Result<Schema, CompilerError>;

    /// Parses a single schema file.
    fn parse_file(&self, path: &Path) -> Result<Schema, CompilerError> {
        let source = read_source(path)?;
        self.parse_str(&source, path)
    }

    /// Parses every schema file under `dir` into one schema.
    fn parse_directory(&self, dir: &Path) -> Result<Schema, CompilerError>;

    /// Parses a file, or a directory of files.
    fn parse_path(&self, path: &Path) -> Result<Schema, CompilerError> {
        if path.is_dir() {
            self.parse_directory(path)
        } else {
            self.parse_file(path)
        }
    }
}

/// Creates a frontend for the given schema format.
pub fn create_frontend(format: &str) -> Result<Box<dyn Frontend>, CompilerError> {
    match format {
        "json" => Ok(Box::new(json::JsonFrontend::new())),
        _ => Err(CompilerError::UnsupportedFormat {
            format: format.to_string(),
        }),
    }
}

/// Picks a frontend from a schema file's extension.
pub fn frontend_for_path(path: &Path) -> Result<Box<dyn Frontend>, CompilerError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    create_frontend(extension)
}

pub(crate) fn read_source(path: &Path) -> Result<String, CompilerError> {
    std::fs::read_to_string(path).map_err(|e| CompilerError::IoError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Schema files under `dir`, in a stable order.
pub(crate) fn schema_files(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>, CompilerError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| CompilerError::IoError {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?;
        let matches = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| extensions.contains(&e));
        if entry.file_type().is_file() && matches {
            files.push(entry.into_path());
        }
    }
    tracing::debug!(dir = %dir.display(), count = files.len(), "schema files found");
    Ok(files)
}
