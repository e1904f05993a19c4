//! JSON schema frontend.

mod document;

pub use document::SchemaDocument;

use std::path::{Path, PathBuf};

use document::{ConstructorDoc, RecordDoc};

use super::type_expr::parse_type_expr;
use super::{read_source, schema_files, Frontend};
use crate::diagnostic::{json_error_offset, CompilerError, SchemaLocation};
use crate::ir::{
    BaseRecord, ConstructorKind, ConstructorShape, EnclosingType, ExternalCodec, KnownEnum,
    KnownRecord, MemberSkeleton, PrimitiveKind, RecordSkeleton, Schema, TypeTable,
};

/// Reads `*.json` schema files.
#[derive(Debug, Default)]
pub struct JsonFrontend;

impl JsonFrontend {
    pub fn new() -> Self {
        Self
    }

    fn parse_document(&self, source: &str, path: &Path) -> Result<SchemaDocument, CompilerError> {
        serde_json::from_str(source).map_err(|e| {
            let offset = json_error_offset(source, e.line(), e.column());
            CompilerError::schema_parse(path, source.to_string(), offset, e.to_string())
        })
    }
}

impl Frontend for JsonFrontend {
    fn format(&self) -> &str {
        "json"
    }

    fn extensions(&self) -> &[&str] {
        &["json"]
    }

    fn parse_str(&self, source: &str, path: &Path) -> Result<Schema, CompilerError> {
        let document = self.parse_document(source, path)?;
        build_schema(document, path)
    }

    fn parse_directory(&self, dir: &Path) -> Result<Schema, CompilerError> {
        let mut merged = SchemaDocument::default();
        for file in schema_files(dir, self.extensions())? {
            let source = read_source(&file)?;
            merged.merge(self.parse_document(&source, &file)?);
        }
        build_schema(merged, dir)
    }
}

fn split_namespace(namespace: &str) -> Vec<String> {
    namespace
        .split("::")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn constructor_shape(doc: &ConstructorDoc) -> ConstructorShape {
    match doc {
        ConstructorDoc::None => ConstructorShape::None,
        ConstructorDoc::Default => ConstructorShape::Default,
        ConstructorDoc::AllFields { function, params } => ConstructorShape::AllFields {
            function: function.clone(),
            params: params.clone(),
        },
    }
}

/// Turns a parsed document into skeletons plus the table of known types.
pub fn build_schema(document: SchemaDocument, source: &Path) -> Result<Schema, CompilerError> {
    let mut types = TypeTable::new();

    let mut records = Vec::with_capacity(document.records.len());
    for doc in &document.records {
        let skeleton = build_record(doc, source)?;
        types.add_record(KnownRecord {
            name: skeleton.name.clone(),
            path: skeleton.path(),
            category: skeleton.category,
            constructor: ConstructorKind::from(&skeleton.constructor),
            generated: true,
        })?;
        records.push(skeleton);
    }

    for doc in document.serializable {
        let path = doc.path.unwrap_or_else(|| doc.name.clone());
        types.add_record(KnownRecord {
            name: doc.name,
            path,
            category: doc.category,
            constructor: ConstructorKind::from(&constructor_shape(&doc.constructor)),
            generated: false,
        })?;
    }

    for doc in document.enums {
        let repr = PrimitiveKind::from_name(&doc.repr)
            .filter(|kind| kind.is_integer())
            .ok_or_else(|| CompilerError::InvalidEnumRepr {
                name: doc.name.clone(),
                repr: doc.repr.clone(),
            })?;
        let path = doc.path.unwrap_or_else(|| doc.name.clone());
        types.add_enum(KnownEnum {
            name: doc.name,
            path,
            repr,
        })?;
    }

    for doc in document.codecs {
        types.add_codec(ExternalCodec {
            type_name: doc.type_name,
            serialize: doc.serialize,
            deserialize: doc.deserialize,
        })?;
    }

    tracing::debug!(
        source = %source.display(),
        records = records.len(),
        "schema loaded"
    );

    Ok(Schema {
        records,
        types,
        options: document.options,
        source: PathBuf::from(source),
    })
}

fn build_record(doc: &RecordDoc, source: &Path) -> Result<RecordSkeleton, CompilerError> {
    let location = SchemaLocation::new(source).record(&doc.name);

    let mut members = Vec::with_capacity(doc.members.len());
    for member in &doc.members {
        let ty = parse_type_expr(&member.type_text, &location.clone().member(&member.name))?;
        members.push(MemberSkeleton {
            name: member.name.clone(),
            ty,
            type_text: member.type_text.clone(),
            access: member.access,
            read_only: member.read_only,
            limit: member.limit,
            skip: member.skip,
        });
    }

    Ok(RecordSkeleton {
        name: doc.name.clone(),
        namespace: split_namespace(&doc.namespace),
        enclosing: doc
            .enclosing
            .iter()
            .map(|e| EnclosingType {
                name: e.name.clone(),
                category: e.category,
            })
            .collect(),
        category: doc.category,
        constructor: constructor_shape(&doc.constructor),
        base: doc.base.as_ref().map(|b| BaseRecord {
            field: b.field.clone(),
            type_name: b.type_name.clone(),
        }),
        sealed: doc.sealed,
        members,
    })
}
