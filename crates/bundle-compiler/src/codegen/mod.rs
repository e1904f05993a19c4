//! Rust code generation from resolved records.
//!
//! The generator only writes trait impls. The record types themselves, the
//! enums and any external codec functions live in user code and are
//! referred to by path.

mod record;

use std::collections::HashSet;

use crate::code_builder::CodeBuilder;
use crate::config::GeneratorConfig;
use crate::diagnostic::CompilerError;
use crate::emit::EmitterRegistry;
use crate::ir::{RecordDescriptor, Schema};
use crate::resolve::{ResolutionReport, ShapeRegistry};

/// First line of every generated file.
pub const BANNER: &str = "// @generated by bundlegen. Do not edit.";

/// Generated code for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedRecord {
    pub name: String,
    pub path: String,
    pub code: String,
}

/// Output of one generator run.
#[derive(Debug, Clone, Default)]
pub struct GeneratedCode {
    pub records: Vec<GeneratedRecord>,
    /// Members left out of serialization.
    pub report: ResolutionReport,
    header: bool,
}

impl GeneratedCode {
    /// All records in one file.
    pub fn combined(&self) -> String {
        let mut out = String::new();
        if self.header {
            out.push_str(BANNER);
            out.push_str("\n\n");
        }
        for (i, record) in self.records.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&record.code);
        }
        out
    }

    /// One file per record plus a `mod.rs` that includes them all.
    ///
    /// Returns `(filename, content)` pairs.
    pub fn files(&self) -> Vec<(String, String)> {
        let mut files = Vec::with_capacity(self.records.len() + 1);
        let mut index = String::new();
        if self.header {
            index.push_str(BANNER);
            index.push_str("\n\n");
        }
        for record in &self.records {
            let filename = format!("{}.rs", file_stem(&record.path));
            index.push_str(&format!("include!(\"{}\");\n", filename));

            let mut content = String::new();
            if self.header {
                content.push_str(BANNER);
                content.push_str("\n\n");
            }
            content.push_str(&record.code);
            files.push((filename, content));
        }
        files.push(("mod.rs".to_string(), index));
        files
    }
}

/// Lowercase, underscore-separated file stem for a record path.
fn file_stem(path: &str) -> String {
    let mut stem = String::new();
    let segments = path.split("::").filter(|s| !s.is_empty() && *s != "crate");
    for (i, segment) in segments.enumerate() {
        if i > 0 {
            stem.push('_');
        }
        for (j, c) in segment.trim_start_matches("r#").chars().enumerate() {
            if c.is_uppercase() {
                if j > 0 && !stem.ends_with('_') {
                    stem.push('_');
                }
                stem.extend(c.to_lowercase());
            } else {
                stem.push(c);
            }
        }
    }
    stem
}

/// Resolves and emits every record of a schema.
pub struct Generator {
    config: GeneratorConfig,
    shapes: ShapeRegistry,
    emitters: EmitterRegistry,
}

impl Generator {
    /// A generator with the built-in matchers and emitters.
    pub fn new(config: GeneratorConfig) -> Self {
        let emitters = EmitterRegistry::with_defaults(config.runtime_path.clone(), config.indent_width);
        Self {
            config,
            shapes: ShapeRegistry::with_defaults(),
            emitters,
        }
    }

    /// A generator with caller-supplied registries.
    pub fn with_registries(
        config: GeneratorConfig,
        shapes: ShapeRegistry,
        emitters: EmitterRegistry,
    ) -> Self {
        Self {
            config,
            shapes,
            emitters,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Resolves every record without emitting code.
    ///
    /// Fails with every record-level error found, not just the first.
    #[tracing::instrument(level = "debug", skip_all, fields(records = schema.records.len()))]
    pub fn resolve(
        &self,
        schema: &Schema,
    ) -> Result<(Vec<RecordDescriptor>, ResolutionReport), CompilerError> {
        let mut failures = Vec::new();
        let mut seen = HashSet::new();
        for skeleton in &schema.records {
            if !seen.insert(skeleton.path()) {
                failures.push(CompilerError::DuplicateType {
                    name: skeleton.path(),
                });
            }
        }

        let mut report = ResolutionReport::default();
        let mut descriptors = Vec::with_capacity(schema.records.len());
        for skeleton in &schema.records {
            let mut record_report = ResolutionReport::default();
            match self
                .shapes
                .resolve_members(skeleton, &schema.types, &self.config, &mut record_report)
            {
                Ok(descriptor) => {
                    report.merge(record_report);
                    descriptors.push(descriptor);
                }
                Err(err) => {
                    tracing::debug!(record = %skeleton.name, error = %err, "record failed to resolve");
                    failures.push(err);
                }
            }
        }

        match CompilerError::from_failures(failures) {
            Some(err) => Err(err),
            None => Ok((descriptors, report)),
        }
    }

    /// Resolves and emits every record.
    ///
    /// A record either generates completely or not at all; any failure
    /// fails the run.
    #[tracing::instrument(level = "debug", skip_all, fields(records = schema.records.len()))]
    pub fn generate(&self, schema: &Schema) -> Result<GeneratedCode, CompilerError> {
        let (descriptors, report) = self.resolve(schema)?;

        let mut failures = Vec::new();
        let mut records = Vec::with_capacity(descriptors.len());
        for descriptor in &descriptors {
            match record::emit_record(descriptor, &schema.types, &self.config, &self.emitters) {
                Ok(code) => {
                    tracing::debug!(record = %descriptor.name, bytes = code.len(), "record generated");
                    records.push(GeneratedRecord {
                        name: descriptor.name.clone(),
                        path: descriptor.path(),
                        code,
                    });
                }
                Err(err) => failures.push(err),
            }
        }

        if let Some(err) = CompilerError::from_failures(failures) {
            return Err(err);
        }
        Ok(GeneratedCode {
            records,
            report,
            header: self.config.header,
        })
    }

    /// Human-readable outline of a resolved record's members.
    pub fn describe(&self, descriptor: &RecordDescriptor) -> String {
        let mut out = CodeBuilder::new(self.config.indent_width);
        let constructor = match &descriptor.constructor {
            crate::ir::ConstructorShape::None => "none".to_string(),
            crate::ir::ConstructorShape::Default => "default".to_string(),
            crate::ir::ConstructorShape::AllFields { function, .. } => format!("all_fields({})", function),
        };
        out.open(format!("record {} [constructor: {}]", descriptor.path(), constructor));
        if let Some(base) = &descriptor.base {
            out.line(format!("base: {} <- self.{}", base.type_name, base.field));
        }
        for member in &descriptor.members {
            member.node.describe(&member.name, &mut out);
        }
        out.close();
        out.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stems() {
        assert_eq!(file_stem("crate::model::Player"), "model_player");
        assert_eq!(file_stem("crate::model::HttpRequest"), "model_http_request");
        assert_eq!(file_stem("Root"), "root");
        assert_eq!(file_stem("crate::r#type::Kind"), "type_kind");
    }

    #[test]
    fn test_split_files_include_every_record() {
        let generated = GeneratedCode {
            records: vec![
                GeneratedRecord {
                    name: "A".to_string(),
                    path: "crate::A".to_string(),
                    code: "// a\n".to_string(),
                },
                GeneratedRecord {
                    name: "B".to_string(),
                    path: "crate::B".to_string(),
                    code: "// b\n".to_string(),
                },
            ],
            report: ResolutionReport::default(),
            header: true,
        };

        let files = generated.files();
        assert_eq!(files.len(), 3);
        assert_eq!(files[0].0, "a.rs");
        assert!(files[0].1.starts_with(BANNER));
        assert_eq!(files[2].0, "mod.rs");
        assert!(files[2].1.ends_with("include!(\"a.rs\");\ninclude!(\"b.rs\");\n"));

        assert_eq!(generated.combined(), format!("{}\n\n// a\n\n// b\n", BANNER));
    }

    #[test]
    fn test_custom_registries() {
        use crate::emit::PrimitiveEmitter;
        use crate::frontend::json::JsonFrontend;
        use crate::frontend::Frontend;

        let schema = JsonFrontend::new()
            .parse_str(
                r#"{ "records": [
                    { "name": "Flat", "members": [ { "name": "a", "type": "u8" } ] },
                    { "name": "Deep", "members": [ { "name": "b", "type": "Vec<u8>" } ] }
                ] }"#,
                std::path::Path::new("custom.json"),
            )
            .unwrap();

        let mut emitters = EmitterRegistry::empty("crate::rt", 2);
        emitters.register(PrimitiveEmitter);
        let generator =
            Generator::with_registries(GeneratorConfig::default(), ShapeRegistry::with_defaults(), emitters);

        let err = generator.generate(&schema).unwrap_err();
        assert!(matches!(err, CompilerError::MissingEmitter { ref kind } if kind == "list"));
    }
}
