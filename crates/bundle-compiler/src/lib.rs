//! # Bundle Compiler
//!
//! Generates binary serialize/deserialize code for Rust records described
//! by a schema. The generated code implements the `bundle-runtime` traits
//! and is meant to be pulled into the crate that defines the records,
//! usually with `include!` from a build script's `OUT_DIR`.
//!
//! ## Architecture
//!
//! ```text
//! Schema (JSON)
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Frontend   │  Records, members and type expressions
//! │ (JSON → IR)  │
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Resolve    │  Ordered shape matchers build an IR node per member
//! │ (shape → IR) │
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │     Emit     │  Serialize, deserialize and construct fragments
//! │ (IR → code)  │
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Codegen    │  One impl block set per record
//! │ (→ Rust)     │
//! └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bundle_compiler::{Compiler, CompilerConfig};
//!
//! let config = CompilerConfig {
//!     schema: "schema/bundles.json".into(),
//!     out: "src/generated/bundles.rs".into(),
//!     ..CompilerConfig::default()
//! };
//!
//! let result = Compiler::new(config).compile()?;
//! println!("{} records generated", result.records);
//! ```

pub mod code_builder;
pub mod codegen;
pub mod config;
pub mod diagnostic;
pub mod emit;
pub mod frontend;
pub mod ir;
pub mod resolve;

use std::path::{Path, PathBuf};

pub use codegen::{GeneratedCode, Generator};
pub use config::{CompilerConfig, ConfigOverrides, GeneratorConfig};
pub use diagnostic::CompilerError;
pub use resolve::ResolutionReport;

/// The main compiler struct that runs the pipeline for one schema.
pub struct Compiler {
    config: CompilerConfig,
}

/// Result of a successful compilation.
#[derive(Debug)]
pub struct CompileResult {
    pub records: usize,
    /// Members left out of serialization.
    pub report: ResolutionReport,
    /// Files written.
    pub files: Vec<PathBuf>,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Loads the configured schema file or directory.
    pub fn load_schema(&self) -> Result<ir::Schema, CompilerError> {
        let frontend = frontend::create_frontend(&self.config.format)?;
        frontend.parse_path(&self.config.schema)
    }

    /// Generator settings: schema options first, then command-line overrides.
    pub fn generator_config(&self, schema: &ir::Schema) -> GeneratorConfig {
        schema
            .options
            .clone()
            .unwrap_or_default()
            .with_overrides(&self.config.overrides)
    }

    /// Generates code in memory without writing anything.
    pub fn generate(&self) -> Result<GeneratedCode, CompilerError> {
        let schema = self.load_schema()?;
        Generator::new(self.generator_config(&schema)).generate(&schema)
    }

    /// Compiles the schema and writes the output.
    ///
    /// This runs the full pipeline:
    /// 1. Parse the schema
    /// 2. Resolve every record member
    /// 3. Emit code per record
    /// 4. Write one combined file, or one file per record plus `mod.rs`
    #[tracing::instrument(level = "info", skip_all, fields(schema = %self.config.schema.display()))]
    pub fn compile(&self) -> Result<CompileResult, CompilerError> {
        let generated = self.generate()?;
        let files = self.write_output(&generated)?;
        tracing::info!(records = generated.records.len(), files = files.len(), "code generated");
        Ok(CompileResult {
            records: generated.records.len(),
            report: generated.report,
            files,
        })
    }

    /// Resolves every record without generating code.
    pub fn check(&self) -> Result<ResolutionReport, CompilerError> {
        let schema = self.load_schema()?;
        let (_, report) = Generator::new(self.generator_config(&schema)).resolve(&schema)?;
        Ok(report)
    }

    /// Outlines the resolved IR of one record, or of all of them.
    pub fn inspect(&self, record: Option<&str>) -> Result<String, CompilerError> {
        let schema = self.load_schema()?;
        let generator = Generator::new(self.generator_config(&schema));
        let (descriptors, _) = generator.resolve(&schema)?;

        let selected: Vec<_> = match record {
            Some(name) => {
                let found: Vec<_> = descriptors
                    .iter()
                    .filter(|d| d.name == name || d.path() == name)
                    .collect();
                if found.is_empty() {
                    return Err(CompilerError::UnknownRecord {
                        name: name.to_string(),
                    });
                }
                found
            }
            None => descriptors.iter().collect(),
        };

        Ok(selected
            .into_iter()
            .map(|d| generator.describe(d))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    /// Writes generated code to the configured output.
    fn write_output(&self, generated: &GeneratedCode) -> Result<Vec<PathBuf>, CompilerError> {
        let out = &self.config.out;
        if !self.config.split {
            if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                create_dir(parent)?;
            }
            write_file(out, &generated.combined())?;
            return Ok(vec![out.clone()]);
        }

        create_dir(out)?;
        let mut written = Vec::new();
        for (filename, content) in generated.files() {
            let path = out.join(filename);
            write_file(&path, &content)?;
            written.push(path);
        }
        Ok(written)
    }
}

fn create_dir(path: &Path) -> Result<(), CompilerError> {
    std::fs::create_dir_all(path).map_err(|e| CompilerError::WriteError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn write_file(path: &Path, content: &str) -> Result<(), CompilerError> {
    std::fs::write(path, content).map_err(|e| CompilerError::WriteError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
