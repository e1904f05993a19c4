//! Compiler configuration.

use std::path::PathBuf;

use serde::Deserialize;

/// Settings that shape the generated code.
///
/// A schema may carry these under its `options` key. Any field left out
/// keeps its default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Path the generated code uses to reach the runtime crate.
    pub runtime_path: String,

    /// Spaces per indentation level.
    pub indent_width: usize,

    /// Deepest composite nesting accepted before resolution fails.
    pub max_depth: usize,

    /// Emit a do-not-edit banner at the top of generated output.
    pub header: bool,

    /// Put `#[allow(..)]` on generated impls for lints that expanded code trips.
    pub allow_lints: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            runtime_path: "::bundle_runtime".to_string(),
            indent_width: 4,
            max_depth: 32,
            header: true,
            allow_lints: true,
        }
    }
}

impl GeneratorConfig {
    /// Applies command-line overrides on top of this configuration.
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(path) = &overrides.runtime_path {
            self.runtime_path = path.clone();
        }
        if let Some(width) = overrides.indent_width {
            self.indent_width = width;
        }
        if let Some(depth) = overrides.max_depth {
            self.max_depth = depth;
        }
        if let Some(header) = overrides.header {
            self.header = header;
        }
        self
    }
}

/// Optional overrides, typically from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub runtime_path: Option<String>,
    pub indent_width: Option<usize>,
    pub max_depth: Option<usize>,
    pub header: Option<bool>,
}

/// Configuration for one compiler invocation.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Schema file, or a directory of schema files.
    pub schema: PathBuf,

    /// Output file, or output directory when `split` is set.
    pub out: PathBuf,

    /// Write one file per record plus a `mod.rs` instead of a single file.
    pub split: bool,

    /// Schema format (default: "json").
    pub format: String,

    pub overrides: ConfigOverrides,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            schema: PathBuf::from("bundles.json"),
            out: PathBuf::from("src/generated/bundles.rs"),
            split: false,
            format: "json".to_string(),
            overrides: ConfigOverrides::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_options_keep_defaults() {
        let config: GeneratorConfig =
            serde_json::from_str(r#"{ "runtime_path": "crate::rt", "max_depth": 8 }"#).unwrap();
        assert_eq!(config.runtime_path, "crate::rt");
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.indent_width, 4);
        assert!(config.header);
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        let result: Result<GeneratorConfig, _> = serde_json::from_str(r#"{ "indent": 2 }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_win() {
        let overrides = ConfigOverrides {
            header: Some(false),
            indent_width: Some(2),
            ..Default::default()
        };
        let config = GeneratorConfig::default().with_overrides(&overrides);
        assert!(!config.header);
        assert_eq!(config.indent_width, 2);
        assert_eq!(config.runtime_path, "::bundle_runtime");
    }
}
