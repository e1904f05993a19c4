//! Generates the bundle impls for `src/model.rs` from `schema/`.

use std::env;
use std::path::Path;

use bundle_compiler::{Compiler, CompilerConfig};

fn main() {
    println!("cargo::rerun-if-changed=build.rs");
    println!("cargo::rerun-if-changed=schema");

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let config = CompilerConfig {
        schema: Path::new("schema").to_path_buf(),
        out: Path::new(&out_dir).join("generated.rs"),
        ..CompilerConfig::default()
    };

    let result = Compiler::new(config)
        .compile()
        .unwrap_or_else(|e| panic!("bundle generation failed: {e}"));

    for skipped in &result.report.skipped {
        println!(
            "cargo::warning={}.{} ({}) is not serialized: {}",
            skipped.record, skipped.member, skipped.type_name, skipped.reason
        );
    }
}
