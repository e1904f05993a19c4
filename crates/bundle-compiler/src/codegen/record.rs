//! Trait impls for one resolved record.

use crate::code_builder::CodeBuilder;
use crate::config::GeneratorConfig;
use crate::diagnostic::CompilerError;
use crate::emit::{declare_local, EmitContext, EmitterRegistry};
use crate::ir::{ConstructorShape, RecordDescriptor, TypeTable};
use crate::resolve::naming::constructor_local;

/// Emits `BundleSerializable` and, unless the record has no constructor,
/// `BundleConstruct` for `record`.
pub(crate) fn emit_record(
    record: &RecordDescriptor,
    types: &TypeTable,
    config: &GeneratorConfig,
    emitters: &EmitterRegistry,
) -> Result<String, CompilerError> {
    let rt = emitters.runtime();
    let path = record.path();
    let mut out = CodeBuilder::new(config.indent_width);

    let base = record
        .base
        .as_ref()
        .map(|b| (b.field.as_str(), types.render_named(&b.type_name).to_string()));

    impl_attributes(&mut out, config);
    out.open(format!("impl {}::BundleSerializable for {}", rt, path));

    // serialize
    method_attributes(&mut out, record);
    out.open(format!(
        "fn serialize<W: {rt}::BundleWrite>(&self, writer: &mut W) -> ::core::result::Result<(), {rt}::BundleError>"
    ));
    if let Some((field, base_path)) = &base {
        out.line(format!(
            "<{} as {}::BundleSerializable>::serialize(&self.{}, writer)?;",
            base_path, rt, field
        ));
    }
    for member in &record.members {
        emitters.serialize(&member.node, EmitContext::record_member(), &mut out)?;
    }
    out.line("::core::result::Result::Ok(())");
    out.close();
    out.blank();

    // deserialize
    method_attributes(&mut out, record);
    out.open(format!(
        "fn deserialize<R: {rt}::BundleRead>(&mut self, reader: &mut R) -> ::core::result::Result<(), {rt}::BundleError>"
    ));
    if let ConstructorShape::AllFields { .. } = record.constructor {
        out.line(format!(
            "*self = <Self as {}::BundleConstruct>::construct_from_reader(reader)?;",
            rt
        ));
    } else {
        if let Some((field, base_path)) = &base {
            out.line(format!(
                "<{} as {}::BundleSerializable>::deserialize(&mut self.{}, reader)?;",
                base_path, rt, field
            ));
        }
        for member in &record.members {
            emitters.deserialize(&member.node, EmitContext::record_member(), &mut out)?;
        }
    }
    out.line("::core::result::Result::Ok(())");
    out.close();
    out.close();

    if !record.constructor.is_constructible() {
        return Ok(out.finish());
    }

    // construct
    out.blank();
    impl_attributes(&mut out, config);
    out.open(format!("impl {}::BundleConstruct for {}", rt, path));
    method_attributes(&mut out, record);
    out.open(format!(
        "fn construct_from_reader<R: {rt}::BundleRead>(reader: &mut R) -> ::core::result::Result<Self, {rt}::BundleError>"
    ));
    match &record.constructor {
        ConstructorShape::AllFields { function, params } => {
            if let Some((field, base_path)) = &base {
                out.line(format!(
                    "let {} = <{} as {}::BundleConstruct>::construct_from_reader(reader)?;",
                    constructor_local(field),
                    base_path,
                    rt
                ));
            }
            for member in &record.members {
                let Some(node) = &member.construct_node else {
                    continue;
                };
                declare_local(&mut out, node.place().read(), &member.type_name, node);
                emitters.construct(node, EmitContext::record_member(), &mut out)?;
            }
            let args: Vec<String> = params.iter().map(|p| constructor_local(p)).collect();
            out.line(format!(
                "::core::result::Result::Ok(Self::{}({}))",
                function,
                args.join(", ")
            ));
        }
        _ => {
            out.line("let mut value = <Self as ::core::default::Default>::default();");
            out.line(format!(
                "<Self as {}::BundleSerializable>::deserialize(&mut value, reader)?;",
                rt
            ));
            out.line("::core::result::Result::Ok(value)");
        }
    }
    out.close();
    out.close();

    Ok(out.finish())
}

fn impl_attributes(out: &mut CodeBuilder, config: &GeneratorConfig) {
    if config.allow_lints {
        out.line("#[automatically_derived]");
        out.line("#[allow(unused_mut, unused_variables, unused_assignments, clippy::all)]");
    }
}

fn method_attributes(out: &mut CodeBuilder, record: &RecordDescriptor) {
    if record.sealed {
        out.line("#[inline]");
    }
}
