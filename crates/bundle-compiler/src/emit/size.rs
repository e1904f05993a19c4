//! Collection counts with optional limits.
//!
//! Counts go over the wire as a single byte when the member's limit fits in
//! one, and as a 1 to 4 byte varint otherwise.

use crate::code_builder::CodeBuilder;
use crate::ir::{LimitDirective, LimitPolicy};

/// Declares `size_var` from `len_expr`, applies the write-side limit and
/// writes the count.
pub(crate) fn write_size(
    out: &mut CodeBuilder,
    runtime: &str,
    size_var: &str,
    len_expr: &str,
    limit: Option<LimitDirective>,
) {
    let clamps = matches!(limit, Some(LimitDirective { policy: LimitPolicy::Clamp, .. }));
    let binding = if clamps { "let mut" } else { "let" };
    out.line(format!("{} {} = {};", binding, size_var, len_expr));

    if let Some(limit) = limit {
        out.block(format!("if {} > {}", size_var, limit.max), |out| match limit.policy {
            LimitPolicy::Throw => out.line(format!(
                "return ::core::result::Result::Err({}::BundleError::limit_exceeded({}, {}));",
                runtime, size_var, limit.max
            )),
            LimitPolicy::Clamp => out.line(format!("{} = {};", size_var, limit.max)),
        });
    }

    if limit.is_some_and(|l| l.fits_in_byte()) {
        out.line(format!("writer.write_u8({} as u8)?;", size_var));
    } else {
        out.line(format!("{}::write_collection_size(writer, {})?;", runtime, size_var));
    }
}

/// Reads a count into `size_var`. An over-limit count always fails.
pub(crate) fn read_size(
    out: &mut CodeBuilder,
    runtime: &str,
    size_var: &str,
    limit: Option<LimitDirective>,
) {
    if limit.is_some_and(|l| l.fits_in_byte()) {
        out.line(format!("let {} = usize::from(reader.read_u8()?);", size_var));
    } else {
        out.line(format!("let {} = {}::read_collection_size(reader)?;", size_var, runtime));
    }

    if let Some(limit) = limit {
        out.block(format!("if {} > {}", size_var, limit.max), |out| {
            out.line(format!(
                "return ::core::result::Result::Err({}::BundleError::limit_exceeded({}, {}));",
                runtime, size_var, limit.max
            ))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(limit: Option<LimitDirective>) -> String {
        let mut out = CodeBuilder::new(4);
        write_size(&mut out, "::rt", "size", "self.items.len()", limit);
        out.finish()
    }

    #[test]
    fn test_unlimited_count_is_varint() {
        assert_eq!(
            written(None),
            "let size = self.items.len();\n::rt::write_collection_size(writer, size)?;\n"
        );
    }

    #[test]
    fn test_clamp_under_a_byte() {
        assert_eq!(
            written(Some(LimitDirective::new(5, LimitPolicy::Clamp))),
            "let mut size = self.items.len();\n\
             if size > 5 {\n    size = 5;\n}\n\
             writer.write_u8(size as u8)?;\n"
        );
    }

    #[test]
    fn test_throw_over_a_byte_uses_varint() {
        let code = written(Some(LimitDirective::new(1000, LimitPolicy::Throw)));
        assert!(code.starts_with("let size = self.items.len();\n"));
        assert!(code.contains("return ::core::result::Result::Err(::rt::BundleError::limit_exceeded(size, 1000));"));
        assert!(code.ends_with("::rt::write_collection_size(writer, size)?;\n"));
    }

    #[test]
    fn test_read_side_always_fails_over_limit() {
        let mut out = CodeBuilder::new(4);
        read_size(&mut out, "::rt", "size1", Some(LimitDirective::new(5, LimitPolicy::Clamp)));
        assert_eq!(
            out.finish(),
            "let size1 = usize::from(reader.read_u8()?);\n\
             if size1 > 5 {\n    \
             return ::core::result::Result::Err(::rt::BundleError::limit_exceeded(size1, 5));\n}\n"
        );

        let mut out = CodeBuilder::new(4);
        read_size(&mut out, "::rt", "size", None);
        assert_eq!(out.finish(), "let size = ::rt::read_collection_size(reader)?;\n");
    }
}
