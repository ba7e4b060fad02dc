//! Arguments for the disassembly, IR and AST variants

use crate::client::Purpose;
use crate::error::{Error, Result};

/// Flag a compiler needs to produce the variant's output
fn variant_flag(purpose: Purpose, compiler: &str) -> Option<&'static str> {
    let dmd = compiler.contains("dmd");
    let ldc = compiler.contains("ldc");
    match purpose {
        Purpose::Asm if dmd => Some("-asm"),
        Purpose::Asm if ldc => Some("-output-s"),
        Purpose::Ir if ldc => Some("-output-ll"),
        Purpose::Ast => Some("-vcg-ast"),
        _ => None,
    }
}

fn variant_label(purpose: Purpose) -> &'static str {
    match purpose {
        Purpose::Asm => "ASM",
        Purpose::Ir => "IR",
        Purpose::Ast => "AST",
        _ => "this",
    }
}

/// Arguments for `purpose`, appending its flag when not already present
pub fn variant_args(purpose: Purpose, compiler: &str, args: &str) -> Result<String> {
    let Some(flag) = variant_flag(purpose, compiler) else {
        return Err(Error::UnsupportedVariant {
            compiler: compiler.to_string(),
            variant: variant_label(purpose).to_string(),
        });
    };
    if args.split_whitespace().any(|a| a == flag) {
        return Ok(args.to_string());
    }
    let args = args.trim_end();
    if args.is_empty() {
        Ok(flag.to_string())
    } else {
        Ok(format!("{} {}", args, flag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asm_flags_per_compiler() {
        assert_eq!(variant_args(Purpose::Asm, "dmd", "").unwrap(), "-asm");
        assert_eq!(variant_args(Purpose::Asm, "dmd-nightly", "-O").unwrap(), "-O -asm");
        assert_eq!(variant_args(Purpose::Asm, "ldc", "").unwrap(), "-output-s");
    }

    #[test]
    fn test_ir_only_on_ldc() {
        assert_eq!(variant_args(Purpose::Ir, "ldc-beta", "").unwrap(), "-output-ll");
        let err = variant_args(Purpose::Ir, "dmd", "").unwrap_err();
        assert_eq!(err.to_string(), "dmd doesn't support IR output");
    }

    #[test]
    fn test_ast_on_any_compiler() {
        assert_eq!(variant_args(Purpose::Ast, "gdc", "-g").unwrap(), "-g -vcg-ast");
    }

    #[test]
    fn test_unknown_compiler_has_no_asm() {
        let err = variant_args(Purpose::Asm, "gdc", "").unwrap_err();
        assert_eq!(err.to_string(), "gdc doesn't support ASM output");
    }

    #[test]
    fn test_compiler_family_matched_anywhere_in_id() {
        assert_eq!(variant_args(Purpose::Asm, "nightly-dmd", "").unwrap(), "-asm");
        assert_eq!(variant_args(Purpose::Ir, "beta-ldc2", "").unwrap(), "-output-ll");
    }

    #[test]
    fn test_flag_not_duplicated() {
        assert_eq!(variant_args(Purpose::Asm, "dmd", "-asm -O").unwrap(), "-asm -O");
    }
}
