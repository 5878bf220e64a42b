use weave_decl::{PackageDecl, PackageId};
use weave_driver::{Backend, BackendDescriptor, CompileError, CompilerContext};
use weave_output::{CSourceWriter, OutputWriter};

use super::analyses::{GlobFuncAbiInfo, PackageAbiInfo};

/// Emits `temp/<pkg>.abi.c`: a weak definition of every exported symbol
/// that aborts when called. A real implementation overrides it at link time.
pub struct AbiSourceBackend;

impl AbiSourceBackend {
    /// Registry name.
    pub const NAME: &'static str = "abi-source";

    /// Registry entry.
    pub fn descriptor() -> BackendDescriptor {
        BackendDescriptor::new(Self::NAME, |opts| {
            opts.expect_only(&[])?;
            Ok(Box::new(AbiSourceBackend))
        })
        .requires(&["abi-header"])
        .summary("weak fallback definitions of the C ABI")
    }

    fn gen_package(
        ctx: &CompilerContext<'_>,
        id: PackageId,
        pkg: &PackageDecl,
    ) -> Result<(), CompileError> {
        let am = ctx.analyses();
        let info = am.get::<PackageAbiInfo>(&id)?;
        ctx.outputs()
            .write::<CSourceWriter, _, CompileError>(&format!("temp/{}", info.source), |w| {
                w.add_include(&info.header);
                for &fid in &pkg.functions {
                    let func = am.get::<GlobFuncAbiInfo>(&fid)?;
                    let name = format!("{}.{}", pkg.name, ctx.package_group().function(fid).name);
                    w.indented(&format!("WEAVE_WEAK {} {{", func.prototype()), "}", |w| {
                        for (_, param) in &func.params {
                            w.writeln(&format!("(void){param};"));
                        }
                        w.writeln(&format!("WEAVE_UNIMPLEMENTED(\"{name}\");"));
                    });
                }
                Ok(())
            })
    }
}

impl Backend for AbiSourceBackend {
    fn generate(&mut self, ctx: &CompilerContext<'_>) -> Result<(), CompileError> {
        for (id, pkg) in ctx.package_group().packages() {
            Self::gen_package(ctx, id, pkg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::testing::{run, sample};

    #[test]
    fn weak_stubs() {
        let out = run(&["abi-source"], sample());
        assert_eq!(
            out["temp/geo.abi.c"],
            "// Generated by weave. Do not edit.
#include \"geo.abi.h\"

WEAVE_WEAK double _weave_3geo4area_f(struct _weave_3geo5Point_t const* p) {
    (void)p;
    WEAVE_UNIMPLEMENTED(\"geo.area\");
}
WEAVE_WEAK struct WOptional _weave_3geo4tint_f(int32_t c, struct WString name) {
    (void)c;
    (void)name;
    WEAVE_UNIMPLEMENTED(\"geo.tint\");
}
WEAVE_WEAK void _weave_3geo5reset_f(void) {
    WEAVE_UNIMPLEMENTED(\"geo.reset\");
}
"
        );
    }

    #[test]
    fn pulls_in_the_header_backend() {
        let out = run(&["abi-source"], sample());
        assert!(out.contains_key("include/geo.abi.h"));
    }
}
