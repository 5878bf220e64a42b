//! Glue for implementing a package in C.
//!
//! `include/<pkg>.impl.h` defines one `WEAVE_EXPORT_C_API_<name>` macro per
//! function; invoking it with an implementation function defines the
//! exported ABI symbol as a call to that function. `temp/<pkg>.impl.c` is a
//! starting point that implements everything with `abort()`.

use weave_analysis::{Analysis, AnalysisError, AnalysisManager};
use weave_decl::{FuncId, PackageDecl, PackageId};
use weave_driver::{Backend, BackendDescriptor, CompileError, CompilerContext};
use weave_output::{CHeaderWriter, CSourceWriter, OutputWriter};

use crate::abi::{GlobFuncAbiInfo, PackageAbiInfo};

/// File names of a package's C implementation glue.
#[derive(Debug)]
pub struct PackageCImplInfo {
    /// `<pkg>.impl.h`
    pub header: String,
    /// `<pkg>.impl.c`
    pub source: String,
}

impl Analysis for PackageCImplInfo {
    type Key = PackageId;

    fn create(am: &AnalysisManager, key: &PackageId) -> Result<Self, AnalysisError> {
        let pkg = am.package_group().package(*key);
        Ok(Self {
            header: format!("{}.impl.h", pkg.name),
            source: format!("{}.impl.c", pkg.name),
        })
    }
}

/// Names used to bind one function to its C implementation.
#[derive(Debug)]
pub struct GlobFuncCImplInfo {
    /// The export macro.
    pub macro_name: String,
    /// The implementation function in the template.
    pub impl_name: String,
}

impl Analysis for GlobFuncCImplInfo {
    type Key = FuncId;

    fn create(am: &AnalysisManager, key: &FuncId) -> Result<Self, AnalysisError> {
        let func = am.package_group().function(*key);
        Ok(Self {
            macro_name: format!("WEAVE_EXPORT_C_API_{}", func.name),
            impl_name: format!("{}_impl", func.name),
        })
    }
}

/// The `c-impl` backend.
pub struct CImplBackend;

impl CImplBackend {
    /// Registry name.
    pub const NAME: &'static str = "c-impl";

    /// Registry entry.
    pub fn descriptor() -> BackendDescriptor {
        BackendDescriptor::new(Self::NAME, |opts| {
            opts.expect_only(&[])?;
            Ok(Box::new(CImplBackend))
        })
        .requires(&["abi-header"])
        .summary("export macros and a template for C implementations")
    }

    fn gen_header(
        ctx: &CompilerContext<'_>,
        id: PackageId,
        pkg: &PackageDecl,
    ) -> Result<(), CompileError> {
        let am = ctx.analyses();
        let abi = am.get::<PackageAbiInfo>(&id)?;
        let info = am.get::<PackageCImplInfo>(&id)?;
        ctx.outputs()
            .write::<CHeaderWriter, _, CompileError>(&format!("include/{}", info.header), |w| {
                w.add_include(&abi.header);
                for &fid in &pkg.functions {
                    let func = am.get::<GlobFuncAbiInfo>(&fid)?;
                    let glue = am.get::<GlobFuncCImplInfo>(&fid)?;
                    let call = format!("CImpl({})", func.arg_list());
                    let call = if func.returns_void() {
                        format!("{call};")
                    } else {
                        format!("return {call};")
                    };
                    w.writelns([
                        format!("#define {}(CImpl) \\", glue.macro_name),
                        format!("    {} {{ \\", func.prototype()),
                        format!("        {call} \\"),
                        "    }".to_string(),
                    ]);
                }
                Ok(())
            })
    }

    fn gen_template(
        ctx: &CompilerContext<'_>,
        id: PackageId,
        pkg: &PackageDecl,
    ) -> Result<(), CompileError> {
        let am = ctx.analyses();
        let info = am.get::<PackageCImplInfo>(&id)?;
        ctx.outputs()
            .write::<CSourceWriter, _, CompileError>(&format!("temp/{}", info.source), |w| {
                w.add_include("<stdlib.h>");
                w.add_include(&info.header);
                let mut invocations = Vec::new();
                for &fid in &pkg.functions {
                    let func = am.get::<GlobFuncAbiInfo>(&fid)?;
                    let glue = am.get::<GlobFuncCImplInfo>(&fid)?;
                    let open = format!("static {} {{", func.prototype_named(&glue.impl_name));
                    w.indented(&open, "}", |w| {
                        for (_, param) in &func.params {
                            w.writeln(&format!("(void){param};"));
                        }
                        w.writeln("abort();");
                    });
                    invocations.push(format!("{}({})", glue.macro_name, glue.impl_name));
                }
                if !invocations.is_empty() {
                    w.newline();
                    w.writelns(&invocations);
                }
                Ok(())
            })
    }
}

impl Backend for CImplBackend {
    fn generate(&mut self, ctx: &CompilerContext<'_>) -> Result<(), CompileError> {
        for (id, pkg) in ctx.package_group().packages() {
            Self::gen_header(ctx, id, pkg)?;
            Self::gen_template(ctx, id, pkg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::testing::{run, sample};

    #[test]
    fn export_macros() {
        let out = run(&["c-impl"], sample());
        let header = &out["include/geo.impl.h"];
        assert!(header.contains("#include \"geo.abi.h\""));
        assert!(header.contains(
            "#define WEAVE_EXPORT_C_API_area(CImpl) \\
    double _weave_3geo4area_f(struct _weave_3geo5Point_t const* p) { \\
        return CImpl(p); \\
    }"
        ));
        assert!(header.contains(
            "    void _weave_3geo5reset_f(void) { \\
        CImpl(); \\"
        ));
    }

    #[test]
    fn template() {
        let out = run(&["c-impl"], sample());
        assert_eq!(
            out["temp/geo.impl.c"],
            "// Generated by weave. Do not edit.
#include <stdlib.h>
#include \"geo.impl.h\"

static double area_impl(struct _weave_3geo5Point_t const* p) {
    (void)p;
    abort();
}
static struct WOptional tint_impl(int32_t c, struct WString name) {
    (void)c;
    (void)name;
    abort();
}
static void reset_impl(void) {
    abort();
}

WEAVE_EXPORT_C_API_area(area_impl)
WEAVE_EXPORT_C_API_tint(tint_impl)
WEAVE_EXPORT_C_API_reset(reset_impl)
"
        );
    }

    #[test]
    fn does_not_emit_abi_sources() {
        let out = run(&["c-impl"], sample());
        assert!(out.contains_key("include/geo.abi.h"));
        assert!(!out.contains_key("temp/geo.abi.c"));
    }
}
