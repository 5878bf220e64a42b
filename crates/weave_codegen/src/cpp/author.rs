use weave_analysis::{Analysis, AnalysisError, AnalysisManager};
use weave_decl::{FuncId, PackageDecl, PackageId};
use weave_driver::{Backend, BackendDescriptor, CompileError, CompilerContext};
use weave_output::{CppHeaderWriter, CppSourceWriter, OutputWriter};

use super::analyses::{GlobFuncCppInfo, PackageCppInfo, TypeCppInfo};
use crate::abi::{GlobFuncAbiInfo, PackageAbiInfo};

/// File names of a package's C++ implementation glue.
#[derive(Debug)]
pub struct PackageCppImplInfo {
    /// `<pkg>.impl.hpp`
    pub header: String,
    /// `<pkg>.impl.cpp`
    pub source: String,
}

impl Analysis for PackageCppImplInfo {
    type Key = PackageId;

    fn create(am: &AnalysisManager, key: &PackageId) -> Result<Self, AnalysisError> {
        let pkg = am.package_group().package(*key);
        Ok(Self {
            header: format!("{}.impl.hpp", pkg.name),
            source: format!("{}.impl.cpp", pkg.name),
        })
    }
}

/// The export macro binding one function to a C++ implementation.
#[derive(Debug)]
pub struct GlobFuncCppImplInfo {
    /// `WEAVE_EXPORT_CPP_API_<name>`
    pub macro_name: String,
}

impl Analysis for GlobFuncCppImplInfo {
    type Key = FuncId;

    fn create(am: &AnalysisManager, key: &FuncId) -> Result<Self, AnalysisError> {
        let func = am.package_group().function(*key);
        Ok(Self {
            macro_name: format!("WEAVE_EXPORT_CPP_API_{}", func.name),
        })
    }
}

/// The `cpp-author` backend.
///
/// `include/<pkg>.impl.hpp` defines the export macros; each one defines the
/// ABI symbol as a call to the given C++ function with arguments converted
/// from their ABI form. `temp/<pkg>.impl.cpp` is a template whose functions
/// throw until implemented.
pub struct CppAuthorBackend;

impl CppAuthorBackend {
    /// Registry name.
    pub const NAME: &'static str = "cpp-author";

    /// Registry entry.
    pub fn descriptor() -> BackendDescriptor {
        BackendDescriptor::new(Self::NAME, |opts| {
            opts.expect_only(&[])?;
            Ok(Box::new(CppAuthorBackend))
        })
        .requires(&["cpp-common"])
        .summary("export macros and a template for C++ implementations")
    }

    fn gen_header(
        am: &AnalysisManager,
        ctx: &CompilerContext<'_>,
        id: PackageId,
        pkg: &PackageDecl,
    ) -> Result<(), CompileError> {
        let abi = am.get::<PackageAbiInfo>(&id)?;
        let proj = am.get::<PackageCppInfo>(&id)?;
        let info = am.get::<PackageCppImplInfo>(&id)?;
        let pg = am.package_group();
        ctx.outputs()
            .write::<CppHeaderWriter, _, CompileError>(&format!("include/{}", info.header), |w| {
                w.add_include(&proj.header);
                w.add_include(&abi.header);
                for &fid in &pkg.functions {
                    let decl = pg.function(fid);
                    let sym = am.get::<GlobFuncAbiInfo>(&fid)?;
                    let glue = am.get::<GlobFuncCppImplInfo>(&fid)?;

                    let mut args = Vec::with_capacity(decl.params.len());
                    for param in &decl.params {
                        let ty = am.get::<TypeCppInfo>(&param.ty)?;
                        args.push(ty.param_from_abi(&param.name));
                    }
                    let call = format!("CppImpl({})", args.join(", "));
                    let body = match &decl.return_ty {
                        Some(ret) => {
                            let ty = am.get::<TypeCppInfo>(ret)?;
                            format!("return {};", ty.owner_into_abi(&call))
                        }
                        None => format!("{call};"),
                    };
                    w.writelns([
                        format!("#define {}(CppImpl) \\", glue.macro_name),
                        format!("    {} {{ \\", sym.prototype()),
                        format!("        {body} \\"),
                        "    }".to_string(),
                    ]);
                }
                Ok(())
            })
    }

    fn gen_template(
        am: &AnalysisManager,
        ctx: &CompilerContext<'_>,
        id: PackageId,
        pkg: &PackageDecl,
    ) -> Result<(), CompileError> {
        let info = am.get::<PackageCppImplInfo>(&id)?;
        ctx.outputs()
            .write::<CppSourceWriter, _, CompileError>(&format!("temp/{}", info.source), |w| {
                w.add_include(&info.header);
                w.add_include("<stdexcept>");
                let mut invocations = Vec::with_capacity(pkg.functions.len());
                w.indented("namespace {", "}  // namespace", |w| {
                    for &fid in &pkg.functions {
                        let func = am.get::<GlobFuncCppInfo>(&fid)?;
                        let glue = am.get::<GlobFuncCppImplInfo>(&fid)?;
                        w.add_includes(&func.headers);
                        w.indented(&format!("{} {{", func.signature(&func.name)), "}", |w| {
                            w.writeln(&format!(
                                "WEAVE_THROW(std::runtime_error, \"{} not implemented\");",
                                func.name
                            ));
                        });
                        invocations.push(format!("{}({})", glue.macro_name, func.name));
                    }
                    Ok::<_, CompileError>(())
                })?;
                w.writeln("// NOLINTBEGIN");
                w.writelns(&invocations);
                w.writeln("// NOLINTEND");
                Ok(())
            })
    }
}

impl Backend for CppAuthorBackend {
    fn generate(&mut self, ctx: &CompilerContext<'_>) -> Result<(), CompileError> {
        let am = ctx.analyses();
        for (id, pkg) in ctx.package_group().packages() {
            Self::gen_header(am, ctx, id, pkg)?;
            Self::gen_template(am, ctx, id, pkg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::testing::{run, sample};

    #[test]
    fn export_macros_convert_both_ways() {
        let out = run(&["cpp-author"], sample());
        let header = &out["include/geo.impl.hpp"];
        assert!(header.contains(
            "#define WEAVE_EXPORT_CPP_API_area(CppImpl) \\
    double _weave_3geo4area_f(struct _weave_3geo5Point_t const* p) { \\
        return CppImpl(::weave::from_abi<::geo::Point const&>(p)); \\
    }"
        ));
        assert!(header.contains(
            "        return ::weave::into_abi<::weave::optional<::weave::string>>(\
             CppImpl(::weave::from_abi<::geo::Color>(c), \
             ::weave::from_abi<::weave::string_view>(name))); \\"
        ));
        assert!(header.contains("        CppImpl(); \\"));
    }

    #[test]
    fn template() {
        let out = run(&["cpp-author"], sample());
        assert_eq!(
            out["temp/geo.impl.cpp"],
            "// Generated by weave. Do not edit.
#include \"geo.impl.hpp\"
#include <stdexcept>
#include \"geo.Point.proj.1.hpp\"
#include \"geo.Color.proj.1.hpp\"
#include \"weave/string.hpp\"
#include \"weave/optional.hpp\"

namespace {
    double area(::geo::Point const& p) {
        WEAVE_THROW(std::runtime_error, \"area not implemented\");
    }
    ::weave::optional<::weave::string> tint(::geo::Color c, ::weave::string_view name) {
        WEAVE_THROW(std::runtime_error, \"tint not implemented\");
    }
    void reset() {
        WEAVE_THROW(std::runtime_error, \"reset not implemented\");
    }
}  // namespace
// NOLINTBEGIN
WEAVE_EXPORT_CPP_API_area(area)
WEAVE_EXPORT_CPP_API_tint(tint)
WEAVE_EXPORT_CPP_API_reset(reset)
// NOLINTEND
"
        );
    }
}
