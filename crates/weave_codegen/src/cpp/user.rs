use weave_analysis::{Analysis, AnalysisError, AnalysisManager};
use weave_decl::{PackageDecl, PackageId};
use weave_driver::{Backend, BackendDescriptor, CompileError, CompilerContext};
use weave_output::{CppHeaderWriter, OutputWriter};

use super::analyses::{GlobFuncCppInfo, PackageCppInfo, TypeCppInfo};
use crate::abi::{GlobFuncAbiInfo, PackageAbiInfo};

/// Where a package's caller-side wrappers live.
#[derive(Debug)]
pub struct PackageCppUserInfo {
    /// `<pkg>.user.hpp`
    pub header: String,
}

impl Analysis for PackageCppUserInfo {
    type Key = PackageId;

    fn create(am: &AnalysisManager, key: &PackageId) -> Result<Self, AnalysisError> {
        let pkg = am.package_group().package(*key);
        Ok(Self {
            header: format!("{}.user.hpp", pkg.name),
        })
    }
}

/// The `cpp-user` backend: one inline wrapper per function that converts
/// arguments, calls the exported symbol and converts the result back.
pub struct CppUserBackend;

impl CppUserBackend {
    /// Registry name.
    pub const NAME: &'static str = "cpp-user";

    /// Registry entry.
    pub fn descriptor() -> BackendDescriptor {
        BackendDescriptor::new(Self::NAME, |opts| {
            opts.expect_only(&[])?;
            Ok(Box::new(CppUserBackend))
        })
        .requires(&["cpp-common"])
        .summary("inline C++ wrappers for calling packages")
    }

    fn gen_package(
        am: &AnalysisManager,
        ctx: &CompilerContext<'_>,
        id: PackageId,
        pkg: &PackageDecl,
    ) -> Result<(), CompileError> {
        let abi = am.get::<PackageAbiInfo>(&id)?;
        let proj = am.get::<PackageCppInfo>(&id)?;
        let info = am.get::<PackageCppUserInfo>(&id)?;
        let pg = am.package_group();
        ctx.outputs()
            .write::<CppHeaderWriter, _, CompileError>(&format!("include/{}", info.header), |w| {
                w.add_include(&proj.header);
                w.add_include(&abi.header);
                if pkg.functions.is_empty() {
                    return Ok(());
                }
                w.indented(&format!("namespace {} {{", proj.namespace), "}", |w| {
                    for &fid in &pkg.functions {
                        let decl = pg.function(fid);
                        let func = am.get::<GlobFuncCppInfo>(&fid)?;
                        let sym = am.get::<GlobFuncAbiInfo>(&fid)?;
                        w.add_includes(&func.headers);

                        let mut args = Vec::with_capacity(decl.params.len());
                        for param in &decl.params {
                            let ty = am.get::<TypeCppInfo>(&param.ty)?;
                            args.push(ty.into_abi(&param.name));
                        }
                        let call = format!("{}({})", sym.mangled_name, args.join(", "));
                        let body = match &decl.return_ty {
                            Some(ret) => {
                                let ty = am.get::<TypeCppInfo>(ret)?;
                                format!("return {};", ty.from_abi(&call))
                            }
                            None => format!("{call};"),
                        };
                        let open = format!("inline {} {{", func.signature(&func.name));
                        w.indented(&open, "}", |w| w.writeln(&body));
                    }
                    Ok(())
                })
            })
    }
}

impl Backend for CppUserBackend {
    fn generate(&mut self, ctx: &CompilerContext<'_>) -> Result<(), CompileError> {
        let am = ctx.analyses();
        for (id, pkg) in ctx.package_group().packages() {
            Self::gen_package(am, ctx, id, pkg)?;
        }
        Ok(())
    }
}
