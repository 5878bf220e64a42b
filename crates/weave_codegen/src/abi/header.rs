use std::rc::Rc;

use weave_analysis::AnalysisManager;
use weave_decl::{PackageDecl, PackageId, StructId};
use weave_driver::{Backend, BackendDescriptor, CompileError, CompilerContext};
use weave_output::{CHeaderWriter, OutputManager, OutputWriter};

use super::analyses::{GlobFuncAbiInfo, PackageAbiInfo, StructAbiInfo, TypeAbiInfo};

/// Emits `include/<pkg>.abi.h` plus two headers per struct: a forward
/// declaration (`.abi.0.h`) and the full definition (`.abi.1.h`).
pub struct AbiHeaderBackend;

impl AbiHeaderBackend {
    /// Registry name.
    pub const NAME: &'static str = "abi-header";

    /// Registry entry.
    pub fn descriptor() -> BackendDescriptor {
        BackendDescriptor::new(Self::NAME, |opts| {
            opts.expect_only(&[])?;
            Ok(Box::new(AbiHeaderBackend))
        })
        .summary("C ABI declarations for every package")
    }
}

impl Backend for AbiHeaderBackend {
    fn generate(&mut self, ctx: &CompilerContext<'_>) -> Result<(), CompileError> {
        let gen = AbiHeaderGenerator {
            am: ctx.analyses(),
            om: ctx.outputs(),
        };
        for (id, pkg) in ctx.package_group().packages() {
            gen.gen_package(id, pkg)?;
        }
        Ok(())
    }
}

struct AbiHeaderGenerator<'a> {
    am: &'a AnalysisManager,
    om: &'a OutputManager,
}

impl AbiHeaderGenerator<'_> {
    fn gen_package(&self, id: PackageId, pkg: &PackageDecl) -> Result<(), CompileError> {
        let info = self.am.get::<PackageAbiInfo>(&id)?;
        tracing::debug!(package = %pkg.name, "generating ABI header");
        self.om
            .write::<CHeaderWriter, _, CompileError>(&format!("include/{}", info.header), |w| {
                w.add_include("weave/common.h");
                for &sid in &pkg.structs {
                    let s = self.gen_struct(sid)?;
                    w.add_include(&s.defn_header);
                }
                for &fid in &pkg.functions {
                    let func = self.am.get::<GlobFuncAbiInfo>(&fid)?;
                    w.add_includes(&func.headers);
                    w.writeln(&format!("WEAVE_EXPORT {};", func.prototype()));
                }
                Ok(())
            })
    }

    fn gen_struct(&self, id: StructId) -> Result<Rc<StructAbiInfo>, CompileError> {
        let info = self.am.get::<StructAbiInfo>(&id)?;
        self.om.write::<CHeaderWriter, _, CompileError>(
            &format!("include/{}", info.decl_header),
            |w| {
                w.add_include("weave/common.h");
                w.writeln(&format!("struct {};", info.mangled_name));
                Ok(())
            },
        )?;

        let decl = self.am.package_group().struct_decl(id);
        self.om.write::<CHeaderWriter, _, CompileError>(
            &format!("include/{}", info.defn_header),
            |w| {
                w.add_include(&info.decl_header);
                w.indented(&format!("struct {} {{", info.mangled_name), "};", |w| {
                    if decl.fields.is_empty() {
                        // C forbids empty structs.
                        w.writeln("uint8_t _weave_empty;");
                    }
                    for field in &decl.fields {
                        let ty = self.am.get::<TypeAbiInfo>(&field.ty)?;
                        w.add_includes(&ty.defn_headers);
                        w.writeln(&format!("{} {};", ty.as_owner, field.name));
                    }
                    Ok(())
                })
            },
        )?;
        Ok(info)
    }
}
