use weave_analysis::AnalysisManager;
use weave_decl::{PackageDecl, PackageId, Type};
use weave_driver::{CompileError, CompilerContext};
use weave_output::{OutputWriter, StsWriter};

use super::analyses::{GlobFuncAniInfo, PackageAniInfo, StsScope, TypeStsInfo};
use crate::naming::Naming;

/// Spells `ty` for the module being written and records its imports.
fn spell(
    am: &AnalysisManager,
    w: &mut StsWriter,
    scope: StsScope,
    ty: &Type,
) -> Result<String, CompileError> {
    let info = am.get::<TypeStsInfo>(&(ty.clone(), scope))?;
    for (alias, module) in &info.imports {
        w.import_module(alias, module);
    }
    Ok(info.sts_type.clone())
}

pub(super) fn gen_module(
    ctx: &CompilerContext<'_>,
    naming: Naming,
    id: PackageId,
    pkg: &PackageDecl,
) -> Result<(), CompileError> {
    let am = ctx.analyses();
    let pg = ctx.package_group();
    let info = am.get::<PackageAniInfo>(&id)?;
    let scope = StsScope {
        package: id,
        naming,
    };

    ctx.outputs()
        .write::<StsWriter, _, CompileError>(&format!("ets/{}", info.module), |w| {
            for &eid in &pkg.enums {
                let decl = pg.enum_decl(eid);
                let open = format!("export enum {} {{", naming.as_type(&decl.name));
                w.indented(&open, "}", |w| {
                    for item in &decl.items {
                        w.writeln(&format!("{} = {},", item.name, item.value));
                    }
                });
            }

            for &sid in &pkg.structs {
                let decl = pg.struct_decl(sid);
                let mut fields = Vec::with_capacity(decl.fields.len());
                for field in &decl.fields {
                    fields.push((field.name.as_str(), spell(am, w, scope, &field.ty)?));
                }
                let open = format!("export class {} {{", naming.as_type(&decl.name));
                w.indented(&open, "}", |w| {
                    for (name, ty) in &fields {
                        w.writeln(&format!("{name}: {ty};"));
                    }
                    let params = fields
                        .iter()
                        .map(|(name, ty)| format!("{name}: {ty}"))
                        .collect::<Vec<_>>()
                        .join(", ");
                    w.indented(&format!("constructor({params}) {{"), "}", |w| {
                        for (name, _) in &fields {
                            w.writeln(&format!("this.{name} = {name};"));
                        }
                    });
                });
            }

            for &fid in &pkg.functions {
                let decl = pg.function(fid);
                let ani = am.get::<GlobFuncAniInfo>(&(fid, naming))?;
                let mut params = Vec::with_capacity(decl.params.len());
                for param in &decl.params {
                    params.push(format!("{}: {}", param.name, spell(am, w, scope, &param.ty)?));
                }
                let params = params.join(", ");
                let ret = match &decl.return_ty {
                    Some(ty) => spell(am, w, scope, ty)?,
                    None => "void".to_string(),
                };
                let args = decl
                    .params
                    .iter()
                    .map(|p| p.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                let call = format!("{}({args})", ani.native_name);

                w.writeln(&format!("native function {}({params}): {ret};", ani.native_name));
                let open = format!("export function {}({params}): {ret} {{", ani.sts_name);
                w.indented(&open, "}", |w| {
                    if decl.return_ty.is_some() {
                        w.writeln(&format!("return {call};"));
                    } else {
                        w.writeln(&format!("{call};"));
                    }
                });
            }
            Ok(())
        })
}
