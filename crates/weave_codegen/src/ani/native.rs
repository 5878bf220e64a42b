use weave_decl::{PackageDecl, PackageId};
use weave_driver::{CompileError, CompilerContext};
use weave_output::{CppHeaderWriter, CppSourceWriter, OutputWriter};

use super::analyses::{GlobFuncAniInfo, PackageAniInfo, TypeAniInfo};
use crate::cpp::{GlobFuncCppInfo, PackageCppUserInfo, TypeCppInfo};
use crate::naming::Naming;

pub(super) fn gen_package(
    ctx: &CompilerContext<'_>,
    naming: Naming,
    id: PackageId,
    pkg: &PackageDecl,
) -> Result<(), CompileError> {
    let am = ctx.analyses();
    let info = am.get::<PackageAniInfo>(&id)?;
    let user = am.get::<PackageCppUserInfo>(&id)?;
    let om = ctx.outputs();

    om.write::<CppHeaderWriter, _, CompileError>(&format!("include/{}", info.header), |w| {
        w.add_include("weave/runtime.hpp");
        w.indented(&format!("namespace {} {{", info.cpp_ns), "}", |w| {
            w.writeln("ani_status ANIRegister(ani_env *env);");
        });
        Ok(())
    })?;

    om.write::<CppSourceWriter, _, CompileError>(&format!("temp/{}", info.source), |w| {
        w.add_include(&info.header);
        w.add_include(&user.header);
        let mut natives = Vec::with_capacity(pkg.functions.len());
        for &fid in &pkg.functions {
            let decl = ctx.package_group().function(fid);
            let ani = am.get::<GlobFuncAniInfo>(&(fid, naming))?;
            let cpp = am.get::<GlobFuncCppInfo>(&fid)?;

            let mut params = vec!["[[maybe_unused]] ani_env *env".to_string()];
            let mut conversions = Vec::with_capacity(decl.params.len());
            let mut args = Vec::with_capacity(decl.params.len());
            for param in &decl.params {
                let ani_ty = am.get::<TypeAniInfo>(&param.ty)?;
                let cpp_ty = am.get::<TypeCppInfo>(&param.ty)?;
                let ani_arg = format!("ani_arg_{}", param.name);
                let cpp_arg = format!("cpp_arg_{}", param.name);
                params.push(format!("{} {ani_arg}", ani_ty.ani_type));
                let value = if ani_ty.passthrough {
                    ani_arg
                } else {
                    format!("::weave::from_ani<{}>(env, {ani_arg})", cpp_ty.as_owner)
                };
                conversions.push(format!("{} {cpp_arg} = {value};", cpp_ty.as_owner));
                args.push(cpp_arg);
            }
            let call = format!("::{}::{}({})", cpp.namespace, cpp.name, args.join(", "));

            let ret = match &decl.return_ty {
                Some(ty) => Some((am.get::<TypeAniInfo>(ty)?, am.get::<TypeCppInfo>(ty)?)),
                None => None,
            };
            let ani_ret = ret.as_ref().map_or("void", |(ani_ty, _)| ani_ty.ani_type);
            let open = format!(
                "static {ani_ret} {}({}) {{",
                ani.mangled_name,
                params.join(", ")
            );
            w.indented(&open, "}", |w| {
                w.writelns(&conversions);
                match &ret {
                    Some((ani_ty, cpp_ty)) => {
                        w.writeln(&format!("{} cpp_result = {call};", cpp_ty.as_owner));
                        w.writeln(&format!(
                            "if (::weave::has_error()) {{ return {}{{}}; }}",
                            ani_ty.ani_type
                        ));
                        if ani_ty.passthrough {
                            w.writeln("return cpp_result;");
                        } else {
                            w.writeln(&format!(
                                "return ::weave::into_ani<{}>(env, cpp_result);",
                                cpp_ty.as_owner
                            ));
                        }
                    }
                    None => w.writeln(&format!("{call};")),
                }
            });
            natives.push((ani.native_name.clone(), ani.mangled_name.clone()));
        }

        w.indented(&format!("namespace {} {{", info.cpp_ns), "}", |w| {
            w.indented("ani_status ANIRegister(ani_env *env) {", "}", |w| {
                if !natives.is_empty() {
                    w.writeln("ani_module scope;");
                    w.indented(
                        &format!(
                            "if (ANI_OK != env->FindModule(\"{}\", &scope)) {{",
                            info.module_desc
                        ),
                        "}",
                        |w| w.writeln("return ANI_ERROR;"),
                    );
                    w.indented("ani_native_function methods[] = {", "};", |w| {
                        for (native, mangled) in &natives {
                            w.writeln(&format!(
                                "{{\"{native}\", nullptr, reinterpret_cast<void*>({mangled})}},"
                            ));
                        }
                    });
                    w.indented(
                        "if (ANI_OK != env->Module_BindNativeFunctions(scope, methods, \
                         sizeof(methods) / sizeof(ani_native_function))) {",
                        "}",
                        |w| w.writeln("return ANI_ERROR;"),
                    );
                }
                w.writeln("return ANI_OK;");
            });
        });
        Ok(())
    })
}

/// `temp/ani_constructor.cpp`: the library entry point that registers every
/// package with the runtime.
pub(super) fn gen_constructor(ctx: &CompilerContext<'_>) -> Result<(), CompileError> {
    let am = ctx.analyses();
    ctx.outputs()
        .write::<CppSourceWriter, _, CompileError>("temp/ani_constructor.cpp", |w| {
            w.add_include("<iostream>");
            w.add_include("weave/runtime.hpp");
            let open = "ANI_EXPORT ani_status ANI_Constructor(ani_vm *vm, uint32_t *result) {";
            w.indented(open, "}", |w| {
                w.writeln("ani_env *env;");
                w.indented("if (ANI_OK != vm->GetEnv(ANI_VERSION_1, &env)) {", "}", |w| {
                    w.writeln("return ANI_ERROR;");
                });
                for (id, _) in ctx.package_group().packages() {
                    let info = am.get::<PackageAniInfo>(&id)?;
                    w.add_include(&info.header);
                    let register = format!("::{}::ANIRegister", info.cpp_ns);
                    w.indented(&format!("if (ANI_OK != {register}(env)) {{"), "}", |w| {
                        w.writeln(&format!(
                            "std::cerr << \"Error from {register}\" << std::endl;"
                        ));
                        w.writeln("return ANI_ERROR;");
                    });
                }
                w.writeln("*result = ANI_VERSION_1;");
                w.writeln("return ANI_OK;");
                Ok(())
            })
        })
}
