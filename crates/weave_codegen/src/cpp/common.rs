use std::rc::Rc;

use weave_analysis::AnalysisManager;
use weave_decl::{EnumId, PackageDecl, PackageId, StructId};
use weave_driver::{Backend, BackendDescriptor, CompileError, CompilerContext};
use weave_output::{CppHeaderWriter, OutputManager, OutputWriter};

use super::analyses::{EnumCppInfo, PackageCppInfo, StructCppInfo, TypeCppInfo};
use crate::abi::{EnumAbiInfo, PackageAbiInfo, StructAbiInfo};

/// The `cpp-common` backend.
pub struct CppCommonBackend;

impl CppCommonBackend {
    /// Registry name.
    pub const NAME: &'static str = "cpp-common";

    /// Registry entry.
    pub fn descriptor() -> BackendDescriptor {
        BackendDescriptor::new(Self::NAME, |opts| {
            opts.expect_only(&[])?;
            Ok(Box::new(CppCommonBackend))
        })
        .requires(&["abi-header"])
        .summary("C++ types for structs and enums")
    }
}

impl Backend for CppCommonBackend {
    fn generate(&mut self, ctx: &CompilerContext<'_>) -> Result<(), CompileError> {
        let gen = CppCommonGenerator {
            am: ctx.analyses(),
            om: ctx.outputs(),
        };
        for (id, pkg) in ctx.package_group().packages() {
            gen.gen_package(id, pkg)?;
        }
        Ok(())
    }
}

struct CppCommonGenerator<'a> {
    am: &'a AnalysisManager,
    om: &'a OutputManager,
}

impl CppCommonGenerator<'_> {
    fn gen_package(&self, id: PackageId, pkg: &PackageDecl) -> Result<(), CompileError> {
        let abi = self.am.get::<PackageAbiInfo>(&id)?;
        let info = self.am.get::<PackageCppInfo>(&id)?;
        tracing::debug!(package = %pkg.name, namespace = %info.namespace, "generating C++ projection");
        self.om
            .write::<CppHeaderWriter, _, CompileError>(&format!("include/{}", info.header), |w| {
                w.add_include("weave/common.hpp");
                w.add_include(&abi.header);
                for &sid in &pkg.structs {
                    let s = self.gen_struct_decl(sid)?;
                    self.gen_struct_defn(sid, &s)?;
                    w.add_include(&s.defn_header);
                }
                for &eid in &pkg.enums {
                    let e = self.gen_enum(eid)?;
                    w.add_include(&e.defn_header);
                }
                Ok(())
            })
    }

    fn gen_struct_decl(&self, id: StructId) -> Result<Rc<StructCppInfo>, CompileError> {
        let info = self.am.get::<StructCppInfo>(&id)?;
        let abi = self.am.get::<StructAbiInfo>(&id)?;
        self.om.write::<CppHeaderWriter, _, CompileError>(
            &format!("include/{}", info.decl_header),
            |w| {
                w.add_include("weave/common.hpp");
                w.add_include(&abi.decl_header);
                w.indented(&format!("namespace {} {{", info.namespace), "}", |w| {
                    w.writeln(&format!("struct {};", info.name));
                });
                Ok(())
            },
        )?;
        Ok(info)
    }

    fn gen_struct_defn(&self, id: StructId, info: &StructCppInfo) -> Result<(), CompileError> {
        let abi = self.am.get::<StructAbiInfo>(&id)?;
        let decl = self.am.package_group().struct_decl(id);
        self.om.write::<CppHeaderWriter, _, CompileError>(
            &format!("include/{}", info.defn_header),
            |w| {
                w.add_include(&info.decl_header);
                w.add_include(&abi.defn_header);
                w.indented(&format!("namespace {} {{", info.namespace), "}", |w| {
                    w.indented(&format!("struct {} {{", info.name), "};", |w| {
                        for field in &decl.fields {
                            let ty = self.am.get::<TypeCppInfo>(&field.ty)?;
                            w.add_includes(&ty.headers);
                            w.writeln(&format!("{} {};", ty.as_owner, field.name));
                        }
                        Ok::<_, CompileError>(())
                    })
                })?;
                write_abi_traits(w, &info.full_name, &abi.as_owner, &abi.as_param);
                Ok(())
            },
        )
    }

    fn gen_enum(&self, id: EnumId) -> Result<Rc<EnumCppInfo>, CompileError> {
        let info = self.am.get::<EnumCppInfo>(&id)?;
        let abi = self.am.get::<EnumAbiInfo>(&id)?;
        let decl = self.am.package_group().enum_decl(id);
        self.om.write::<CppHeaderWriter, _, CompileError>(
            &format!("include/{}", info.defn_header),
            |w| {
                w.add_include("weave/common.hpp");
                w.indented(&format!("namespace {} {{", info.namespace), "}", |w| {
                    let open = format!("enum class {} : {} {{", info.name, abi.abi_type);
                    w.indented(&open, "};", |w| {
                        for item in &decl.items {
                            w.writeln(&format!("{} = {},", item.name, item.value));
                        }
                    });
                });
                write_abi_traits(w, &info.full_name, abi.abi_type, abi.abi_type);
                Ok(())
            },
        )?;
        Ok(info)
    }
}

/// Specializes the runtime's `as_abi` and `as_param` traits for `cpp_name`.
fn write_abi_traits(w: &mut CppHeaderWriter, cpp_name: &str, owner: &str, param: &str) {
    w.indented("namespace weave {", "}", |w| {
        for (trait_name, abi_ty) in [("as_abi", owner), ("as_param", param)] {
            w.writeln("template<>");
            w.indented(&format!("struct {trait_name}<{cpp_name}> {{"), "};", |w| {
                w.writeln(&format!("using type = {abi_ty};"));
            });
        }
    });
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::testing::{run, sample};

    #[test]
    fn package_header_includes_projections() {
        let out = run(&["cpp-common"], sample());
        let header = &out["include/geo.proj.hpp"];
        assert!(header.contains("#pragma once"));
        assert!(header.contains("#include \"geo.abi.h\""));
        assert!(header.contains("#include \"geo.Point.proj.1.hpp\""));
        assert!(header.contains("#include \"geo.Color.proj.1.hpp\""));
    }

    #[test]
    fn struct_definition() {
        let out = run(&["cpp-common"], sample());
        assert_eq!(
            out["include/geo.Point.proj.1.hpp"],
            "// Generated by weave. Do not edit.
#pragma once
#include \"geo.Point.proj.0.hpp\"
#include \"geo.Point.abi.1.h\"

namespace geo {
    struct Point {
        double x;
        double y;
    };
}
namespace weave {
    template<>
    struct as_abi<::geo::Point> {
        using type = struct _weave_3geo5Point_t;
    };
    template<>
    struct as_param<::geo::Point> {
        using type = struct _weave_3geo5Point_t const*;
    };
}
"
        );
    }

    #[test]
    fn enum_definition() {
        let out = run(&["cpp-common"], sample());
        let header = &out["include/geo.Color.proj.1.hpp"];
        assert!(header.contains(
            "namespace geo {
    enum class Color : int32_t {
        red = 0,
        green = 1,
    };
}"
        ));
        assert!(header.contains("struct as_abi<::geo::Color> {\n        using type = int32_t;"));
    }

    #[test]
    fn forward_declaration() {
        let out = run(&["cpp-common"], sample());
        assert!(out["include/geo.Point.proj.0.hpp"]
            .contains("namespace geo {\n    struct Point;\n}"));
    }
}
