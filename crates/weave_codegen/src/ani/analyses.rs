//! Names and type spellings on both sides of the ANI boundary.

use weave_analysis::{Analysis, AnalysisError, AnalysisManager};
use weave_decl::{FuncId, PackageId, ScalarKind, Type};

use crate::mangle::{encode, DeclKind};
use crate::naming::Naming;

/// The viewpoint an ArkTS spelling is computed from: types declared in
/// another package are qualified through an import.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct StsScope {
    /// The module being written.
    pub package: PackageId,
    /// How declared names are spelled.
    pub naming: Naming,
}

/// Per-package ANI file names.
#[derive(Debug)]
pub struct PackageAniInfo {
    /// `<pkg>.ani.hpp`
    pub header: String,
    /// `<pkg>.ani.cpp`
    pub source: String,
    /// `<pkg>.ets`
    pub module: String,
    /// Namespace holding `ANIRegister`.
    pub cpp_ns: String,
    /// Descriptor the runtime finds the module by.
    pub module_desc: String,
    /// Alias other modules import this one under.
    pub import_alias: String,
}

impl Analysis for PackageAniInfo {
    type Key = PackageId;

    fn create(am: &AnalysisManager, key: &PackageId) -> Result<Self, AnalysisError> {
        let pkg = am.package_group().package(*key);
        Ok(Self {
            header: format!("{}.ani.hpp", pkg.name),
            source: format!("{}.ani.cpp", pkg.name),
            module: format!("{}.ets", pkg.name),
            cpp_ns: pkg.segments.join("::"),
            module_desc: pkg.segments.join("/"),
            import_alias: encode(&pkg.segments, DeclKind::Module),
        })
    }
}

/// A global function's native entry point and ArkTS names.
#[derive(Debug)]
pub struct GlobFuncAniInfo {
    /// The C++ function registered with the runtime.
    pub mangled_name: String,
    /// The `native function` declared in the module.
    pub native_name: String,
    /// The exported ArkTS wrapper.
    pub sts_name: String,
}

impl Analysis for GlobFuncAniInfo {
    type Key = (FuncId, Naming);

    fn create(am: &AnalysisManager, key: &(FuncId, Naming)) -> Result<Self, AnalysisError> {
        let (id, naming) = *key;
        let pg = am.package_group();
        let func = pg.function(id);
        let mut segments = pg.package(func.package).segments.clone();
        segments.push(func.name.clone());
        Ok(Self {
            mangled_name: encode(&segments, DeclKind::AniFunc),
            native_name: format!("_weave_{}_native", func.name),
            sts_name: naming.as_func(&func.name),
        })
    }
}

fn ani_scalar(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::Bool => "ani_boolean",
        ScalarKind::I8 | ScalarKind::U8 => "ani_byte",
        ScalarKind::I16 | ScalarKind::U16 => "ani_short",
        ScalarKind::I32 | ScalarKind::U32 => "ani_int",
        ScalarKind::I64 | ScalarKind::U64 => "ani_long",
        ScalarKind::F32 => "ani_float",
        ScalarKind::F64 => "ani_double",
    }
}

fn sts_scalar(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::Bool => "boolean",
        ScalarKind::I8 | ScalarKind::U8 => "byte",
        ScalarKind::I16 | ScalarKind::U16 => "short",
        ScalarKind::I32 | ScalarKind::U32 => "int",
        ScalarKind::I64 | ScalarKind::U64 => "long",
        ScalarKind::F32 => "float",
        ScalarKind::F64 => "double",
    }
}

/// The ANI handle type a value travels as.
#[derive(Debug)]
pub struct TypeAniInfo {
    /// e.g. `ani_int`, `ani_string`, `ani_object`.
    pub ani_type: &'static str,
    /// Scalars need no conversion.
    pub passthrough: bool,
}

impl Analysis for TypeAniInfo {
    type Key = Type;

    fn create(_am: &AnalysisManager, key: &Type) -> Result<Self, AnalysisError> {
        let ani_type = match key {
            Type::Scalar(kind) => ani_scalar(*kind),
            Type::String => "ani_string",
            Type::Enum(_) => "ani_enum_item",
            Type::Array(_) => "ani_array_ref",
            Type::Struct(_) | Type::Optional(_) => "ani_object",
        };
        Ok(Self {
            ani_type,
            passthrough: key.is_scalar(),
        })
    }
}

/// How a type is written in an ArkTS module.
#[derive(Debug)]
pub struct TypeStsInfo {
    /// The spelling.
    pub sts_type: String,
    /// `(alias, module)` imports the spelling relies on.
    pub imports: Vec<(String, String)>,
}

impl TypeStsInfo {
    fn named(
        am: &AnalysisManager,
        scope: StsScope,
        owner: PackageId,
        name: &str,
    ) -> Result<Self, AnalysisError> {
        let name = scope.naming.as_type(name);
        if owner == scope.package {
            return Ok(Self {
                sts_type: name,
                imports: Vec::new(),
            });
        }
        let pkg = am.get::<PackageAniInfo>(&owner)?;
        let module = format!("./{}", am.package_group().package(owner).name);
        Ok(Self {
            sts_type: format!("{}.{name}", pkg.import_alias),
            imports: vec![(pkg.import_alias.clone(), module)],
        })
    }
}

impl Analysis for TypeStsInfo {
    type Key = (Type, StsScope);

    fn create(am: &AnalysisManager, key: &(Type, StsScope)) -> Result<Self, AnalysisError> {
        let (ty, scope) = key;
        let pg = am.package_group();
        Ok(match ty {
            Type::Scalar(kind) => Self {
                sts_type: sts_scalar(*kind).to_string(),
                imports: Vec::new(),
            },
            Type::String => Self {
                sts_type: "string".to_string(),
                imports: Vec::new(),
            },
            Type::Struct(id) => {
                let decl = pg.struct_decl(*id);
                Self::named(am, *scope, decl.package, &decl.name)?
            }
            Type::Enum(id) => {
                let decl = pg.enum_decl(*id);
                Self::named(am, *scope, decl.package, &decl.name)?
            }
            Type::Array(elem) => {
                let elem = am.get::<TypeStsInfo>(&((**elem).clone(), *scope))?;
                Self {
                    sts_type: format!("Array<{}>", elem.sts_type),
                    imports: elem.imports.clone(),
                }
            }
            Type::Optional(inner) => {
                let inner = am.get::<TypeStsInfo>(&((**inner).clone(), *scope))?;
                Self {
                    sts_type: format!("{} | undefined", inner.sts_type),
                    imports: inner.imports.clone(),
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use weave_decl::PackageGroup;

    fn two_packages() -> (AnalysisManager, PackageId, PackageId, Type) {
        let mut pg = PackageGroup::new();
        let geo = pg.add_package("geo.shapes").unwrap();
        let app = pg.add_package("app").unwrap();
        let point = pg.add_struct(geo, "point_2d", vec![]).unwrap();
        (AnalysisManager::new(Rc::new(pg)), geo, app, Type::Struct(point))
    }

    #[test]
    fn same_package_types_are_unqualified() {
        let (am, geo, _, point) = two_packages();
        let scope = StsScope {
            package: geo,
            naming: Naming::Camel,
        };
        let info = am.get::<TypeStsInfo>(&(point, scope)).unwrap();
        assert_eq!(info.sts_type, "Point2d");
        assert!(info.imports.is_empty());
    }

    #[test]
    fn foreign_types_are_imported() {
        let (am, _, app, point) = two_packages();
        let scope = StsScope {
            package: app,
            naming: Naming::Keep,
        };
        let ty = Type::Optional(Box::new(Type::Array(Box::new(point))));
        let info = am.get::<TypeStsInfo>(&(ty, scope)).unwrap();
        assert_eq!(
            info.sts_type,
            "Array<_weave_3geo6shapes_m.point_2d> | undefined"
        );
        assert_eq!(
            info.imports,
            vec![("_weave_3geo6shapes_m".to_string(), "./geo.shapes".to_string())]
        );
    }

    #[test]
    fn underscored_packages_get_distinct_aliases() {
        let mut pg = PackageGroup::new();
        let left = pg.add_package("a_b.c").unwrap();
        let right = pg.add_package("a.b_c").unwrap();
        let am = AnalysisManager::new(Rc::new(pg));
        let left = am.get::<PackageAniInfo>(&left).unwrap();
        let right = am.get::<PackageAniInfo>(&right).unwrap();
        assert_eq!(left.import_alias, "_weave_3a_b1c_m");
        assert_eq!(right.import_alias, "_weave_1a3b_c_m");
    }

    #[test]
    fn naming_is_part_of_the_key() {
        let mut pg = PackageGroup::new();
        let pkg = pg.add_package("geo").unwrap();
        let f = pg.add_function(pkg, "get_area", vec![], None).unwrap();
        let am = AnalysisManager::new(Rc::new(pg));

        let camel = am.get::<GlobFuncAniInfo>(&(f, Naming::Camel)).unwrap();
        let keep = am.get::<GlobFuncAniInfo>(&(f, Naming::Keep)).unwrap();
        assert_eq!(camel.sts_name, "getArea");
        assert_eq!(keep.sts_name, "get_area");
        assert_eq!(camel.mangled_name, "_weave_3geo8get_area_ani");
        assert_eq!(camel.native_name, "_weave_get_area_native");
    }

    #[test]
    fn ani_handles() {
        let am = AnalysisManager::new(Rc::new(PackageGroup::new()));
        let int = am.get::<TypeAniInfo>(&Type::I32).unwrap();
        assert_eq!(int.ani_type, "ani_int");
        assert!(int.passthrough);
        let s = am.get::<TypeAniInfo>(&Type::String).unwrap();
        assert_eq!(s.ani_type, "ani_string");
        assert!(!s.passthrough);
    }
}
