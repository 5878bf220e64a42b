//! C++ projections of declarations and types.

use weave_analysis::{Analysis, AnalysisError, AnalysisManager};
use weave_decl::{EnumId, FuncId, PackageId, StructId, Type};

use crate::abi::c_scalar;

fn namespace_of(segments: &[String]) -> String {
    segments.join("::")
}

/// Per-package C++ names.
#[derive(Debug)]
pub struct PackageCppInfo {
    /// `<pkg>.proj.hpp`
    pub header: String,
    /// The package namespace, `a::b` for package `a.b`.
    pub namespace: String,
}

impl Analysis for PackageCppInfo {
    type Key = PackageId;

    fn create(am: &AnalysisManager, key: &PackageId) -> Result<Self, AnalysisError> {
        let pkg = am.package_group().package(*key);
        Ok(Self {
            header: format!("{}.proj.hpp", pkg.name),
            namespace: namespace_of(&pkg.segments),
        })
    }
}

/// The C++ projection of a struct.
#[derive(Debug)]
pub struct StructCppInfo {
    /// Header with the forward declaration.
    pub decl_header: String,
    /// Header with the definition and ABI traits.
    pub defn_header: String,
    /// Enclosing namespace.
    pub namespace: String,
    /// Unqualified name.
    pub name: String,
    /// Fully qualified name, `::a::b::Name`.
    pub full_name: String,
}

impl Analysis for StructCppInfo {
    type Key = StructId;

    fn create(am: &AnalysisManager, key: &StructId) -> Result<Self, AnalysisError> {
        let pg = am.package_group();
        let decl = pg.struct_decl(*key);
        let pkg = am.get::<PackageCppInfo>(&decl.package)?;
        let pkg_name = &pg.package(decl.package).name;
        Ok(Self {
            decl_header: format!("{pkg_name}.{}.proj.0.hpp", decl.name),
            defn_header: format!("{pkg_name}.{}.proj.1.hpp", decl.name),
            full_name: format!("::{}::{}", pkg.namespace, decl.name),
            namespace: pkg.namespace.clone(),
            name: decl.name.clone(),
        })
    }
}

/// The C++ projection of an enum.
#[derive(Debug)]
pub struct EnumCppInfo {
    /// Header with the definition.
    pub defn_header: String,
    /// Enclosing namespace.
    pub namespace: String,
    /// Unqualified name.
    pub name: String,
    /// Fully qualified name.
    pub full_name: String,
}

impl Analysis for EnumCppInfo {
    type Key = EnumId;

    fn create(am: &AnalysisManager, key: &EnumId) -> Result<Self, AnalysisError> {
        let pg = am.package_group();
        let decl = pg.enum_decl(*key);
        let pkg = am.get::<PackageCppInfo>(&decl.package)?;
        Ok(Self {
            defn_header: format!("{}.{}.proj.1.hpp", pg.package(decl.package).name, decl.name),
            full_name: format!("::{}::{}", pkg.namespace, decl.name),
            namespace: pkg.namespace.clone(),
            name: decl.name.clone(),
        })
    }
}

/// How a type is spelled in C++ and how values cross the ABI.
#[derive(Debug)]
pub struct TypeCppInfo {
    /// Headers needed to use the type by value.
    pub headers: Vec<String>,
    /// Spelling as a field or return value.
    pub as_owner: String,
    /// Spelling as a parameter.
    pub as_param: String,
    /// Scalars cross the ABI unchanged.
    pub passthrough: bool,
}

impl TypeCppInfo {
    /// Converts a C++ parameter expression to its ABI form.
    pub fn into_abi(&self, expr: &str) -> String {
        if self.passthrough {
            expr.to_string()
        } else {
            format!("::weave::into_abi<{}>({expr})", self.as_param)
        }
    }

    /// Converts an ABI return expression to its C++ form.
    pub fn from_abi(&self, expr: &str) -> String {
        if self.passthrough {
            expr.to_string()
        } else {
            format!("::weave::from_abi<{}>({expr})", self.as_owner)
        }
    }

    /// Converts an ABI parameter to the C++ parameter type.
    pub fn param_from_abi(&self, expr: &str) -> String {
        if self.passthrough {
            expr.to_string()
        } else {
            format!("::weave::from_abi<{}>({expr})", self.as_param)
        }
    }

    /// Converts a C++ return value to its ABI form.
    pub fn owner_into_abi(&self, expr: &str) -> String {
        if self.passthrough {
            expr.to_string()
        } else {
            format!("::weave::into_abi<{}>({expr})", self.as_owner)
        }
    }

    fn container(header: &str, owner: &str, param: &str, inner: Option<&TypeCppInfo>) -> Self {
        let mut headers = vec![header.to_string()];
        if let Some(inner) = inner {
            headers.extend(inner.headers.iter().cloned());
        }
        Self {
            headers,
            as_owner: owner.to_string(),
            as_param: param.to_string(),
            passthrough: false,
        }
    }
}

impl Analysis for TypeCppInfo {
    type Key = Type;

    fn create(am: &AnalysisManager, key: &Type) -> Result<Self, AnalysisError> {
        Ok(match key {
            Type::Scalar(kind) => Self {
                headers: Vec::new(),
                as_owner: c_scalar(*kind).to_string(),
                as_param: c_scalar(*kind).to_string(),
                passthrough: true,
            },
            Type::String => Self::container(
                "weave/string.hpp",
                "::weave::string",
                "::weave::string_view",
                None,
            ),
            Type::Array(elem) => {
                let elem = am.get::<TypeCppInfo>(elem)?;
                Self::container(
                    "weave/array.hpp",
                    &format!("::weave::array<{}>", elem.as_owner),
                    &format!("::weave::array_view<{}>", elem.as_owner),
                    Some(&*elem),
                )
            }
            Type::Optional(inner) => {
                let inner = am.get::<TypeCppInfo>(inner)?;
                Self::container(
                    "weave/optional.hpp",
                    &format!("::weave::optional<{}>", inner.as_owner),
                    &format!("::weave::optional_view<{}>", inner.as_owner),
                    Some(&*inner),
                )
            }
            Type::Struct(id) => {
                let info = am.get::<StructCppInfo>(id)?;
                Self {
                    headers: vec![info.defn_header.clone()],
                    as_owner: info.full_name.clone(),
                    as_param: format!("{} const&", info.full_name),
                    passthrough: false,
                }
            }
            Type::Enum(id) => {
                let info = am.get::<EnumCppInfo>(id)?;
                Self {
                    headers: vec![info.defn_header.clone()],
                    as_owner: info.full_name.clone(),
                    as_param: info.full_name.clone(),
                    passthrough: false,
                }
            }
        })
    }
}

/// A global function as seen from C++.
#[derive(Debug)]
pub struct GlobFuncCppInfo {
    /// Namespace of the owning package.
    pub namespace: String,
    /// Function name.
    pub name: String,
    /// C++ return type, `void` when the function returns nothing.
    pub return_ty: String,
    /// `(type, name)` per parameter.
    pub params: Vec<(String, String)>,
    /// Headers the signature needs.
    pub headers: Vec<String>,
}

impl GlobFuncCppInfo {
    /// `ret name(params)`.
    pub fn signature(&self, name: &str) -> String {
        let params = self
            .params
            .iter()
            .map(|(ty, param)| format!("{ty} {param}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} {name}({params})", self.return_ty)
    }
}

impl Analysis for GlobFuncCppInfo {
    type Key = FuncId;

    fn create(am: &AnalysisManager, key: &FuncId) -> Result<Self, AnalysisError> {
        let func = am.package_group().function(*key);
        let pkg = am.get::<PackageCppInfo>(&func.package)?;
        let mut headers = Vec::new();
        let mut params = Vec::with_capacity(func.params.len());
        for param in &func.params {
            let ty = am.get::<TypeCppInfo>(&param.ty)?;
            headers.extend(ty.headers.iter().cloned());
            params.push((ty.as_param.clone(), param.name.clone()));
        }
        let return_ty = match &func.return_ty {
            Some(ret) => {
                let ty = am.get::<TypeCppInfo>(ret)?;
                headers.extend(ty.headers.iter().cloned());
                ty.as_owner.clone()
            }
            None => "void".to_string(),
        };
        Ok(Self {
            namespace: pkg.namespace.clone(),
            name: func.name.clone(),
            return_ty,
            params,
            headers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use weave_decl::{PackageGroup, ScalarKind};

    #[test]
    fn nested_containers() {
        let mut pg = PackageGroup::new();
        let pkg = pg.add_package("geo.shapes").unwrap();
        let point = pg.add_struct(pkg, "Point", vec![]).unwrap();
        let am = AnalysisManager::new(Rc::new(pg));

        let ty = Type::Optional(Box::new(Type::Array(Box::new(Type::Struct(point)))));
        let info = am.get::<TypeCppInfo>(&ty).unwrap();
        assert_eq!(
            info.as_owner,
            "::weave::optional<::weave::array<::geo::shapes::Point>>"
        );
        assert_eq!(
            info.as_param,
            "::weave::optional_view<::weave::array<::geo::shapes::Point>>"
        );
        assert_eq!(
            info.headers,
            vec![
                "weave/optional.hpp",
                "weave/array.hpp",
                "geo.shapes.Point.proj.1.hpp"
            ]
        );
    }

    #[test]
    fn scalars_pass_through() {
        let am = AnalysisManager::new(Rc::new(PackageGroup::new()));
        let info = am.get::<TypeCppInfo>(&Type::Scalar(ScalarKind::U8)).unwrap();
        assert_eq!(info.as_param, "uint8_t");
        assert_eq!(info.into_abi("x"), "x");
        assert_eq!(info.from_abi("r"), "r");

        let s = am.get::<TypeCppInfo>(&Type::String).unwrap();
        assert_eq!(s.into_abi("x"), "::weave::into_abi<::weave::string_view>(x)");
        assert_eq!(s.from_abi("r"), "::weave::from_abi<::weave::string>(r)");
    }

    #[test]
    fn struct_projection() {
        let mut pg = PackageGroup::new();
        let pkg = pg.add_package("geo.shapes").unwrap();
        let point = pg.add_struct(pkg, "Point", vec![]).unwrap();
        let am = AnalysisManager::new(Rc::new(pg));
        let info = am.get::<StructCppInfo>(&point).unwrap();
        assert_eq!(info.namespace, "geo::shapes");
        assert_eq!(info.full_name, "::geo::shapes::Point");
        assert_eq!(info.decl_header, "geo.shapes.Point.proj.0.hpp");
    }
}
