//! ABI-level names and type spellings.

use weave_analysis::{Analysis, AnalysisError, AnalysisManager};
use weave_decl::{EnumId, FuncId, PackageId, ScalarKind, StructId, Type};

use crate::mangle::{encode, DeclKind};

/// The C spelling of a scalar.
pub fn c_scalar(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::Bool => "bool",
        ScalarKind::I8 => "int8_t",
        ScalarKind::I16 => "int16_t",
        ScalarKind::I32 => "int32_t",
        ScalarKind::I64 => "int64_t",
        ScalarKind::U8 => "uint8_t",
        ScalarKind::U16 => "uint16_t",
        ScalarKind::U32 => "uint32_t",
        ScalarKind::U64 => "uint64_t",
        ScalarKind::F32 => "float",
        ScalarKind::F64 => "double",
    }
}

/// File names of a package's ABI layer.
#[derive(Debug)]
pub struct PackageAbiInfo {
    /// `<pkg>.abi.h`
    pub header: String,
    /// `<pkg>.abi.c`
    pub source: String,
}

impl Analysis for PackageAbiInfo {
    type Key = PackageId;

    fn create(am: &AnalysisManager, key: &PackageId) -> Result<Self, AnalysisError> {
        let pkg = am.package_group().package(*key);
        Ok(Self {
            header: format!("{}.abi.h", pkg.name),
            source: format!("{}.abi.c", pkg.name),
        })
    }
}

/// The C view of a struct.
#[derive(Debug)]
pub struct StructAbiInfo {
    /// Header with the forward declaration.
    pub decl_header: String,
    /// Header with the full definition.
    pub defn_header: String,
    /// The C struct tag.
    pub mangled_name: String,
    /// Spelling as a field or return value.
    pub as_owner: String,
    /// Spelling as a parameter.
    pub as_param: String,
}

impl Analysis for StructAbiInfo {
    type Key = StructId;

    fn create(am: &AnalysisManager, key: &StructId) -> Result<Self, AnalysisError> {
        let pg = am.package_group();
        let decl = pg.struct_decl(*key);
        let pkg = pg.package(decl.package);
        let mut segments = pkg.segments.clone();
        segments.push(decl.name.clone());
        let mangled_name = encode(&segments, DeclKind::Type);
        Ok(Self {
            decl_header: format!("{}.{}.abi.0.h", pkg.name, decl.name),
            defn_header: format!("{}.{}.abi.1.h", pkg.name, decl.name),
            as_owner: format!("struct {mangled_name}"),
            as_param: format!("struct {mangled_name} const*"),
            mangled_name,
        })
    }
}

/// The C view of an enum: its underlying integer type.
#[derive(Debug)]
pub struct EnumAbiInfo {
    /// The integer type values travel as.
    pub abi_type: &'static str,
}

impl Analysis for EnumAbiInfo {
    type Key = EnumId;

    fn create(_am: &AnalysisManager, _key: &EnumId) -> Result<Self, AnalysisError> {
        Ok(Self { abi_type: "int32_t" })
    }
}

/// How a type is spelled and which headers it needs at the ABI level.
#[derive(Debug)]
pub struct TypeAbiInfo {
    /// Headers needed to mention the type by pointer.
    pub decl_headers: Vec<String>,
    /// Headers needed to use the type by value.
    pub defn_headers: Vec<String>,
    /// Spelling as a field or return value.
    pub as_owner: String,
    /// Spelling as a parameter.
    pub as_param: String,
}

impl TypeAbiInfo {
    fn plain(spelling: &str) -> Self {
        Self {
            decl_headers: Vec::new(),
            defn_headers: Vec::new(),
            as_owner: spelling.to_string(),
            as_param: spelling.to_string(),
        }
    }

    fn runtime(header: &str, spelling: &str) -> Self {
        Self {
            decl_headers: vec![header.to_string()],
            defn_headers: vec![header.to_string()],
            as_owner: spelling.to_string(),
            as_param: spelling.to_string(),
        }
    }
}

impl Analysis for TypeAbiInfo {
    type Key = Type;

    fn create(am: &AnalysisManager, key: &Type) -> Result<Self, AnalysisError> {
        Ok(match key {
            Type::Scalar(kind) => Self::plain(c_scalar(*kind)),
            Type::String => Self::runtime("weave/string.abi.h", "struct WString"),
            Type::Array(_) => Self::runtime("weave/array.abi.h", "struct WArray"),
            Type::Optional(_) => Self::runtime("weave/optional.abi.h", "struct WOptional"),
            Type::Enum(id) => Self::plain(am.get::<EnumAbiInfo>(id)?.abi_type),
            Type::Struct(id) => {
                let info = am.get::<StructAbiInfo>(id)?;
                Self {
                    decl_headers: vec![info.decl_header.clone()],
                    defn_headers: vec![info.defn_header.clone()],
                    as_owner: info.as_owner.clone(),
                    as_param: info.as_param.clone(),
                }
            }
        })
    }
}

/// The exported C symbol of a global function and its prototype.
#[derive(Debug)]
pub struct GlobFuncAbiInfo {
    /// The exported symbol.
    pub mangled_name: String,
    /// C return type, `void` when the function returns nothing.
    pub return_ty: String,
    /// `(type, name)` per parameter.
    pub params: Vec<(String, String)>,
    /// Headers the prototype needs, in first-use order.
    pub headers: Vec<String>,
}

impl GlobFuncAbiInfo {
    /// `ret name(params)`, with `void` for an empty parameter list.
    pub fn prototype(&self) -> String {
        self.prototype_named(&self.mangled_name)
    }

    /// The same signature under another name.
    pub fn prototype_named(&self, name: &str) -> String {
        format!("{} {name}({})", self.return_ty, self.param_list())
    }

    /// `type name, ...`, or `void`.
    pub fn param_list(&self) -> String {
        if self.params.is_empty() {
            return "void".to_string();
        }
        self.params
            .iter()
            .map(|(ty, name)| format!("{ty} {name}"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Parameter names, comma separated.
    pub fn arg_list(&self) -> String {
        self.params
            .iter()
            .map(|(_, name)| name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `true` if the function returns nothing.
    pub fn returns_void(&self) -> bool {
        self.return_ty == "void"
    }
}

impl Analysis for GlobFuncAbiInfo {
    type Key = FuncId;

    fn create(am: &AnalysisManager, key: &FuncId) -> Result<Self, AnalysisError> {
        let pg = am.package_group();
        let func = pg.function(*key);
        let mut segments = pg.package(func.package).segments.clone();
        segments.push(func.name.clone());

        let mut headers: Vec<String> = Vec::new();
        let mut params = Vec::with_capacity(func.params.len());
        for param in &func.params {
            let ty = am.get::<TypeAbiInfo>(&param.ty)?;
            headers.extend(ty.defn_headers.iter().cloned());
            params.push((ty.as_param.clone(), param.name.clone()));
        }
        let return_ty = match &func.return_ty {
            Some(ret) => {
                let ty = am.get::<TypeAbiInfo>(ret)?;
                headers.extend(ty.defn_headers.iter().cloned());
                ty.as_owner.clone()
            }
            None => "void".to_string(),
        };
        Ok(Self {
            mangled_name: encode(&segments, DeclKind::Func),
            return_ty,
            params,
            headers,
        })
    }
}
