//! Declarations and the package group that owns them.

use std::collections::HashMap;

use crate::arena::Arena;
use crate::error::DeclError;
use crate::ids::{EnumId, FuncId, PackageId, StructId};
use crate::types::Type;

/// A package: a dotted name plus the declarations it contains, in source order.
#[derive(Debug, Clone)]
pub struct PackageDecl {
    /// The dotted package name, e.g. `geo.shapes`.
    pub name: String,
    /// The package name split on `.`.
    pub segments: Vec<String>,
    /// Global functions in declaration order.
    pub functions: Vec<FuncId>,
    /// Structs in declaration order.
    pub structs: Vec<StructId>,
    /// Enums in declaration order.
    pub enums: Vec<EnumId>,
    /// `true` if the package was injected by a backend rather than loaded.
    pub synthetic: bool,
    members: HashMap<String, Member>,
}

#[derive(Debug, Clone, Copy)]
enum Member {
    Func,
    Struct(StructId),
    Enum(EnumId),
}

/// A package-level function.
#[derive(Debug, Clone)]
pub struct GlobFuncDecl {
    /// The function name.
    pub name: String,
    /// The owning package.
    pub package: PackageId,
    /// Parameters in declaration order.
    pub params: Vec<ParamDecl>,
    /// The return type, or `None` for `void`.
    pub return_ty: Option<Type>,
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDecl {
    /// The parameter name.
    pub name: String,
    /// The parameter type.
    pub ty: Type,
}

impl ParamDecl {
    /// Creates a parameter.
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A struct declaration.
#[derive(Debug, Clone)]
pub struct StructDecl {
    /// The struct name.
    pub name: String,
    /// The owning package.
    pub package: PackageId,
    /// Fields in declaration order.
    pub fields: Vec<StructFieldDecl>,
}

/// A struct field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructFieldDecl {
    /// The field name.
    pub name: String,
    /// The field type.
    pub ty: Type,
}

impl StructFieldDecl {
    /// Creates a field.
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// An enum declaration with integer-valued items.
#[derive(Debug, Clone)]
pub struct EnumDecl {
    /// The enum name.
    pub name: String,
    /// The owning package.
    pub package: PackageId,
    /// Items in declaration order.
    pub items: Vec<EnumItemDecl>,
}

/// A single enum item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumItemDecl {
    /// The item name.
    pub name: String,
    /// The item value.
    pub value: i64,
}

/// The complete declaration graph for one compilation.
///
/// The group is mutable while it is being loaded and while backends inject
/// synthetic packages; after that the driver freezes it behind an `Rc` and
/// every analysis reads it immutably.
#[derive(Debug, Clone, Default)]
pub struct PackageGroup {
    packages: Arena<PackageId, PackageDecl>,
    functions: Arena<FuncId, GlobFuncDecl>,
    structs: Arena<StructId, StructDecl>,
    enums: Arena<EnumId, EnumDecl>,
    by_name: HashMap<String, PackageId>,
}

impl PackageGroup {
    /// Creates an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a package loaded from a declaration file.
    pub fn add_package(&mut self, name: &str) -> Result<PackageId, DeclError> {
        self.insert_package(name, false)
    }

    /// Adds a package injected by a backend.
    pub fn add_synthetic_package(&mut self, name: &str) -> Result<PackageId, DeclError> {
        self.insert_package(name, true)
    }

    fn insert_package(&mut self, name: &str, synthetic: bool) -> Result<PackageId, DeclError> {
        let segments: Vec<String> = name.split('.').map(str::to_string).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(DeclError::InvalidPackageName(name.to_string()));
        }
        if self.by_name.contains_key(name) {
            return Err(DeclError::DuplicatePackage(name.to_string()));
        }
        let id = self.packages.alloc(PackageDecl {
            name: name.to_string(),
            segments,
            functions: Vec::new(),
            structs: Vec::new(),
            enums: Vec::new(),
            synthetic,
            members: HashMap::new(),
        });
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    fn claim_name(&mut self, pkg: PackageId, name: &str, member: Member) -> Result<(), DeclError> {
        let package = self.package_mut(pkg);
        if package.members.contains_key(name) {
            return Err(DeclError::DuplicateDecl {
                package: package.name.clone(),
                name: name.to_string(),
            });
        }
        package.members.insert(name.to_string(), member);
        Ok(())
    }

    /// Adds a struct to a package. Fields may be filled in later with
    /// [`set_struct_fields`](Self::set_struct_fields) so that structs can
    /// refer to each other regardless of declaration order.
    pub fn add_struct(
        &mut self,
        pkg: PackageId,
        name: &str,
        fields: Vec<StructFieldDecl>,
    ) -> Result<StructId, DeclError> {
        let id = StructId::from_raw(self.structs.len() as u32);
        self.claim_name(pkg, name, Member::Struct(id))?;
        self.structs.alloc(StructDecl {
            name: name.to_string(),
            package: pkg,
            fields,
        });
        self.package_mut(pkg).structs.push(id);
        Ok(id)
    }

    /// Replaces the fields of a struct.
    pub fn set_struct_fields(&mut self, id: StructId, fields: Vec<StructFieldDecl>) {
        if let Some(decl) = self.structs.get_mut(id) {
            decl.fields = fields;
        }
    }

    /// Adds an enum to a package.
    pub fn add_enum(
        &mut self,
        pkg: PackageId,
        name: &str,
        items: Vec<EnumItemDecl>,
    ) -> Result<EnumId, DeclError> {
        let id = EnumId::from_raw(self.enums.len() as u32);
        self.claim_name(pkg, name, Member::Enum(id))?;
        self.enums.alloc(EnumDecl {
            name: name.to_string(),
            package: pkg,
            items,
        });
        self.package_mut(pkg).enums.push(id);
        Ok(id)
    }

    /// Adds a global function to a package.
    pub fn add_function(
        &mut self,
        pkg: PackageId,
        name: &str,
        params: Vec<ParamDecl>,
        return_ty: Option<Type>,
    ) -> Result<FuncId, DeclError> {
        self.claim_name(pkg, name, Member::Func)?;
        let id = self.functions.alloc(GlobFuncDecl {
            name: name.to_string(),
            package: pkg,
            params,
            return_ty,
        });
        self.package_mut(pkg).functions.push(id);
        Ok(id)
    }

    fn package_mut(&mut self, id: PackageId) -> &mut PackageDecl {
        self.packages
            .get_mut(id)
            .unwrap_or_else(|| panic!("package {id:?} does not belong to this group"))
    }

    /// Iterates over packages in the order they were added.
    pub fn packages(&self) -> impl Iterator<Item = (PackageId, &PackageDecl)> {
        self.packages.iter()
    }

    /// Returns the number of packages.
    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    /// Looks up a package by its dotted name.
    pub fn lookup_package(&self, name: &str) -> Option<PackageId> {
        self.by_name.get(name).copied()
    }

    /// Resolves a user type name declared in `pkg`.
    pub fn lookup_type(&self, pkg: PackageId, name: &str) -> Option<Type> {
        match self.packages.get(pkg)?.members.get(name)? {
            Member::Struct(id) => Some(Type::Struct(*id)),
            Member::Enum(id) => Some(Type::Enum(*id)),
            Member::Func => None,
        }
    }

    /// Returns a package.
    ///
    /// # Panics
    ///
    /// Panics if the ID was not issued by this group.
    pub fn package(&self, id: PackageId) -> &PackageDecl {
        &self.packages[id]
    }

    /// Returns a global function.
    ///
    /// # Panics
    ///
    /// Panics if the ID was not issued by this group.
    pub fn function(&self, id: FuncId) -> &GlobFuncDecl {
        &self.functions[id]
    }

    /// Returns a struct declaration.
    ///
    /// # Panics
    ///
    /// Panics if the ID was not issued by this group.
    pub fn struct_decl(&self, id: StructId) -> &StructDecl {
        &self.structs[id]
    }

    /// Returns an enum declaration.
    ///
    /// # Panics
    ///
    /// Panics if the ID was not issued by this group.
    pub fn enum_decl(&self, id: EnumId) -> &EnumDecl {
        &self.enums[id]
    }

    /// Spells a type the way declaration files write it.
    pub fn type_spelling(&self, ty: &Type) -> String {
        match ty {
            Type::Scalar(kind) => kind.name().to_string(),
            Type::String => "String".to_string(),
            Type::Struct(id) => self.struct_decl(*id).name.clone(),
            Type::Enum(id) => self.enum_decl(*id).name.clone(),
            Type::Array(inner) => format!("Array<{}>", self.type_spelling(inner)),
            Type::Optional(inner) => format!("Optional<{}>", self.type_spelling(inner)),
        }
    }
}
