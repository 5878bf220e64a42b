//! Loading of TOML declaration files into a [`PackageGroup`].
//!
//! One file declares one package:
//!
//! ```toml
//! [package]
//! name = "geo"
//!
//! [[structs]]
//! name = "Point"
//! fields = [{ name = "x", ty = "f64" }, { name = "y", ty = "f64" }]
//!
//! [[enums]]
//! name = "Color"
//! items = ["Red", { name = "Blue", value = 4 }]
//!
//! [[functions]]
//! name = "norm"
//! params = [{ name = "p", ty = "Point" }]
//! returns = "f64"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::decl::{EnumItemDecl, PackageGroup, ParamDecl, StructFieldDecl};
use crate::error::DeclError;
use crate::ids::PackageId;
use crate::types::{ScalarKind, Type};

/// File extension of declaration files.
const DECL_EXT: &str = "toml";

#[derive(Debug, Deserialize)]
struct PackageFile {
    package: PackageHeader,
    #[serde(default)]
    structs: Vec<StructEntry>,
    #[serde(default)]
    enums: Vec<EnumEntry>,
    #[serde(default)]
    functions: Vec<FunctionEntry>,
}

#[derive(Debug, Deserialize)]
struct PackageHeader {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TypedName {
    name: String,
    ty: String,
}

#[derive(Debug, Deserialize)]
struct StructEntry {
    name: String,
    #[serde(default)]
    fields: Vec<TypedName>,
}

#[derive(Debug, Deserialize)]
struct EnumEntry {
    name: String,
    #[serde(default)]
    items: Vec<EnumItemEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EnumItemEntry {
    Named(String),
    Valued { name: String, value: i64 },
}

#[derive(Debug, Deserialize)]
struct FunctionEntry {
    name: String,
    #[serde(default)]
    params: Vec<TypedName>,
    returns: Option<String>,
}

/// Loads every `*.toml` declaration file found (recursively) under the given
/// directories. Files are processed in sorted path order so package order is
/// stable across runs.
pub fn load_dirs(dirs: &[PathBuf]) -> Result<PackageGroup, DeclError> {
    let mut files = Vec::new();
    for dir in dirs {
        walk_dir(dir, &mut files)?;
    }
    files.sort();
    files.dedup();

    let mut pg = PackageGroup::new();
    for file in &files {
        load_package_file(&mut pg, file)?;
    }
    tracing::debug!(
        files = files.len(),
        packages = pg.package_count(),
        "loaded declaration files"
    );
    Ok(pg)
}

fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), DeclError> {
    let entries = std::fs::read_dir(dir).map_err(|e| DeclError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;
    let io_error = |e| DeclError::Io {
        path: dir.to_path_buf(),
        source: e,
    };
    for entry in entries {
        let entry = entry.map_err(io_error)?;
        let file_type = entry.file_type().map_err(io_error)?;
        let path = entry.path();
        if file_type.is_dir() {
            walk_dir(&path, files)?;
        } else if file_type.is_symlink() && path.is_dir() {
            // Linked directories may point back up the tree.
            tracing::debug!(path = %path.display(), "skipping symlinked directory");
        } else if path.extension().and_then(|e| e.to_str()) == Some(DECL_EXT) {
            files.push(path);
        }
    }
    Ok(())
}

/// Loads a single declaration file into `pg`.
pub fn load_package_file(pg: &mut PackageGroup, path: &Path) -> Result<PackageId, DeclError> {
    let content = std::fs::read_to_string(path).map_err(|e| DeclError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    load_package_str(pg, &content)
}

/// Parses a declaration file from a string and adds its package to `pg`.
///
/// Structs and enums are declared before any type spelling is resolved, so
/// declarations may refer to types declared later in the same file.
pub fn load_package_str(pg: &mut PackageGroup, content: &str) -> Result<PackageId, DeclError> {
    let file: PackageFile =
        toml::from_str(content).map_err(|e| DeclError::Parse(e.to_string()))?;
    let pkg = pg.add_package(&file.package.name)?;

    let mut struct_ids = Vec::with_capacity(file.structs.len());
    for entry in &file.structs {
        struct_ids.push(pg.add_struct(pkg, &entry.name, Vec::new())?);
    }
    for entry in &file.enums {
        pg.add_enum(pkg, &entry.name, number_items(&entry.items))?;
    }

    for (entry, id) in file.structs.iter().zip(struct_ids) {
        let fields = entry
            .fields
            .iter()
            .map(|f| Ok(StructFieldDecl::new(&f.name, resolve_type(pg, pkg, &f.ty)?)))
            .collect::<Result<Vec<_>, DeclError>>()?;
        pg.set_struct_fields(id, fields);
    }

    for entry in &file.functions {
        let params = entry
            .params
            .iter()
            .map(|p| Ok(ParamDecl::new(&p.name, resolve_type(pg, pkg, &p.ty)?)))
            .collect::<Result<Vec<_>, DeclError>>()?;
        let return_ty = entry
            .returns
            .as_deref()
            .map(|ty| resolve_type(pg, pkg, ty))
            .transpose()?;
        pg.add_function(pkg, &entry.name, params, return_ty)?;
    }

    Ok(pkg)
}

/// Items without an explicit value take the previous value plus one, starting at zero.
fn number_items(items: &[EnumItemEntry]) -> Vec<EnumItemDecl> {
    let mut next = 0i64;
    items
        .iter()
        .map(|item| {
            let (name, value) = match item {
                EnumItemEntry::Named(name) => (name.clone(), next),
                EnumItemEntry::Valued { name, value } => (name.clone(), *value),
            };
            next = value.wrapping_add(1);
            EnumItemDecl { name, value }
        })
        .collect()
}

/// Resolves a type spelling against builtins and the declarations of `pkg`.
pub fn resolve_type(pg: &PackageGroup, pkg: PackageId, spelling: &str) -> Result<Type, DeclError> {
    let s = spelling.trim();
    if let Some(inner) = strip_generic(s, "Array") {
        return Ok(Type::Array(Box::new(resolve_type(pg, pkg, inner)?)));
    }
    if let Some(inner) = strip_generic(s, "Optional") {
        return Ok(Type::Optional(Box::new(resolve_type(pg, pkg, inner)?)));
    }
    if s == "String" {
        return Ok(Type::String);
    }
    if let Some(kind) = ScalarKind::from_name(s) {
        return Ok(Type::Scalar(kind));
    }
    pg.lookup_type(pkg, s).ok_or_else(|| DeclError::UnknownType {
        package: pg.package(pkg).name.clone(),
        ty: s.to_string(),
    })
}

fn strip_generic<'a>(s: &'a str, head: &str) -> Option<&'a str> {
    s.strip_prefix(head)?
        .trim_start()
        .strip_prefix('<')?
        .strip_suffix('>')
}

#[cfg(test)]
mod tests {
    use super::*;

    const GEO: &str = r#"
[package]
name = "geo"

[[functions]]
name = "norm"
params = [{ name = "p", ty = "Point" }]
returns = "f64"

[[structs]]
name = "Point"
fields = [{ name = "x", ty = "f64" }, { name = "y", ty = "f64" }]

[[enums]]
name = "Color"
items = ["Red", "Green", { name = "Blue", value = 10 }, "Cyan"]
"#;

    #[test]
    fn load_full_package() {
        let mut pg = PackageGroup::new();
        let pkg = load_package_str(&mut pg, GEO).unwrap();
        let package = pg.package(pkg);
        assert_eq!(package.name, "geo");
        assert_eq!(package.functions.len(), 1);
        assert_eq!(package.structs.len(), 1);

        let norm = pg.function(package.functions[0]);
        assert_eq!(norm.params[0].ty, Type::Struct(package.structs[0]));
        assert_eq!(norm.return_ty, Some(Type::Scalar(ScalarKind::F64)));

        let point = pg.struct_decl(package.structs[0]);
        assert_eq!(point.fields.len(), 2);
    }

    #[test]
    fn enum_items_are_numbered() {
        let mut pg = PackageGroup::new();
        let pkg = load_package_str(&mut pg, GEO).unwrap();
        let color = pg.enum_decl(pg.package(pkg).enums[0]);
        let values: Vec<i64> = color.items.iter().map(|i| i.value).collect();
        assert_eq!(values, vec![0, 1, 10, 11]);
    }

    #[test]
    fn generic_spellings() {
        let mut pg = PackageGroup::new();
        let pkg = pg.add_package("p").unwrap();
        let ty = resolve_type(&pg, pkg, "Optional<Array<String>>").unwrap();
        assert_eq!(
            ty,
            Type::Optional(Box::new(Type::Array(Box::new(Type::String))))
        );
        let ty = resolve_type(&pg, pkg, " Array < u8 > ").unwrap();
        assert_eq!(ty, Type::Array(Box::new(Type::Scalar(ScalarKind::U8))));
    }

    #[test]
    fn unknown_type_errors() {
        let mut pg = PackageGroup::new();
        let err = load_package_str(
            &mut pg,
            r#"
[package]
name = "p"

[[functions]]
name = "f"
params = [{ name = "x", ty = "Missing" }]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, DeclError::UnknownType { .. }));
    }

    #[test]
    fn invalid_toml_errors() {
        let mut pg = PackageGroup::new();
        let err = load_package_str(&mut pg, "not toml {{").unwrap_err();
        assert!(matches!(err, DeclError::Parse(_)));
    }

    #[test]
    fn load_dirs_sorted_and_recursive() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("nested")).unwrap();
        std::fs::write(
            dir.path().join("nested/b.toml"),
            "[package]\nname = \"b\"\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("a.toml"), "[package]\nname = \"a\"\n").unwrap();
        std::fs::write(dir.path().join("notes.md"), "ignored").unwrap();

        let pg = load_dirs(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<&str> = pg.packages().map(|(_, p)| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[cfg(unix)]
    #[test]
    fn directory_links_back_up_the_tree_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("b.toml"), "[package]\nname = \"b\"\n").unwrap();
        std::os::unix::fs::symlink(dir.path(), nested.join("loop")).unwrap();

        let pg = load_dirs(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<&str> = pg.packages().map(|(_, p)| p.name.as_str()).collect();
        assert_eq!(names, vec!["b"]);
    }

    #[test]
    fn missing_dir_is_io_error() {
        let err = load_dirs(&[PathBuf::from("/nonexistent/idl")]).unwrap_err();
        assert!(matches!(err, DeclError::Io { .. }));
    }
}
