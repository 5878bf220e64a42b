//! The read-only declaration graph that code generation operates over.
//!
//! A [`PackageGroup`] owns arenas of packages, global functions, structs and
//! enums. Declarations refer to each other through copyable IDs, which makes
//! them cheap, hashable analysis keys. The [`loader`] module reads TOML
//! declaration files into a group.

#![warn(missing_docs)]

pub mod arena;
pub mod decl;
pub mod error;
pub mod ids;
pub mod loader;
pub mod types;

pub use arena::{Arena, ArenaId};
pub use decl::{
    EnumDecl, EnumItemDecl, GlobFuncDecl, PackageDecl, PackageGroup, ParamDecl, StructDecl,
    StructFieldDecl,
};
pub use error::DeclError;
pub use ids::{EnumId, FuncId, PackageId, StructId};
pub use loader::{load_dirs, load_package_file, load_package_str, resolve_type};
pub use types::{ScalarKind, Type};
