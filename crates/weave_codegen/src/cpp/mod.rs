//! C++ projections.
//!
//! `cpp-common` maps every struct and enum to a C++ type and tells the
//! runtime how each one crosses the ABI. `cpp-user` builds inline wrappers
//! for calling a package from C++; `cpp-author` builds export macros for
//! implementing one.

mod analyses;
mod author;
mod common;
mod user;

pub use analyses::{
    EnumCppInfo, GlobFuncCppInfo, PackageCppInfo, StructCppInfo, TypeCppInfo,
};
pub use author::{CppAuthorBackend, GlobFuncCppImplInfo, PackageCppImplInfo};
pub use common::CppCommonBackend;
pub use user::{CppUserBackend, PackageCppUserInfo};
