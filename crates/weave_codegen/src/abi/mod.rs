//! The C ABI layer every other binding is built on.
//!
//! `abi-header` declares one exported symbol per global function and one C
//! struct per declared struct; `abi-source` provides weak fallback
//! definitions so that a partially implemented package still links.

mod analyses;
mod header;
mod source;

pub use analyses::{
    c_scalar, EnumAbiInfo, GlobFuncAbiInfo, PackageAbiInfo, StructAbiInfo, TypeAbiInfo,
};
pub use header::AbiHeaderBackend;
pub use source::AbiSourceBackend;
