//! Shared foundational types used across the Weave bindings compiler.
//!
//! This crate provides interned identifiers, content hashing, and the
//! internal error type shared by every other crate.

#![warn(missing_docs)]

pub mod hash;
pub mod ident;
pub mod result;

pub use hash::ContentHash;
pub use ident::{Ident, Interner};
pub use result::InternalError;
