//! Memoized analyses over the declaration graph.
//!
//! An [`Analysis`] is a derived fact about a declaration: a mangled symbol, a
//! header path, the spelling of a type in some target language. The
//! [`AnalysisManager`] computes each `(analysis, key)` pair at most once per
//! run and hands out the same `Rc` to every caller, so independent backends
//! that ask the same question observe identical generated names.

#![warn(missing_docs)]

pub mod error;
pub mod manager;

pub use error::AnalysisError;
pub use manager::{Analysis, AnalysisManager, CacheStats};
