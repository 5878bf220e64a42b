//! Backend orchestration for the Weave compiler.
//!
//! A [`BackendRegistry`] holds named backend descriptors with their declared
//! dependencies. A [`CompilerInstance`] resolves a requested subset into a
//! dependency-ordered plan, constructs the backends, lets them inject
//! synthetic declarations, then runs their generators against a shared
//! [`AnalysisManager`](weave_analysis::AnalysisManager) and
//! [`OutputManager`](weave_output::OutputManager).

#![warn(missing_docs)]

pub mod backend;
pub mod error;
pub mod instance;
pub mod registry;

pub use backend::{Backend, BackendDescriptor, BackendOptions, CompilerContext, OptionValue};
pub use error::{CompileError, DriverError};
pub use instance::{CompilerInstance, CompilerOptions, CompilerState, RunSummary};
pub use registry::BackendRegistry;
