//! Scoped, buffered emission of generated files.
//!
//! Backends never write to disk directly. They open a writer for a relative
//! output path through [`OutputManager::write`], append body lines and
//! directives (includes, imports), and the manager commits the file when the
//! scope closes. The prologue is rendered from the accumulated directives only
//! at commit time, because directives are discovered while the body is being
//! written.

#![warn(missing_docs)]

pub mod directives;
pub mod error;
pub mod kind;
pub mod manager;
pub mod manifest;
pub mod writer;
pub mod writers;

pub use directives::DirectiveSet;
pub use error::OutputError;
pub use kind::FileKind;
pub use manager::{FlushReport, OutputManager};
pub use manifest::OutputManifest;
pub use writer::{Buffer, OutputWriter};
pub use writers::{
    CHeaderWriter, CSourceWriter, CppHeaderWriter, CppSourceWriter, StsWriter, TextWriter,
};
