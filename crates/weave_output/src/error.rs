//! Error types for output management.

use std::path::PathBuf;

use crate::kind::FileKind;

/// Errors raised while opening, committing or flushing output files.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// The path is already open in an enclosing writer scope.
    #[error("output '{0}' is already open")]
    AlreadyOpen(String),

    /// A single-writer file was opened a second time.
    #[error("output '{0}' was already generated in this run")]
    DuplicateOutput(String),

    /// A file was reopened with a different kind.
    #[error("output '{path}' is a {existing}, cannot reopen it as a {requested}")]
    KindMismatch {
        /// The output path.
        path: String,
        /// The kind it was first written as.
        existing: FileKind,
        /// The kind requested now.
        requested: FileKind,
    },

    /// The path is empty, absolute, or escapes the output root.
    #[error("invalid output path '{0}'")]
    InvalidPath(String),

    /// A filesystem operation failed during flush.
    #[error("output I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The output manifest could not be serialized.
    #[error("failed to write output manifest: {0}")]
    Manifest(String),
}
