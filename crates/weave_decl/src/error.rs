//! Error types for building and loading the declaration graph.

use std::path::PathBuf;

/// Errors raised while building a [`PackageGroup`](crate::PackageGroup).
#[derive(Debug, thiserror::Error)]
pub enum DeclError {
    /// A declaration file could not be read.
    #[error("failed to read declaration file {path}: {source}")]
    Io {
        /// The file or directory that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A declaration file is not valid TOML or does not match the schema.
    #[error("failed to parse declaration file: {0}")]
    Parse(String),

    /// Two packages share a name.
    #[error("duplicate package '{0}'")]
    DuplicatePackage(String),

    /// Two declarations in the same package share a name.
    #[error("duplicate declaration '{name}' in package '{package}'")]
    DuplicateDecl {
        /// The package containing the clash.
        package: String,
        /// The clashing declaration name.
        name: String,
    },

    /// A type spelling names neither a builtin nor a declaration of the package.
    #[error("unknown type '{ty}' in package '{package}'")]
    UnknownType {
        /// The package in which the spelling was resolved.
        package: String,
        /// The offending spelling.
        ty: String,
    },

    /// A package name is empty or has an empty segment.
    #[error("invalid package name '{0}'")]
    InvalidPackageName(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unknown_type() {
        let err = DeclError::UnknownType {
            package: "geo".to_string(),
            ty: "Pointt".to_string(),
        };
        assert_eq!(err.to_string(), "unknown type 'Pointt' in package 'geo'");
    }

    #[test]
    fn display_duplicate_decl() {
        let err = DeclError::DuplicateDecl {
            package: "geo".to_string(),
            name: "Point".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "duplicate declaration 'Point' in package 'geo'"
        );
    }

    #[test]
    fn display_io() {
        let err = DeclError::Io {
            path: PathBuf::from("idl/geo.toml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("idl/geo.toml"));
    }
}
