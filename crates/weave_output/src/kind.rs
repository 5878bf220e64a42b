//! Kinds of generated files.

use std::fmt;

/// The emitted-language convention of an output file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum FileKind {
    /// A C header (`.h`).
    CHeader,
    /// A C source file (`.c`).
    CSource,
    /// A C++ header (`.hpp`).
    CppHeader,
    /// A C++ source file (`.cpp`).
    CppSource,
    /// An ArkTS module (`.ets`).
    ArkTs,
    /// Plain text with no prologue.
    Text,
}

impl FileKind {
    /// Whether reopening a committed file of this kind appends to it.
    ///
    /// Headers accumulate so that several generators can contribute to one
    /// header; every other kind has single-writer semantics.
    pub fn accumulates(self) -> bool {
        matches!(self, FileKind::CHeader | FileKind::CppHeader)
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileKind::CHeader => "C header",
            FileKind::CSource => "C source",
            FileKind::CppHeader => "C++ header",
            FileKind::CppSource => "C++ source",
            FileKind::ArkTs => "ArkTS module",
            FileKind::Text => "text",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_headers_accumulate() {
        assert!(FileKind::CHeader.accumulates());
        assert!(FileKind::CppHeader.accumulates());
        assert!(!FileKind::CSource.accumulates());
        assert!(!FileKind::ArkTs.accumulates());
        assert!(!FileKind::Text.accumulates());
    }

    #[test]
    fn display() {
        assert_eq!(FileKind::CppHeader.to_string(), "C++ header");
    }
}
