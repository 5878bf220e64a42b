//! Writer variants, one per [`FileKind`].

use crate::directives::DirectiveSet;
use crate::kind::FileKind;
use crate::writer::{Buffer, OutputWriter, BANNER};

fn include_directive(header: &str) -> String {
    if header.starts_with('<') {
        format!("#include {header}")
    } else {
        format!("#include \"{header}\"")
    }
}

fn c_family_prologue(kind: FileKind, directives: &DirectiveSet) -> Vec<String> {
    let mut lines = vec![BANNER.to_string()];
    if kind.accumulates() {
        lines.push("#pragma once".to_string());
    }
    lines.extend(directives.iter().map(str::to_string));
    lines.push(String::new());
    if kind == FileKind::CHeader {
        lines.extend(
            ["#ifdef __cplusplus", "extern \"C\" {", "#endif", ""].map(str::to_string),
        );
    }
    lines
}

fn c_family_epilogue(kind: FileKind) -> Vec<String> {
    if kind == FileKind::CHeader {
        ["", "#ifdef __cplusplus", "}", "#endif"].map(str::to_string).to_vec()
    } else {
        Vec::new()
    }
}

macro_rules! c_family_writer {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name {
            buffer: Buffer,
        }

        impl $name {
            /// Adds `#include "header"` (or `#include <header>` when the name
            /// is given in angle brackets). Repeats are no-ops.
            pub fn add_include(&mut self, header: &str) -> bool {
                self.buffer.add_directive(include_directive(header))
            }

            /// Adds several includes in order.
            pub fn add_includes<I, S>(&mut self, headers: I)
            where
                I: IntoIterator<Item = S>,
                S: AsRef<str>,
            {
                for header in headers {
                    self.add_include(header.as_ref());
                }
            }
        }

        impl OutputWriter for $name {
            const KIND: FileKind = $kind;

            fn from_buffer(buffer: Buffer) -> Self {
                Self { buffer }
            }

            fn into_buffer(self) -> Buffer {
                self.buffer
            }

            fn buffer(&self) -> &Buffer {
                &self.buffer
            }

            fn buffer_mut(&mut self) -> &mut Buffer {
                &mut self.buffer
            }

            fn prologue(directives: &DirectiveSet) -> Vec<String> {
                c_family_prologue(Self::KIND, directives)
            }

            fn epilogue() -> Vec<String> {
                c_family_epilogue(Self::KIND)
            }
        }
    };
}

c_family_writer!(
    /// Writes a C header, wrapped in an `extern "C"` guard.
    CHeaderWriter,
    FileKind::CHeader
);
c_family_writer!(
    /// Writes a C source file.
    CSourceWriter,
    FileKind::CSource
);
c_family_writer!(
    /// Writes a C++ header.
    CppHeaderWriter,
    FileKind::CppHeader
);
c_family_writer!(
    /// Writes a C++ source file.
    CppSourceWriter,
    FileKind::CppSource
);

/// Writes an ArkTS module.
#[derive(Debug)]
pub struct StsWriter {
    buffer: Buffer,
}

impl StsWriter {
    /// Adds `import * as alias from "module";`. Repeats are no-ops.
    pub fn import_module(&mut self, alias: &str, module: &str) -> bool {
        self.buffer
            .add_directive(format!("import * as {alias} from \"{module}\";"))
    }
}

impl OutputWriter for StsWriter {
    const KIND: FileKind = FileKind::ArkTs;

    fn from_buffer(buffer: Buffer) -> Self {
        Self { buffer }
    }

    fn into_buffer(self) -> Buffer {
        self.buffer
    }

    fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    fn buffer_mut(&mut self) -> &mut Buffer {
        &mut self.buffer
    }

    fn prologue(directives: &DirectiveSet) -> Vec<String> {
        let mut lines = vec![BANNER.to_string()];
        lines.extend(directives.iter().map(str::to_string));
        lines.push(String::new());
        lines
    }
}

/// Writes plain text with no prologue.
#[derive(Debug)]
pub struct TextWriter {
    buffer: Buffer,
}

impl OutputWriter for TextWriter {
    const KIND: FileKind = FileKind::Text;

    fn from_buffer(buffer: Buffer) -> Self {
        Self { buffer }
    }

    fn into_buffer(self) -> Buffer {
        self.buffer
    }

    fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    fn buffer_mut(&mut self) -> &mut Buffer {
        &mut self.buffer
    }

    fn prologue(_directives: &DirectiveSet) -> Vec<String> {
        Vec::new()
    }
}
