//! The writer core shared by every output variant.

use crate::directives::DirectiveSet;
use crate::kind::FileKind;

/// First line of every generated code file.
pub const BANNER: &str = "// Generated by weave. Do not edit.";

const INDENT_UNIT: &str = "    ";

/// The mutable state of one open output file: its directives, body lines and
/// current indentation depth.
///
/// Body lines are stored already indented; the prologue is not part of the
/// buffer and is rendered from [`Buffer::directives`] at commit time.
#[derive(Debug, Clone)]
pub struct Buffer {
    path: String,
    directives: DirectiveSet,
    lines: Vec<String>,
    depth: usize,
}

impl Buffer {
    pub(crate) fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            directives: DirectiveSet::new(),
            lines: Vec::new(),
            depth: 0,
        }
    }

    /// Returns the relative output path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the accumulated directives.
    pub fn directives(&self) -> &DirectiveSet {
        &self.directives
    }

    /// Returns the body lines written so far.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Adds a directive line. Repeats are no-ops.
    pub fn add_directive(&mut self, directive: impl Into<String>) -> bool {
        self.directives.insert(directive)
    }

    /// Appends one body line at the current depth. Empty lines carry no
    /// indentation.
    pub fn push_line(&mut self, line: &str) {
        if line.is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines
                .push(format!("{}{line}", INDENT_UNIT.repeat(self.depth)));
        }
    }

    fn enter(&mut self) {
        self.depth += 1;
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

/// A typed writer over a [`Buffer`].
///
/// Each variant fixes its [`FileKind`] and how the prologue is rendered from
/// the directives. Writers are only obtained through
/// [`OutputManager::write`](crate::OutputManager::write), which commits them
/// when the scope closes.
pub trait OutputWriter: Sized {
    /// The kind of file this writer produces.
    const KIND: FileKind;

    /// Wraps a buffer, either fresh or seeded from a previous commit.
    fn from_buffer(buffer: Buffer) -> Self;

    /// Unwraps the buffer for commit.
    fn into_buffer(self) -> Buffer;

    /// Returns the underlying buffer.
    fn buffer(&self) -> &Buffer;

    /// Returns the underlying buffer mutably.
    fn buffer_mut(&mut self) -> &mut Buffer;

    /// Renders the lines that precede the body.
    fn prologue(directives: &DirectiveSet) -> Vec<String>;

    /// Renders the lines that follow the body.
    fn epilogue() -> Vec<String> {
        Vec::new()
    }

    /// Returns the relative output path.
    fn path(&self) -> &str {
        self.buffer().path()
    }

    /// Appends one line at the current indentation.
    fn writeln(&mut self, line: &str) {
        self.buffer_mut().push_line(line);
    }

    /// Appends an empty line.
    fn newline(&mut self) {
        self.buffer_mut().push_line("");
    }

    /// Appends several lines at the current indentation.
    fn writelns<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let buffer = self.buffer_mut();
        for line in lines {
            buffer.push_line(line.as_ref());
        }
    }

    /// Writes `open`, runs `body` one level deeper, then writes `close`.
    ///
    /// `close` is written whatever `body` returns, so an `Err` from the body
    /// still leaves the block balanced.
    fn indented<R>(&mut self, open: &str, close: &str, body: impl FnOnce(&mut Self) -> R) -> R {
        self.buffer_mut().push_line(open);
        self.buffer_mut().enter();
        let result = body(self);
        self.buffer_mut().leave();
        self.buffer_mut().push_line(close);
        result
    }

    /// Renders the final text of a buffer: prologue, body, epilogue.
    fn render(buffer: &Buffer) -> String {
        let prologue = Self::prologue(buffer.directives());
        let epilogue = Self::epilogue();
        let mut out = String::new();
        for line in prologue.iter().chain(buffer.lines()).chain(epilogue.iter()) {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writers::TextWriter;

    fn writer() -> TextWriter {
        TextWriter::from_buffer(Buffer::new("debug/x.txt"))
    }

    #[test]
    fn indentation_is_four_spaces() {
        let mut w = writer();
        w.indented("a {", "}", |w| {
            w.writeln("b;");
            w.indented("c {", "}", |w| w.writeln("d;"));
        });
        w.writeln("e;");
        assert_eq!(
            w.buffer().lines(),
            ["a {", "    b;", "    c {", "        d;", "    }", "}", "e;"]
        );
    }

    #[test]
    fn close_is_written_when_body_fails() {
        let mut w = writer();
        let result: Result<(), &str> = w.indented("{", "}", |w| {
            w.writeln("partial");
            Err("boom")
        });
        assert_eq!(result, Err("boom"));
        w.writeln("after");
        assert_eq!(w.buffer().lines(), ["{", "    partial", "}", "after"]);
    }

    #[test]
    fn blank_lines_are_not_indented() {
        let mut w = writer();
        w.indented("{", "}", |w| {
            w.writelns(["x", "", "y"]);
        });
        assert_eq!(w.buffer().lines(), ["{", "    x", "", "    y", "}"]);
    }

    #[test]
    fn deep_nesting_balances() {
        fn nest(w: &mut TextWriter, n: usize) {
            if n == 0 {
                w.writeln("leaf");
                return;
            }
            w.indented("(", ")", |w| nest(w, n - 1));
        }
        let mut w = writer();
        nest(&mut w, 6);
        w.writeln("tail");
        assert_eq!(w.buffer().lines().last().map(String::as_str), Some("tail"));
        let opens = w.buffer().lines().iter().filter(|l| l.trim() == "(").count();
        let closes = w.buffer().lines().iter().filter(|l| l.trim() == ")").count();
        assert_eq!(opens, 6);
        assert_eq!(closes, 6);
        assert_eq!(w.buffer().lines()[6], format!("{}leaf", "    ".repeat(6)));
    }
}
