//! Indentation-aware text accumulator for generated Rust.
//!
//! ```
//! use bundle_compiler::code_builder::CodeBuilder;
//!
//! let mut b = CodeBuilder::new(4);
//! b.block("fn answer() -> u32", |b| b.line("42"));
//! assert_eq!(b.finish(), "fn answer() -> u32 {\n    42\n}\n");
//! ```

/// Owned code buffer with an indentation level.
#[derive(Debug, Clone)]
pub struct CodeBuilder {
    buf: String,
    unit: String,
    level: usize,
}

impl Default for CodeBuilder {
    fn default() -> Self {
        Self::new(4)
    }
}

impl CodeBuilder {
    pub fn new(indent_width: usize) -> Self {
        Self {
            buf: String::new(),
            unit: " ".repeat(indent_width),
            level: 0,
        }
    }

    /// Appends one line at the current indentation.
    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.is_empty() {
            self.buf.push('\n');
            return;
        }
        for _ in 0..self.level {
            self.buf.push_str(&self.unit);
        }
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    /// Writes `header {` (or a bare `{`) and indents.
    pub fn open(&mut self, header: impl AsRef<str>) {
        let header = header.as_ref();
        if header.is_empty() {
            self.line("{");
        } else {
            self.line(format!("{} {{", header));
        }
        self.level += 1;
    }

    /// Dedents and writes `}`.
    pub fn close(&mut self) {
        self.level = self.level.saturating_sub(1);
        self.line("}");
    }

    /// Dedents, writes `} header {` and indents again.
    pub fn reopen(&mut self, header: impl AsRef<str>) {
        self.level = self.level.saturating_sub(1);
        self.line(format!("}} {} {{", header.as_ref()));
        self.level += 1;
    }

    pub fn block<R>(&mut self, header: impl AsRef<str>, body: impl FnOnce(&mut Self) -> R) -> R {
        self.open(header);
        let result = body(self);
        self.close();
        result
    }

    /// Runs `body` inside a bare `{ }` scope when `wrap` is set, inline otherwise.
    pub fn scoped<R>(&mut self, wrap: bool, body: impl FnOnce(&mut Self) -> R) -> R {
        if wrap {
            self.block("", body)
        } else {
            body(self)
        }
    }

    pub fn indented<R>(&mut self, body: impl FnOnce(&mut Self) -> R) -> R {
        self.level += 1;
        let result = body(self);
        self.level = self.level.saturating_sub(1);
        result
    }

    /// Appends text produced elsewhere, re-indented to the current level.
    pub fn append(&mut self, fragment: &str) {
        for line in fragment.lines() {
            self.line(line);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn finish(self) -> String {
        self.buf
    }
}
