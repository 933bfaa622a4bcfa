//! Line-oriented C text buffer.

use super::LineEnding;

/// Accumulates C source with four-space indentation and a fixed line ending.
#[derive(Debug, Clone)]
pub struct CWriter {
    output: String,
    indent: usize,
    newline: &'static str,
}

impl CWriter {
    pub fn new(line_ending: LineEnding) -> Self {
        Self {
            output: String::new(),
            indent: 0,
            newline: line_ending.as_str(),
        }
    }

    /// Emit one line at the current indentation. Empty lines carry no indentation.
    pub fn line(&mut self, s: &str) {
        if !s.is_empty() {
            for _ in 0..self.indent {
                self.output.push_str("    ");
            }
            self.output.push_str(s);
        }
        self.output.push_str(self.newline);
    }

    pub fn blank(&mut self) {
        self.output.push_str(self.newline);
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// `{` line followed by one indentation level.
    pub fn open(&mut self, s: &str) {
        self.line(s);
        self.indent();
    }

    /// Drop one indentation level and emit the closing line.
    pub fn close(&mut self, s: &str) {
        self.dedent();
        self.line(s);
    }

    /// Append already-terminated text verbatim.
    pub fn push_raw(&mut self, text: &str) {
        self.output.push_str(text);
    }

    pub fn as_str(&self) -> &str {
        &self.output
    }

    pub fn into_string(self) -> String {
        self.output
    }
}
