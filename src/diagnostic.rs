//! Non-fatal findings collected while compiling. Nothing here is printed by the library;
//! the `mibgen` binary renders them.

use std::fmt;

/// Identifies which check produced the warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A name was defined twice; the later definition is dropped.
    DuplicateName,
    /// Two names resolved to the same OID; the later definition is dropped.
    DuplicateOid,
    /// A row index object is unknown, so its range defaults to 1..1.
    DefaultIndexBound,
    /// A notification without OBJECTS produces no code.
    EmptyNotification,
}

impl DiagnosticKind {
    pub fn id(self) -> &'static str {
        match self {
            DiagnosticKind::DuplicateName => "duplicate-name",
            DiagnosticKind::DuplicateOid => "duplicate-oid",
            DiagnosticKind::DefaultIndexBound => "default-index-bound",
            DiagnosticKind::EmptyNotification => "empty-notification",
        }
    }
}

/// A single warning with location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub column: usize,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(line: usize, column: usize, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Diagnostic {
            line,
            column,
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: warning: {} [{}]",
            self.line,
            self.column,
            self.message,
            self.kind.id()
        )
    }
}
