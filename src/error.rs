//! Fatal compilation errors.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// Input does not match any statement form at the reported position.
    #[error("syntax error at line {line}, column {column}: {message}\n{snippet}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
        /// Offending line followed by a caret line.
        snippet: String,
    },
    #[error("line {line}: parent `{parent}` of `{name}` is not defined before it")]
    UnresolvedParent {
        name: String,
        parent: String,
        line: usize,
    },
    #[error("line {line}: cannot classify `{name}` under `{parent}` ({reason})")]
    Unclassifiable {
        name: String,
        parent: String,
        reason: String,
        line: usize,
    },
    #[error("malformed table `{name}`: {reason}")]
    MalformedTable { name: String, reason: String },
    #[error("notification `{notification}` references unknown object `{object}`")]
    UnresolvedObject { notification: String, object: String },
    #[error("no MIB root: {0}")]
    MissingRoot(String),
    #[error("{}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CompileError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CompileError::Io {
            path: path.into(),
            source,
        }
    }
}
