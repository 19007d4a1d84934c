//! Error and warning types for the bibliograph crate

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type for bibliograph operations
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for bibliograph
///
/// Lexical and grammatical failures abort the current parse call; no partial
/// database is returned for those. Recoverable conditions are collected as
/// [`Warning`]s on the database instead, unless strict mode escalates them.
#[derive(Error, Debug)]
pub enum Error {
    /// Lexical error: unterminated brace or quote, illegal character
    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        /// Line number (1-indexed)
        line: usize,
        /// Column number (1-indexed)
        column: usize,
        /// Error message
        message: String,
    },

    /// Grammatical error: missing expected token, malformed construct
    #[error("parse error at line {line}, column {column}: {message}")]
    Parse {
        /// Line number (1-indexed)
        line: usize,
        /// Column number (1-indexed)
        column: usize,
        /// Error message
        message: String,
    },

    /// A warning escalated to a fatal error by strict mode
    #[error("strict mode: {0}")]
    Strict(Warning),

    /// IO error from `parse_file`
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A recoverable condition encountered while parsing
///
/// By default these are collected on the returned [`Database`](crate::Database)
/// alongside a still-usable, best-effort result. With
/// [`ParseOptions::strict`](crate::ParseOptions::strict) each becomes fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Warning {
    /// A field name assigned twice within one entry (case-insensitive)
    #[error("duplicate field '{field}' in entry '{key}'")]
    DuplicateField {
        /// Citation key of the affected entry
        key: String,
        /// The repeated field name
        field: String,
    },

    /// The same citation key introduced by more than one entry
    #[error("repeated bibliography entry: {0}")]
    DuplicateKey(String),

    /// A field value referenced a macro with no `@string` definition so far
    #[error("undefined macro '{0}'")]
    UndefinedMacro(String),

    /// An entry type outside the standard BibTeX vocabulary
    #[error("unknown entry type '{0}'")]
    UnknownEntryType(String),
}

/// A 1-indexed line/column position in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl Position {
    /// Position of the first character of a source
    #[must_use]
    pub const fn start() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl Error {
    pub(crate) fn syntax(pos: Position, message: impl Into<String>) -> Self {
        Self::Syntax {
            line: pos.line,
            column: pos.column,
            message: message.into(),
        }
    }

    pub(crate) fn parse(pos: Position, message: impl Into<String>) -> Self {
        Self::Parse {
            line: pos.line,
            column: pos.column,
            message: message.into(),
        }
    }
}
