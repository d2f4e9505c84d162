//! Source parser errors.

use std::path::PathBuf;

use super::error_code::{self, QuarantineErrorCode};

/// Errors that can occur while parsing a Python source file.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Failed to load Python grammar: {message}")]
    GrammarUnavailable { message: String },

    #[error("Syntax error in {path} at line {line}, column {column}")]
    SyntaxError {
        path: PathBuf,
        line: u32,
        column: u32,
    },

    #[error("Parser produced no tree for {path}")]
    NoTree { path: PathBuf },

    #[error("{path} is not valid UTF-8")]
    InvalidUtf8 { path: PathBuf },
}

impl ParseError {
    /// Attach a file path to an error produced while parsing in-memory text.
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match self {
            Self::SyntaxError { line, column, .. } => Self::SyntaxError { path, line, column },
            Self::NoTree { .. } => Self::NoTree { path },
            Self::InvalidUtf8 { .. } => Self::InvalidUtf8 { path },
            other => other,
        }
    }
}

impl QuarantineErrorCode for ParseError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::SyntaxError { .. } => error_code::SYNTAX_ERROR,
            _ => error_code::PARSE_ERROR,
        }
    }
}
