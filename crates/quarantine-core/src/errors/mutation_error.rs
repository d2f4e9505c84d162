//! Mutator errors. Every variant aborts the operation before any write.

use std::path::PathBuf;

use super::error_code::{self, QuarantineErrorCode};
use super::ParseError;

/// Errors raised by `apply` / `remove` on a single (file, function) target.
#[derive(Debug, thiserror::Error)]
pub enum MutationError {
    #[error("Invalid test target '{target}': {message}")]
    InvalidTarget { target: String, message: String },

    #[error("Function '{function}' not found in {file}")]
    NotFound { file: PathBuf, function: String },

    #[error("Function '{function}' is ambiguous in {file}; candidates: {}", .candidates.join(", "))]
    Ambiguous {
        file: PathBuf,
        function: String,
        candidates: Vec<String>,
    },

    #[error("'{qualified_name}' in {file} is already quarantined")]
    AlreadyQuarantined { file: PathBuf, qualified_name: String },

    #[error("No quarantine marker found on '{qualified_name}' in {file}")]
    NoMarkerFound { file: PathBuf, qualified_name: String },

    #[error("Ticket id '{ticket}' does not match the ticket pattern {pattern}")]
    InvalidTicket { ticket: String, pattern: String },

    #[error("Overlapping edits in {file} at byte {offset}")]
    EditConflict { file: PathBuf, offset: usize },

    #[error("Edited {file} does not classify '{qualified_name}' as {expected}")]
    VerificationFailed {
        file: PathBuf,
        qualified_name: String,
        expected: String,
    },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl QuarantineErrorCode for MutationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTarget { .. } => error_code::INVALID_TARGET,
            Self::NotFound { .. } => error_code::NOT_FOUND,
            Self::Ambiguous { .. } => error_code::AMBIGUOUS_TARGET,
            Self::AlreadyQuarantined { .. } => error_code::ALREADY_QUARANTINED,
            Self::NoMarkerFound { .. } => error_code::NO_MARKER_FOUND,
            Self::InvalidTicket { .. } => error_code::INVALID_TICKET,
            Self::EditConflict { .. } => error_code::EDIT_CONFLICT,
            Self::VerificationFailed { .. } => error_code::VERIFICATION_FAILED,
            Self::Io { .. } => error_code::IO_ERROR,
            Self::Parse(e) => e.error_code(),
        }
    }
}
