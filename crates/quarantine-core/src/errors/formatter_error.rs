//! Formatter errors. Logged by the mutator, never propagated.

use std::path::PathBuf;

use super::error_code::{self, QuarantineErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum FormatterError {
    #[error("Failed to launch formatter {command}: {source}")]
    Launch {
        command: String,
        source: std::io::Error,
    },

    #[error("Formatter exited with {status} on {path}: {stderr}")]
    Failed {
        path: PathBuf,
        status: String,
        stderr: String,
    },
}

impl QuarantineErrorCode for FormatterError {
    fn error_code(&self) -> &'static str {
        error_code::FORMATTER_FAILED
    }
}
