//! Scanner errors.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::error_code::{self, QuarantineErrorCode};
use super::{ConfigError, ParseError};

/// Errors that can occur while scanning a repository.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Tests directory not found: {path}")]
    TestsRootMissing { path: PathBuf },

    #[error("IO error scanning {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("File too large: {path} ({size} bytes, max {max})")]
    MaxFileSizeExceeded { path: PathBuf, size: u64, max: u64 },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl QuarantineErrorCode for ScanError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::IoError { .. } => error_code::IO_ERROR,
            _ => error_code::SCAN_ERROR,
        }
    }
}

/// A non-fatal, per-file scan failure recorded on the scan report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanFileError {
    pub path: PathBuf,
    pub code: String,
    pub message: String,
}

impl ScanFileError {
    pub fn new(path: impl Into<PathBuf>, error: &ScanError) -> Self {
        Self {
            path: path.into(),
            code: error.error_code().to_string(),
            message: error.to_string(),
        }
    }
}
