//! Scanner output types.

use std::path::PathBuf;

use quarantine_core::errors::ScanFileError;
use serde::{Deserialize, Serialize};

use crate::classifier::TestRecord;

/// One successfully parsed source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedFile {
    /// Relative to the repository root.
    pub path: PathBuf,
    pub content_hash: u64,
    pub test_count: usize,
    pub quarantined_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    pub files_scanned: usize,
    pub files_failed: usize,
    pub tests: usize,
    pub quarantined: usize,
    pub duration_ms: u64,
}

/// Flat inventory of one scan plus per-file results and non-fatal errors.
/// Records are in path order, then declaration order within a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanReport {
    pub root: PathBuf,
    pub records: Vec<TestRecord>,
    pub files: Vec<ScannedFile>,
    pub errors: Vec<ScanFileError>,
    pub stats: ScanStats,
}

impl ScanReport {
    pub fn quarantined(&self) -> impl Iterator<Item = &TestRecord> {
        self.records.iter().filter(|r| r.is_quarantined())
    }
}
