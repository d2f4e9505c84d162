//! Scanner configuration.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Configuration for the repository scanner.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScanConfig {
    /// Tests root relative to the repository root. Default: `tests`.
    pub tests_root: Option<String>,
    /// Directory names skipped on exact segment match. Default: `__pycache__`.
    #[serde(default)]
    pub excluded_dirs: Vec<String>,
    /// Maximum file size in bytes. Default: 1MB.
    pub max_file_size: Option<u64>,
    /// Number of parser threads. 0 = auto-detect. Default: 0.
    pub threads: Option<usize>,
}

impl ScanConfig {
    pub fn effective_tests_root(&self) -> &str {
        self.tests_root
            .as_deref()
            .unwrap_or(constants::DEFAULT_TESTS_ROOT)
    }

    /// Configured exclusions, or the compiled defaults when none are set.
    pub fn effective_excluded_dirs(&self) -> Vec<String> {
        if self.excluded_dirs.is_empty() {
            constants::DEFAULT_EXCLUDED_DIRS
                .iter()
                .map(|d| d.to_string())
                .collect()
        } else {
            self.excluded_dirs.clone()
        }
    }

    pub fn effective_max_file_size(&self) -> u64 {
        self.max_file_size
            .unwrap_or(constants::DEFAULT_MAX_FILE_SIZE)
    }

    pub fn effective_threads(&self) -> usize {
        self.threads.unwrap_or(constants::DEFAULT_THREADS)
    }
}
