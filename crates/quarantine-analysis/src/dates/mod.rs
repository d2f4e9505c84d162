//! Out-of-band dates for quarantine markers.
//!
//! Marker age is informational: every source answers `None` rather than
//! failing, and a `None` is reported as "unknown age", never as zero.

pub mod git_blame;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use quarantine_core::types::FxHashMap;

pub use git_blame::GitBlameDates;

/// Supplies the date a marker line was introduced.
pub trait MarkerDateSource {
    /// `rel_path` is relative to the scanned repository root; `line` is 1-based.
    fn marker_date(&self, rel_path: &Path, line: u32) -> Option<NaiveDate>;
}

/// Source that never knows a date.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDates;

impl MarkerDateSource for NoDates {
    fn marker_date(&self, _rel_path: &Path, _line: u32) -> Option<NaiveDate> {
        None
    }
}

/// In-memory dates keyed by (relative path, line). A `default` applies to
/// any line without an explicit entry.
#[derive(Debug, Clone, Default)]
pub struct FixedDates {
    dates: FxHashMap<(PathBuf, u32), NaiveDate>,
    default: Option<NaiveDate>,
}

impl FixedDates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(date: NaiveDate) -> Self {
        Self {
            dates: FxHashMap::default(),
            default: Some(date),
        }
    }

    pub fn insert(&mut self, rel_path: impl Into<PathBuf>, line: u32, date: NaiveDate) {
        self.dates.insert((rel_path.into(), line), date);
    }
}

impl MarkerDateSource for FixedDates {
    fn marker_date(&self, rel_path: &Path, line: u32) -> Option<NaiveDate> {
        self.dates
            .get(&(rel_path.to_path_buf(), line))
            .copied()
            .or(self.default)
    }
}
