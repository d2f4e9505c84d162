//! Signal payload types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One flaky test as reported by the history service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlakyTest {
    pub name: String,
    pub failure_count: u32,
    pub total_runs: u32,
    pub failure_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_failure: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Individual runs, any order. Empty when the service reports totals only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outcomes: Vec<RunOutcome>,
}

impl FlakyTest {
    pub fn new(name: impl Into<String>, failure_count: u32, total_runs: u32) -> Self {
        let failure_rate = if total_runs == 0 {
            0.0
        } else {
            f64::from(failure_count) / f64::from(total_runs)
        };
        Self {
            name: name.into(),
            failure_count,
            total_runs,
            failure_rate,
            last_failure: None,
            branch: None,
            outcomes: Vec::new(),
        }
    }

    /// Entries without a branch apply to every branch.
    pub fn on_branch(&self, branch: Option<&str>) -> bool {
        match (branch, self.branch.as_deref()) {
            (Some(wanted), Some(actual)) => wanted == actual,
            _ => true,
        }
    }
}

/// One execution of a test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub started_at: DateTime<Utc>,
    /// Status as reported by the service (`PASSED`, `FAILED`, `SKIPPED`, ...).
    pub status: String,
}

impl RunOutcome {
    pub fn new(started_at: DateTime<Utc>, status: impl Into<String>) -> Self {
        Self {
            started_at,
            status: status.into(),
        }
    }

    pub fn is_passed(&self) -> bool {
        self.status.eq_ignore_ascii_case("passed")
    }

    pub fn is_failed(&self) -> bool {
        self.status.eq_ignore_ascii_case("failed")
    }
}
