//! JSON file-backed signals, standing in for the history service and the
//! ticket tracker when running from the command line.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use quarantine_core::errors::SignalError;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::types::{FlakyTest, RunOutcome};
use super::{HistorySignal, PassHistorySignal, TicketSignal};
use crate::classifier::normalize_test_name;
use crate::reconciler::consecutive_passes;

fn read_json<T: DeserializeOwned>(signal: &str, path: &Path) -> Result<T, SignalError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| SignalError::unavailable(signal, format!("{}: {e}", path.display())))?;
    serde_json::from_str(&content).map_err(|e| SignalError::Malformed {
        signal: signal.to_string(),
        message: format!("{}: {e}", path.display()),
    })
}

/// History export: a JSON array of `FlakyTest` objects.
///
/// Entries below `min_failures`, entries on another branch and entries
/// whose last failure falls outside the lookback window are dropped.
#[derive(Debug, Clone)]
pub struct JsonHistory {
    path: PathBuf,
    tests: Vec<FlakyTest>,
    min_failures: u32,
}

impl JsonHistory {
    pub fn load(path: impl Into<PathBuf>, min_failures: u32) -> Result<Self, SignalError> {
        let path = path.into();
        let tests: Vec<FlakyTest> = read_json("history", &path)?;
        Ok(Self {
            path,
            tests,
            min_failures,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistorySignal for JsonHistory {
    fn fetch(&self, lookback_days: u32, branch: Option<&str>) -> Result<Vec<FlakyTest>, SignalError> {
        let cutoff = Utc::now() - Duration::days(i64::from(lookback_days));
        Ok(self
            .tests
            .iter()
            .filter(|t| t.failure_count >= self.min_failures)
            .filter(|t| t.on_branch(branch))
            .filter(|t| t.last_failure.map_or(true, |at| at >= cutoff))
            .cloned()
            .collect())
    }
}

/// Ticket export: a JSON object mapping ticket id to status name.
/// Status names are compared case-insensitively against `resolved_statuses`.
#[derive(Debug, Clone)]
pub struct JsonTickets {
    statuses: BTreeMap<String, String>,
    resolved_statuses: Vec<String>,
}

impl JsonTickets {
    pub fn load(path: impl AsRef<Path>, resolved_statuses: Vec<String>) -> Result<Self, SignalError> {
        let statuses = read_json("tickets", path.as_ref())?;
        Ok(Self::new(statuses, resolved_statuses))
    }

    pub fn new(statuses: BTreeMap<String, String>, resolved_statuses: Vec<String>) -> Self {
        Self {
            statuses,
            resolved_statuses: resolved_statuses
                .into_iter()
                .map(|s| s.to_lowercase())
                .collect(),
        }
    }
}

impl TicketSignal for JsonTickets {
    fn is_resolved(&self, ticket: &str) -> Result<bool, SignalError> {
        match self.statuses.get(ticket) {
            Some(status) => Ok(self
                .resolved_statuses
                .iter()
                .any(|s| *s == status.to_lowercase())),
            None => {
                tracing::debug!(ticket, "ticket not in export, treated as unresolved");
                Ok(false)
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum PassEntry {
    Count(u32),
    Outcomes(Vec<RunOutcome>),
}

/// Pass-history export: a JSON object mapping test name to either a
/// consecutive-pass count or a list of run outcomes.
#[derive(Debug, Clone, Default)]
pub struct JsonPasses {
    counts: BTreeMap<String, u32>,
}

impl JsonPasses {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SignalError> {
        let entries: BTreeMap<String, PassEntry> = read_json("pass history", path.as_ref())?;
        let counts = entries
            .into_iter()
            .map(|(name, entry)| {
                let count = match entry {
                    PassEntry::Count(n) => n,
                    PassEntry::Outcomes(outcomes) => consecutive_passes(&outcomes),
                };
                (normalize_test_name(&name), count)
            })
            .collect();
        Ok(Self { counts })
    }
}

impl PassHistorySignal for JsonPasses {
    fn consecutive_passes(&self, test_name: &str) -> Result<u32, SignalError> {
        Ok(self
            .counts
            .get(&normalize_test_name(test_name))
            .copied()
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarantine_core::errors::QuarantineErrorCode;

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn history_filters_by_min_failures_and_branch() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write(
            &dir,
            "history.json",
            r#"[
                {"name": "tests/net/test_a.py::test_a", "failure_count": 5, "total_runs": 10, "failure_rate": 0.5},
                {"name": "tests/net/test_b.py::test_b", "failure_count": 1, "total_runs": 10, "failure_rate": 0.1},
                {"name": "tests/net/test_c.py::test_c", "failure_count": 4, "total_runs": 8, "failure_rate": 0.5, "branch": "release-4.16"}
            ]"#,
        );
        let history = JsonHistory::load(&path, 3).unwrap();
        let main: Vec<String> = history
            .fetch(7, Some("main"))
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(main, vec!["tests/net/test_a.py::test_a"]);
        assert_eq!(history.fetch(7, None).unwrap().len(), 2);
    }

    #[test]
    fn missing_file_is_unavailable_and_bad_json_is_malformed() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = JsonHistory::load(dir.path().join("nope.json"), 3).unwrap_err();
        assert_eq!(err.error_code(), "SIGNAL_UNAVAILABLE");

        let path = write(&dir, "bad.json", "{not json");
        let err = JsonTickets::load(&path, vec!["closed".into()]).unwrap_err();
        assert_eq!(err.error_code(), "SIGNAL_ERROR");
    }

    #[test]
    fn ticket_vocabulary_is_configurable() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write(&dir, "tickets.json", r#"{"CNV-1": "Closed", "CNV-2": "Done", "CNV-3": "In Progress"}"#);

        let narrow = JsonTickets::load(&path, vec!["closed".into(), "resolved".into()]).unwrap();
        assert!(narrow.is_resolved("CNV-1").unwrap());
        assert!(!narrow.is_resolved("CNV-2").unwrap());
        assert!(!narrow.is_resolved("CNV-3").unwrap());
        assert!(!narrow.is_resolved("CNV-404").unwrap());

        let broad = JsonTickets::load(&path, vec!["Closed".into(), "Resolved".into(), "Done".into()]).unwrap();
        assert!(broad.is_resolved("CNV-2").unwrap());
    }

    #[test]
    fn pass_history_accepts_counts_and_outcomes() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write(
            &dir,
            "passes.json",
            r#"{
                "tests/net/test_a.py::test_a": 6,
                "tests.net.test_b.test_b": [
                    {"started_at": "2026-01-03T00:00:00Z", "status": "PASSED"},
                    {"started_at": "2026-01-02T00:00:00Z", "status": "PASSED"},
                    {"started_at": "2026-01-01T00:00:00Z", "status": "FAILED"}
                ]
            }"#,
        );
        let passes = JsonPasses::load(&path).unwrap();
        assert_eq!(passes.consecutive_passes("tests.net.test_a.test_a").unwrap(), 6);
        assert_eq!(passes.consecutive_passes("tests/net/test_b.py::test_b").unwrap(), 2);
        assert_eq!(passes.consecutive_passes("tests.net.test_c.test_c").unwrap(), 0);
    }
}
