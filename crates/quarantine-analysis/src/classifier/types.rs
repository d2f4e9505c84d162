//! Classification output types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::discovery::FunctionNode;
use crate::marker::Marker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    Active,
    Quarantined,
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Quarantined => write!(f, "quarantined"),
        }
    }
}

/// A discovered function paired with its marker, before file-level
/// context (path, team, dates) is attached.
#[derive(Debug, Clone)]
pub struct ClassifiedTest {
    pub function: FunctionNode,
    pub marker: Option<Marker>,
}

impl ClassifiedTest {
    pub fn status(&self) -> TestStatus {
        if self.marker.is_some() {
            TestStatus::Quarantined
        } else {
            TestStatus::Active
        }
    }
}

/// One test in the inventory. Built once per scan and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    /// Module-qualified dotted path: `tests.storage.test_x.TestA.test_b`.
    pub qualified_name: String,
    /// Path relative to the repository root, `/`-separated.
    pub file_path: String,
    /// 1-based line of the `def`.
    pub line: u32,
    pub team: String,
    pub status: TestStatus,
    pub ticket: Option<String>,
    /// Human reason; `None` for active tests, possibly empty when quarantined.
    pub reason: Option<String>,
    /// Date the marker was introduced; `None` when active or unknown.
    pub quarantined_since: Option<NaiveDate>,
    /// Days since `quarantined_since`, clamped at zero.
    pub age_days: Option<i64>,
}

impl TestRecord {
    /// Build a record from a classified test. `since` is ignored for active
    /// tests; `today` anchors the age computation.
    pub fn new(
        test: &ClassifiedTest,
        qualified_name: String,
        file_path: String,
        team: String,
        since: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Self {
        let (status, ticket, reason, since) = match &test.marker {
            Some(marker) => (
                TestStatus::Quarantined,
                marker.ticket.clone(),
                Some(marker.reason.clone()),
                since,
            ),
            None => (TestStatus::Active, None, None, None),
        };
        let age_days = since.map(|d| (today - d).num_days().max(0));
        Self {
            qualified_name,
            file_path,
            line: test.function.line,
            team,
            status,
            ticket,
            reason,
            quarantined_since: since,
            age_days,
        }
    }

    pub fn is_quarantined(&self) -> bool {
        self.status == TestStatus::Quarantined
    }
}
