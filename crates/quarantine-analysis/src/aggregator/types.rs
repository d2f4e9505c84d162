//! Aggregation rows.

use std::collections::BTreeMap;

use quarantine_core::constants::{AGE_BUCKET_MONTH, AGE_BUCKET_QUARTER, AGE_BUCKET_WEEK};
use serde::{Deserialize, Serialize};

/// Quarantined tests by marker age: `<7d`, `7–30d`, `30–90d` (90 inclusive), `>90d`, unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeBuckets {
    pub under_week: usize,
    pub week_to_month: usize,
    pub month_to_quarter: usize,
    pub over_quarter: usize,
    pub unknown: usize,
}

impl AgeBuckets {
    pub fn add(&mut self, age_days: Option<i64>) {
        match age_days {
            None => self.unknown += 1,
            Some(age) if age < AGE_BUCKET_WEEK => self.under_week += 1,
            Some(age) if age < AGE_BUCKET_MONTH => self.week_to_month += 1,
            Some(age) if age <= AGE_BUCKET_QUARTER => self.month_to_quarter += 1,
            Some(_) => self.over_quarter += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.under_week + self.week_to_month + self.month_to_quarter + self.over_quarter + self.unknown
    }
}

/// One aggregation row. Recomputed per call, never updated in place
/// except by the enrichment step that fills the reconciliation fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStat {
    pub team: String,
    pub total: usize,
    pub active: usize,
    pub quarantined: usize,
    pub health_percent: f64,
    /// Mean known age of quarantined tests; `None` when no age is known.
    pub average_age_days: Option<f64>,
    pub age_buckets: AgeBuckets,
    /// Flaky tests for this team not yet quarantined.
    pub flaky_candidates: Option<usize>,
    /// Mean failure rate over those flaky candidates.
    pub mean_failure_rate: Option<f64>,
}

/// Per-team rows plus the roll-up over all teams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub teams: BTreeMap<String, TeamStat>,
    pub overall: TeamStat,
}

/// Aggregation for one branch of one repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchStats {
    pub branch: String,
    pub aggregation: Aggregation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryStats {
    pub repository: String,
    /// Roll-up over every branch of the repository.
    pub overall: TeamStat,
    pub branches: BTreeMap<String, BranchStats>,
}

/// Repository → branch → team roll-up with a global row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopedAggregation {
    pub repositories: BTreeMap<String, RepositoryStats>,
    pub overall: TeamStat,
}
