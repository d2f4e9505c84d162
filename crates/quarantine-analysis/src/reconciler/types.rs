//! Reconciliation output types.

use serde::{Deserialize, Serialize};

use super::trend::Trend;

/// A flaky test that is not quarantined locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarantineCandidate {
    /// Name as reported by the history signal.
    pub name: String,
    /// Local record the name resolved to, when it resolved to exactly one.
    pub qualified_name: Option<String>,
    pub team: String,
    pub failure_count: u32,
    pub total_runs: u32,
    pub failure_rate: f64,
    /// Present when the signal carried per-run outcomes.
    pub trend: Option<Trend>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DequarantineReason {
    PassingConsistently,
    TicketResolved,
    Both,
}

impl DequarantineReason {
    pub fn from_signals(passing: bool, ticket_resolved: bool) -> Option<Self> {
        match (passing, ticket_resolved) {
            (true, true) => Some(Self::Both),
            (true, false) => Some(Self::PassingConsistently),
            (false, true) => Some(Self::TicketResolved),
            (false, false) => None,
        }
    }
}

impl std::fmt::Display for DequarantineReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PassingConsistently => write!(f, "passing_consistently"),
            Self::TicketResolved => write!(f, "ticket_resolved"),
            Self::Both => write!(f, "both"),
        }
    }
}

/// A quarantined test whose signals suggest re-enabling it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DequarantineCandidate {
    pub qualified_name: String,
    pub file_path: String,
    pub line: u32,
    pub team: String,
    pub ticket: Option<String>,
    /// `None` when the pass signal was absent or failed for this test.
    pub consecutive_passes: Option<u32>,
    /// `None` when there is no ticket, or the ticket signal was absent or failed.
    pub ticket_resolved: Option<bool>,
    pub reason: DequarantineReason,
}

/// Two disjoint lists: quarantine candidates are never quarantined
/// locally, de-quarantine candidates always are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateSet {
    pub quarantine: Vec<QuarantineCandidate>,
    pub dequarantine: Vec<DequarantineCandidate>,
}
