//! Seams to external collaborators: execution history, ticket tracker,
//! pass history and the code formatter.
//!
//! Signals are optional. Callers treat any `SignalError` as "signal
//! unavailable" and degrade; nothing here is allowed to fail a scan or a
//! mutation.

pub mod file;
pub mod formatter;
pub mod types;

use std::collections::BTreeMap;
use std::path::Path;

use quarantine_core::errors::{FormatterError, SignalError};

use crate::classifier::normalize_test_name;

pub use file::{JsonHistory, JsonPasses, JsonTickets};
pub use formatter::{CommandFormatter, NoopFormatter};
pub use types::{FlakyTest, RunOutcome};

/// Remote execution history.
pub trait HistorySignal {
    /// Flaky tests seen in the last `lookback_days`, optionally on one branch.
    fn fetch(&self, lookback_days: u32, branch: Option<&str>) -> Result<Vec<FlakyTest>, SignalError>;
}

/// Ticket tracker.
pub trait TicketSignal {
    fn is_resolved(&self, ticket: &str) -> Result<bool, SignalError>;
}

/// Per-test pass history.
pub trait PassHistorySignal {
    /// Consecutive passes counted back from the most recent run.
    fn consecutive_passes(&self, test_name: &str) -> Result<u32, SignalError>;
}

/// Post-write formatter. Failures are logged by the caller, never propagated.
pub trait Formatter {
    fn format(&self, path: &Path) -> Result<(), FormatterError>;
}

/// Fixed history list.
#[derive(Debug, Clone, Default)]
pub struct StaticHistory(pub Vec<FlakyTest>);

impl HistorySignal for StaticHistory {
    fn fetch(&self, _lookback_days: u32, branch: Option<&str>) -> Result<Vec<FlakyTest>, SignalError> {
        Ok(self
            .0
            .iter()
            .filter(|t| t.on_branch(branch))
            .cloned()
            .collect())
    }
}

/// Fixed ticket → resolved map. Unknown tickets are unresolved.
#[derive(Debug, Clone, Default)]
pub struct StaticTickets(pub BTreeMap<String, bool>);

impl TicketSignal for StaticTickets {
    fn is_resolved(&self, ticket: &str) -> Result<bool, SignalError> {
        Ok(self.0.get(ticket).copied().unwrap_or(false))
    }
}

/// Fixed test name → consecutive pass count. Names are compared in
/// normalized dotted form; unknown names have zero passes.
#[derive(Debug, Clone, Default)]
pub struct StaticPasses(BTreeMap<String, u32>);

impl StaticPasses {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: AsRef<str>,
    {
        Self(
            entries
                .into_iter()
                .map(|(name, count)| (normalize_test_name(name.as_ref()), count))
                .collect(),
        )
    }
}

impl PassHistorySignal for StaticPasses {
    fn consecutive_passes(&self, test_name: &str) -> Result<u32, SignalError> {
        Ok(self
            .0
            .get(&normalize_test_name(test_name))
            .copied()
            .unwrap_or(0))
    }
}
