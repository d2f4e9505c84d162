//! Reconciliation of the local inventory against external signals.
//!
//! Quarantine candidates are flaky names minus quarantined records;
//! de-quarantine candidates are quarantined records whose pass streak or
//! ticket state clears them. Missing signals shrink the output, they never
//! produce an error.

pub mod trend;
pub mod types;

use quarantine_core::config::QuarantineConfig;
use quarantine_core::types::{FxHashMap, SmallVec, SmallVec1};

use crate::classifier::{normalize_test_name, TeamResolver, TestRecord};
use crate::signals::{FlakyTest, HistorySignal, PassHistorySignal, TicketSignal};

pub use trend::{compute_trend, consecutive_passes, trend_from_counts, Trend};
pub use types::{CandidateSet, DequarantineCandidate, DequarantineReason, QuarantineCandidate};

#[derive(Debug, Clone)]
pub struct Reconciler {
    pass_threshold: u32,
    trend_margin: f64,
    teams: TeamResolver,
}

impl Reconciler {
    pub fn new(pass_threshold: u32, trend_margin: f64, teams: TeamResolver) -> Self {
        Self {
            pass_threshold,
            trend_margin,
            teams,
        }
    }

    pub fn from_config(config: &QuarantineConfig) -> Self {
        Self::new(
            config.reconcile.effective_pass_threshold(),
            config.reconcile.effective_trend_margin(),
            TeamResolver::from_config(config),
        )
    }

    pub fn pass_threshold(&self) -> u32 {
        self.pass_threshold
    }

    /// Fetch flaky tests, degrading to an empty list when the history
    /// signal is absent or fails.
    pub fn fetch_flaky(
        history: Option<&dyn HistorySignal>,
        lookback_days: u32,
        branch: Option<&str>,
    ) -> Vec<FlakyTest> {
        let Some(history) = history else {
            return Vec::new();
        };
        match history.fetch(lookback_days, branch) {
            Ok(tests) => tests,
            Err(e) => {
                tracing::warn!(error = %e, "history signal unavailable, no quarantine candidates");
                Vec::new()
            }
        }
    }

    /// Both candidate lists in one pass.
    pub fn reconcile(
        &self,
        records: &[TestRecord],
        flaky: &[FlakyTest],
        tickets: Option<&dyn TicketSignal>,
        passes: Option<&dyn PassHistorySignal>,
    ) -> CandidateSet {
        let set = CandidateSet {
            quarantine: self.quarantine_candidates(records, flaky),
            dequarantine: self.dequarantine_candidates(records, tickets, passes),
        };
        tracing::info!(
            quarantine = set.quarantine.len(),
            dequarantine = set.dequarantine.len(),
            "reconciliation complete"
        );
        set
    }

    /// Flaky tests not quarantined locally, deduplicated per resolved test
    /// (highest failure count kept), sorted by failure count descending
    /// then name.
    pub fn quarantine_candidates(
        &self,
        records: &[TestRecord],
        flaky: &[FlakyTest],
    ) -> Vec<QuarantineCandidate> {
        let index = RecordIndex::new(records);
        let mut by_key: FxHashMap<String, QuarantineCandidate> = FxHashMap::default();

        for test in flaky {
            let matches = index.resolve(&test.name);
            if matches.iter().any(|&i| records[i].is_quarantined()) {
                continue;
            }
            let matched = match matches.as_slice() {
                [only] => Some(&records[*only]),
                _ => None,
            };
            let team = matched
                .map(|r| r.team.clone())
                .unwrap_or_else(|| self.teams.team_for_test_name(&test.name));
            let trend = (!test.outcomes.is_empty())
                .then(|| compute_trend(&test.outcomes, self.trend_margin));
            let candidate = QuarantineCandidate {
                name: test.name.clone(),
                qualified_name: matched.map(|r| r.qualified_name.clone()),
                team,
                failure_count: test.failure_count,
                total_runs: test.total_runs,
                failure_rate: test.failure_rate,
                trend,
            };
            let key = candidate
                .qualified_name
                .clone()
                .unwrap_or_else(|| normalize_test_name(&test.name));
            match by_key.get(&key) {
                Some(existing) if existing.failure_count >= candidate.failure_count => {}
                _ => {
                    by_key.insert(key, candidate);
                }
            }
        }

        let mut out: Vec<QuarantineCandidate> = by_key.into_values().collect();
        out.sort_by(|a, b| {
            b.failure_count
                .cmp(&a.failure_count)
                .then_with(|| a.name.cmp(&b.name))
        });
        out
    }

    /// Quarantined records cleared by a pass streak of at least the
    /// threshold or by a resolved ticket. Records without a ticket can
    /// only qualify through passes. With neither signal present the
    /// result is empty.
    pub fn dequarantine_candidates(
        &self,
        records: &[TestRecord],
        tickets: Option<&dyn TicketSignal>,
        passes: Option<&dyn PassHistorySignal>,
    ) -> Vec<DequarantineCandidate> {
        if tickets.is_none() && passes.is_none() {
            tracing::warn!("no ticket or pass signal, skipping de-quarantine check");
            return Vec::new();
        }

        let mut pass_warned = false;
        let mut ticket_warned = false;
        let mut out = Vec::new();

        for record in records.iter().filter(|r| r.is_quarantined()) {
            let pass_count = passes.and_then(|signal| {
                match signal.consecutive_passes(&record.qualified_name) {
                    Ok(n) => Some(n),
                    Err(e) => {
                        if !pass_warned {
                            tracing::warn!(error = %e, "pass signal unavailable");
                            pass_warned = true;
                        }
                        None
                    }
                }
            });
            let ticket_resolved = match (tickets, record.ticket.as_deref()) {
                (Some(signal), Some(ticket)) => match signal.is_resolved(ticket) {
                    Ok(resolved) => Some(resolved),
                    Err(e) => {
                        if !ticket_warned {
                            tracing::warn!(error = %e, "ticket signal unavailable");
                            ticket_warned = true;
                        }
                        None
                    }
                },
                _ => None,
            };

            let passing = pass_count.is_some_and(|n| n >= self.pass_threshold);
            let resolved = ticket_resolved == Some(true);
            if let Some(reason) = DequarantineReason::from_signals(passing, resolved) {
                tracing::debug!(test = %record.qualified_name, %reason, "de-quarantine candidate");
                out.push(DequarantineCandidate {
                    qualified_name: record.qualified_name.clone(),
                    file_path: record.file_path.clone(),
                    line: record.line,
                    team: record.team.clone(),
                    ticket: record.ticket.clone(),
                    consecutive_passes: pass_count,
                    ticket_resolved,
                    reason,
                });
            }
        }

        out.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));
        out
    }
}

/// Name lookup over the inventory. Resolution tries, in order: exact
/// normalized name, dotted-suffix match, then bare function name. The
/// first strategy with any hit wins and may return several records.
struct RecordIndex<'a> {
    records: &'a [TestRecord],
    exact: FxHashMap<&'a str, SmallVec1<usize>>,
    short: FxHashMap<&'a str, SmallVec1<usize>>,
}

impl<'a> RecordIndex<'a> {
    fn new(records: &'a [TestRecord]) -> Self {
        let mut exact: FxHashMap<&str, SmallVec1<usize>> = FxHashMap::default();
        let mut short: FxHashMap<&str, SmallVec1<usize>> = FxHashMap::default();
        for (i, record) in records.iter().enumerate() {
            exact.entry(record.qualified_name.as_str()).or_default().push(i);
            let leaf = record
                .qualified_name
                .rsplit('.')
                .next()
                .unwrap_or(&record.qualified_name);
            short.entry(leaf).or_default().push(i);
        }
        Self {
            records,
            exact,
            short,
        }
    }

    fn resolve(&self, name: &str) -> SmallVec1<usize> {
        let normalized = normalize_test_name(name);
        if normalized.is_empty() {
            return SmallVec::new();
        }
        if let Some(hits) = self.exact.get(normalized.as_str()) {
            return hits.clone();
        }

        let suffix_hits: SmallVec1<usize> = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| is_dotted_suffix(&r.qualified_name, &normalized))
            .map(|(i, _)| i)
            .collect();
        if !suffix_hits.is_empty() {
            return suffix_hits;
        }

        let leaf = normalized.rsplit('.').next().unwrap_or(&normalized);
        self.short.get(leaf).cloned().unwrap_or_default()
    }
}

/// True when one dotted name ends with the other on a segment boundary.
fn is_dotted_suffix(a: &str, b: &str) -> bool {
    let ends = |long: &str, short: &str| {
        long.len() > short.len()
            && long.ends_with(short)
            && long.as_bytes()[long.len() - short.len() - 1] == b'.'
    };
    ends(a, b) || ends(b, a)
}
