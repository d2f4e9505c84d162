//! Reconciliation configuration.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Thresholds for candidate selection and trend detection.
///
/// Two ticket-status vocabularies exist for "resolved": the de-quarantine
/// check accepts `closed`/`resolved`, the open-ticket listing also accepts
/// `done`. Neither is assumed; the caller picks via `resolved_statuses`
/// and the narrower set is the default.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Consecutive passes needed for de-quarantine. Default: 5.
    pub pass_threshold: Option<u32>,
    /// Relative failure change between window halves. Default: 0.0.
    pub trend_margin: Option<f64>,
    /// Minimum failures for a history entry to count as flaky. Default: 3.
    pub min_failures: Option<u32>,
    /// History lookback in days. Default: 7.
    pub lookback_days: Option<u32>,
    /// Ticket statuses (case-insensitive) that count as resolved.
    #[serde(default)]
    pub resolved_statuses: Vec<String>,
}

impl ReconcileConfig {
    pub fn effective_pass_threshold(&self) -> u32 {
        self.pass_threshold
            .unwrap_or(constants::DEFAULT_PASS_THRESHOLD)
    }

    pub fn effective_trend_margin(&self) -> f64 {
        self.trend_margin
            .unwrap_or(constants::DEFAULT_TREND_MARGIN)
    }

    pub fn effective_min_failures(&self) -> u32 {
        self.min_failures
            .unwrap_or(constants::DEFAULT_MIN_FAILURES)
    }

    pub fn effective_lookback_days(&self) -> u32 {
        self.lookback_days
            .unwrap_or(constants::DEFAULT_LOOKBACK_DAYS)
    }

    /// Lower-cased resolved statuses, defaulting to the narrow vocabulary.
    pub fn effective_resolved_statuses(&self) -> Vec<String> {
        if self.resolved_statuses.is_empty() {
            constants::NARROW_RESOLVED_STATUSES
                .iter()
                .map(|s| s.to_string())
                .collect()
        } else {
            self.resolved_statuses
                .iter()
                .map(|s| s.to_lowercase())
                .collect()
        }
    }
}
