//! Failure trend and pass streaks from run outcomes.

use serde::{Deserialize, Serialize};

use crate::signals::RunOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Worsening,
    Stable,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Improving => write!(f, "improving"),
            Self::Worsening => write!(f, "worsening"),
            Self::Stable => write!(f, "stable"),
        }
    }
}

/// Compare failures in the older half of a window with the newer half.
/// A relative increase above `margin` is worsening, a decrease beyond it
/// is improving. Any failure after a clean older half is worsening.
pub fn trend_from_counts(older_failures: u32, newer_failures: u32, margin: f64) -> Trend {
    if older_failures == 0 {
        return if newer_failures > 0 {
            Trend::Worsening
        } else {
            Trend::Stable
        };
    }
    let older = f64::from(older_failures);
    let change = (f64::from(newer_failures) - older) / older;
    if change > margin {
        Trend::Worsening
    } else if change < -margin {
        Trend::Improving
    } else {
        Trend::Stable
    }
}

/// Trend over run outcomes in any order. Outcomes are sorted oldest first
/// and split into two equal halves; with an odd count the middle run is
/// left out. Fewer than two runs is stable.
pub fn compute_trend(outcomes: &[RunOutcome], margin: f64) -> Trend {
    if outcomes.len() < 2 {
        return Trend::Stable;
    }
    let mut sorted: Vec<&RunOutcome> = outcomes.iter().collect();
    sorted.sort_by_key(|o| o.started_at);
    let half = sorted.len() / 2;
    let failures = |runs: &[&RunOutcome]| runs.iter().filter(|o| o.is_failed()).count() as u32;
    let older = failures(&sorted[..half]);
    let newer = failures(&sorted[sorted.len() - half..]);
    trend_from_counts(older, newer, margin)
}

/// Passes counted back from the most recent run, stopping at the first
/// run that did not pass.
pub fn consecutive_passes(outcomes: &[RunOutcome]) -> u32 {
    let mut sorted: Vec<&RunOutcome> = outcomes.iter().collect();
    sorted.sort_by(|a, b| b.started_at.cmp(&a.started_at));
    sorted.iter().take_while(|o| o.is_passed()).count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn run(day: u32, status: &str) -> RunOutcome {
        RunOutcome::new(Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap(), status)
    }

    #[test]
    fn counts_with_zero_margin() {
        assert_eq!(trend_from_counts(4, 1, 0.0), Trend::Improving);
        assert_eq!(trend_from_counts(1, 4, 0.0), Trend::Worsening);
        assert_eq!(trend_from_counts(2, 2, 0.0), Trend::Stable);
        assert_eq!(trend_from_counts(0, 0, 0.0), Trend::Stable);
        assert_eq!(trend_from_counts(0, 1, 0.5), Trend::Worsening);
    }

    #[test]
    fn margin_absorbs_small_changes() {
        assert_eq!(trend_from_counts(10, 12, 0.25), Trend::Stable);
        assert_eq!(trend_from_counts(10, 13, 0.25), Trend::Worsening);
        assert_eq!(trend_from_counts(10, 7, 0.25), Trend::Improving);
    }

    #[test]
    fn outcomes_are_ordered_chronologically() {
        // given newest first, as history services usually return them
        let outcomes = vec![
            run(6, "PASSED"),
            run(5, "PASSED"),
            run(4, "PASSED"),
            run(3, "FAILED"),
            run(2, "FAILED"),
            run(1, "FAILED"),
        ];
        assert_eq!(compute_trend(&outcomes, 0.0), Trend::Improving);

        let reversed: Vec<RunOutcome> = vec![
            run(1, "PASSED"),
            run(2, "PASSED"),
            run(3, "FAILED"),
            run(4, "FAILED"),
        ];
        assert_eq!(compute_trend(&reversed, 0.0), Trend::Worsening);
    }

    #[test]
    fn odd_window_drops_middle_run() {
        let outcomes = vec![run(1, "FAILED"), run(2, "FAILED"), run(3, "PASSED")];
        // older half [FAILED], newer half [PASSED]
        assert_eq!(compute_trend(&outcomes, 0.0), Trend::Improving);
        assert_eq!(compute_trend(&outcomes[..1], 0.0), Trend::Stable);
    }

    #[test]
    fn pass_streak_from_newest() {
        let outcomes = vec![
            run(1, "PASSED"),
            run(2, "FAILED"),
            run(3, "PASSED"),
            run(4, "passed"),
        ];
        assert_eq!(consecutive_passes(&outcomes), 2);
        assert_eq!(consecutive_passes(&[]), 0);
        assert_eq!(consecutive_passes(&[run(1, "SKIPPED"), run(2, "PASSED")]), 1);
    }
}
