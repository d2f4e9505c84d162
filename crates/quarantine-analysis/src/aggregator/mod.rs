//! Aggregation of the inventory into per-team statistics.

pub mod types;

use std::collections::BTreeMap;

use quarantine_core::constants::ALL_TEAMS;
use serde::{Deserialize, Serialize};

use crate::classifier::TestRecord;
use crate::reconciler::QuarantineCandidate;

pub use types::{AgeBuckets, Aggregation, BranchStats, RepositoryStats, ScopedAggregation, TeamStat};

/// `(total − quarantined) / total × 100`, and 100.0 for an empty team.
pub fn health_percent(total: usize, quarantined: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (total.saturating_sub(quarantined) as f64) / (total as f64) * 100.0
}

fn team_stat<'a>(team: &str, records: impl IntoIterator<Item = &'a TestRecord>) -> TeamStat {
    let mut total = 0usize;
    let mut quarantined = 0usize;
    let mut buckets = AgeBuckets::default();
    let mut age_sum = 0i64;
    let mut age_count = 0usize;

    for record in records {
        total += 1;
        if !record.is_quarantined() {
            continue;
        }
        quarantined += 1;
        buckets.add(record.age_days);
        if let Some(age) = record.age_days {
            age_sum += age;
            age_count += 1;
        }
    }

    TeamStat {
        team: team.to_string(),
        total,
        active: total - quarantined,
        quarantined,
        health_percent: health_percent(total, quarantined),
        average_age_days: (age_count > 0).then(|| age_sum as f64 / age_count as f64),
        age_buckets: buckets,
        flaky_candidates: None,
        mean_failure_rate: None,
    }
}

/// Group records by team and compute one row per team plus the overall row.
pub fn aggregate(records: &[TestRecord]) -> Aggregation {
    let mut by_team: BTreeMap<&str, Vec<&TestRecord>> = BTreeMap::new();
    for record in records {
        by_team.entry(record.team.as_str()).or_default().push(record);
    }
    let teams = by_team
        .into_iter()
        .map(|(team, rows)| (team.to_string(), team_stat(team, rows)))
        .collect();
    Aggregation {
        teams,
        overall: team_stat(ALL_TEAMS, records),
    }
}

impl Aggregation {
    /// Fill the flaky-candidate count and mean failure rate from
    /// reconciliation output. Candidates whose team has no local tests
    /// only count towards the overall row.
    pub fn enrich(&mut self, candidates: &[QuarantineCandidate]) {
        let mut by_team: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for candidate in candidates {
            by_team
                .entry(candidate.team.as_str())
                .or_default()
                .push(candidate.failure_rate);
        }
        for (team, stat) in self.teams.iter_mut() {
            let rates = by_team.get(team.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            apply_rates(stat, rates);
        }
        let all: Vec<f64> = candidates.iter().map(|c| c.failure_rate).collect();
        apply_rates(&mut self.overall, &all);
    }
}

fn apply_rates(stat: &mut TeamStat, rates: &[f64]) {
    stat.flaky_candidates = Some(rates.len());
    stat.mean_failure_rate = if rates.is_empty() {
        None
    } else {
        Some(rates.iter().sum::<f64>() / rates.len() as f64)
    };
}

/// An inventory labelled with the repository and branch it was scanned from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopedInventory {
    pub repository: String,
    pub branch: String,
    pub records: Vec<TestRecord>,
}

/// Roll inventories up into repository → branch → team statistics.
/// Inventories sharing a repository and branch are merged.
pub fn aggregate_scoped(inventories: &[ScopedInventory]) -> ScopedAggregation {
    let mut tree: BTreeMap<&str, BTreeMap<&str, Vec<&TestRecord>>> = BTreeMap::new();
    for inventory in inventories {
        tree.entry(inventory.repository.as_str())
            .or_default()
            .entry(inventory.branch.as_str())
            .or_default()
            .extend(inventory.records.iter());
    }

    let mut repositories = BTreeMap::new();
    for (repository, branches) in tree {
        let overall = team_stat(ALL_TEAMS, branches.values().flatten().copied());
        let branches = branches
            .into_iter()
            .map(|(branch, records)| {
                let owned: Vec<TestRecord> = records.into_iter().cloned().collect();
                (
                    branch.to_string(),
                    BranchStats {
                        branch: branch.to_string(),
                        aggregation: aggregate(&owned),
                    },
                )
            })
            .collect();
        repositories.insert(
            repository.to_string(),
            RepositoryStats {
                repository: repository.to_string(),
                overall,
                branches,
            },
        );
    }

    ScopedAggregation {
        repositories,
        overall: team_stat(ALL_TEAMS, inventories.iter().flat_map(|i| i.records.iter())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::TestStatus;

    fn record(team: &str, status: TestStatus, age: Option<i64>) -> TestRecord {
        TestRecord {
            qualified_name: format!("tests.{team}.test_x.test_{}", age.unwrap_or(-1)),
            file_path: format!("tests/{team}/test_x.py"),
            line: 1,
            team: team.to_string(),
            status,
            ticket: None,
            reason: None,
            quarantined_since: None,
            age_days: age,
        }
    }

    #[test]
    fn health_percent_edges() {
        assert_eq!(health_percent(0, 0), 100.0);
        assert_eq!(health_percent(10, 2), 80.0);
        assert_eq!(health_percent(4, 4), 0.0);
    }

    #[test]
    fn per_team_and_overall_rows() {
        let mut records: Vec<TestRecord> = (0..8)
            .map(|_| record("storage", TestStatus::Active, None))
            .collect();
        records.push(record("storage", TestStatus::Quarantined, Some(10)));
        records.push(record("storage", TestStatus::Quarantined, Some(30)));
        records.push(record("network", TestStatus::Active, None));

        let agg = aggregate(&records);
        let storage = &agg.teams["storage"];
        assert_eq!((storage.total, storage.active, storage.quarantined), (10, 8, 2));
        assert_eq!(storage.health_percent, 80.0);
        assert_eq!(storage.average_age_days, Some(20.0));
        assert_eq!(storage.age_buckets.week_to_month, 1);
        assert_eq!(storage.age_buckets.month_to_quarter, 1);

        let network = &agg.teams["network"];
        assert_eq!(network.health_percent, 100.0);
        assert_eq!(network.average_age_days, None);

        assert_eq!(agg.overall.team, "all");
        assert_eq!(agg.overall.total, 11);
        assert_eq!(agg.overall.quarantined, 2);
    }

    #[test]
    fn average_age_ignores_unknown_ages() {
        let records = vec![
            record("virt", TestStatus::Quarantined, None),
            record("virt", TestStatus::Quarantined, Some(40)),
        ];
        let agg = aggregate(&records);
        assert_eq!(agg.teams["virt"].average_age_days, Some(40.0));
        assert_eq!(agg.teams["virt"].age_buckets.unknown, 1);

        let unknown_only = aggregate(&[record("virt", TestStatus::Quarantined, None)]);
        assert_eq!(unknown_only.teams["virt"].average_age_days, None);
    }

    #[test]
    fn age_bucket_boundaries() {
        let mut buckets = AgeBuckets::default();
        for age in [0, 6, 7, 29, 30, 90, 91] {
            buckets.add(Some(age));
        }
        buckets.add(None);
        assert_eq!(buckets.under_week, 2);
        assert_eq!(buckets.week_to_month, 2);
        assert_eq!(buckets.month_to_quarter, 2);
        assert_eq!(buckets.over_quarter, 1);
        assert_eq!(buckets.unknown, 1);
        assert_eq!(buckets.total(), 8);
    }

    #[test]
    fn empty_inventory() {
        let agg = aggregate(&[]);
        assert!(agg.teams.is_empty());
        assert_eq!(agg.overall.health_percent, 100.0);
    }

    #[test]
    fn enrich_with_candidates() {
        let records = vec![
            record("network", TestStatus::Active, None),
            record("storage", TestStatus::Active, None),
        ];
        let mut agg = aggregate(&records);
        let candidate = |team: &str, rate: f64| QuarantineCandidate {
            name: format!("tests/{team}/test_y.py::test_y"),
            qualified_name: None,
            team: team.to_string(),
            failure_count: 3,
            total_runs: 10,
            failure_rate: rate,
            trend: None,
        };
        agg.enrich(&[
            candidate("network", 0.2),
            candidate("network", 0.4),
            candidate("chaos", 0.9),
        ]);
        let network = &agg.teams["network"];
        assert_eq!(network.flaky_candidates, Some(2));
        assert!((network.mean_failure_rate.unwrap() - 0.3).abs() < 1e-9);
        assert_eq!(agg.teams["storage"].flaky_candidates, Some(0));
        assert_eq!(agg.teams["storage"].mean_failure_rate, None);
        assert!(!agg.teams.contains_key("chaos"));
        assert_eq!(agg.overall.flaky_candidates, Some(3));
    }

    #[test]
    fn scoped_rollup() {
        let inventories = vec![
            ScopedInventory {
                repository: "openshift-virtualization-tests".into(),
                branch: "main".into(),
                records: vec![
                    record("network", TestStatus::Active, None),
                    record("network", TestStatus::Quarantined, Some(3)),
                ],
            },
            ScopedInventory {
                repository: "openshift-virtualization-tests".into(),
                branch: "cnv-4.18".into(),
                records: vec![record("storage", TestStatus::Active, None)],
            },
            ScopedInventory {
                repository: "other".into(),
                branch: "main".into(),
                records: vec![record("chaos", TestStatus::Quarantined, None)],
            },
        ];
        let scoped = aggregate_scoped(&inventories);
        let repo = &scoped.repositories["openshift-virtualization-tests"];
        assert_eq!(repo.overall.total, 3);
        assert_eq!(repo.branches.len(), 2);
        let main = &repo.branches["main"].aggregation;
        assert_eq!(main.teams["network"].health_percent, 50.0);
        assert_eq!(scoped.overall.total, 4);
        assert_eq!(scoped.overall.quarantined, 2);
    }
}
