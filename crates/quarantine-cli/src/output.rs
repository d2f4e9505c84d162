//! Table and JSON rendering for command output.

use anyhow::{Context, Result};
use quarantine_analysis::aggregator::{Aggregation, TeamStat};
use quarantine_analysis::mutator::MutationOutcome;
use quarantine_analysis::reconciler::{DequarantineCandidate, QuarantineCandidate};
use quarantine_analysis::TestRecord;
use quarantine_core::errors::ScanFileError;
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}

fn optional<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn team_row(stat: &TeamStat) -> String {
    format!(
        "{:<32} {:>6} {:>6} {:>6} {:>8.1} {:>8} {:>5} {:>5} {:>5} {:>5} {:>5}",
        stat.team,
        stat.total,
        stat.active,
        stat.quarantined,
        stat.health_percent,
        optional(stat.average_age_days.map(|a| format!("{a:.1}"))),
        stat.age_buckets.under_week,
        stat.age_buckets.week_to_month,
        stat.age_buckets.month_to_quarter,
        stat.age_buckets.over_quarter,
        optional(stat.flaky_candidates),
    )
}

pub fn print_status(aggregation: &Aggregation) {
    println!(
        "{:<32} {:>6} {:>6} {:>6} {:>8} {:>8} {:>5} {:>5} {:>5} {:>5} {:>5}",
        "TEAM", "TOTAL", "ACTIVE", "QUAR", "HEALTH%", "AVG AGE", "<7d", "<30d", "<90d", ">90d", "FLAKY"
    );
    for stat in aggregation.teams.values() {
        println!("{}", team_row(stat));
    }
    println!("{}", team_row(&aggregation.overall));
}

pub fn print_quarantined(records: &[&TestRecord]) {
    if records.is_empty() {
        println!("No quarantined tests.");
        return;
    }
    println!("Quarantined tests ({}):", records.len());
    for record in records {
        println!(
            "  {}:{}  {}  team={} ticket={} age={}",
            record.file_path,
            record.line,
            record.qualified_name,
            record.team,
            optional(record.ticket.as_deref()),
            optional(record.age_days.map(|d| format!("{d}d"))),
        );
        if let Some(reason) = record.reason.as_deref().filter(|r| !r.is_empty()) {
            println!("      {reason}");
        }
    }
}

pub fn print_quarantine_candidates(candidates: &[QuarantineCandidate]) {
    if candidates.is_empty() {
        println!("No quarantine candidates.");
        return;
    }
    println!("Quarantine candidates ({}):", candidates.len());
    for c in candidates {
        println!(
            "  {}  team={} failures={}/{} rate={:.1}% trend={}",
            c.qualified_name.as_deref().unwrap_or(&c.name),
            c.team,
            c.failure_count,
            c.total_runs,
            c.failure_rate * 100.0,
            optional(c.trend),
        );
    }
}

pub fn print_dequarantine_candidates(candidates: &[DequarantineCandidate]) {
    if candidates.is_empty() {
        println!("No de-quarantine candidates.");
        return;
    }
    println!("De-quarantine candidates ({}):", candidates.len());
    for c in candidates {
        println!(
            "  {}:{}  {}  team={} ticket={} passes={} reason={}",
            c.file_path,
            c.line,
            c.qualified_name,
            c.team,
            optional(c.ticket.as_deref()),
            optional(c.consecutive_passes),
            c.reason,
        );
    }
}

pub fn print_scan_errors(errors: &[ScanFileError]) {
    for error in errors {
        eprintln!("warning: skipped {} [{}] {}", error.path.display(), error.code, error.message);
    }
}

pub fn print_outcome(verb: &str, outcome: &MutationOutcome) {
    println!("{verb} {}::{}", outcome.file.display(), outcome.function);
    for import in &outcome.imports_added {
        println!("  added `{import}`");
    }
    if outcome.formatted {
        println!("  formatted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_renders_dash() {
        assert_eq!(optional::<u32>(None), "-");
        assert_eq!(optional(Some(3)), "3");
    }
}
