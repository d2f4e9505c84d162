//! `quarantine` - track, apply and remove test quarantine markers.
//!
//! ## Commands
//!
//! - `status`: per-team totals, health and marker ages
//! - `suggest`: currently quarantined tests and, given a history export,
//!   flaky tests that are not quarantined yet
//! - `apply`: quarantine one test
//! - `remove`: lift the quarantine on one test
//! - `health`: quarantined tests whose pass streak or ticket clears them

mod output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use quarantine_analysis::aggregator::aggregate;
use quarantine_analysis::dates::{GitBlameDates, MarkerDateSource, NoDates};
use quarantine_analysis::mutator::{Mutator, TestTarget};
use quarantine_analysis::reconciler::Reconciler;
use quarantine_analysis::scanner::{ScanReport, Scanner};
use quarantine_analysis::signals::{
    FlakyTest, HistorySignal, JsonHistory, JsonPasses, JsonTickets, PassHistorySignal,
    TicketSignal,
};
use quarantine_core::config::CliOverrides;
use quarantine_core::errors::{MutationError, QuarantineErrorCode};
use quarantine_core::tracing::init_tracing;
use quarantine_core::QuarantineConfig;
use serde_json::json;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(name = "quarantine")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Track, apply and remove test quarantine markers", long_about = None)]
struct Cli {
    /// Repository root
    #[arg(long, global = true, default_value = ".", env = "QUARANTINE_ROOT")]
    root: PathBuf,

    /// Tests directory, relative to the repository root
    #[arg(long, global = true)]
    tests_root: Option<String>,

    /// Directory name to skip while scanning (repeatable, replaces the configured list)
    #[arg(long = "exclude", global = true)]
    exclude: Vec<String>,

    /// Emit JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Default)]
struct HistoryArgs {
    /// JSON export of flaky tests from the execution-history service
    #[arg(long)]
    history: Option<PathBuf>,

    /// Only consider history from this branch
    #[arg(long)]
    branch: Option<String>,

    /// History lookback window in days
    #[arg(long)]
    lookback_days: Option<u32>,

    /// Minimum failures for a history entry to count as flaky
    #[arg(long)]
    min_failures: Option<u32>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Per-team quarantine statistics
    Status {
        #[command(flatten)]
        history: HistoryArgs,

        /// Skip git blame; marker ages are reported as unknown
        #[arg(long)]
        no_blame: bool,
    },

    /// List quarantined tests and flaky tests that are not quarantined
    Suggest {
        #[command(flatten)]
        history: HistoryArgs,

        #[arg(long)]
        no_blame: bool,
    },

    /// Quarantine a test: `tests/dir/test_file.py::TestClass::test_name`
    Apply {
        target: String,

        /// Ticket id tracking the failure, e.g. CNV-12345
        #[arg(short, long)]
        ticket: String,

        /// Human-readable reason
        #[arg(short, long, default_value = "")]
        reason: String,

        /// Do not run the formatter after writing
        #[arg(long)]
        no_format: bool,
    },

    /// Remove the quarantine marker from a test
    Remove {
        target: String,

        #[arg(long)]
        no_format: bool,
    },

    /// Quarantined tests that are ready to be re-enabled
    Health {
        /// JSON object mapping ticket id to status name
        #[arg(long)]
        tickets: Option<PathBuf>,

        /// JSON object mapping test name to pass count or run outcomes
        #[arg(long)]
        passes: Option<PathBuf>,

        /// Consecutive passes needed to re-enable
        #[arg(long)]
        threshold: Option<u32>,

        #[arg(long)]
        no_blame: bool,
    },
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<MutationError>() {
                Some(mutation) => eprintln!("error: {}", mutation.coded_string()),
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut overrides = CliOverrides {
        tests_root: cli.tests_root.clone(),
        excluded_dirs: cli.exclude.clone(),
        ..Default::default()
    };

    match &cli.command {
        Commands::Status { history, no_blame } => {
            history.apply_overrides(&mut overrides);
            let config = load_config(&cli.root, &overrides)?;
            cmd_status(&cli, &config, history, *no_blame)
        }
        Commands::Suggest { history, no_blame } => {
            history.apply_overrides(&mut overrides);
            let config = load_config(&cli.root, &overrides)?;
            cmd_suggest(&cli, &config, history, *no_blame)
        }
        Commands::Apply {
            target,
            ticket,
            reason,
            no_format,
        } => {
            overrides.format_after_write = no_format.then_some(false);
            let config = load_config(&cli.root, &overrides)?;
            let target = TestTarget::parse(target, &cli.root)?;
            let outcome = mutator(&config)?.apply_target(&target, ticket, reason)?;
            if cli.json {
                output::print_json(&outcome)
            } else {
                output::print_outcome("Quarantined", &outcome);
                Ok(())
            }
        }
        Commands::Remove { target, no_format } => {
            overrides.format_after_write = no_format.then_some(false);
            let config = load_config(&cli.root, &overrides)?;
            let target = TestTarget::parse(target, &cli.root)?;
            let outcome = mutator(&config)?.remove_target(&target)?;
            if cli.json {
                output::print_json(&outcome)
            } else {
                output::print_outcome("Unquarantined", &outcome);
                Ok(())
            }
        }
        Commands::Health {
            tickets,
            passes,
            threshold,
            no_blame,
        } => {
            overrides.pass_threshold = *threshold;
            let config = load_config(&cli.root, &overrides)?;
            cmd_health(&cli, &config, tickets.as_deref(), passes.as_deref(), *no_blame)
        }
    }
}

impl HistoryArgs {
    fn apply_overrides(&self, overrides: &mut CliOverrides) {
        overrides.lookback_days = self.lookback_days;
        overrides.min_failures = self.min_failures;
    }
}

fn load_config(root: &Path, overrides: &CliOverrides) -> Result<QuarantineConfig> {
    QuarantineConfig::load(root, Some(overrides))
        .with_context(|| format!("Failed to load configuration for {}", root.display()))
}

fn mutator(config: &QuarantineConfig) -> Result<Mutator> {
    Mutator::from_config(config).context("Invalid marker configuration")
}

fn scan(cli: &Cli, config: &QuarantineConfig, no_blame: bool) -> Result<ScanReport> {
    let scanner = Scanner::new(&cli.root, config).context("Invalid marker configuration")?;
    let dates: Box<dyn MarkerDateSource> = if no_blame {
        Box::new(NoDates)
    } else {
        match GitBlameDates::open(&cli.root) {
            Ok(blame) => Box::new(blame),
            Err(e) => {
                warn!(error = %e, "marker ages unavailable");
                Box::new(NoDates)
            }
        }
    };
    let report = scanner
        .scan(dates.as_ref(), Utc::now().date_naive())
        .with_context(|| format!("Failed to scan {}", cli.root.display()))?;
    if !cli.json {
        output::print_scan_errors(&report.errors);
    }
    Ok(report)
}

/// Flaky tests from the history export; empty when no export is given or
/// it cannot be read.
fn fetch_flaky(config: &QuarantineConfig, args: &HistoryArgs) -> Vec<FlakyTest> {
    let history = args.history.as_ref().and_then(|path| {
        JsonHistory::load(path, config.reconcile.effective_min_failures())
            .map_err(|e| warn!(error = %e, "history signal unavailable"))
            .ok()
    });
    Reconciler::fetch_flaky(
        history.as_ref().map(|h| h as &dyn HistorySignal),
        config.reconcile.effective_lookback_days(),
        args.branch.as_deref(),
    )
}

fn cmd_status(cli: &Cli, config: &QuarantineConfig, args: &HistoryArgs, no_blame: bool) -> Result<()> {
    let report = scan(cli, config, no_blame)?;
    let mut aggregation = aggregate(&report.records);
    if args.history.is_some() {
        let flaky = fetch_flaky(config, args);
        let candidates = Reconciler::from_config(config).quarantine_candidates(&report.records, &flaky);
        aggregation.enrich(&candidates);
    }
    if cli.json {
        output::print_json(&json!({
            "teams": aggregation.teams,
            "overall": aggregation.overall,
            "errors": report.errors,
        }))
    } else {
        output::print_status(&aggregation);
        Ok(())
    }
}

fn cmd_suggest(cli: &Cli, config: &QuarantineConfig, args: &HistoryArgs, no_blame: bool) -> Result<()> {
    let report = scan(cli, config, no_blame)?;
    let quarantined: Vec<_> = report.quarantined().collect();
    let candidates = args.history.as_ref().map(|_| {
        let flaky = fetch_flaky(config, args);
        Reconciler::from_config(config).quarantine_candidates(&report.records, &flaky)
    });
    if cli.json {
        return output::print_json(&json!({
            "quarantined": quarantined,
            "candidates": candidates,
        }));
    }
    output::print_quarantined(&quarantined);
    if let Some(candidates) = candidates {
        println!();
        output::print_quarantine_candidates(&candidates);
    }
    Ok(())
}

fn cmd_health(
    cli: &Cli,
    config: &QuarantineConfig,
    tickets: Option<&Path>,
    passes: Option<&Path>,
    no_blame: bool,
) -> Result<()> {
    let report = scan(cli, config, no_blame)?;
    let tickets = tickets.and_then(|path| {
        JsonTickets::load(path, config.reconcile.effective_resolved_statuses())
            .map_err(|e| warn!(error = %e, "ticket signal unavailable"))
            .ok()
    });
    let passes = passes.and_then(|path| {
        JsonPasses::load(path)
            .map_err(|e| warn!(error = %e, "pass signal unavailable"))
            .ok()
    });
    let candidates = Reconciler::from_config(config).dequarantine_candidates(
        &report.records,
        tickets.as_ref().map(|t| t as &dyn TicketSignal),
        passes.as_ref().map(|p| p as &dyn PassHistorySignal),
    );
    if cli.json {
        output::print_json(&candidates)
    } else {
        output::print_dequarantine_candidates(&candidates);
        Ok(())
    }
}
