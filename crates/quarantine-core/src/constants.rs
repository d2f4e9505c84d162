//! Shared constants for the quarantine marker engine.

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ---- Marker grammar ----

/// Decorator that carries a quarantine marker.
pub const DEFAULT_MARKER_DECORATOR: &str = "pytest.mark.xfail";

/// Sentinel token that prefixes a quarantine reason.
pub const DEFAULT_SENTINEL: &str = "QUARANTINED";

/// Keyword argument holding the reason string.
pub const DEFAULT_REASON_KEYWORD: &str = "reason";

/// Keyword argument holding the do-not-execute flag (set to `False`).
pub const DEFAULT_RUN_KEYWORD: &str = "run";

/// Module imported for the marker machinery (`import pytest`).
pub const DEFAULT_MARKER_IMPORT: &str = "pytest";

/// Module the sentinel constant is imported from.
pub const DEFAULT_CONSTANT_MODULE: &str = "quarantine_tools.constants";

/// Case-sensitive ticket id pattern (`PROJECTKEY-NUMBER`).
pub const DEFAULT_TICKET_PATTERN: &str = r"[A-Z][A-Z0-9_]*-[0-9]+";

// ---- Scanning ----

/// Directory under the repository root that holds the test suite.
pub const DEFAULT_TESTS_ROOT: &str = "tests";

/// Directory names never descended into.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &["__pycache__"];

/// Maximum source file size in bytes (default: 1MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_048_576;

/// Default number of worker threads (0 = auto-detect).
pub const DEFAULT_THREADS: usize = 0;

/// Prefix a function name must carry to be collected as a test.
pub const TEST_FUNCTION_PREFIX: &str = "test_";

/// Prefix a class name must carry for its methods to be collected.
pub const TEST_CLASS_PREFIX: &str = "Test";

// ---- Teams ----

/// Team label used when a path has no directory below the tests root.
pub const UNKNOWN_TEAM: &str = "unknown";

/// Label of the roll-up row covering every team.
pub const ALL_TEAMS: &str = "all";

/// Directory name → team overrides applied when no project table is configured.
pub const DEFAULT_TEAM_OVERRIDES: &[(&str, &str)] = &[
    ("chaos", "chaos"),
    ("virt", "virt"),
    ("network", "network"),
    ("storage", "storage"),
    ("install_upgrade_operators", "iuo"),
    ("observability", "observability"),
    ("infrastructure", "infrastructure"),
    ("data_protection", "data_protection"),
    ("compute", "virt"),
    ("cross_cluster_live_migration", "storage"),
];

/// Directories that keep their own name as team even when the override
/// table remaps them.
pub const DEFAULT_PRESERVED_TEAM_DIRS: &[&str] = &["install_upgrade_operators"];

// ---- Reconciliation ----

/// Consecutive passes needed before a quarantined test is a de-quarantine candidate.
pub const DEFAULT_PASS_THRESHOLD: u32 = 5;

/// Relative change in failures between window halves that counts as a trend.
pub const DEFAULT_TREND_MARGIN: f64 = 0.0;

/// Minimum failures in the lookback window for a flaky entry to count.
pub const DEFAULT_MIN_FAILURES: u32 = 3;

/// History lookback window in days.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 7;

/// Ticket statuses treated as resolved by the de-quarantine check.
pub const NARROW_RESOLVED_STATUSES: &[&str] = &["closed", "resolved"];

/// Ticket statuses treated as resolved by the open-ticket listing.
pub const BROAD_RESOLVED_STATUSES: &[&str] = &["closed", "resolved", "done"];

// ---- Mutation ----

/// External formatter invoked after every write.
pub const DEFAULT_FORMATTER_COMMAND: &[&str] = &["ruff", "format"];

// ---- Age buckets (days) ----

pub const AGE_BUCKET_WEEK: i64 = 7;
pub const AGE_BUCKET_MONTH: i64 = 30;
pub const AGE_BUCKET_QUARTER: i64 = 90;
