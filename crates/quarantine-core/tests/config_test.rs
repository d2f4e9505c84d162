//! Tests for the quarantine configuration system.

use std::sync::Mutex;

use quarantine_core::config::{CliOverrides, QuarantineConfig};
use quarantine_core::errors::ConfigError;

/// Global mutex to serialize tests that modify environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn tempdir() -> tempfile::TempDir {
    tempfile::TempDir::new().unwrap()
}

/// Clear all QUARANTINE_ env vars to prevent cross-test contamination.
fn clear_quarantine_env_vars() {
    for key in [
        "QUARANTINE_TESTS_ROOT",
        "QUARANTINE_EXCLUDED_DIRS",
        "QUARANTINE_SCAN_THREADS",
        "QUARANTINE_PASS_THRESHOLD",
        "QUARANTINE_MIN_FAILURES",
        "QUARANTINE_LOOKBACK_DAYS",
        "QUARANTINE_RESOLVED_STATUSES",
        "QUARANTINE_FORMAT_AFTER_WRITE",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn test_layered_resolution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_quarantine_env_vars();

    let dir = tempdir();
    std::fs::write(
        dir.path().join("quarantine.toml"),
        r#"
[scan]
tests_root = "suite"

[reconcile]
pass_threshold = 8
min_failures = 4
"#,
    )
    .unwrap();

    std::env::set_var("QUARANTINE_MIN_FAILURES", "6");
    std::env::set_var("QUARANTINE_PASS_THRESHOLD", "9");

    let cli = CliOverrides {
        pass_threshold: Some(12),
        ..Default::default()
    };

    let config = QuarantineConfig::load(dir.path(), Some(&cli)).unwrap();

    // Project value survives when nothing above it is set
    assert_eq!(config.scan.effective_tests_root(), "suite");
    // Env overrides project
    assert_eq!(config.reconcile.effective_min_failures(), 6);
    // CLI overrides env
    assert_eq!(config.reconcile.effective_pass_threshold(), 12);

    clear_quarantine_env_vars();
}

#[test]
fn test_load_without_files_uses_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_quarantine_env_vars();

    let dir = tempdir();
    let config = QuarantineConfig::load(dir.path(), None).unwrap();

    assert_eq!(config.marker.effective_decorator(), "pytest.mark.xfail");
    assert_eq!(config.marker.effective_sentinel(), "QUARANTINED");
    assert_eq!(config.scan.effective_tests_root(), "tests");
    assert_eq!(config.scan.effective_excluded_dirs(), vec!["__pycache__"]);
    assert_eq!(config.reconcile.effective_pass_threshold(), 5);
    assert_eq!(config.reconcile.effective_min_failures(), 3);
    assert_eq!(config.reconcile.effective_lookback_days(), 7);
    assert_eq!(config.reconcile.effective_trend_margin(), 0.0);
    assert_eq!(
        config.reconcile.effective_resolved_statuses(),
        vec!["closed", "resolved"]
    );
    assert_eq!(config.mutate.effective_formatter(), vec!["ruff", "format"]);
    assert!(config.mutate.effective_format_after_write());
}

#[test]
fn test_default_team_overrides() {
    let config = QuarantineConfig::default();
    let overrides = config.teams.effective_overrides();
    assert_eq!(overrides.get("compute").map(String::as_str), Some("virt"));
    assert_eq!(
        overrides
            .get("cross_cluster_live_migration")
            .map(String::as_str),
        Some("storage")
    );
    assert_eq!(
        overrides.get("install_upgrade_operators").map(String::as_str),
        Some("iuo")
    );
    assert_eq!(overrides.len(), 10);
    assert_eq!(
        config.teams.effective_preserve(),
        vec!["install_upgrade_operators".to_string()]
    );
    assert_eq!(config.teams.effective_unknown_team(), "unknown");
}

#[test]
fn test_project_team_table_replaces_defaults() {
    let config = QuarantineConfig::from_toml(
        r#"
[teams]
unknown_team = "orphans"

[teams.overrides]
network_v2 = "network"
"#,
    )
    .unwrap();
    let overrides = config.teams.effective_overrides();
    assert_eq!(overrides.len(), 1);
    assert_eq!(overrides.get("network_v2").map(String::as_str), Some("network"));
    assert_eq!(config.teams.effective_unknown_team(), "orphans");
}

#[test]
fn test_team_preserve_list_from_toml() {
    let config = QuarantineConfig::from_toml(
        r#"
[teams]
preserve = []
"#,
    )
    .unwrap();
    assert!(config.teams.effective_preserve().is_empty());
    assert_eq!(config.teams.effective_overrides().len(), 10);
}

#[test]
fn test_invalid_toml_reports_parse_error() {
    let result = QuarantineConfig::from_toml("[scan\ntests_root = ");
    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

#[test]
fn test_invalid_project_file_fails_load() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_quarantine_env_vars();

    let dir = tempdir();
    std::fs::write(dir.path().join("quarantine.toml"), "not = [valid").unwrap();
    let result = QuarantineConfig::load(dir.path(), None);
    match result {
        Err(ConfigError::ParseError { path, .. }) => assert!(path.ends_with("quarantine.toml")),
        other => panic!("expected ParseError, got {other:?}"),
    }
}

#[test]
fn test_validation_rejects_bad_ticket_pattern() {
    let result = QuarantineConfig::from_toml(
        r#"
[marker]
ticket_pattern = "[A-Z"
"#,
    );
    match result {
        Err(ConfigError::ValidationFailed { field, .. }) => {
            assert_eq!(field, "marker.ticket_pattern")
        }
        other => panic!("expected ValidationFailed, got {other:?}"),
    }
}

#[test]
fn test_validation_rejects_zero_pass_threshold() {
    let result = QuarantineConfig::from_toml("[reconcile]\npass_threshold = 0\n");
    assert!(matches!(
        result,
        Err(ConfigError::ValidationFailed { ref field, .. }) if field == "reconcile.pass_threshold"
    ));
}

#[test]
fn test_validation_rejects_negative_trend_margin() {
    let result = QuarantineConfig::from_toml("[reconcile]\ntrend_margin = -0.5\n");
    assert!(matches!(
        result,
        Err(ConfigError::ValidationFailed { ref field, .. }) if field == "reconcile.trend_margin"
    ));
}

#[test]
fn test_validation_rejects_empty_tests_root() {
    let result = QuarantineConfig::from_toml("[scan]\ntests_root = \"  \"\n");
    assert!(matches!(result, Err(ConfigError::ValidationFailed { .. })));
}

#[test]
fn test_unknown_keys_are_ignored() {
    let config = QuarantineConfig::from_toml(
        r#"
[scan]
tests_root = "tests"
future_option = true

[something_new]
key = 1
"#,
    )
    .unwrap();
    assert_eq!(config.scan.effective_tests_root(), "tests");
}

#[test]
fn test_env_resolved_statuses_are_lowercased() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_quarantine_env_vars();

    std::env::set_var("QUARANTINE_RESOLVED_STATUSES", "Closed, RESOLVED ,Done");
    let dir = tempdir();
    let config = QuarantineConfig::load(dir.path(), None).unwrap();
    assert_eq!(
        config.reconcile.effective_resolved_statuses(),
        vec!["closed", "resolved", "done"]
    );

    clear_quarantine_env_vars();
}

#[test]
fn test_unparseable_env_value_is_ignored() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_quarantine_env_vars();

    std::env::set_var("QUARANTINE_PASS_THRESHOLD", "many");
    let dir = tempdir();
    let config = QuarantineConfig::load(dir.path(), None).unwrap();
    assert_eq!(config.reconcile.effective_pass_threshold(), 5);

    clear_quarantine_env_vars();
}

#[test]
fn test_cli_excluded_dirs_and_formatter_toggle() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_quarantine_env_vars();

    let dir = tempdir();
    let cli = CliOverrides {
        excluded_dirs: vec!["fixtures".to_string(), "__pycache__".to_string()],
        format_after_write: Some(false),
        ..Default::default()
    };
    let config = QuarantineConfig::load(dir.path(), Some(&cli)).unwrap();
    assert_eq!(
        config.scan.effective_excluded_dirs(),
        vec!["fixtures", "__pycache__"]
    );
    assert!(!config.mutate.effective_format_after_write());
}

#[test]
fn test_to_toml_round_trips() {
    let original = QuarantineConfig::from_toml(
        r#"
[marker]
sentinel = "QUARANTINED"

[reconcile]
pass_threshold = 7
resolved_statuses = ["closed", "resolved", "done"]
"#,
    )
    .unwrap();
    let text = original.to_toml().unwrap();
    let reparsed = QuarantineConfig::from_toml(&text).unwrap();
    assert_eq!(reparsed.reconcile.effective_pass_threshold(), 7);
    assert_eq!(reparsed.reconcile.resolved_statuses.len(), 3);
    assert_eq!(reparsed.marker.effective_sentinel(), "QUARANTINED");
}
