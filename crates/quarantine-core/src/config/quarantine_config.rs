//! Top-level configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{MarkerConfig, MutateConfig, ReconcileConfig, ScanConfig, TeamConfig};
use crate::errors::ConfigError;

/// Project config file name, looked up in the repository root.
pub const PROJECT_CONFIG_FILE: &str = "quarantine.toml";

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`QUARANTINE_*`)
/// 3. Project config (`quarantine.toml` in the repository root)
/// 4. User config (`~/.quarantine/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct QuarantineConfig {
    pub marker: MarkerConfig,
    pub scan: ScanConfig,
    pub teams: TeamConfig,
    pub reconcile: ReconcileConfig,
    pub mutate: MutateConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub tests_root: Option<String>,
    pub excluded_dirs: Vec<String>,
    pub pass_threshold: Option<u32>,
    pub min_failures: Option<u32>,
    pub lookback_days: Option<u32>,
    pub format_after_write: Option<bool>,
}

impl QuarantineConfig {
    /// Load configuration with layered resolution rooted at `root`.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 4 (lowest priority): user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(err @ ConfigError::ParseError { .. }) => return Err(err),
                    Err(err) => {
                        tracing::warn!(error = %err, "ignoring unreadable user config");
                    }
                }
            }
        }

        // Layer 3: project config
        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config);

        // Layer 1 (highest priority): CLI flags
        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(config: &QuarantineConfig) -> Result<(), ConfigError> {
        if let Err(e) = regex::Regex::new(config.marker.effective_ticket_pattern()) {
            return Err(ConfigError::ValidationFailed {
                field: "marker.ticket_pattern".to_string(),
                message: e.to_string(),
            });
        }
        if config.marker.effective_sentinel().trim().is_empty() {
            return Err(ConfigError::ValidationFailed {
                field: "marker.sentinel".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if config.scan.effective_tests_root().trim().is_empty() {
            return Err(ConfigError::ValidationFailed {
                field: "scan.tests_root".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if config.scan.max_file_size == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "scan.max_file_size".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.reconcile.pass_threshold == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "reconcile.pass_threshold".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if let Some(margin) = config.reconcile.trend_margin {
            if !margin.is_finite() || margin < 0.0 {
                return Err(ConfigError::ValidationFailed {
                    field: "reconcile.trend_margin".to_string(),
                    message: "must be a non-negative number".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Returns the user config path: `~/.quarantine/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        home_dir().map(|h| h.join(".quarantine").join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut QuarantineConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: QuarantineConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `other` wins wherever it carries a value.
    fn merge(base: &mut QuarantineConfig, other: &QuarantineConfig) {
        // Marker
        let marker = &other.marker;
        if marker.decorator.is_some() {
            base.marker.decorator = marker.decorator.clone();
        }
        if marker.sentinel.is_some() {
            base.marker.sentinel = marker.sentinel.clone();
        }
        if marker.reason_keyword.is_some() {
            base.marker.reason_keyword = marker.reason_keyword.clone();
        }
        if marker.run_keyword.is_some() {
            base.marker.run_keyword = marker.run_keyword.clone();
        }
        if marker.marker_import.is_some() {
            base.marker.marker_import = marker.marker_import.clone();
        }
        if marker.constant_module.is_some() {
            base.marker.constant_module = marker.constant_module.clone();
        }
        if marker.ticket_pattern.is_some() {
            base.marker.ticket_pattern = marker.ticket_pattern.clone();
        }

        // Scan
        if other.scan.tests_root.is_some() {
            base.scan.tests_root = other.scan.tests_root.clone();
        }
        if !other.scan.excluded_dirs.is_empty() {
            base.scan.excluded_dirs = other.scan.excluded_dirs.clone();
        }
        if other.scan.max_file_size.is_some() {
            base.scan.max_file_size = other.scan.max_file_size;
        }
        if other.scan.threads.is_some() {
            base.scan.threads = other.scan.threads;
        }

        // Teams
        if !other.teams.overrides.is_empty() {
            base.teams.overrides = other.teams.overrides.clone();
        }
        if other.teams.unknown_team.is_some() {
            base.teams.unknown_team = other.teams.unknown_team.clone();
        }
        if other.teams.preserve.is_some() {
            base.teams.preserve = other.teams.preserve.clone();
        }

        // Reconcile
        if other.reconcile.pass_threshold.is_some() {
            base.reconcile.pass_threshold = other.reconcile.pass_threshold;
        }
        if other.reconcile.trend_margin.is_some() {
            base.reconcile.trend_margin = other.reconcile.trend_margin;
        }
        if other.reconcile.min_failures.is_some() {
            base.reconcile.min_failures = other.reconcile.min_failures;
        }
        if other.reconcile.lookback_days.is_some() {
            base.reconcile.lookback_days = other.reconcile.lookback_days;
        }
        if !other.reconcile.resolved_statuses.is_empty() {
            base.reconcile.resolved_statuses = other.reconcile.resolved_statuses.clone();
        }

        // Mutate
        if !other.mutate.formatter.is_empty() {
            base.mutate.formatter = other.mutate.formatter.clone();
        }
        if other.mutate.format_after_write.is_some() {
            base.mutate.format_after_write = other.mutate.format_after_write;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `QUARANTINE_TESTS_ROOT`, `QUARANTINE_PASS_THRESHOLD`, etc.
    fn apply_env_overrides(config: &mut QuarantineConfig) {
        if let Ok(val) = std::env::var("QUARANTINE_TESTS_ROOT") {
            config.scan.tests_root = Some(val);
        }
        if let Ok(val) = std::env::var("QUARANTINE_EXCLUDED_DIRS") {
            let dirs: Vec<String> = val
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(String::from)
                .collect();
            if !dirs.is_empty() {
                config.scan.excluded_dirs = dirs;
            }
        }
        if let Ok(val) = std::env::var("QUARANTINE_SCAN_THREADS") {
            if let Ok(v) = val.parse::<usize>() {
                config.scan.threads = Some(v);
            }
        }
        if let Ok(val) = std::env::var("QUARANTINE_PASS_THRESHOLD") {
            if let Ok(v) = val.parse::<u32>() {
                config.reconcile.pass_threshold = Some(v);
            }
        }
        if let Ok(val) = std::env::var("QUARANTINE_MIN_FAILURES") {
            if let Ok(v) = val.parse::<u32>() {
                config.reconcile.min_failures = Some(v);
            }
        }
        if let Ok(val) = std::env::var("QUARANTINE_LOOKBACK_DAYS") {
            if let Ok(v) = val.parse::<u32>() {
                config.reconcile.lookback_days = Some(v);
            }
        }
        if let Ok(val) = std::env::var("QUARANTINE_RESOLVED_STATUSES") {
            config.reconcile.resolved_statuses = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_lowercase)
                .collect();
        }
        if let Ok(val) = std::env::var("QUARANTINE_FORMAT_AFTER_WRITE") {
            if let Ok(v) = val.parse::<bool>() {
                config.mutate.format_after_write = Some(v);
            }
        }
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut QuarantineConfig, cli: &CliOverrides) {
        if let Some(ref v) = cli.tests_root {
            config.scan.tests_root = Some(v.clone());
        }
        if !cli.excluded_dirs.is_empty() {
            config.scan.excluded_dirs = cli.excluded_dirs.clone();
        }
        if let Some(v) = cli.pass_threshold {
            config.reconcile.pass_threshold = Some(v);
        }
        if let Some(v) = cli.min_failures {
            config.reconcile.min_failures = Some(v);
        }
        if let Some(v) = cli.lookback_days {
            config.reconcile.lookback_days = Some(v);
        }
        if let Some(v) = cli.format_after_write {
            config.mutate.format_after_write = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
