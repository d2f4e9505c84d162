//! Configuration system for the quarantine engine.
//! TOML-based, layered resolution: CLI > env > project > user > defaults.

pub mod marker_config;
pub mod mutate_config;
pub mod quarantine_config;
pub mod reconcile_config;
pub mod scan_config;
pub mod team_config;

pub use marker_config::MarkerConfig;
pub use mutate_config::MutateConfig;
pub use quarantine_config::{CliOverrides, QuarantineConfig};
pub use reconcile_config::ReconcileConfig;
pub use scan_config::ScanConfig;
pub use team_config::TeamConfig;
