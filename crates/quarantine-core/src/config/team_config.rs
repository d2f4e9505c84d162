//! Team derivation configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants;

/// Directory → team override table and the fallback label.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TeamConfig {
    /// Directory name (first component below the tests root) → team name.
    #[serde(default)]
    pub overrides: BTreeMap<String, String>,
    /// Label for paths with no directory below the tests root. Default: `unknown`.
    pub unknown_team: Option<String>,
    /// Directory names the override table never remaps.
    /// Default: `["install_upgrade_operators"]`; an empty list preserves nothing.
    pub preserve: Option<Vec<String>>,
}

impl TeamConfig {
    /// Configured overrides, or the compiled defaults when the table is empty.
    pub fn effective_overrides(&self) -> BTreeMap<String, String> {
        if self.overrides.is_empty() {
            constants::DEFAULT_TEAM_OVERRIDES
                .iter()
                .map(|(dir, team)| (dir.to_string(), team.to_string()))
                .collect()
        } else {
            self.overrides.clone()
        }
    }

    pub fn effective_preserve(&self) -> Vec<String> {
        match &self.preserve {
            Some(dirs) => dirs.clone(),
            None => constants::DEFAULT_PRESERVED_TEAM_DIRS
                .iter()
                .map(|d| d.to_string())
                .collect(),
        }
    }

    pub fn effective_unknown_team(&self) -> &str {
        self.unknown_team
            .as_deref()
            .unwrap_or(constants::UNKNOWN_TEAM)
    }
}
