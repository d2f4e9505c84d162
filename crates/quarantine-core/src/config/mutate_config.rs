//! Mutator configuration.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Post-write formatter settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MutateConfig {
    /// Formatter argv; the file path is appended. Default: `ruff format`.
    #[serde(default)]
    pub formatter: Vec<String>,
    /// Run the formatter after each write. Default: true.
    pub format_after_write: Option<bool>,
}

impl MutateConfig {
    pub fn effective_formatter(&self) -> Vec<String> {
        if self.formatter.is_empty() {
            constants::DEFAULT_FORMATTER_COMMAND
                .iter()
                .map(|s| s.to_string())
                .collect()
        } else {
            self.formatter.clone()
        }
    }

    pub fn effective_format_after_write(&self) -> bool {
        self.format_after_write.unwrap_or(true)
    }
}
