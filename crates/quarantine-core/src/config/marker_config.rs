//! Marker grammar configuration.

use serde::{Deserialize, Serialize};

use crate::constants;

/// The textual shape of a quarantine marker. Defaults reproduce
/// `@pytest.mark.xfail(reason=f"{QUARANTINED}: ...", run=False)` byte for byte.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MarkerConfig {
    /// Dotted decorator path. Default: `pytest.mark.xfail`.
    pub decorator: Option<String>,
    /// Sentinel token prefixing the reason. Default: `QUARANTINED`.
    pub sentinel: Option<String>,
    /// Keyword holding the reason string. Default: `reason`.
    pub reason_keyword: Option<String>,
    /// Keyword holding the do-not-execute flag. Default: `run`.
    pub run_keyword: Option<String>,
    /// Module imported for the decorator. Default: `pytest`.
    pub marker_import: Option<String>,
    /// Module exporting the sentinel constant. Default: `quarantine_tools.constants`.
    pub constant_module: Option<String>,
    /// Case-sensitive ticket id regex. Default: `[A-Z][A-Z0-9_]*-[0-9]+`.
    pub ticket_pattern: Option<String>,
}

impl MarkerConfig {
    pub fn effective_decorator(&self) -> &str {
        self.decorator
            .as_deref()
            .unwrap_or(constants::DEFAULT_MARKER_DECORATOR)
    }

    pub fn effective_sentinel(&self) -> &str {
        self.sentinel.as_deref().unwrap_or(constants::DEFAULT_SENTINEL)
    }

    pub fn effective_reason_keyword(&self) -> &str {
        self.reason_keyword
            .as_deref()
            .unwrap_or(constants::DEFAULT_REASON_KEYWORD)
    }

    pub fn effective_run_keyword(&self) -> &str {
        self.run_keyword
            .as_deref()
            .unwrap_or(constants::DEFAULT_RUN_KEYWORD)
    }

    pub fn effective_marker_import(&self) -> &str {
        self.marker_import
            .as_deref()
            .unwrap_or(constants::DEFAULT_MARKER_IMPORT)
    }

    pub fn effective_constant_module(&self) -> &str {
        self.constant_module
            .as_deref()
            .unwrap_or(constants::DEFAULT_CONSTANT_MODULE)
    }

    pub fn effective_ticket_pattern(&self) -> &str {
        self.ticket_pattern
            .as_deref()
            .unwrap_or(constants::DEFAULT_TICKET_PATTERN)
    }
}
