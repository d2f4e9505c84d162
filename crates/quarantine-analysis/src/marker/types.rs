//! Marker value types.

use serde::{Deserialize, Serialize};

use crate::parsers::ByteSpan;

/// A quarantine marker found on a test function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    /// Reason text after the sentinel prefix, as the test author sees it.
    pub raw_reason: String,
    pub ticket: Option<String>,
    /// Human reason: `raw_reason` up to the ticket id, trailing separators trimmed.
    pub reason: String,
    /// Byte span of the decorator (from `@` to its closing parenthesis).
    pub span: ByteSpan,
    /// 1-based line of the decorator's `@`.
    pub line: u32,
}

/// Reason string split into its human part and ticket id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedReason {
    pub reason: String,
    pub ticket: Option<String>,
}
