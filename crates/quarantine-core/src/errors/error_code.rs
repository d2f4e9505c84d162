//! QuarantineErrorCode trait for stable, machine-readable error codes.

/// Every error enum implements this to expose a structured code string
/// that callers (CLI exit paths, JSON output) can match on.
pub trait QuarantineErrorCode {
    /// Returns the error code string (e.g., "NOT_FOUND").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted error string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const PARSE_ERROR: &str = "PARSE_ERROR";
pub const SYNTAX_ERROR: &str = "SYNTAX_ERROR";
pub const SCAN_ERROR: &str = "SCAN_ERROR";
pub const IO_ERROR: &str = "IO_ERROR";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const AMBIGUOUS_TARGET: &str = "AMBIGUOUS_TARGET";
pub const ALREADY_QUARANTINED: &str = "ALREADY_QUARANTINED";
pub const NO_MARKER_FOUND: &str = "NO_MARKER_FOUND";
pub const INVALID_TICKET: &str = "INVALID_TICKET";
pub const INVALID_TARGET: &str = "INVALID_TARGET";
pub const EDIT_CONFLICT: &str = "EDIT_CONFLICT";
pub const VERIFICATION_FAILED: &str = "VERIFICATION_FAILED";
pub const SIGNAL_UNAVAILABLE: &str = "SIGNAL_UNAVAILABLE";
pub const SIGNAL_ERROR: &str = "SIGNAL_ERROR";
pub const FORMATTER_FAILED: &str = "FORMATTER_FAILED";
