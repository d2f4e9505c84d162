//! Error handling for the quarantine engine.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod config_error;
pub mod error_code;
pub mod formatter_error;
pub mod mutation_error;
pub mod parse_error;
pub mod scan_error;
pub mod signal_error;

pub use config_error::ConfigError;
pub use error_code::QuarantineErrorCode;
pub use formatter_error::FormatterError;
pub use mutation_error::MutationError;
pub use parse_error::ParseError;
pub use scan_error::{ScanError, ScanFileError};
pub use signal_error::SignalError;
