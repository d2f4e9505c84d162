//! quarantine-core: shared foundation for the quarantine marker engine.
//!
//! Every other crate in the workspace depends on this one for:
//! - Errors: one `thiserror` enum per subsystem, each with a stable error code
//! - Config: TOML-based, layered resolution (CLI > env > project > user > defaults)
//! - Tracing: `tracing` + `EnvFilter` driven by `QUARANTINE_LOG`
//! - Constants and collection aliases

pub mod config;
pub mod constants;
pub mod errors;
pub mod tracing;
pub mod types;

pub use config::QuarantineConfig;
pub use errors::{
    ConfigError, FormatterError, MutationError, ParseError, QuarantineErrorCode, ScanError,
    SignalError,
};
