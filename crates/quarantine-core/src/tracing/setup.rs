//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding the log filter directives.
pub const LOG_ENV_VAR: &str = "QUARANTINE_LOG";

/// Filter used when `QUARANTINE_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "quarantine_cli=info,quarantine_core=info,quarantine_analysis=info";

/// Initialize the tracing/logging system.
///
/// Reads `QUARANTINE_LOG` for per-module log levels, e.g.
/// `QUARANTINE_LOG=quarantine_analysis::scanner=debug,quarantine_analysis::mutator=info`.
///
/// Idempotent: calling it more than once is safe.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(filter)
            .init();
    });
}
