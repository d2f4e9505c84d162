//! Tests for the quarantine tracing setup.

use std::sync::Mutex;

use quarantine_core::tracing::init_tracing;

/// Global mutex to serialize tracing tests (env var manipulation).
static TRACING_MUTEX: Mutex<()> = Mutex::new(());

#[test]
fn test_quarantine_log_debug() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    std::env::set_var("QUARANTINE_LOG", "debug");
    init_tracing();
    std::env::remove_var("QUARANTINE_LOG");
}

#[test]
fn test_per_module_filtering() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    std::env::set_var(
        "QUARANTINE_LOG",
        "quarantine_analysis::scanner=debug,quarantine_analysis::mutator=warn",
    );
    init_tracing();
    std::env::remove_var("QUARANTINE_LOG");
}

#[test]
fn test_init_tracing_idempotent() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    init_tracing();
    init_tracing();
    tracing::info!("still alive after repeated init");
}

#[test]
fn test_invalid_filter_falls_back() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    std::env::set_var("QUARANTINE_LOG", "=[not a filter");
    init_tracing();
    std::env::remove_var("QUARANTINE_LOG");
}
