//! Tests for `src/logging.rs`.

use outreach::logging::LoggingGuard;

#[test]
fn logging_guard_is_send() {
    fn assert_send<T: Send>() {}
    assert_send::<LoggingGuard>();
}

#[test]
fn init_production_creates_logs_dir() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let logs_dir = tmp.path().join("logs");
    assert!(!logs_dir.exists());

    // The global subscriber may already be set by another test; the
    // directory is created either way.
    let guard = outreach::logging::init_production(&logs_dir);
    assert!(guard.is_ok());
    assert!(logs_dir.exists(), "logs directory should be created");
}

#[test]
fn init_cli_is_idempotent() {
    outreach::logging::init_cli();
    outreach::logging::init_cli();
}
