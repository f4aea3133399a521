//! Tests for logging.rs module

use job_tracker::config::AppConfig;
use job_tracker::logging::{init_logging, OperationTimer};
use tempfile::tempdir;

#[test]
fn test_init_logging_with_file_returns_guard() {
    let dir = tempdir().expect("Failed to create temp directory");
    let mut config = AppConfig::default().logging;
    config.level = "debug".to_string();
    config.format = "json".to_string();
    config.file_path = Some(dir.path().join("tracker.log").to_string_lossy().into_owned());

    let guard = init_logging(&config).expect("Failed to initialize logging");
    assert!(guard.is_some());

    let timer = OperationTimer::new("logging_test");
    assert!(timer.finish() < 60_000);

    // A second subscriber cannot be installed in the same process
    assert!(init_logging(&config).is_err());
    drop(guard);
}
