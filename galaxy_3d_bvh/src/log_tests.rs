//! Unit tests for log.rs
//!
//! Tests Logger trait, LogEntry, LogSeverity, and DefaultLogger filtering.

use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

fn entry(severity: LogSeverity, message: &str) -> LogEntry {
    LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: "galaxy3d::SceneBvh".to_string(),
        message: message.to_string(),
        file: None,
        line: None,
    }
}

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_debug() {
    assert_eq!(format!("{:?}", LogSeverity::Trace), "Trace");
    assert_eq!(format!("{:?}", LogSeverity::Warn), "Warn");
    assert_eq!(format!("{:?}", LogSeverity::Error), "Error");
}

// ============================================================================
// LOG ENTRY TESTS
// ============================================================================

#[test]
fn test_log_entry_with_file_line() {
    let entry = LogEntry {
        file: Some("bvh_validation.rs"),
        line: Some(42),
        ..entry(LogSeverity::Error, "corrupted")
    };
    let cloned = entry.clone();
    assert_eq!(cloned.file, Some("bvh_validation.rs"));
    assert_eq!(cloned.line, Some(42));
    assert_eq!(cloned.source, "galaxy3d::SceneBvh");
}

// ============================================================================
// DEFAULT LOGGER TESTS
// ============================================================================

#[test]
fn test_default_logger_threshold() {
    assert_eq!(DefaultLogger::default().min_severity(), LogSeverity::Debug);
    let logger = DefaultLogger::with_min_severity(LogSeverity::Warn);
    assert_eq!(logger.min_severity(), LogSeverity::Warn);
}

#[test]
fn test_default_logger_prints_all_severities() {
    // Output goes to stderr; this only checks nothing panics
    let logger = DefaultLogger::with_min_severity(LogSeverity::Trace);
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        logger.log(&entry(severity, "message"));
    }
    logger.log(&LogEntry { file: Some("scene_bvh.rs"), line: Some(1), ..entry(LogSeverity::Error, "e") });
}

#[test]
fn test_logger_trait_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DefaultLogger>();
}

// ============================================================================
// CUSTOM LOGGER TESTS
// ============================================================================

struct CountingLogger {
    logged: Arc<Mutex<Vec<LogSeverity>>>,
}

impl Logger for CountingLogger {
    fn log(&self, entry: &LogEntry) {
        self.logged.lock().unwrap().push(entry.severity);
    }
}

#[test]
fn test_custom_logger_implementation() {
    let logged = Arc::new(Mutex::new(Vec::new()));
    let logger = CountingLogger { logged: logged.clone() };

    logger.log(&entry(LogSeverity::Info, "first"));
    logger.log(&entry(LogSeverity::Trace, "second"));
    assert_eq!(*logged.lock().unwrap(), vec![LogSeverity::Info, LogSeverity::Trace]);
}
