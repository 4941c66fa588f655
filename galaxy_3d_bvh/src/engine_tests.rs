//! Unit tests for the Engine logging front door
//!
//! IMPORTANT: the logger is a global OnceLock shared across all tests.
//! Tests that replace it are marked with #[serial]. Other tests may log
//! concurrently, so assertions only look at entries with their own source tag.

use crate::galaxy3d::{Engine, Error};
use crate::galaxy3d::log::{Logger, LogEntry, LogSeverity};
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST HELPERS
// ============================================================================

/// Test logger that captures log entries for verification
#[derive(Clone)]
struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl CaptureLogger {
    fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn from_source(&self, source: &str) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| entry.source == source)
            .cloned()
            .collect()
    }
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

// ============================================================================
// LOGGER TESTS
// ============================================================================

#[test]
#[serial]
fn test_set_logger_receives_macro_output() {
    let capture = CaptureLogger::new();
    Engine::set_logger(capture.clone());

    crate::engine_trace!("test::engine_macros", "trace {}", 1);
    crate::engine_debug!("test::engine_macros", "debug {}", 2);
    crate::engine_info!("test::engine_macros", "info {}", 3);
    crate::engine_warn!("test::engine_macros", "warn {}", 4);
    crate::engine_error!("test::engine_macros", "error {}", 5);
    Engine::reset_logger();

    let entries = capture.from_source("test::engine_macros");
    let severities: Vec<LogSeverity> = entries.iter().map(|e| e.severity).collect();
    assert_eq!(severities, vec![
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ]);
    assert_eq!(entries[2].message, "info 3");
    assert!(entries[0].file.is_none());
    assert!(entries[4].file.is_some());
    assert!(entries[4].line.is_some());
}

#[test]
#[serial]
fn test_engine_err_logs_and_builds_error() {
    let capture = CaptureLogger::new();
    Engine::set_logger(capture.clone());

    let err = crate::engine_err!(CorruptedTree, "test::engine_err", "node {} is broken", 7);
    Engine::reset_logger();

    assert_eq!(err, Error::CorruptedTree("node 7 is broken".to_string()));
    let entries = capture.from_source("test::engine_err");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].severity, LogSeverity::Error);
    assert_eq!(entries[0].message, "node 7 is broken");
}

#[test]
#[serial]
fn test_reset_logger_detaches_custom_logger() {
    let capture = CaptureLogger::new();
    Engine::set_logger(capture.clone());
    Engine::reset_logger();

    Engine::log(LogSeverity::Info, "test::engine_reset", "after reset".to_string());
    assert!(capture.from_source("test::engine_reset").is_empty());
}

#[test]
#[serial]
fn test_log_detailed_keeps_location() {
    let capture = CaptureLogger::new();
    Engine::set_logger(capture.clone());
    Engine::log_detailed(LogSeverity::Warn, "test::engine_detailed", "w".to_string(), "x.rs", 12);
    Engine::reset_logger();

    let entries = capture.from_source("test::engine_detailed");
    assert_eq!(entries[0].file, Some("x.rs"));
    assert_eq!(entries[0].line, Some(12));
}
