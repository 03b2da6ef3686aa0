//! Test utilities for Conduit crates.

pub mod mock_endpoints;

pub use mock_endpoints::MockEndpoint;

use once_cell::sync::Lazy;
use std::path::PathBuf;
use tempfile::TempDir;

/// Route tracing output through the test harness, once per process.
pub fn init_tracing() {
    static INIT: Lazy<()> = Lazy::new(|| {
        // Another subscriber may already be installed; that is fine for tests.
        let _ = conduit_log::init(conduit_log::LogConfig::for_tests());
    });

    Lazy::force(&INIT);
}

/// Creates a temporary directory that is cleaned up on drop.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Creates a temporary file with given content.
pub fn temp_file(content: &str) -> (TempDir, PathBuf) {
    let dir = temp_dir();
    let path = dir.path().join("test_file");
    std::fs::write(&path, content).expect("Failed to write temp file");
    (dir, path)
}

/// Assert that a Result is Ok and return the value.
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a Result is Err and return the error.
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}
