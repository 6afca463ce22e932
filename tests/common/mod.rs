#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::NaiveDate;
use fintrack_core::{config::Config, Tracker};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates an isolated data directory for one test.
pub fn data_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().join("fintrack");
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

/// Opens a file-backed tracker on `dir`.
pub fn open(dir: &PathBuf) -> Tracker {
    Config::with_data_dir(dir.clone())
        .open_tracker()
        .expect("open tracker")
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}
