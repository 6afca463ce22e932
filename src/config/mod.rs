//! Persisted user preferences and the runtime configuration that locates them.

use std::{path::PathBuf, sync::Arc};

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::core::{utils::app_data_dir, Tracker};
use crate::domain::FilterMode;
use crate::errors::LedgerResult;
use crate::storage::{codec, FileStorage, KeyValueStore, FILTER_MODE_KEY, THEME_KEY};

/// Runtime settings for opening a tracker.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub remember_filter_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: app_data_dir(),
            remember_filter_mode: true,
        }
    }
}

impl Config {
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            ..Self::default()
        }
    }

    /// Opens file-backed storage under `data_dir` and returns a loaded tracker.
    pub fn open_tracker(&self) -> LedgerResult<Tracker> {
        let storage = FileStorage::new(self.data_dir.clone())?;
        Ok(Tracker::open(Arc::new(storage), self.remember_filter_mode))
    }
}

/// Small preference values stored on their own keys, independent of the ledger.
/// Reads never fail: missing or unreadable values fall back to defaults.
#[derive(Clone)]
pub struct PreferenceStore {
    storage: Arc<dyn KeyValueStore>,
}

impl PreferenceStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    pub fn theme(&self) -> bool {
        self.read(THEME_KEY).unwrap_or_default()
    }

    pub fn set_theme(&self, enabled: bool) -> LedgerResult<()> {
        self.write(THEME_KEY, &enabled)
    }

    pub fn filter_mode(&self) -> FilterMode {
        self.read(FILTER_MODE_KEY).unwrap_or_default()
    }

    pub fn set_filter_mode(&self, mode: FilterMode) -> LedgerResult<()> {
        self.write(FILTER_MODE_KEY, &mode)
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = match self.storage.get(key) {
            Ok(bytes) => bytes?,
            Err(err) => {
                warn!(key, error = %err, "failed to read preference");
                return None;
            }
        };
        codec::decode(&bytes)
            .inspect_err(|err| warn!(key, error = %err, "ignoring unreadable preference"))
            .ok()
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> LedgerResult<()> {
        let bytes = codec::encode(value)?;
        self.storage
            .set(key, &bytes)
            .inspect_err(|err| warn!(key, error = %err, "failed to persist preference"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LedgerError;
    use crate::storage::MemoryStorage;

    struct Unavailable;

    impl KeyValueStore for Unavailable {
        fn get(&self, _key: &str) -> LedgerResult<Option<Vec<u8>>> {
            Err(LedgerError::Persistence("storage offline".into()))
        }

        fn set(&self, _key: &str, _value: &[u8]) -> LedgerResult<()> {
            Err(LedgerError::Persistence("storage offline".into()))
        }
    }

    #[test]
    fn theme_defaults_to_false() {
        let prefs = PreferenceStore::new(Arc::new(MemoryStorage::new()));
        assert!(!prefs.theme());
    }

    #[test]
    fn theme_is_stored_as_a_json_boolean() {
        let storage = Arc::new(MemoryStorage::new());
        let prefs = PreferenceStore::new(storage.clone());
        prefs.set_theme(true).unwrap();

        assert!(prefs.theme());
        assert_eq!(storage.get(THEME_KEY).unwrap().as_deref(), Some(&b"true"[..]));
    }

    #[test]
    fn unreadable_values_fall_back_to_defaults() {
        let storage = MemoryStorage::new()
            .with_entry(THEME_KEY, "maybe")
            .with_entry(FILTER_MODE_KEY, "\"transfers\"");
        let prefs = PreferenceStore::new(Arc::new(storage));
        assert!(!prefs.theme());
        assert_eq!(prefs.filter_mode(), FilterMode::All);
    }

    #[test]
    fn storage_failures_are_non_fatal() {
        let prefs = PreferenceStore::new(Arc::new(Unavailable));
        assert!(!prefs.theme());
        assert!(prefs.set_theme(true).is_err());
        assert_eq!(prefs.filter_mode(), FilterMode::All);
    }

    #[test]
    fn filter_mode_round_trips() {
        let prefs = PreferenceStore::new(Arc::new(MemoryStorage::new()));
        prefs.set_filter_mode(FilterMode::Expense).unwrap();
        assert_eq!(prefs.filter_mode(), FilterMode::Expense);
    }
}
