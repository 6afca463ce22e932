pub mod codec;
pub mod json_backend;

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use crate::errors::{LedgerError, LedgerResult};

pub use json_backend::FileStorage;

/// Key holding the encoded ledger.
pub const TRANSACTIONS_KEY: &str = "transactions";
/// Key holding the theme flag.
pub const THEME_KEY: &str = "appTheme";
/// Key holding the last selected filter mode.
pub const FILTER_MODE_KEY: &str = "filterMode";

/// Durable key-value byte store. Implementations know nothing about the payloads.
pub trait KeyValueStore: Send + Sync {
    /// Returns `Ok(None)` when the key has never been written.
    fn get(&self, key: &str) -> LedgerResult<Option<Vec<u8>>>;
    fn set(&self, key: &str, value: &[u8]) -> LedgerResult<()>;
}

/// Process-local store, used by tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with raw bytes, bypassing any encoding.
    pub fn with_entry(self, key: &str, value: impl Into<Vec<u8>>) -> Self {
        self.entries().insert(key.to_string(), value.into());
        self
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> LedgerResult<()> {
        self.entries().insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

pub(crate) fn invalid_key(key: &str) -> LedgerError {
    LedgerError::Persistence(format!("key `{key}` is not a valid storage key"))
}
