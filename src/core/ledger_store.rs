//! Authoritative in-memory ledger with save-on-every-write persistence.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard},
};

use tracing::{debug, info, warn};

use crate::domain::{Transaction, TransactionDraft, TransactionId};
use crate::errors::{LedgerError, LedgerResult};
use crate::storage::{codec, KeyValueStore, TRANSACTIONS_KEY};

type Listener = Arc<dyn Fn(&LedgerEvent) + Send + Sync>;

/// Change notifications delivered to the store's listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    Loaded { count: usize },
    Added(TransactionId),
    Updated(TransactionId),
    Removed(TransactionId),
}

/// Metadata describing the outcome of a load operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub count: usize,
    pub discarded_corrupt: bool,
    pub warnings: Vec<String>,
}

/// Result of an applied mutation. A failed write leaves the change in memory
/// and is carried here so the caller can warn that it may not survive a restart.
#[derive(Debug)]
pub struct Mutation<T> {
    pub value: T,
    pub persist_error: Option<LedgerError>,
}

impl<T> Mutation<T> {
    pub fn is_durable(&self) -> bool {
        self.persist_error.is_none()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Sole owner of the transaction collection. Every operation runs under one
/// lock that also covers the persistence write.
pub struct TransactionStore {
    storage: Arc<dyn KeyValueStore>,
    records: Mutex<Option<Vec<Transaction>>>,
    listener: Mutex<Option<Listener>>,
}

impl TransactionStore {
    /// Creates an unloaded store. Mutations are rejected until [`load`] runs.
    ///
    /// [`load`]: TransactionStore::load
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            records: Mutex::new(None),
            listener: Mutex::new(None),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.records().is_some()
    }

    /// Replaces memory with the persisted ledger. Undecodable data is discarded
    /// with a warning and the store starts empty; this never fails. When the
    /// adapter cannot read at all, the current state is kept, and a store that
    /// was never loaded stays unloaded so writes cannot clobber the stored ledger.
    pub fn load(&self) -> LoadReport {
        let mut report = LoadReport::default();
        let mut guard = self.records();

        let loaded = match self.storage.get(TRANSACTIONS_KEY) {
            Ok(None) => {
                debug!("no persisted transactions, starting empty");
                Vec::new()
            }
            Ok(Some(bytes)) => match codec::decode_transactions(&bytes) {
                Ok(decoded) => retain_valid(decoded, &mut report.warnings),
                Err(err) => {
                    warn!(error = %err, "discarding unreadable transactions blob");
                    report.discarded_corrupt = true;
                    report
                        .warnings
                        .push(format!("stored transactions were unreadable: {err}"));
                    Vec::new()
                }
            },
            Err(err) => {
                warn!(error = %err, "failed to read stored transactions");
                report
                    .warnings
                    .push(format!("stored transactions could not be read: {err}"));
                // Stay unloaded rather than let a write overwrite a ledger that was never read.
                match guard.as_ref() {
                    Some(current) => report.count = current.len(),
                    None => report
                        .warnings
                        .push("ledger not loaded; changes are refused until a reload succeeds".into()),
                }
                return report;
            }
        };

        report.count = loaded.len();
        *guard = Some(loaded);
        drop(guard);

        info!(count = report.count, "ledger loaded");
        self.notify(&LedgerEvent::Loaded {
            count: report.count,
        });
        report
    }

    /// Validates the draft, assigns a fresh id, appends and persists.
    pub fn add(&self, draft: TransactionDraft) -> LedgerResult<Mutation<Transaction>> {
        let mut guard = self.records();
        let records = guard.as_mut().ok_or(LedgerError::NotLoaded)?;
        draft.validate()?;

        let txn = draft.into_transaction(unique_id(records));
        records.push(txn.clone());
        let persist_error = self.persist(records).err();
        drop(guard);

        info!(id = %txn.id, "transaction added");
        self.notify(&LedgerEvent::Added(txn.id.clone()));
        Ok(Mutation {
            value: txn,
            persist_error,
        })
    }

    /// Replaces every field except the id, keeping the record's position.
    pub fn update(
        &self,
        id: &TransactionId,
        draft: TransactionDraft,
    ) -> LedgerResult<Mutation<Transaction>> {
        let mut guard = self.records();
        let records = guard.as_mut().ok_or(LedgerError::NotLoaded)?;
        let index = position(records, id)?;
        draft.validate()?;

        let txn = draft.into_transaction(id.clone());
        records[index] = txn.clone();
        let persist_error = self.persist(records).err();
        drop(guard);

        info!(id = %txn.id, "transaction updated");
        self.notify(&LedgerEvent::Updated(txn.id.clone()));
        Ok(Mutation {
            value: txn,
            persist_error,
        })
    }

    /// Deletes the record permanently and returns it. Callers confirm first.
    pub fn remove(&self, id: &TransactionId) -> LedgerResult<Mutation<Transaction>> {
        let mut guard = self.records();
        let records = guard.as_mut().ok_or(LedgerError::NotLoaded)?;
        let index = position(records, id)?;

        let removed = records.remove(index);
        let persist_error = self.persist(records).err();
        drop(guard);

        info!(id = %removed.id, "transaction removed");
        self.notify(&LedgerEvent::Removed(removed.id.clone()));
        Ok(Mutation {
            value: removed,
            persist_error,
        })
    }

    /// Snapshot of the ledger in insertion order. Empty before load.
    pub fn list(&self) -> Vec<Transaction> {
        self.with_records(<[Transaction]>::to_vec)
    }

    pub fn get(&self, id: &TransactionId) -> Option<Transaction> {
        self.with_records(|records| records.iter().find(|txn| &txn.id == id).cloned())
    }

    pub fn len(&self) -> usize {
        self.with_records(<[Transaction]>::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs `f` against the current records without cloning them.
    pub fn with_records<R>(&self, f: impl FnOnce(&[Transaction]) -> R) -> R {
        let guard = self.records();
        f(guard.as_deref().unwrap_or_default())
    }

    /// Installs the single change listener, replacing any previous one.
    ///
    /// The listener runs after the store lock is released, so it may read the
    /// store. Events from mutations racing on different threads can therefore
    /// arrive in a different order than the mutations were applied; re-read
    /// the store rather than replaying events when order matters.
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&LedgerEvent) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(listener);
        *self.listener() = Some(listener);
    }

    pub fn unsubscribe(&self) {
        self.listener().take();
    }

    fn persist(&self, records: &[Transaction]) -> LedgerResult<()> {
        let bytes = codec::encode_transactions(records)?;
        self.storage
            .set(TRANSACTIONS_KEY, &bytes)
            .inspect_err(|err| warn!(error = %err, "failed to persist transactions"))
    }

    fn notify(&self, event: &LedgerEvent) {
        // Clone out of the lock so the listener may call back into the store.
        let listener = self.listener().clone();
        if let Some(listener) = listener {
            listener(event);
        }
    }

    fn records(&self) -> MutexGuard<'_, Option<Vec<Transaction>>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn listener(&self) -> MutexGuard<'_, Option<Listener>> {
        self.listener
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn position(records: &[Transaction], id: &TransactionId) -> LedgerResult<usize> {
    records
        .iter()
        .position(|txn| &txn.id == id)
        .ok_or_else(|| LedgerError::NotFound(id.clone()))
}

fn unique_id(records: &[Transaction]) -> TransactionId {
    loop {
        let candidate = TransactionId::generate();
        if records.iter().all(|txn| txn.id != candidate) {
            return candidate;
        }
    }
}

/// Drops records that break ledger invariants, keeping the first of any duplicate id.
fn retain_valid(decoded: Vec<Transaction>, warnings: &mut Vec<String>) -> Vec<Transaction> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(decoded.len());
    for txn in decoded {
        if let Err(err) = txn.check() {
            warn!(id = %txn.id, error = %err, "dropping invalid stored transaction");
            warnings.push(format!("transaction {} dropped: {err}", txn.id));
            continue;
        }
        if !seen.insert(txn.id.clone()) {
            warn!(id = %txn.id, "dropping duplicate stored transaction");
            warnings.push(format!("transaction {} dropped: duplicate id", txn.id));
            continue;
        }
        kept.push(txn);
    }
    kept
}
