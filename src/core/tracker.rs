//! Facade that the presentation layer drives: ledger, view selection and preferences.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::PreferenceStore;
use crate::core::ledger_store::{LedgerEvent, LoadReport, Mutation, TransactionStore};
use crate::core::services::{filter_view, Aggregates, SummaryService};
use crate::domain::{FilterMode, Transaction, TransactionDraft, TransactionId};
use crate::errors::LedgerResult;
use crate::storage::KeyValueStore;

pub struct Tracker {
    store: TransactionStore,
    preferences: PreferenceStore,
    filter_mode: FilterMode,
    remember_filter_mode: bool,
    load_report: LoadReport,
}

impl Tracker {
    /// Builds the store over `storage` and loads it before returning, so the
    /// tracker never accepts writes against an unloaded ledger.
    pub fn open(storage: Arc<dyn KeyValueStore>, remember_filter_mode: bool) -> Self {
        let store = TransactionStore::new(storage.clone());
        let preferences = PreferenceStore::new(storage);
        let load_report = store.load();
        let filter_mode = if remember_filter_mode {
            preferences.filter_mode()
        } else {
            FilterMode::default()
        };
        Self {
            store,
            preferences,
            filter_mode,
            remember_filter_mode,
            load_report,
        }
    }

    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }

    pub fn store(&self) -> &TransactionStore {
        &self.store
    }

    pub fn preferences(&self) -> &PreferenceStore {
        &self.preferences
    }

    /// Re-reads the ledger from storage.
    pub fn reload(&mut self) -> &LoadReport {
        self.load_report = self.store.load();
        &self.load_report
    }

    pub fn add(&self, draft: TransactionDraft) -> LedgerResult<Mutation<Transaction>> {
        self.store.add(draft)
    }

    pub fn update(
        &self,
        id: &TransactionId,
        draft: TransactionDraft,
    ) -> LedgerResult<Mutation<Transaction>> {
        self.store.update(id, draft)
    }

    pub fn remove(&self, id: &TransactionId) -> LedgerResult<Mutation<Transaction>> {
        self.store.remove(id)
    }

    pub fn list(&self) -> Vec<Transaction> {
        self.store.list()
    }

    pub fn get(&self, id: &TransactionId) -> Option<Transaction> {
        self.store.get(id)
    }

    pub fn filter_mode(&self) -> FilterMode {
        self.filter_mode
    }

    /// Switches the active view. Remembering the choice is best effort.
    pub fn set_filter_mode(&mut self, mode: FilterMode) {
        self.filter_mode = mode;
        if self.remember_filter_mode {
            if let Err(err) = self.preferences.set_filter_mode(mode) {
                warn!(error = %err, %mode, "filter mode will not be remembered");
            }
        }
    }

    /// Records selected by the active filter mode, in ledger order.
    pub fn filtered_view(&self) -> Vec<Transaction> {
        let mode = self.filter_mode;
        self.store.with_records(|records| {
            let view: Vec<Transaction> = filter_view(records, mode).into_iter().cloned().collect();
            debug!(%mode, shown = view.len(), total = records.len(), "derived filtered view");
            view
        })
    }

    /// Totals over the whole ledger, whatever the active filter.
    pub fn aggregates(&self) -> Aggregates {
        self.store
            .with_records(|records| SummaryService::aggregate(records))
    }

    pub fn theme_preference(&self) -> bool {
        self.preferences.theme()
    }

    pub fn set_theme_preference(&self, enabled: bool) -> LedgerResult<()> {
        self.preferences.set_theme(enabled)
    }

    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&LedgerEvent) + Send + Sync + 'static,
    {
        self.store.subscribe(listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, FILTER_MODE_KEY, TRANSACTIONS_KEY};
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn scenarios_a_through_d() {
        let mut tracker = Tracker::open(Arc::new(MemoryStorage::new()), true);

        let coffee = tracker
            .add(TransactionDraft::expense("Coffee", 4.50, day(1)))
            .unwrap()
            .into_value();
        assert_eq!(tracker.list().len(), 1);
        let totals = tracker.aggregates();
        assert_eq!(totals.total_expense, 4.50);
        assert_eq!(totals.balance, -4.50);

        let salary = tracker
            .add(TransactionDraft::income("Salary", 2000.00, day(2)))
            .unwrap()
            .into_value();
        tracker.set_filter_mode(FilterMode::Income);
        assert_eq!(tracker.filtered_view(), vec![salary.clone()]);

        tracker
            .update(&coffee.id, TransactionDraft::expense("Coffee", 5.00, day(1)))
            .unwrap();
        assert_eq!(tracker.aggregates().total_expense, 5.00);
        assert_eq!(tracker.list().len(), 2);

        tracker.remove(&salary.id).unwrap();
        let totals = tracker.aggregates();
        assert_eq!(totals.total_income, 0.0);
        assert_eq!(totals.balance, -5.00);
    }

    #[test]
    fn aggregates_ignore_the_active_filter() {
        let mut tracker = Tracker::open(Arc::new(MemoryStorage::new()), false);
        tracker
            .add(TransactionDraft::expense("Coffee", 4.5, day(1)))
            .unwrap();
        tracker
            .add(TransactionDraft::income("Salary", 2000.0, day(2)))
            .unwrap();
        tracker.set_filter_mode(FilterMode::Expense);

        assert_eq!(tracker.filtered_view().len(), 1);
        assert_eq!(tracker.aggregates().total_income, 2000.0);
    }

    #[test]
    fn corrupt_ledger_opens_empty() {
        let storage = MemoryStorage::new().with_entry(TRANSACTIONS_KEY, vec![0xff, 0x00, 0x7b]);
        let tracker = Tracker::open(Arc::new(storage), true);
        assert!(tracker.load_report().discarded_corrupt);
        assert!(tracker.list().is_empty());
        assert!(tracker
            .add(TransactionDraft::expense("Coffee", 4.5, day(1)))
            .is_ok());
    }

    struct ReadOnceFails {
        inner: MemoryStorage,
        failed: std::sync::atomic::AtomicBool,
    }

    impl KeyValueStore for ReadOnceFails {
        fn get(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
            use std::sync::atomic::Ordering;
            if key == TRANSACTIONS_KEY && !self.failed.swap(true, Ordering::SeqCst) {
                return Err(crate::errors::LedgerError::Persistence("EACCES".into()));
            }
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &[u8]) -> LedgerResult<()> {
            self.inner.set(key, value)
        }
    }

    #[test]
    fn unreadable_ledger_is_kept_until_reload() {
        let raw = r#"[
            {"id":"rent","description":"Rent","amount":900,"date":"2024-01-01","isExpense":true},
            {"id":"salary","description":"Salary","amount":2000,"date":"2024-01-02","isExpense":false}
        ]"#;
        let storage = Arc::new(ReadOnceFails {
            inner: MemoryStorage::new().with_entry(TRANSACTIONS_KEY, raw),
            failed: Default::default(),
        });
        let mut tracker = Tracker::open(storage.clone(), true);
        assert!(!tracker.load_report().warnings.is_empty());
        assert!(matches!(
            tracker.add(TransactionDraft::expense("Coffee", 4.5, day(3))),
            Err(crate::errors::LedgerError::NotLoaded)
        ));

        assert_eq!(tracker.reload().count, 2);
        tracker
            .add(TransactionDraft::expense("Coffee", 4.5, day(3)))
            .unwrap();
        let stored = crate::storage::codec::decode_transactions(
            &storage.get(TRANSACTIONS_KEY).unwrap().unwrap(),
        )
        .unwrap();
        let names: Vec<_> = stored.iter().map(|txn| txn.description.as_str()).collect();
        assert_eq!(names, vec!["Rent", "Salary", "Coffee"]);
    }

    #[test]
    fn filter_mode_is_restored_only_when_remembered() {
        let storage = Arc::new(MemoryStorage::new());
        let mut tracker = Tracker::open(storage.clone(), true);
        tracker.set_filter_mode(FilterMode::Expense);
        assert!(storage.get(FILTER_MODE_KEY).unwrap().is_some());

        assert_eq!(
            Tracker::open(storage.clone(), true).filter_mode(),
            FilterMode::Expense
        );
        assert_eq!(Tracker::open(storage, false).filter_mode(), FilterMode::All);
    }

    #[test]
    fn theme_preference_is_independent_of_the_ledger() {
        let storage = Arc::new(MemoryStorage::new());
        let tracker = Tracker::open(storage.clone(), true);
        assert!(!tracker.theme_preference());
        tracker.set_theme_preference(true).unwrap();

        let reopened = Tracker::open(storage, true);
        assert!(reopened.theme_preference());
        assert!(reopened.list().is_empty());
    }
}
