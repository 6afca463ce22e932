use crate::domain::{Amounted, FilterMode};

/// Returns the records selected by `mode`, preserving input order.
pub fn filter_view<T: Amounted>(transactions: &[T], mode: FilterMode) -> Vec<&T> {
    transactions
        .iter()
        .filter(|record| mode.matches(*record))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Transaction, TransactionDraft, TransactionId};
    use chrono::NaiveDate;

    fn ledger() -> Vec<Transaction> {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        vec![
            TransactionDraft::expense("Coffee", 4.5, date).into_transaction("a".into()),
            TransactionDraft::income("Salary", 2000.0, date).into_transaction("b".into()),
            TransactionDraft::expense("Lunch", 12.0, date).into_transaction("c".into()),
        ]
    }

    fn ids(view: &[&Transaction]) -> Vec<TransactionId> {
        view.iter().map(|txn| txn.id.clone()).collect()
    }

    #[test]
    fn all_returns_every_record_in_order() {
        let ledger = ledger();
        let view = filter_view(&ledger, FilterMode::All);
        let expected: Vec<&Transaction> = ledger.iter().collect();
        assert_eq!(view, expected);
    }

    #[test]
    fn income_and_expense_partition_the_ledger() {
        let ledger = ledger();
        assert_eq!(ids(&filter_view(&ledger, FilterMode::Income)), vec![TransactionId::from("b")]);
        assert_eq!(
            ids(&filter_view(&ledger, FilterMode::Expense)),
            vec![TransactionId::from("a"), TransactionId::from("c")]
        );
    }

    #[test]
    fn empty_ledger_yields_empty_views() {
        let ledger: Vec<Transaction> = Vec::new();
        assert!(filter_view(&ledger, FilterMode::Expense).is_empty());
    }
}
