use serde::Serialize;

use crate::domain::Amounted;

/// Totals derived from the full ledger.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregates {
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
}

pub struct SummaryService;

impl SummaryService {
    /// Sums income and expense over `transactions`. Pass the whole ledger, not a filtered view.
    pub fn aggregate<I>(transactions: I) -> Aggregates
    where
        I: IntoIterator,
        I::Item: Amounted,
    {
        let (total_income, total_expense) =
            transactions
                .into_iter()
                .fold((0.0, 0.0), |(income, expense), record| {
                    if record.is_expense() {
                        (income, expense + record.amount())
                    } else {
                        (income + record.amount(), expense)
                    }
                });
        Aggregates {
            total_income,
            total_expense,
            balance: total_income - total_expense,
        }
    }
}
