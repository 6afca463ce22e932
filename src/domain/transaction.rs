//! Domain models for ledger transactions and the drafts that create them.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::domain::common::{Amounted, Displayable};
use crate::errors::{LedgerError, LedgerResult};

/// Opaque string identifier assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Draws a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TransactionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TransactionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A single income or expense entry in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub description: String,
    pub amount: f64,
    #[serde(deserialize_with = "deserialize_calendar_date")]
    pub date: NaiveDate,
    pub is_expense: bool,
}

impl Transaction {
    /// Returns the amount with its sign applied: negative for expenses.
    pub fn signed_amount(&self) -> f64 {
        if self.is_expense {
            -self.amount
        } else {
            self.amount
        }
    }

    /// Checks the record-level invariants on data that did not come through a draft.
    pub fn check(&self) -> LedgerResult<()> {
        validate_fields(&self.description, self.amount)
    }
}

impl Amounted for Transaction {
    fn amount(&self) -> f64 {
        self.amount
    }

    fn is_expense(&self) -> bool {
        self.is_expense
    }
}

impl Displayable for Transaction {
    fn display_label(&self) -> String {
        let kind = if self.is_expense { "expense" } else { "income" };
        format!("{} {} [{}]", self.date, self.description, kind)
    }
}

/// Caller-supplied fields for creating or replacing a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDraft {
    pub description: String,
    pub amount: f64,
    #[serde(deserialize_with = "deserialize_calendar_date")]
    pub date: NaiveDate,
    pub is_expense: bool,
}

impl TransactionDraft {
    pub fn new(
        description: impl Into<String>,
        amount: f64,
        date: NaiveDate,
        is_expense: bool,
    ) -> Self {
        Self {
            description: description.into(),
            amount,
            date,
            is_expense,
        }
    }

    pub fn expense(description: impl Into<String>, amount: f64, date: NaiveDate) -> Self {
        Self::new(description, amount, date, true)
    }

    pub fn income(description: impl Into<String>, amount: f64, date: NaiveDate) -> Self {
        Self::new(description, amount, date, false)
    }

    /// Parses user-entered amount text. Sign and range are checked by [`validate`].
    ///
    /// [`validate`]: TransactionDraft::validate
    pub fn parse_amount(raw: &str) -> LedgerResult<f64> {
        let trimmed = raw.trim();
        let value: f64 = trimmed.parse().map_err(|_| {
            LedgerError::Validation(format!("amount `{trimmed}` is not a number"))
        })?;
        if !value.is_finite() {
            return Err(LedgerError::Validation(format!(
                "amount `{trimmed}` is not a number"
            )));
        }
        Ok(value)
    }

    pub fn validate(&self) -> LedgerResult<()> {
        validate_fields(&self.description, self.amount)
    }

    pub(crate) fn into_transaction(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            description: self.description.trim().to_string(),
            amount: self.amount,
            date: self.date,
            is_expense: self.is_expense,
        }
    }
}

impl From<&Transaction> for TransactionDraft {
    fn from(txn: &Transaction) -> Self {
        Self::new(txn.description.clone(), txn.amount, txn.date, txn.is_expense)
    }
}

fn validate_fields(description: &str, amount: f64) -> LedgerResult<()> {
    if description.trim().is_empty() {
        return Err(LedgerError::Validation(
            "description must not be empty".into(),
        ));
    }
    if !amount.is_finite() {
        return Err(LedgerError::Validation(
            "amount must be a finite number".into(),
        ));
    }
    if amount <= 0.0 {
        return Err(LedgerError::Validation(
            "amount must be greater than zero".into(),
        ));
    }
    Ok(())
}

/// Reads a calendar date, accepting either `YYYY-MM-DD` or an ISO-8601 date-time
/// whose date part is kept as written.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(stamp.date_naive());
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|stamp| stamp.date())
}

fn deserialize_calendar_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_calendar_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid calendar date `{raw}`")))
}
