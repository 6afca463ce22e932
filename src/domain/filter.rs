//! View selector over the ledger.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::common::Amounted;
use crate::errors::LedgerError;

/// Chooses which subset of the ledger a view displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    All,
    Income,
    Expense,
}

impl FilterMode {
    pub fn matches<T: Amounted>(self, record: &T) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::Income => !record.is_expense(),
            FilterMode::Expense => record.is_expense(),
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FilterMode::All => "all",
            FilterMode::Income => "income",
            FilterMode::Expense => "expense",
        };
        f.write_str(label)
    }
}

impl FromStr for FilterMode {
    type Err = LedgerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(FilterMode::All),
            "income" => Ok(FilterMode::Income),
            "expense" | "expenses" => Ok(FilterMode::Expense),
            other => Err(LedgerError::Validation(format!(
                "unknown filter mode `{other}`"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_labels_case_insensitively() {
        assert_eq!("Income".parse::<FilterMode>().unwrap(), FilterMode::Income);
        assert_eq!(" expense ".parse::<FilterMode>().unwrap(), FilterMode::Expense);
        assert!("transfers".parse::<FilterMode>().is_err());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for mode in [FilterMode::All, FilterMode::Income, FilterMode::Expense] {
            assert_eq!(mode.to_string().parse::<FilterMode>().unwrap(), mode);
        }
    }
}
