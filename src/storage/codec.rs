//! Wire format for persisted entries.

use serde::{de::DeserializeOwned, Serialize};

use crate::domain::Transaction;
use crate::errors::LedgerResult;

/// Encodes the ledger as a JSON array in insertion order.
pub fn encode_transactions(transactions: &[Transaction]) -> LedgerResult<Vec<u8>> {
    encode(transactions)
}

pub fn decode_transactions(bytes: &[u8]) -> LedgerResult<Vec<Transaction>> {
    decode(bytes)
}

pub fn encode<T: Serialize + ?Sized>(value: &T) -> LedgerResult<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> LedgerResult<T> {
    Ok(serde_json::from_slice(bytes)?)
}
