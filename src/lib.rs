#![doc(test(attr(deny(warnings))))]

//! Fintrack Core is the transaction ledger behind the Fintrack personal finance
//! app: validated records, save-on-every-write persistence, filtered views and
//! income/expense totals. Presentation shells drive it through [`Tracker`].

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
#[cfg(feature = "ffi")]
pub mod ffi;
pub mod storage;
pub mod utils;

pub use crate::core::{Aggregates, LedgerEvent, LoadReport, Mutation, Tracker, TransactionStore};
pub use domain::{FilterMode, Transaction, TransactionDraft, TransactionId};
pub use errors::{LedgerError, LedgerResult};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Fintrack Core tracing initialized.");
    });
}
