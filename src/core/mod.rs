pub mod ledger_store;
pub mod services;
pub mod tracker;
pub mod utils;

pub use ledger_store::{LedgerEvent, LoadReport, Mutation, TransactionStore};
pub use tracker::Tracker;
pub use services::Aggregates;
