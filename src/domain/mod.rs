pub mod common;
pub mod filter;
pub mod transaction;

pub use common::{Amounted, Displayable};
pub use filter::FilterMode;
pub use transaction::{parse_calendar_date, Transaction, TransactionDraft, TransactionId};
