pub mod filter_service;
pub mod summary_service;

pub use filter_service::filter_view;
pub use summary_service::{Aggregates, SummaryService};
