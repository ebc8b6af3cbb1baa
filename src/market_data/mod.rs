pub mod bar;
pub mod quote;

// Re-export the bar types for convenient access (e.g. `use crate::market_data::Bar`).
pub use bar::{closes, sanitize, Bar, RawFeed};
pub use quote::{QuoteMeta, QuoteSummary};
