pub mod client;
pub mod response;

pub use client::YahooClient;
pub use response::{parse_chart, parse_search, ChartPayload, SymbolMatch};
