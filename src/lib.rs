// =============================================================================
// Stock Terminal - library root
// =============================================================================
//
// The indicator engine (`market_data`, `indicators`, `window`, `chart`) is
// pure and synchronous.  `yahoo`, `app_state` and `api` wrap it into the
// HTTP service started by the binary.
// =============================================================================

pub mod api;
pub mod app_state;
pub mod chart;
pub mod error;
pub mod indicators;
pub mod market_data;
pub mod runtime_config;
pub mod types;
pub mod window;
pub mod yahoo;

pub use chart::build_chart;
pub use error::EngineError;
pub use indicators::{IndicatorParams, IndicatorSet, Series};
pub use market_data::{sanitize, Bar, RawFeed};
pub use types::{Timeframe, WindowPolicy};
pub use window::{slice_window, DisplayWindow};
