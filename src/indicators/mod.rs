// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the chart indicators.  Every
// series is a `Vec<Option<f64>>` aligned index-for-index with the bars it was
// derived from; `None` at position i means there is not enough history to
// compute a value there.  Bad windows/spans are the only error case.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod set;
pub mod sma;

/// A derived series aligned with its source bars.
pub type Series = Vec<Option<f64>>;

pub use bollinger::{bollinger, BollingerBands};
pub use ema::ema;
pub use macd::{macd, macd_with, Macd};
pub use rsi::rsi;
pub use set::{IndicatorParams, IndicatorSet};
pub use sma::{rolling_std, sma};
