// =============================================================================
// Indicator Set - every derived series for one full-history computation
// =============================================================================
//
// Indicators are always computed over the *full* sanitized history and only
// then sliced to the display window.  Slicing first would truncate the
// look-back and corrupt the warm-up values inside the visible range.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{require_positive, EngineError};

use super::bollinger::{bollinger, DEFAULT_K};
use super::ema::ema;
use super::macd::{macd, MACD_FAST, MACD_SLOW};
use super::rsi::{rsi, RSI_PERIOD};
use super::sma::{rolling_std, sma};
use super::Series;

fn default_sma_window() -> usize {
    20
}

fn default_sma_long_window() -> usize {
    60
}

fn default_bollinger_k() -> f64 {
    DEFAULT_K
}

fn default_rsi_period() -> usize {
    RSI_PERIOD
}

/// Tunable windows for the indicator set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    /// Short SMA window; the Bollinger bands wrap this average.
    #[serde(default = "default_sma_window")]
    pub sma_window: usize,

    /// Long SMA window.
    #[serde(default = "default_sma_long_window")]
    pub sma_long_window: usize,

    /// Band width in standard deviations.
    #[serde(default = "default_bollinger_k")]
    pub bollinger_k: f64,

    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            sma_window: default_sma_window(),
            sma_long_window: default_sma_long_window(),
            bollinger_k: default_bollinger_k(),
            rsi_period: default_rsi_period(),
        }
    }
}

impl IndicatorParams {
    pub fn validate(&self) -> Result<(), EngineError> {
        require_positive("sma_window", self.sma_window)?;
        require_positive("sma_long_window", self.sma_long_window)?;
        require_positive("rsi_period", self.rsi_period)?;
        if !self.bollinger_k.is_finite() || self.bollinger_k < 0.0 {
            return Err(EngineError::invalid(
                "bollinger_k",
                format!("must be a finite non-negative number, got {}", self.bollinger_k),
            ));
        }
        Ok(())
    }
}

/// All derived series, each the same length as the bars they came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndicatorSet {
    pub sma: Series,
    pub sma_long: Series,
    pub ema12: Series,
    pub ema26: Series,
    pub macd: Series,
    pub signal: Series,
    pub histogram: Series,
    pub rsi: Series,
    pub bollinger_upper: Series,
    pub bollinger_lower: Series,
}

impl IndicatorSet {
    /// Compute every indicator over the full closing-price history.
    pub fn compute(closes: &[f64], params: &IndicatorParams) -> Result<Self, EngineError> {
        params.validate()?;

        let sma_short = sma(closes, params.sma_window)?;
        let std = rolling_std(closes, params.sma_window, &sma_short)?;
        let bands = bollinger(&sma_short, &std, params.bollinger_k);
        let lines = macd(closes);

        let set = Self {
            sma_long: sma(closes, params.sma_long_window)?,
            ema12: ema(closes, MACD_FAST)?,
            ema26: ema(closes, MACD_SLOW)?,
            macd: lines.macd,
            signal: lines.signal,
            histogram: lines.histogram,
            rsi: rsi(closes, params.rsi_period)?,
            bollinger_upper: bands.upper,
            bollinger_lower: bands.lower,
            sma: sma_short,
        };

        debug!(
            bars = closes.len(),
            sma_window = params.sma_window,
            sma_long_window = params.sma_long_window,
            rsi_period = params.rsi_period,
            "indicator set computed"
        );

        Ok(set)
    }

    /// Length shared by every series.
    pub fn len(&self) -> usize {
        self.sma.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sma.is_empty()
    }

    /// Copy out the entries at `indices` from every series, in order.
    ///
    /// Nothing is recomputed; values keep the alignment they had in the
    /// full-history computation.
    pub fn select(&self, indices: &[usize]) -> Self {
        let pick = |s: &Series| -> Series {
            indices.iter().map(|&i| s.get(i).copied().flatten()).collect()
        };

        Self {
            sma: pick(&self.sma),
            sma_long: pick(&self.sma_long),
            ema12: pick(&self.ema12),
            ema26: pick(&self.ema26),
            macd: pick(&self.macd),
            signal: pick(&self.signal),
            histogram: pick(&self.histogram),
            rsi: pick(&self.rsi),
            bollinger_upper: pick(&self.bollinger_upper),
            bollinger_lower: pick(&self.bollinger_lower),
        }
    }

    fn all(&self) -> [&Series; 10] {
        [
            &self.sma,
            &self.sma_long,
            &self.ema12,
            &self.ema26,
            &self.macd,
            &self.signal,
            &self.histogram,
            &self.rsi,
            &self.bollinger_upper,
            &self.bollinger_lower,
        ]
    }

    /// True when every series has exactly `len` entries.
    pub fn is_aligned_with(&self, len: usize) -> bool {
        self.all().iter().all(|s| s.len() == len)
    }
}
