// =============================================================================
// Relative Strength Index (RSI) - Wilder's Smoothing
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 - Compute price changes (deltas) from consecutive closes.
// Step 2 - Seed average gain / average loss with the SMA of the first `period`
//          gains / losses (covering closes[0..=period]).
// Step 3 - Apply Wilder's smoothing:
//            avg_gain = (prev_avg_gain * (period - 1) + current_gain) / period
//            avg_loss = (prev_avg_loss * (period - 1) + current_loss) / period
// Step 4 - RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS),   or 100 when avg_loss == 0
// =============================================================================

use crate::error::{require_positive, EngineError};

use super::Series;

pub const RSI_PERIOD: usize = 14;

/// Compute the RSI series for `closes`, aligned index-for-index with it.
///
/// Indices `0 .. period` are `None`; the first value lands on index `period`.
///
/// # Edge cases
/// - `period == 0` => `InvalidParameter`
/// - `closes.len() < period + 1` => every entry `None`
/// - Average loss of zero (no down moves) => 100.0, never a division by zero.
pub fn rsi(closes: &[f64], period: usize) -> Result<Series, EngineError> {
    require_positive("period", period)?;

    let mut out = vec![None; closes.len()];
    if closes.len() <= period {
        return Ok(out);
    }

    // --- Split deltas into gains and losses ----------------------------------
    let (gains, losses): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|w| {
            let delta = w[1] - w[0];
            (delta.max(0.0), (-delta).max(0.0))
        })
        .unzip();

    // --- Seed averages with the SMA of the first `period` moves ---------------
    let period_f = period as f64;
    let mut avg_gain = gains[..period].iter().sum::<f64>() / period_f;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period_f;
    out[period] = Some(rsi_from_averages(avg_gain, avg_loss));

    // --- Wilder's smoothing for subsequent values ----------------------------
    for i in period + 1..closes.len() {
        avg_gain = (avg_gain * (period_f - 1.0) + gains[i - 1]) / period_f;
        avg_loss = (avg_loss * (period_f - 1.0) + losses[i - 1]) / period_f;
        out[i] = Some(rsi_from_averages(avg_gain, avg_loss));
    }

    Ok(out)
}

/// Convert average gain / average loss into an RSI value in [0, 100].
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}
