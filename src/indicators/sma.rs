// =============================================================================
// Simple Moving Average (SMA) & Rolling Standard Deviation
// =============================================================================
//
// SMA_i = mean(closes[i - window + 1 ..= i])        for i >= window - 1
//
// A running sum keeps the computation O(n).  The sum is rebuilt from scratch
// every `window` steps so floating-point drift cannot accumulate over long
// histories.
// =============================================================================

use crate::error::{require_positive, EngineError};

use super::Series;

/// Simple moving average aligned index-for-index with `closes`.
///
/// Positions `0 .. window - 1` are `None` (insufficient look-back).
///
/// # Errors
/// `InvalidParameter` when `window == 0`.
pub fn sma(closes: &[f64], window: usize) -> Result<Series, EngineError> {
    require_positive("window", window)?;

    let mut out = vec![None; closes.len()];
    if closes.len() < window {
        return Ok(out);
    }

    let w = window as f64;
    let mut sum: f64 = closes[..window].iter().sum();
    out[window - 1] = Some(sum / w);

    for i in window..closes.len() {
        if (i - window + 1) % window == 0 {
            sum = closes[i + 1 - window..=i].iter().sum();
        } else {
            sum += closes[i] - closes[i - window];
        }
        out[i] = Some(sum / w);
    }

    Ok(out)
}

/// Population standard deviation over the same trailing window as `ma`.
///
/// Divides by `window`, not `window - 1`.  The entry is `None` wherever the
/// paired moving average is `None`.
///
/// # Errors
/// `InvalidParameter` when `window == 0`.
pub fn rolling_std(closes: &[f64], window: usize, ma: &[Option<f64>]) -> Result<Series, EngineError> {
    require_positive("window", window)?;

    let out = (0..closes.len())
        .map(|i| {
            let mean = ma.get(i).copied().flatten()?;
            if i + 1 < window {
                return None;
            }
            let variance = closes[i + 1 - window..=i]
                .iter()
                .map(|x| (x - mean).powi(2))
                .sum::<f64>()
                / window as f64;
            Some(variance.sqrt())
        })
        .collect();

    Ok(out)
}
