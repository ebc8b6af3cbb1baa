// =============================================================================
// MACD - Moving Average Convergence / Divergence
// =============================================================================
//
//   macd_i      = EMA_fast_i - EMA_slow_i          (None if either is None)
//   signal      = EMA_signal(macd), seeded at first_valid + signal - 1 with the
//                 mean of the first `signal` MACD values
//   histogram_i = macd_i - signal_i
//
// Standard spans are 12 / 26 / 9.
// =============================================================================

use serde::Serialize;

use crate::error::{require_positive, EngineError};

use super::ema::ema_from_first_valid;
use super::Series;

pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;

/// MACD line, signal line and histogram, all aligned with the input closes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Macd {
    pub macd: Series,
    pub signal: Series,
    pub histogram: Series,
}

/// MACD with the standard 12 / 26 / 9 spans.
pub fn macd(closes: &[f64]) -> Macd {
    lines(closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL)
}

/// MACD with caller-chosen spans.
///
/// # Errors
/// `InvalidParameter` when any span is zero.
pub fn macd_with(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Result<Macd, EngineError> {
    require_positive("fast", fast)?;
    require_positive("slow", slow)?;
    require_positive("signal", signal)?;
    Ok(lines(closes, fast, slow, signal))
}

fn lines(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Macd {
    let lifted: Vec<Option<f64>> = closes.iter().copied().map(Some).collect();
    let fast_ema = ema_from_first_valid(&lifted, fast);
    let slow_ema = ema_from_first_valid(&lifted, slow);

    let macd_line = difference(&fast_ema, &slow_ema);
    let signal_line = ema_from_first_valid(&macd_line, signal);
    let histogram = difference(&macd_line, &signal_line);

    Macd {
        macd: macd_line,
        signal: signal_line,
        histogram,
    }
}

fn difference(a: &[Option<f64>], b: &[Option<f64>]) -> Series {
    a.iter()
        .zip(b)
        .map(|(x, y)| Some((*x)? - (*y)?))
        .collect()
}
