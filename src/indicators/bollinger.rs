// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), where σ is the population standard deviation
// of the same trailing window.

use serde::Serialize;

use super::Series;

pub const DEFAULT_K: f64 = 2.0;

/// Upper and lower envelopes, aligned with the moving average they wrap.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BollingerBands {
    pub upper: Series,
    pub lower: Series,
}

/// `upper = ma + k*std`, `lower = ma - k*std`; `None` wherever either input is.
pub fn bollinger(ma: &[Option<f64>], std: &[Option<f64>], k: f64) -> BollingerBands {
    let (upper, lower): (Series, Series) = ma
        .iter()
        .zip(std)
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => (Some(m + k * s), Some(m - k * s)),
            _ => (None, None),
        })
        .unzip();

    BollingerBands { upper, lower }
}
