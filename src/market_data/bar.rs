// =============================================================================
// Bars & Sanitizer
// =============================================================================
//
// The chart provider delivers OHLCV data as parallel arrays in which any
// entry may be `null` and any array may come back shorter than the
// timestamp array.  The sanitizer folds them into a single ordered sequence
// of complete bars:
//
//   close missing          => bar omitted entirely (never null-filled)
//   open/high/low missing  => filled with the close
//   volume missing         => 0.0
//
// Non-finite numbers are treated the same as missing ones.  Every index used
// downstream refers to the *sanitized* sequence, not the raw response.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A single OHLCV sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Raw bar feed as delivered by an OHLCV chart API.
///
/// `timestamps` are epoch seconds.  Price and volume arrays may hold `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFeed {
    #[serde(default)]
    pub timestamps: Vec<i64>,
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

impl RawFeed {
    /// Fold the parallel arrays into an ordered `Vec<Bar>`.
    pub fn sanitize(&self) -> Vec<Bar> {
        sanitize(
            &self.timestamps,
            &self.open,
            &self.high,
            &self.low,
            &self.close,
            &self.volume,
        )
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Build the sanitized bar sequence from six parallel arrays.
///
/// The timestamp array drives the iteration; an index past the end of any
/// other array counts as a missing value there.  Input order is preserved
/// and nothing is re-sorted or deduplicated.
pub fn sanitize(
    timestamps: &[i64],
    opens: &[Option<f64>],
    highs: &[Option<f64>],
    lows: &[Option<f64>],
    closes: &[Option<f64>],
    volumes: &[Option<f64>],
) -> Vec<Bar> {
    let mut bars = Vec::with_capacity(timestamps.len());

    for (i, &secs) in timestamps.iter().enumerate() {
        let Some(close) = value_at(closes, i) else {
            continue;
        };
        // An epoch outside chrono's range cannot be plotted; drop it like a
        // missing close.
        let Some(timestamp) = DateTime::<Utc>::from_timestamp(secs, 0) else {
            continue;
        };

        bars.push(Bar {
            timestamp,
            open: value_at(opens, i).unwrap_or(close),
            high: value_at(highs, i).unwrap_or(close),
            low: value_at(lows, i).unwrap_or(close),
            close,
            volume: value_at(volumes, i).unwrap_or(0.0),
        });
    }

    debug!(
        raw = timestamps.len(),
        kept = bars.len(),
        dropped = timestamps.len() - bars.len(),
        "feed sanitized"
    );

    bars
}

/// Close prices of a bar sequence, index-aligned with it.
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

fn value_at(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten().filter(|v| v.is_finite())
}
