// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   multiplier = 2 / (span + 1)
//   EMA_t      = close_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// The series is seeded exactly once, with the SMA of the first `span`
// values, at index `span - 1`.  Everything before the seed is `None`.
// =============================================================================

use crate::error::{require_positive, EngineError};

use super::Series;

/// Compute the EMA series for `closes`, aligned index-for-index with it.
///
/// # Edge cases
/// - `span == 0` => `InvalidParameter`
/// - `closes.len() < span` => every entry `None` (not an error)
pub fn ema(closes: &[f64], span: usize) -> Result<Series, EngineError> {
    require_positive("span", span)?;
    let lifted: Vec<Option<f64>> = closes.iter().copied().map(Some).collect();
    Ok(ema_from_first_valid(&lifted, span))
}

/// EMA over a partially-defined series.
///
/// The seed is the mean of the `span` values starting at the first non-`None`
/// entry and lands on the last of them.  If fewer than `span` contiguous
/// values follow the first valid one, the result is all `None`.  A `None`
/// after the seed ends the recurrence; the remainder stays `None`.
///
/// `span` must be non-zero; callers validate it.
pub(crate) fn ema_from_first_valid(values: &[Option<f64>], span: usize) -> Series {
    let mut out = vec![None; values.len()];

    let Some(first) = values.iter().position(Option::is_some) else {
        return out;
    };
    if span > values.len() - first {
        return out;
    }
    let seed_at = first + span - 1;

    let mut sum = 0.0;
    for v in &values[first..=seed_at] {
        match v {
            Some(v) => sum += v,
            None => return out,
        }
    }

    let multiplier = 2.0 / (span as f64 + 1.0);
    let mut prev = sum / span as f64;
    out[seed_at] = Some(prev);

    for (i, v) in values.iter().enumerate().skip(seed_at + 1) {
        let Some(v) = v else { break };
        prev = v * multiplier + prev * (1.0 - multiplier);
        out[i] = Some(prev);
    }

    out
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    // ---- ema -------------------------------------------------------------

    #[test]
    fn ema_span_zero() {
        assert!(matches!(
            ema(&[1.0, 2.0, 3.0], 0),
            Err(EngineError::InvalidParameter { name: "span", .. })
        ));
    }

    #[test]
    fn ema_insufficient_data_is_all_none() {
        assert_eq!(ema(&[1.0, 2.0], 3).unwrap(), vec![None, None]);
        assert!(ema(&[], 5).unwrap().is_empty());
    }

    #[test]
    fn ema_seed_and_first_step() {
        // k = 2 / (3 + 1) = 0.5
        let out = ema(&[1.0, 2.0, 3.0, 4.0], 3).unwrap();
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert!((out[2].unwrap() - 2.0).abs() < 1e-10);
        assert!((out[3].unwrap() - 3.0).abs() < 1e-10);
    }

    #[test]
    fn ema_huge_span_is_all_none() {
        assert_eq!(ema(&[1.0, 2.0, 3.0], usize::MAX).unwrap(), vec![None; 3]);
        let values = [None, Some(1.0), Some(2.0)];
        assert_eq!(ema_from_first_valid(&values, usize::MAX), vec![None; 3]);
    }

    #[test]
    fn ema_period_equals_length() {
        let out = ema(&[2.0, 4.0, 6.0], 3).unwrap();
        assert_eq!(out.len(), 3);
        assert!((out[2].unwrap() - 4.0).abs() < 1e-10);
    }

    #[test]
    fn ema_known_values() {
        // 5-span EMA of [1..=10]: SMA seed 3.0, multiplier 1/3.
        let closes: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        let out = ema(&closes, 5).unwrap();

        let mult = 2.0 / 6.0;
        let mut expected = 3.0;
        assert!((out[4].unwrap() - expected).abs() < 1e-10);
        for i in 5..10 {
            expected = closes[i] * mult + expected * (1.0 - mult);
            assert!((out[i].unwrap() - expected).abs() < 1e-10, "index {i}");
        }
    }

    #[test]
    fn ema_span_one_tracks_closes() {
        let closes = [5.0, 7.0, 6.0];
        let out = ema(&closes, 1).unwrap();
        assert_eq!(out, vec![Some(5.0), Some(7.0), Some(6.0)]);
    }

    // ---- ema_from_first_valid --------------------------------------------

    #[test]
    fn partial_series_seeds_after_leading_nones() {
        let values = [None, None, Some(2.0), Some(4.0), Some(6.0), Some(8.0)];
        let out = ema_from_first_valid(&values, 2);
        assert_eq!(&out[..3], &[None, None, None]);
        assert!((out[3].unwrap() - 3.0).abs() < 1e-10);
        // k = 2/3
        let next = 6.0 * (2.0 / 3.0) + 3.0 * (1.0 / 3.0);
        assert!((out[4].unwrap() - next).abs() < 1e-10);
    }

    #[test]
    fn partial_series_too_short_is_all_none() {
        let values = [None, Some(1.0), Some(2.0)];
        assert_eq!(ema_from_first_valid(&values, 3), vec![None, None, None]);
        assert_eq!(ema_from_first_valid(&[None, None], 1), vec![None, None]);
    }

    #[test]
    fn gap_after_seed_stops_the_recurrence() {
        let values = [Some(1.0), Some(3.0), None, Some(5.0)];
        let out = ema_from_first_valid(&values, 2);
        assert_eq!(out[1], Some(2.0));
        assert_eq!(out[2], None);
        assert_eq!(out[3], None);
    }
}
