// =============================================================================
// Window Slicer - cut the display window out of the full history
// =============================================================================
//
// Two policies:
//
//   Cutoff         keep every bar with timestamp >= now - lookback_days
//   LatestSession  find the largest gap between consecutive bars that is
//                  wider than the threshold; keep the bars after it
//                  (all bars when no such gap exists)
//
// Both produce a set of retained indices that is applied unchanged to the
// bars and to every pre-computed indicator series.  Nothing is recomputed.
// =============================================================================

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;

use crate::error::EngineError;
use crate::indicators::IndicatorSet;
use crate::market_data::Bar;
use crate::types::WindowPolicy;

/// The sliced view handed to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisplayWindow {
    pub bars: Vec<Bar>,
    pub indicators: IndicatorSet,
}

impl DisplayWindow {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.bars.first().map(|b| b.timestamp)
    }
}

/// Slice `bars` and `indicators` with the given policy.
///
/// # Errors
/// `InvalidParameter` for a negative day count, a non-positive session gap,
/// or an indicator set that is not aligned with `bars`.
pub fn slice_window(
    bars: &[Bar],
    indicators: &IndicatorSet,
    policy: WindowPolicy,
) -> Result<DisplayWindow, EngineError> {
    if !indicators.is_aligned_with(bars.len()) {
        return Err(EngineError::invalid(
            "indicators",
            format!(
                "series length {} does not match {} bars",
                indicators.len(),
                bars.len()
            ),
        ));
    }

    let retained: Vec<usize> = match policy {
        WindowPolicy::Cutoff { now, lookback_days } => {
            let cutoff = cutoff_instant(now, lookback_days)?;
            bars.iter()
                .enumerate()
                .filter(|(_, b)| b.timestamp >= cutoff)
                .map(|(i, _)| i)
                .collect()
        }
        WindowPolicy::LatestSession { gap_threshold } => {
            let start = session_start(bars, gap_threshold)?;
            (start..bars.len()).collect()
        }
    };

    debug!(
        policy = %policy,
        total = bars.len(),
        retained = retained.len(),
        "display window sliced"
    );

    Ok(DisplayWindow {
        bars: retained.iter().map(|&i| bars[i]).collect(),
        indicators: indicators.select(&retained),
    })
}

/// `now - lookback_days`.
pub fn cutoff_instant(now: DateTime<Utc>, lookback_days: i64) -> Result<DateTime<Utc>, EngineError> {
    if lookback_days < 0 {
        return Err(EngineError::invalid(
            "lookback_days",
            format!("must be >= 0, got {lookback_days}"),
        ));
    }
    Duration::try_days(lookback_days)
        .and_then(|span| now.checked_sub_signed(span))
        .ok_or_else(|| EngineError::invalid("lookback_days", format!("{lookback_days} days is out of range")))
}

/// Index of the first bar of the most recent session.
///
/// The session starts at the bar right after the largest gap wider than
/// `gap_threshold`.  Among equally large gaps the most recent one wins.
/// Returns 0 when no gap qualifies.
pub fn session_start(bars: &[Bar], gap_threshold: Duration) -> Result<usize, EngineError> {
    if gap_threshold <= Duration::zero() {
        return Err(EngineError::invalid(
            "gap_threshold",
            format!("must be positive, got {}s", gap_threshold.num_seconds()),
        ));
    }

    let mut best: Option<(usize, Duration)> = None;
    for i in (1..bars.len()).rev() {
        let gap = bars[i].timestamp - bars[i - 1].timestamp;
        if gap <= gap_threshold {
            continue;
        }
        if best.map_or(true, |(_, widest)| gap > widest) {
            best = Some((i, gap));
        }
    }

    Ok(best.map_or(0, |(i, _)| i))
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::IndicatorParams;
    use crate::market_data::closes;

    fn bar_at(ts: DateTime<Utc>, close: f64) -> Bar {
        Bar {
            timestamp: ts,
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000.0,
        }
    }

    fn daily_bars(n: i64, last: DateTime<Utc>) -> Vec<Bar> {
        (0..n)
            .map(|i| bar_at(last - Duration::days(n - 1 - i), 100.0 + i as f64))
            .collect()
    }

    fn with_indicators(bars: &[Bar]) -> IndicatorSet {
        IndicatorSet::compute(&closes(bars), &IndicatorParams::default()).unwrap()
    }

    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_760_000_000, 0).unwrap()
    }

    // ---- cutoff ----------------------------------------------------------

    #[test]
    fn cutoff_keeps_suffix_and_preserves_values() {
        let bars = daily_bars(100, now());
        let set = with_indicators(&bars);
        let window = slice_window(
            &bars,
            &set,
            WindowPolicy::Cutoff {
                now: now(),
                lookback_days: 30,
            },
        )
        .unwrap();

        // Days 0..=30 back inclusive.
        assert_eq!(window.len(), 31);
        assert!(window.indicators.is_aligned_with(31));
        assert_eq!(window.bars[0], bars[69]);
        // Values come straight from the full-history computation, so the
        // 20-bar SMA is already defined on the first visible bar.
        assert_eq!(window.indicators.sma[0], set.sma[69]);
        assert!(window.indicators.sma[0].is_some());
        assert_eq!(window.indicators.rsi[30], set.rsi[99]);
    }

    #[test]
    fn cutoff_with_nothing_recent_is_empty() {
        let bars = daily_bars(10, now() - Duration::days(400));
        let set = with_indicators(&bars);
        let window = slice_window(
            &bars,
            &set,
            WindowPolicy::Cutoff {
                now: now(),
                lookback_days: 7,
            },
        )
        .unwrap();
        assert!(window.is_empty());
        assert!(window.indicators.is_aligned_with(0));
        assert!(window.indicators.macd.is_empty());
    }

    #[test]
    fn cutoff_is_idempotent_and_monotonic() {
        let bars = daily_bars(400, now());
        let set = with_indicators(&bars);
        let policy = |days| WindowPolicy::Cutoff {
            now: now(),
            lookback_days: days,
        };

        let year = slice_window(&bars, &set, policy(365)).unwrap();
        let again = slice_window(&year.bars, &year.indicators, policy(365)).unwrap();
        assert_eq!(again, year);

        let month = slice_window(&bars, &set, policy(30)).unwrap();
        let month_of_year = slice_window(&year.bars, &year.indicators, policy(30)).unwrap();
        assert_eq!(month_of_year, month);
        assert!(month.bars.iter().all(|b| year.bars.contains(b)));
        assert!(month.len() < year.len());
    }

    #[test]
    fn negative_lookback_is_invalid() {
        let bars = daily_bars(5, now());
        let set = with_indicators(&bars);
        let err = slice_window(
            &bars,
            &set,
            WindowPolicy::Cutoff {
                now: now(),
                lookback_days: -1,
            },
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameter { name: "lookback_days", .. }));
    }

    #[test]
    fn misaligned_indicators_are_rejected() {
        let bars = daily_bars(5, now());
        let set = with_indicators(&bars[..4]);
        assert!(slice_window(
            &bars,
            &set,
            WindowPolicy::Cutoff {
                now: now(),
                lookback_days: 1,
            }
        )
        .is_err());
    }

    // ---- latest session --------------------------------------------------

    fn intraday(start: DateTime<Utc>, count: i64, first_close: f64) -> Vec<Bar> {
        (0..count)
            .map(|i| bar_at(start + Duration::minutes(15 * i), first_close + i as f64 * 0.1))
            .collect()
    }

    #[test]
    fn session_slice_returns_post_gap_bars() {
        // Day one: 09:30 .. 15:30 (25 bars), then a 16h+ overnight gap,
        // then six hours of 15-minute bars.
        let day_one = DateTime::<Utc>::from_timestamp(1_759_311_000, 0).unwrap();
        let mut bars = intraday(day_one, 25, 100.0);
        let last_day_one = bars[24].timestamp;
        let day_two = last_day_one + Duration::hours(18);
        let post_gap = intraday(day_two, 24, 110.0);
        bars.extend(post_gap.iter().copied());

        let set = with_indicators(&bars);
        let window = slice_window(
            &bars,
            &set,
            WindowPolicy::LatestSession {
                gap_threshold: Duration::hours(4),
            },
        )
        .unwrap();

        assert_eq!(window.bars, post_gap);
        assert_eq!(window.first_timestamp(), Some(day_two));
        assert_eq!(window.indicators.sma, set.sma[25..].to_vec());
    }

    #[test]
    fn session_slice_starts_after_the_largest_gap() {
        let t0 = DateTime::<Utc>::from_timestamp(1_759_311_000, 0).unwrap();
        let mut bars = intraday(t0, 4, 1.0);
        // Weekend-sized gap first, then a normal overnight gap.
        let monday = bars[3].timestamp + Duration::hours(66);
        bars.extend(intraday(monday, 4, 2.0));
        let tuesday = bars[7].timestamp + Duration::hours(17);
        bars.extend(intraday(tuesday, 4, 3.0));

        assert_eq!(session_start(&bars, Duration::hours(4)).unwrap(), 4);

        let set = with_indicators(&bars);
        let window = slice_window(
            &bars,
            &set,
            WindowPolicy::LatestSession {
                gap_threshold: Duration::hours(4),
            },
        )
        .unwrap();
        assert_eq!(window.bars, bars[4..].to_vec());
    }

    #[test]
    fn equal_gaps_prefer_the_most_recent() {
        let t0 = DateTime::<Utc>::from_timestamp(1_759_311_000, 0).unwrap();
        let mut bars = intraday(t0, 3, 1.0);
        let next = bars[2].timestamp + Duration::hours(18);
        bars.extend(intraday(next, 3, 2.0));
        let last = bars[5].timestamp + Duration::hours(18);
        bars.extend(intraday(last, 3, 3.0));

        assert_eq!(session_start(&bars, Duration::hours(4)).unwrap(), 6);
    }

    #[test]
    fn session_without_gap_keeps_everything() {
        let t0 = DateTime::<Utc>::from_timestamp(1_759_311_000, 0).unwrap();
        let bars = intraday(t0, 10, 50.0);
        assert_eq!(session_start(&bars, Duration::hours(4)).unwrap(), 0);
        assert_eq!(session_start(&[], Duration::hours(4)).unwrap(), 0);
    }

    #[test]
    fn gap_exactly_at_threshold_does_not_split() {
        let t0 = DateTime::<Utc>::from_timestamp(1_759_311_000, 0).unwrap();
        let bars = vec![bar_at(t0, 1.0), bar_at(t0 + Duration::hours(4), 2.0)];
        assert_eq!(session_start(&bars, Duration::hours(4)).unwrap(), 0);
    }

    #[test]
    fn non_positive_gap_threshold_is_invalid() {
        assert!(session_start(&[], Duration::zero()).is_err());
        assert!(session_start(&[], Duration::hours(-1)).is_err());
    }
}
