// =============================================================================
// Chart Pipeline - sanitize, compute over full history, then slice
// =============================================================================
//
//   raw feed -> sanitize -> closes -> IndicatorSet (full history)
//            -> slice_window(policy) -> DisplayWindow
//
// The order is fixed.  Indicators see every fetched bar; the slicer only
// filters what they produced.
// =============================================================================

use tracing::debug;

use crate::error::EngineError;
use crate::indicators::{IndicatorParams, IndicatorSet};
use crate::market_data::{closes, RawFeed};
use crate::types::WindowPolicy;
use crate::window::{slice_window, DisplayWindow};

/// Run the full pipeline for one chart request.
pub fn build_chart(
    feed: &RawFeed,
    params: &IndicatorParams,
    policy: WindowPolicy,
) -> Result<DisplayWindow, EngineError> {
    let bars = feed.sanitize();
    let indicators = IndicatorSet::compute(&closes(&bars), params)?;
    let window = slice_window(&bars, &indicators, policy)?;

    debug!(
        raw = feed.len(),
        sanitized = bars.len(),
        visible = window.len(),
        policy = %policy,
        "chart built"
    );

    Ok(window)
}
