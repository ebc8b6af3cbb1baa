// =============================================================================
// Shared types used across the stock terminal
// =============================================================================

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Display timeframe requested by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1w")]
    OneWeek,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "3y")]
    ThreeYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    TenYears,
}

impl Timeframe {
    pub const ALL: [Timeframe; 8] = [
        Self::OneDay,
        Self::OneWeek,
        Self::OneMonth,
        Self::ThreeMonths,
        Self::OneYear,
        Self::ThreeYears,
        Self::FiveYears,
        Self::TenYears,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneDay => "1d",
            Self::OneWeek => "1w",
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::OneYear => "1y",
            Self::ThreeYears => "3y",
            Self::FiveYears => "5y",
            Self::TenYears => "10y",
        }
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Self::OneMonth
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|tf| tf.as_str() == wanted)
            .ok_or_else(|| format!("unknown timeframe '{s}'"))
    }
}

/// How a display window is cut out of the full history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPolicy {
    /// Keep every bar stamped at or after `now - lookback_days`.
    Cutoff {
        now: DateTime<Utc>,
        lookback_days: i64,
    },
    /// Keep the bars after the largest gap longer than `gap_threshold`.
    LatestSession { gap_threshold: Duration },
}

impl std::fmt::Display for WindowPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cutoff { lookback_days, .. } => write!(f, "cutoff({lookback_days}d)"),
            Self::LatestSession { gap_threshold } => {
                write!(f, "session(gap>{}m)", gap_threshold.num_minutes())
            }
        }
    }
}
