// =============================================================================
// Runtime Configuration - dashboard settings with atomic save
// =============================================================================
//
// Every tunable of the terminal lives here: indicator windows, the session
// gap threshold, the per-timeframe fetch/slice table, the ticker alias table
// and the provider endpoints.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::EngineError;
use crate::indicators::IndicatorParams;
use crate::types::{Timeframe, WindowPolicy};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_session_gap_hours() -> i64 {
    4
}

fn default_home_currency() -> String {
    "KRW".to_string()
}

fn default_timeframes() -> Vec<TimeframeSettings> {
    use Timeframe::*;
    vec![
        TimeframeSettings::session(OneDay, "5d", "15m"),
        TimeframeSettings::cutoff(OneWeek, "1mo", "1h", 7),
        TimeframeSettings::cutoff(OneMonth, "6mo", "1d", 30),
        TimeframeSettings::cutoff(ThreeMonths, "1y", "1d", 90),
        TimeframeSettings::cutoff(OneYear, "2y", "1d", 365),
        TimeframeSettings::cutoff(ThreeYears, "5y", "1wk", 1095),
        TimeframeSettings::cutoff(FiveYears, "10y", "1wk", 1825),
        TimeframeSettings::cutoff(TenYears, "max", "1mo", 3650),
    ]
}

fn default_aliases() -> BTreeMap<String, String> {
    [
        ("apple", "AAPL"),
        ("hyundai", "005380.KS"),
        ("kakao", "035720.KS"),
        ("lvmh", "MC.PA"),
        ("microsoft", "MSFT"),
        ("naver", "035420.KS"),
        ("nvidia", "NVDA"),
        ("samsung", "005930.KS"),
        ("tesla", "TSLA"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn default_chart_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_search_base_url() -> String {
    "https://query2.finance.yahoo.com".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

// =============================================================================
// TimeframeSettings
// =============================================================================

/// One row of the timeframe table: what to fetch and how to slice it.
///
/// The fetched `range` is broader than the displayed window so indicator
/// warm-up happens off-screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeSettings {
    pub timeframe: Timeframe,

    /// Provider range parameter (e.g. "6mo", "max").
    pub range: String,

    /// Provider bar interval (e.g. "15m", "1d").
    pub interval: String,

    /// Calendar cutoff in days; `None` selects the latest-session policy.
    #[serde(default)]
    pub lookback_days: Option<i64>,
}

impl TimeframeSettings {
    fn cutoff(timeframe: Timeframe, range: &str, interval: &str, days: i64) -> Self {
        Self {
            timeframe,
            range: range.to_string(),
            interval: interval.to_string(),
            lookback_days: Some(days),
        }
    }

    fn session(timeframe: Timeframe, range: &str, interval: &str) -> Self {
        Self {
            timeframe,
            range: range.to_string(),
            interval: interval.to_string(),
            lookback_days: None,
        }
    }

    /// Slicing policy for this row at instant `now`.
    pub fn policy(&self, now: DateTime<Utc>, session_gap: Duration) -> WindowPolicy {
        match self.lookback_days {
            Some(lookback_days) => WindowPolicy::Cutoff { now, lookback_days },
            None => WindowPolicy::LatestSession {
                gap_threshold: session_gap,
            },
        }
    }
}

// =============================================================================
// ProviderSettings
// =============================================================================

/// Endpoints and HTTP settings for the chart/search provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_chart_base_url")]
    pub chart_base_url: String,

    #[serde(default = "default_search_base_url")]
    pub search_base_url: String,

    /// The provider rejects requests without a browser-like agent.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            chart_base_url: default_chart_base_url(),
            search_base_url: default_search_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level runtime configuration for the terminal.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    // --- Indicators ---------------------------------------------------------

    #[serde(default)]
    pub indicator_params: IndicatorParams,

    /// Gap (hours) between consecutive intraday bars that ends a session.
    #[serde(default = "default_session_gap_hours")]
    pub session_gap_hours: i64,

    // --- Timeframes ---------------------------------------------------------

    #[serde(default = "default_timeframes")]
    pub timeframes: Vec<TimeframeSettings>,

    // --- Symbols & quotes ---------------------------------------------------

    /// Lower-cased display name => ticker, consulted before provider search.
    #[serde(default = "default_aliases")]
    pub aliases: BTreeMap<String, String>,

    /// Currency the quote price is converted into for display.
    #[serde(default = "default_home_currency")]
    pub home_currency: String,

    // --- Provider -----------------------------------------------------------

    #[serde(default)]
    pub provider: ProviderSettings,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            indicator_params: IndicatorParams::default(),
            session_gap_hours: default_session_gap_hours(),
            timeframes: default_timeframes(),
            aliases: default_aliases(),
            home_currency: default_home_currency(),
            provider: ProviderSettings::default(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("invalid runtime config in {}", path.display()))?;

        info!(
            path = %path.display(),
            timeframes = config.timeframes.len(),
            aliases = config.aliases.len(),
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise runtime config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }

    /// Reject windows, thresholds and day counts the engine cannot use.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.indicator_params.validate()?;
        if self.session_gap_hours <= 0 {
            return Err(EngineError::invalid(
                "session_gap_hours",
                format!("must be positive, got {}", self.session_gap_hours),
            ));
        }
        self.session_gap()?;
        for row in &self.timeframes {
            if let Some(days) = row.lookback_days {
                if days < 0 {
                    return Err(EngineError::invalid(
                        "lookback_days",
                        format!("timeframe {} has negative day count {days}", row.timeframe),
                    ));
                }
            }
        }
        Ok(())
    }

    /// `session_gap_hours` as a `Duration`.
    ///
    /// # Errors
    /// `InvalidParameter` when the hour count does not fit in a `Duration`.
    pub fn session_gap(&self) -> Result<Duration, EngineError> {
        Duration::try_hours(self.session_gap_hours).ok_or_else(|| {
            EngineError::invalid(
                "session_gap_hours",
                format!("{} hours is out of range", self.session_gap_hours),
            )
        })
    }

    pub fn timeframe(&self, timeframe: Timeframe) -> Option<&TimeframeSettings> {
        self.timeframes.iter().find(|row| row.timeframe == timeframe)
    }

    /// Ticker registered for a display name, matched case-insensitively.
    pub fn alias(&self, name: &str) -> Option<&str> {
        self.aliases
            .get(&name.trim().to_lowercase())
            .map(String::as_str)
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.session_gap_hours, 4);
        assert_eq!(cfg.home_currency, "KRW");
        assert_eq!(cfg.timeframes.len(), Timeframe::ALL.len());
        assert_eq!(cfg.indicator_params.sma_window, 20);
        assert_eq!(cfg.provider.timeout_secs, 10);
        assert!(cfg.validate().is_ok());

        let one_day = cfg.timeframe(Timeframe::OneDay).unwrap();
        assert_eq!(one_day.lookback_days, None);
        assert_eq!(one_day.interval, "15m");
        let five_years = cfg.timeframe(Timeframe::FiveYears).unwrap();
        assert_eq!(five_years.lookback_days, Some(1825));
    }

    #[test]
    fn every_timeframe_has_a_row() {
        let cfg = RuntimeConfig::default();
        for tf in Timeframe::ALL {
            assert!(cfg.timeframe(tf).is_some(), "missing {tf}");
        }
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.session_gap_hours, 4);
        assert_eq!(cfg.alias("Tesla"), Some("TSLA"));
        assert_eq!(cfg.provider.user_agent, "Mozilla/5.0");
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{
            "session_gap_hours": 6,
            "indicator_params": { "rsi_period": 9 },
            "timeframes": [ { "timeframe": "1y", "range": "2y", "interval": "1d", "lookback_days": 365 } ]
        }"#;
        let cfg: RuntimeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.session_gap().unwrap(), Duration::hours(6));
        assert_eq!(cfg.indicator_params.rsi_period, 9);
        assert_eq!(cfg.indicator_params.sma_window, 20);
        assert_eq!(cfg.timeframes.len(), 1);
        assert!(cfg.timeframe(Timeframe::OneDay).is_none());
        assert_eq!(cfg.home_currency, "KRW");
    }

    #[test]
    fn validate_rejects_bad_thresholds() {
        let mut cfg = RuntimeConfig::default();
        cfg.session_gap_hours = 0;
        assert!(matches!(
            cfg.validate(),
            Err(EngineError::InvalidParameter { name: "session_gap_hours", .. })
        ));

        let mut cfg = RuntimeConfig::default();
        cfg.timeframes[2].lookback_days = Some(-30);
        assert!(matches!(
            cfg.validate(),
            Err(EngineError::InvalidParameter { name: "lookback_days", .. })
        ));
    }

    #[test]
    fn policy_follows_lookback_days() {
        let cfg = RuntimeConfig::default();
        let now = Utc::now();
        match cfg.timeframe(Timeframe::OneMonth).unwrap().policy(now, cfg.session_gap().unwrap()) {
            WindowPolicy::Cutoff { lookback_days, .. } => assert_eq!(lookback_days, 30),
            other => panic!("unexpected policy {other}"),
        }
        match cfg.timeframe(Timeframe::OneDay).unwrap().policy(now, cfg.session_gap().unwrap()) {
            WindowPolicy::LatestSession { gap_threshold } => assert_eq!(gap_threshold, Duration::hours(4)),
            other => panic!("unexpected policy {other}"),
        }
    }

    #[test]
    fn alias_lookup_is_case_insensitive() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.alias("  SAMSUNG "), Some("005930.KS"));
        assert_eq!(cfg.alias("unknown corp"), None);
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = std::env::temp_dir().join(format!("stock-terminal-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("dashboard_config.json");

        let mut cfg = RuntimeConfig::default();
        cfg.home_currency = "USD".to_string();
        cfg.save(&path).unwrap();

        let loaded = RuntimeConfig::load(&path).unwrap();
        assert_eq!(loaded.home_currency, "USD");
        assert_eq!(loaded.timeframes, cfg.timeframes);
        assert!(!path.with_extension("json.tmp").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_missing_file_is_an_error() {
        assert!(RuntimeConfig::load("/definitely/not/here.json").is_err());
    }
}
