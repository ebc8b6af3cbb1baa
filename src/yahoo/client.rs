// =============================================================================
// Yahoo Finance REST client - chart, search and FX lookups
// =============================================================================
//
// All endpoints are public.  The provider refuses requests without a
// browser-like User-Agent, so one is attached as a default header.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Url;
use tracing::{debug, instrument, warn};

use crate::runtime_config::ProviderSettings;

use super::response::{parse_chart, parse_search, ChartPayload, SymbolMatch};

/// HTTP client for the chart/search provider.
#[derive(Clone)]
pub struct YahooClient {
    chart_base_url: String,
    search_base_url: String,
    client: reqwest::Client,
}

impl YahooClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&settings.user_agent)
            .with_context(|| format!("invalid user agent '{}'", settings.user_agent))?;
        default_headers.insert(USER_AGENT, agent);

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("failed to build reqwest client")?;

        debug!(
            chart = %settings.chart_base_url,
            search = %settings.search_base_url,
            "YahooClient initialised"
        );

        Ok(Self {
            chart_base_url: settings.chart_base_url.trim_end_matches('/').to_string(),
            search_base_url: settings.search_base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    // -------------------------------------------------------------------------
    // Chart
    // -------------------------------------------------------------------------

    /// GET /v8/finance/chart/{symbol}?range=..&interval=..
    #[instrument(skip(self), name = "yahoo::fetch_chart")]
    pub async fn fetch_chart(&self, symbol: &str, range: &str, interval: &str) -> Result<ChartPayload> {
        let url = self.chart_url(symbol)?;

        let resp = self
            .client
            .get(url)
            .query(&[("range", range), ("interval", interval)])
            .send()
            .await
            .context("GET /v8/finance/chart request failed")?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .context("failed to read chart response body")?;

        if !status.is_success() {
            anyhow::bail!(
                "GET /v8/finance/chart/{symbol} returned {status}: {}",
                upstream_detail(&text)
            );
        }

        let body: serde_json::Value =
            serde_json::from_str(&text).context("failed to parse chart response")?;
        let payload = parse_chart(&body).with_context(|| format!("chart for {symbol} is unusable"))?;

        debug!(symbol, range, interval, bars = payload.feed.len(), "chart fetched");
        Ok(payload)
    }

    /// `{chart_base_url}/v8/finance/chart/{symbol}` with the symbol escaped
    /// as a single path segment.
    fn chart_url(&self, symbol: &str) -> Result<Url> {
        let mut url = Url::parse(&self.chart_base_url)
            .with_context(|| format!("invalid chart base url '{}'", self.chart_base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("chart base url '{}' cannot take a path", self.chart_base_url))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        Ok(url)
    }

    /// Units of `to` per one unit of `from`, from the `{FROM}{TO}=X` pair.
    #[instrument(skip(self), name = "yahoo::fx_rate")]
    pub async fn fx_rate(&self, from: &str, to: &str) -> Result<f64> {
        let pair = format!("{}{}=X", from.to_uppercase(), to.to_uppercase());
        let payload = self.fetch_chart(&pair, "1d", "1d").await?;
        let rate = payload.meta.price;
        if !rate.is_finite() || rate <= 0.0 {
            anyhow::bail!("FX pair {pair} returned unusable rate {rate}");
        }
        Ok(rate)
    }

    // -------------------------------------------------------------------------
    // Search / resolution
    // -------------------------------------------------------------------------

    /// GET /v1/finance/search?q=.. - first matching quote.
    #[instrument(skip(self), name = "yahoo::search")]
    pub async fn search(&self, query: &str) -> Result<Option<SymbolMatch>> {
        let url = format!("{}/v1/finance/search", self.search_base_url);

        let resp = self
            .client
            .get(&url)
            .query(&[("q", query)])
            .send()
            .await
            .context("GET /v1/finance/search request failed")?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .context("failed to read search response body")?;

        if !status.is_success() {
            anyhow::bail!("GET /v1/finance/search returned {status}: {}", upstream_detail(&text));
        }

        let body: serde_json::Value =
            serde_json::from_str(&text).context("failed to parse search response")?;

        let hit = parse_search(&body);
        if hit.is_none() {
            warn!(query, "search returned no quotes");
        }
        Ok(hit)
    }

    /// Resolve free text to a ticker: the alias table first, then search.
    ///
    /// `alias` is the caller's alias-table lookup for `query`.
    pub async fn resolve(&self, query: &str, alias: Option<&str>) -> Result<Option<SymbolMatch>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }
        if let Some(symbol) = alias {
            debug!(query, symbol, "resolved via alias table");
            return Ok(Some(SymbolMatch {
                symbol: symbol.to_string(),
                name: None,
            }));
        }
        self.search(query).await
    }
}

/// Readable reason for a failed request: the provider's error object when the
/// body carries one, otherwise the start of the raw body.
fn upstream_detail(text: &str) -> String {
    let described = serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .filter(|body| body.pointer("/chart/error").is_some_and(|e| !e.is_null()))
        .and_then(|body| parse_chart(&body).err());
    match described {
        Some(err) => err.to_string(),
        None => text.chars().take(200).collect(),
    }
}

impl std::fmt::Debug for YahooClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooClient")
            .field("chart_base_url", &self.chart_base_url)
            .field("search_base_url", &self.search_base_url)
            .finish()
    }
}
