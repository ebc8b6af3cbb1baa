// =============================================================================
// Yahoo Finance response parsing
// =============================================================================
//
// Chart endpoint shape:
//
//   { "chart": { "result": [ { "meta": { ... },
//                              "timestamp": [ ... ],
//                              "indicators": { "quote": [ { "open": [...],
//                                  "high": [...], "low": [...],
//                                  "close": [...], "volume": [...] } ] } } ],
//                "error": null } }
//
// Any price entry may be `null`; arrays are passed through untouched and the
// sanitizer deals with the gaps.
// =============================================================================

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use crate::market_data::{QuoteMeta, RawFeed};

/// Parsed chart response: the quote header plus the raw bar arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPayload {
    pub meta: QuoteMeta,
    pub feed: RawFeed,
}

/// Best search hit for a free-text query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolMatch {
    pub symbol: String,
    pub name: Option<String>,
}

/// Parse a `/v8/finance/chart/{symbol}` body.
pub fn parse_chart(body: &Value) -> Result<ChartPayload> {
    let chart = body.get("chart").context("missing field chart")?;

    if let Some(err) = chart.get("error").filter(|e| !e.is_null()) {
        let code = err["code"].as_str().unwrap_or("unknown");
        let description = err["description"].as_str().unwrap_or("no description");
        anyhow::bail!("chart provider error {code}: {description}");
    }

    let result = chart["result"]
        .as_array()
        .and_then(|r| r.first())
        .context("chart response has no result")?;

    let meta = parse_meta(&result["meta"])?;

    let timestamps = match result.get("timestamp") {
        Some(Value::Array(ts)) => ts
            .iter()
            .map(|t| t.as_i64().context("timestamp entry is not an integer"))
            .collect::<Result<Vec<i64>>>()?,
        _ => Vec::new(),
    };

    let quote = &result["indicators"]["quote"][0];

    let feed = RawFeed {
        timestamps,
        open: optional_f64s(&quote["open"]),
        high: optional_f64s(&quote["high"]),
        low: optional_f64s(&quote["low"]),
        close: optional_f64s(&quote["close"]),
        volume: optional_f64s(&quote["volume"]),
    };

    Ok(ChartPayload { meta, feed })
}

/// Parse a `/v1/finance/search` body; `None` when nothing matched.
pub fn parse_search(body: &Value) -> Option<SymbolMatch> {
    body["quotes"].as_array()?.iter().find_map(|q| {
        let symbol = q["symbol"].as_str()?.to_string();
        let name = q["shortname"]
            .as_str()
            .or_else(|| q["longname"].as_str())
            .map(str::to_string);
        Some(SymbolMatch { symbol, name })
    })
}

fn parse_meta(meta: &Value) -> Result<QuoteMeta> {
    let symbol = meta["symbol"]
        .as_str()
        .context("missing field meta.symbol")?
        .to_string();

    let price = meta["regularMarketPrice"]
        .as_f64()
        .context("missing field meta.regularMarketPrice")?;

    let previous_close = meta["chartPreviousClose"]
        .as_f64()
        .or_else(|| meta["previousClose"].as_f64());

    let name = meta["shortName"]
        .as_str()
        .or_else(|| meta["longName"].as_str())
        .map(str::to_string);

    Ok(QuoteMeta {
        symbol,
        currency: meta["currency"].as_str().unwrap_or_default().to_string(),
        price,
        previous_close,
        name,
    })
}

/// A JSON array of numbers-or-null; anything that is not an array is empty.
fn optional_f64s(val: &Value) -> Vec<Option<f64>> {
    val.as_array()
        .map(|arr| arr.iter().map(Value::as_f64).collect())
        .unwrap_or_default()
}
