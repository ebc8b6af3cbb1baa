// =============================================================================
// Quote metadata & summary
// =============================================================================
//
// The headline numbers shown above the chart: last price, change against the
// previous close, and the price converted into the viewer's home currency.

use serde::{Deserialize, Serialize};

/// Quote header returned alongside a chart response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteMeta {
    pub symbol: String,
    pub currency: String,
    pub price: f64,
    pub previous_close: Option<f64>,
    pub name: Option<String>,
}

impl QuoteMeta {
    /// Whether displaying this quote in `home_currency` needs an FX rate.
    pub fn needs_conversion(&self, home_currency: &str) -> bool {
        !self.currency.is_empty() && !self.currency.eq_ignore_ascii_case(home_currency)
    }
}

/// Price, change and converted price for the dashboard header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteSummary {
    pub symbol: String,
    pub name: String,
    pub currency: String,
    pub price: f64,
    pub previous_close: Option<f64>,
    pub change: Option<f64>,
    pub change_pct: Option<f64>,
    pub home_currency: String,
    /// `price` in `home_currency`; `None` when a needed FX rate is missing.
    pub home_price: Option<f64>,
}

impl QuoteSummary {
    /// Build the summary.
    ///
    /// `display_name` wins over the provider name, which wins over the symbol.
    /// `fx_rate` converts one unit of the quote currency into the home
    /// currency and is ignored when the currencies already match.
    pub fn new(meta: &QuoteMeta, display_name: Option<&str>, home_currency: &str, fx_rate: Option<f64>) -> Self {
        let change = meta.previous_close.map(|prev| meta.price - prev);
        let change_pct = match (change, meta.previous_close) {
            (Some(change), Some(prev)) if prev != 0.0 => Some(change / prev * 100.0),
            _ => None,
        };

        let home_price = if meta.needs_conversion(home_currency) {
            fx_rate.filter(|r| r.is_finite() && *r > 0.0).map(|r| meta.price * r)
        } else {
            Some(meta.price)
        };

        let name = display_name
            .map(str::to_string)
            .or_else(|| meta.name.clone())
            .unwrap_or_else(|| meta.symbol.clone());

        Self {
            symbol: meta.symbol.clone(),
            name,
            currency: meta.currency.clone(),
            price: meta.price,
            previous_close: meta.previous_close,
            change,
            change_pct,
            home_currency: home_currency.to_string(),
            home_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(currency: &str, price: f64, prev: Option<f64>) -> QuoteMeta {
        QuoteMeta {
            symbol: "TSLA".to_string(),
            currency: currency.to_string(),
            price,
            previous_close: prev,
            name: Some("Tesla, Inc.".to_string()),
        }
    }

    #[test]
    fn change_and_percentage() {
        let q = QuoteSummary::new(&meta("USD", 110.0, Some(100.0)), None, "KRW", Some(1_350.0));
        assert!((q.change.unwrap() - 10.0).abs() < 1e-10);
        assert!((q.change_pct.unwrap() - 10.0).abs() < 1e-10);
        assert!((q.home_price.unwrap() - 148_500.0).abs() < 1e-6);
        assert_eq!(q.name, "Tesla, Inc.");
    }

    #[test]
    fn zero_previous_close_has_no_percentage() {
        let q = QuoteSummary::new(&meta("USD", 5.0, Some(0.0)), None, "USD", None);
        assert_eq!(q.change, Some(5.0));
        assert_eq!(q.change_pct, None);
    }

    #[test]
    fn same_currency_needs_no_rate() {
        let q = QuoteSummary::new(&meta("KRW", 71_000.0, None), Some("Samsung"), "krw", None);
        assert_eq!(q.home_price, Some(71_000.0));
        assert_eq!(q.change, None);
        assert_eq!(q.name, "Samsung");
    }

    #[test]
    fn missing_rate_leaves_home_price_empty() {
        let q = QuoteSummary::new(&meta("EUR", 700.0, Some(690.0)), None, "KRW", None);
        assert_eq!(q.home_price, None);
        let q = QuoteSummary::new(&meta("EUR", 700.0, Some(690.0)), None, "KRW", Some(f64::NAN));
        assert_eq!(q.home_price, None);
    }

    #[test]
    fn name_falls_back_to_symbol() {
        let mut m = meta("USD", 1.0, None);
        m.name = None;
        assert_eq!(QuoteSummary::new(&m, None, "USD", None).name, "TSLA");
    }
}
