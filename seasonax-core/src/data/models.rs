//! Backend response shapes.
//!
//! Field names follow the backend JSON. Numeric fields the backend may omit or
//! send as `null` are `Option`s; derivation substitutes neutral defaults.
//! Aliases cover the older field names some endpoints still emit.

use serde::{Deserialize, Serialize};

/// Daily closes for one calendar year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    #[serde(alias = "date", default)]
    pub dates: Vec<String>,
    #[serde(alias = "price", default)]
    pub prices: Vec<Option<f64>>,
}

/// Smoothed seasonality curve over a synthetic calendar year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Seasonality {
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(alias = "average_prices", default)]
    pub values: Vec<Option<f64>>,
}

/// One year's pattern profit; the dashboard accumulates these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativeProfitItem {
    pub year: i32,
    #[serde(default)]
    pub cumulative_profit: Option<f64>,
}

/// Per-year pattern returns in column form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternReturns {
    #[serde(default)]
    pub year: Vec<i32>,
    #[serde(rename = "return", default)]
    pub returns: Vec<Option<f64>>,
}

/// One row of the yearly statistics table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyStatistic {
    pub year: i32,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub start_price: Option<f64>,
    #[serde(default)]
    pub end_price: Option<f64>,
    #[serde(default)]
    pub profit: Option<f64>,
    #[serde(default)]
    pub profit_percentage: Option<f64>,
    #[serde(default)]
    pub max_rise: Option<f64>,
    #[serde(default)]
    pub max_drop: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfitSummary {
    #[serde(default)]
    pub total_profit: Option<f64>,
    #[serde(default)]
    pub average_profit: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GainsLosses {
    #[serde(default)]
    pub number_of_gains: Option<u32>,
    #[serde(default)]
    pub number_of_losses: Option<u32>,
    #[serde(default)]
    pub profit_percentage: Option<f64>,
    #[serde(default)]
    pub max_profit: Option<f64>,
    #[serde(default)]
    pub max_loss: Option<f64>,
}

/// Risk and streak metrics. Ratios are computed server-side and shown as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MiscMetrics {
    #[serde(alias = "trades", default)]
    pub number_of_trades: Option<u32>,
    #[serde(default)]
    pub trading_days: Option<u32>,
    #[serde(default)]
    pub calendar_days: Option<u32>,
    #[serde(alias = "std_dev", default)]
    pub std_deviation: Option<f64>,
    #[serde(default)]
    pub sortino_ratio: Option<f64>,
    #[serde(default)]
    pub sharpe_ratio: Option<f64>,
    #[serde(default)]
    pub volatility: Option<f64>,
    #[serde(default)]
    pub current_streak: Option<i32>,
    #[serde(alias = "gains", default)]
    pub number_of_gains: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeStats {
    #[serde(default)]
    pub total_trades: u32,
    #[serde(alias = "winning_trades", default)]
    pub wins: u32,
    #[serde(alias = "losing_trades", default)]
    pub losses: u32,
    #[serde(default)]
    pub win_pct: Option<f64>,
    #[serde(default)]
    pub loss_pct: Option<f64>,
}

/// Tickers offered by the asset picker, with display labels.
pub const KNOWN_ASSETS: [(&str, &str); 8] = [
    ("AAPL", "Apple Inc. (AAPL)"),
    ("MSFT", "Microsoft Corp. (MSFT)"),
    ("GOOGL", "Alphabet Inc. (GOOGL)"),
    ("AMZN", "Amazon.com Inc. (AMZN)"),
    ("TSLA", "Tesla Inc. (TSLA)"),
    ("BTC-USD", "Bitcoin (BTC-USD)"),
    ("ETH-USD", "Ethereum (ETH-USD)"),
    ("EURUSD", "EUR/USD"),
];

/// Display label for a ticker, falling back to the ticker itself.
pub fn asset_label(ticker: &str) -> &str {
    KNOWN_ASSETS
        .iter()
        .find(|(symbol, _)| *symbol == ticker)
        .map(|(_, label)| *label)
        .unwrap_or(ticker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_series_accepts_singular_column_names() {
        let json = r#"{"date": ["2024-01-02", "2024-01-03"], "price": [185.6, null]}"#;
        let series: PriceSeries = serde_json::from_str(json).unwrap();
        assert_eq!(series.dates.len(), 2);
        assert_eq!(series.prices, vec![Some(185.6), None]);
    }

    #[test]
    fn seasonality_accepts_average_prices() {
        let json = r#"{"dates": ["01-02"], "average_prices": [51.2]}"#;
        let s: Seasonality = serde_json::from_str(json).unwrap();
        assert_eq!(s.values, vec![Some(51.2)]);
    }

    #[test]
    fn yearly_statistic_tolerates_missing_numbers() {
        let json = r#"{"year": 2020, "start_date": "2020-05-13", "end_date": "2020-06-12"}"#;
        let row: YearlyStatistic = serde_json::from_str(json).unwrap();
        assert_eq!(row.year, 2020);
        assert!(row.profit.is_none());
        assert!(row.max_drop.is_none());
    }

    #[test]
    fn misc_metrics_accepts_short_names() {
        let json = r#"{"trades": 12, "std_dev": 3.2, "gains": 8, "current_streak": -2}"#;
        let m: MiscMetrics = serde_json::from_str(json).unwrap();
        assert_eq!(m.number_of_trades, Some(12));
        assert_eq!(m.std_deviation, Some(3.2));
        assert_eq!(m.number_of_gains, Some(8));
        assert_eq!(m.current_streak, Some(-2));
    }

    #[test]
    fn pattern_returns_column_form() {
        let json = r#"{"year": [2021, 2022], "return": [4.5, -1.25]}"#;
        let r: PatternReturns = serde_json::from_str(json).unwrap();
        assert_eq!(r.year, vec![2021, 2022]);
        assert_eq!(r.returns, vec![Some(4.5), Some(-1.25)]);
    }

    #[test]
    fn asset_labels() {
        assert_eq!(asset_label("BTC-USD"), "Bitcoin (BTC-USD)");
        assert_eq!(asset_label("NVDA"), "NVDA");
    }
}
