//! Backend API trait and structured error types.
//!
//! `SeasonalityApi` abstracts over the analytics backend so the refresh path
//! can run against the hosted service or an in-memory fake in tests.

use thiserror::Error;

use crate::data::models::{
    CumulativeProfitItem, GainsLosses, MiscMetrics, PatternReturns, PriceSeries, ProfitSummary,
    Seasonality, TradeStats, YearlyStatistic,
};
use crate::data::screener::{ScreenerPattern, ScreenerQuery};
use crate::domain::{DateRange, Lookback};

/// Errors surfaced by backend calls. Displayable in both CLI and TUI.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("network unreachable: {0}")]
    Network(String),

    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response format changed: {0}")]
    Decode(String),

    #[error("backend unavailable: circuit breaker open ({remaining_secs}s left)")]
    CircuitOpen { remaining_secs: u64 },

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// Whether repeating the same request later could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Network(_) | ApiError::CircuitOpen { .. } => true,
            ApiError::Status { status, .. } => *status == 429 || *status >= 500,
            ApiError::Decode(_) | ApiError::InvalidRequest(_) => false,
        }
    }
}

/// Every endpoint the dashboard reads from.
///
/// Arguments follow one order throughout: asset, date range, lookback.
pub trait SeasonalityApi: Send + Sync {
    fn name(&self) -> &str;

    fn price_series(&self, asset: &str, year: i32) -> Result<PriceSeries, ApiError>;

    /// `range: None` asks for the whole synthetic year.
    fn seasonality(
        &self,
        asset: &str,
        range: Option<DateRange>,
        lookback: Lookback,
    ) -> Result<Seasonality, ApiError>;

    fn cumulative_profit(
        &self,
        asset: &str,
        range: DateRange,
    ) -> Result<Vec<CumulativeProfitItem>, ApiError>;

    fn pattern_returns(&self, asset: &str, range: DateRange) -> Result<PatternReturns, ApiError>;

    fn pattern_statistics(
        &self,
        asset: &str,
        range: DateRange,
    ) -> Result<Vec<YearlyStatistic>, ApiError>;

    fn profit_summary(&self, asset: &str, range: DateRange) -> Result<ProfitSummary, ApiError>;

    fn gains_losses(&self, asset: &str, range: DateRange) -> Result<GainsLosses, ApiError>;

    fn misc_metrics(
        &self,
        asset: &str,
        range: DateRange,
        lookback: Lookback,
    ) -> Result<MiscMetrics, ApiError>;

    fn trade_stats(
        &self,
        asset: &str,
        range: DateRange,
        lookback: Lookback,
    ) -> Result<TradeStats, ApiError>;

    /// Raw CSV text of the per-year pattern table.
    fn export_csv(&self, asset: &str, range: DateRange) -> Result<String, ApiError>;

    fn screener(&self, query: &ScreenerQuery) -> Result<Vec<ScreenerPattern>, ApiError>;

    /// False while the backend is known to be refusing requests.
    fn is_available(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(ApiError::Network("reset".into()).is_transient());
        assert!(ApiError::Status {
            status: 503,
            body: String::new()
        }
        .is_transient());
        assert!(ApiError::Status {
            status: 429,
            body: String::new()
        }
        .is_transient());
        assert!(!ApiError::Status {
            status: 404,
            body: String::new()
        }
        .is_transient());
        assert!(!ApiError::Decode("missing field".into()).is_transient());
    }

    #[test]
    fn messages_are_user_facing() {
        let err = ApiError::Status {
            status: 502,
            body: "Bad Gateway".into(),
        };
        assert_eq!(err.to_string(), "backend returned HTTP 502: Bad Gateway");
    }
}
