//! HTTP client for the price-pattern backend.
//!
//! One blocking request per call; the refresh coordinator owns retries. The
//! shared circuit breaker fails calls fast while the backend is down.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;

use super::circuit_breaker::CircuitBreaker;
use super::models::{
    CumulativeProfitItem, GainsLosses, MiscMetrics, PatternReturns, PriceSeries, ProfitSummary,
    Seasonality, TradeStats, YearlyStatistic,
};
use super::provider::{ApiError, SeasonalityApi};
use super::screener::{ScreenerPattern, ScreenerQuery};
use crate::config::ApiConfig;
use crate::domain::{DateRange, Lookback};

type Params = Vec<(&'static str, String)>;

pub struct HttpSeasonalityApi {
    client: reqwest::blocking::Client,
    base_url: String,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl HttpSeasonalityApi {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        circuit_breaker: Arc<CircuitBreaker>,
    ) -> Result<Self, ApiError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("seasonax/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            circuit_breaker,
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let breaker = CircuitBreaker::with_threshold(
            Duration::from_secs(config.breaker_cooldown_secs),
            config.breaker_threshold,
        );
        Self::new(
            &config.base_url,
            Duration::from_secs(config.timeout_secs),
            Arc::new(breaker),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/api/{endpoint}", self.base_url)
    }

    fn send(&self, endpoint: &str, params: &Params) -> Result<reqwest::blocking::Response, ApiError> {
        if !self.circuit_breaker.is_allowed() {
            return Err(ApiError::CircuitOpen {
                remaining_secs: self.circuit_breaker.remaining_cooldown().as_secs(),
            });
        }

        let url = self.endpoint_url(endpoint);
        tracing::debug!(%url, ?params, "backend request");

        let resp = match self.client.get(&url).query(params).send() {
            Ok(resp) => resp,
            Err(e) => {
                self.circuit_breaker.record_failure();
                return Err(ApiError::Network(e.to_string()));
            }
        };

        let status = resp.status();
        if !status.is_success() {
            if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                self.circuit_breaker.record_failure();
            }
            let body = resp.text().unwrap_or_default();
            let body = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or_default().to_string()
            } else {
                body.trim().to_string()
            };
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        self.circuit_breaker.record_success();
        Ok(resp)
    }

    fn get_json<T: DeserializeOwned>(&self, endpoint: &str, params: Params) -> Result<T, ApiError> {
        let resp = self.send(endpoint, &params)?;
        resp.json::<T>()
            .map_err(|e| ApiError::Decode(format!("{endpoint}: {e}")))
    }

    fn get_text(&self, endpoint: &str, params: Params) -> Result<String, ApiError> {
        let resp = self.send(endpoint, &params)?;
        resp.text().map_err(|e| ApiError::Network(e.to_string()))
    }
}

fn asset_param(asset: &str) -> Result<(&'static str, String), ApiError> {
    let asset = asset.trim();
    if asset.is_empty() {
        return Err(ApiError::InvalidRequest("asset must not be empty".into()));
    }
    Ok(("asset", asset.to_string()))
}

/// `asset`, `start_day`, `end_day` in canonical order.
fn pattern_params(asset: &str, range: DateRange) -> Result<Params, ApiError> {
    Ok(vec![
        asset_param(asset)?,
        ("start_day", range.start.to_string()),
        ("end_day", range.end.to_string()),
    ])
}

impl SeasonalityApi for HttpSeasonalityApi {
    fn name(&self) -> &str {
        "price_pattern_backend"
    }

    fn price_series(&self, asset: &str, year: i32) -> Result<PriceSeries, ApiError> {
        self.get_json("price-series", vec![asset_param(asset)?, ("year", year.to_string())])
    }

    fn seasonality(
        &self,
        asset: &str,
        range: Option<DateRange>,
        lookback: Lookback,
    ) -> Result<Seasonality, ApiError> {
        let mut params = match range {
            Some(range) => pattern_params(asset, range)?,
            None => vec![asset_param(asset)?],
        };
        params.push(("years_back", lookback.to_string()));
        self.get_json("seasonality", params)
    }

    fn cumulative_profit(
        &self,
        asset: &str,
        range: DateRange,
    ) -> Result<Vec<CumulativeProfitItem>, ApiError> {
        self.get_json("cumulative-profit", pattern_params(asset, range)?)
    }

    fn pattern_returns(&self, asset: &str, range: DateRange) -> Result<PatternReturns, ApiError> {
        self.get_json("pattern-returns", pattern_params(asset, range)?)
    }

    fn pattern_statistics(
        &self,
        asset: &str,
        range: DateRange,
    ) -> Result<Vec<YearlyStatistic>, ApiError> {
        self.get_json("pattern-statistics", pattern_params(asset, range)?)
    }

    fn profit_summary(&self, asset: &str, range: DateRange) -> Result<ProfitSummary, ApiError> {
        self.get_json("profit-summary", pattern_params(asset, range)?)
    }

    fn gains_losses(&self, asset: &str, range: DateRange) -> Result<GainsLosses, ApiError> {
        self.get_json("gains-losses", pattern_params(asset, range)?)
    }

    fn misc_metrics(
        &self,
        asset: &str,
        range: DateRange,
        lookback: Lookback,
    ) -> Result<MiscMetrics, ApiError> {
        let mut params = pattern_params(asset, range)?;
        params.push(("years_back", lookback.to_string()));
        self.get_json("misc-metrics", params)
    }

    fn trade_stats(
        &self,
        asset: &str,
        range: DateRange,
        lookback: Lookback,
    ) -> Result<TradeStats, ApiError> {
        let mut params = pattern_params(asset, range)?;
        params.push(("years_back", lookback.to_string()));
        self.get_json("trade-stats", params)
    }

    fn export_csv(&self, asset: &str, range: DateRange) -> Result<String, ApiError> {
        let mut params = pattern_params(asset, range)?;
        params.push(("format", "csv".to_string()));
        self.get_text("export", params)
    }

    fn screener(&self, query: &ScreenerQuery) -> Result<Vec<ScreenerPattern>, ApiError> {
        self.get_json("screener", query.params())
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}
