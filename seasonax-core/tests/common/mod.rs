//! In-memory backend shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use seasonax_core::data::models::{
    CumulativeProfitItem, GainsLosses, MiscMetrics, PatternReturns, PriceSeries, ProfitSummary,
    Seasonality, TradeStats, YearlyStatistic,
};
use seasonax_core::data::{ApiError, ScreenerPattern, ScreenerQuery, SeasonalityApi};
use seasonax_core::domain::{DateRange, Lookback};

/// Records every call as `endpoint asset [range] [lookback]` and fails the
/// next `n` calls when told to.
#[derive(Default)]
pub struct FakeApi {
    pub calls: Mutex<Vec<String>>,
    failures: Mutex<VecDeque<ApiError>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, err: ApiError) {
        self.failures.lock().unwrap().push_back(err);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        match self.failures.lock().unwrap().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl SeasonalityApi for FakeApi {
    fn name(&self) -> &str {
        "fake"
    }

    fn price_series(&self, asset: &str, year: i32) -> Result<PriceSeries, ApiError> {
        self.record(format!("price-series {asset} {year}"))?;
        Ok(PriceSeries {
            dates: vec![format!("{year}-01-02"), format!("{year}-01-03")],
            prices: vec![Some(100.0), Some(101.5)],
        })
    }

    fn seasonality(
        &self,
        asset: &str,
        range: Option<DateRange>,
        lookback: Lookback,
    ) -> Result<Seasonality, ApiError> {
        let range = range.map(|r| r.to_string()).unwrap_or_else(|| "-".into());
        self.record(format!("seasonality {asset} {range} {lookback}"))?;
        Ok(Seasonality {
            dates: vec!["01-01".into(), "06-15".into(), "12-31".into()],
            values: vec![Some(0.0), Some(55.0), Some(100.0)],
        })
    }

    fn cumulative_profit(
        &self,
        asset: &str,
        range: DateRange,
    ) -> Result<Vec<CumulativeProfitItem>, ApiError> {
        self.record(format!("cumulative-profit {asset} {range}"))?;
        Ok((2020..=2024)
            .map(|year| CumulativeProfitItem {
                year,
                cumulative_profit: Some(2.5),
            })
            .collect())
    }

    fn pattern_returns(&self, asset: &str, range: DateRange) -> Result<PatternReturns, ApiError> {
        self.record(format!("pattern-returns {asset} {range}"))?;
        Ok(PatternReturns {
            year: vec![2023, 2024],
            returns: vec![Some(3.0), Some(-1.0)],
        })
    }

    fn pattern_statistics(
        &self,
        asset: &str,
        range: DateRange,
    ) -> Result<Vec<YearlyStatistic>, ApiError> {
        self.record(format!("pattern-statistics {asset} {range}"))?;
        Ok(vec![YearlyStatistic {
            year: 2024,
            start_date: "2024-05-13".into(),
            end_date: "2024-06-12".into(),
            start_price: Some(180.0),
            end_price: Some(189.0),
            profit: Some(9.0),
            profit_percentage: Some(5.0),
            max_rise: Some(8.0),
            max_drop: Some(-3.0),
        }])
    }

    fn profit_summary(&self, asset: &str, range: DateRange) -> Result<ProfitSummary, ApiError> {
        self.record(format!("profit-summary {asset} {range}"))?;
        Ok(ProfitSummary {
            total_profit: Some(12.5),
            average_profit: Some(2.5),
        })
    }

    fn gains_losses(&self, asset: &str, range: DateRange) -> Result<GainsLosses, ApiError> {
        self.record(format!("gains-losses {asset} {range}"))?;
        Ok(GainsLosses::default())
    }

    fn misc_metrics(
        &self,
        asset: &str,
        range: DateRange,
        lookback: Lookback,
    ) -> Result<MiscMetrics, ApiError> {
        self.record(format!("misc-metrics {asset} {range} {lookback}"))?;
        Ok(MiscMetrics::default())
    }

    fn trade_stats(
        &self,
        asset: &str,
        range: DateRange,
        lookback: Lookback,
    ) -> Result<TradeStats, ApiError> {
        self.record(format!("trade-stats {asset} {range} {lookback}"))?;
        Ok(TradeStats {
            total_trades: 5,
            wins: 4,
            losses: 1,
            win_pct: Some(80.0),
            loss_pct: Some(20.0),
        })
    }

    fn export_csv(&self, asset: &str, range: DateRange) -> Result<String, ApiError> {
        self.record(format!("export {asset} {range}"))?;
        Ok("year,profit\n2024,5.0\n".into())
    }

    fn screener(&self, query: &ScreenerQuery) -> Result<Vec<ScreenerPattern>, ApiError> {
        self.record(format!("screener {}", query.market_group))?;
        Ok(Vec::new())
    }

    fn is_available(&self) -> bool {
        true
    }
}
