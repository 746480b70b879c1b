//! Dashboard views: what each depends on, how it is fetched, what it derives.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data::models::{
    CumulativeProfitItem, GainsLosses, MiscMetrics, PatternReturns, PriceSeries, ProfitSummary,
    Seasonality, TradeStats, YearlyStatistic,
};
use crate::data::provider::{ApiError, SeasonalityApi};
use crate::derive::{
    cumulative_series, filter_by_lookback, pattern_return_bars, price_points, seasonality_points,
    trade_split, yearly_rise_drop, CumulativePoint, LabeledPoint, TradeSplit, YearRiseDrop,
    YearValue,
};
use crate::domain::{DateRange, Lookback};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewKind {
    PriceHistory,
    Seasonality,
    CumulativeProfit,
    PatternReturns,
    PatternStatistics,
    ProfitSummary,
    GainsLosses,
    MiscMetrics,
    TradeStats,
}

/// Which state fields a view's data depends on. Asset and refresh token are
/// always included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependencies {
    pub range: bool,
    pub lookback: bool,
    pub year: bool,
}

impl ViewKind {
    pub const ALL: [ViewKind; 9] = [
        ViewKind::PriceHistory,
        ViewKind::Seasonality,
        ViewKind::CumulativeProfit,
        ViewKind::PatternReturns,
        ViewKind::PatternStatistics,
        ViewKind::ProfitSummary,
        ViewKind::GainsLosses,
        ViewKind::MiscMetrics,
        ViewKind::TradeStats,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ViewKind::PriceHistory => "Price history",
            ViewKind::Seasonality => "Seasonality",
            ViewKind::CumulativeProfit => "Cumulative profit",
            ViewKind::PatternReturns => "Pattern returns",
            ViewKind::PatternStatistics => "Pattern statistics",
            ViewKind::ProfitSummary => "Profit summary",
            ViewKind::GainsLosses => "Gains & losses",
            ViewKind::MiscMetrics => "Metrics",
            ViewKind::TradeStats => "Trade stats",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            ViewKind::PriceHistory => "price-history",
            ViewKind::Seasonality => "seasonality",
            ViewKind::CumulativeProfit => "cumulative-profit",
            ViewKind::PatternReturns => "pattern-returns",
            ViewKind::PatternStatistics => "pattern-statistics",
            ViewKind::ProfitSummary => "profit-summary",
            ViewKind::GainsLosses => "gains-losses",
            ViewKind::MiscMetrics => "misc-metrics",
            ViewKind::TradeStats => "trade-stats",
        }
    }

    /// The seasonality curve always spans the whole year so that dragging a
    /// new range on it does not reload it. Price history follows the chosen
    /// year only. Everything else is a per-pattern aggregate; a few of them
    /// also honour the lookback window.
    pub fn dependencies(self) -> Dependencies {
        let (range, lookback, year) = match self {
            ViewKind::PriceHistory => (false, false, true),
            ViewKind::Seasonality => (false, true, false),
            ViewKind::CumulativeProfit
            | ViewKind::PatternReturns
            | ViewKind::PatternStatistics
            | ViewKind::MiscMetrics
            | ViewKind::TradeStats => (true, true, false),
            ViewKind::ProfitSummary | ViewKind::GainsLosses => (true, false, false),
        };
        Dependencies {
            range,
            lookback,
            year,
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ViewKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase().replace('_', "-");
        ViewKind::ALL
            .into_iter()
            .find(|v| v.slug() == needle)
            .ok_or_else(|| {
                let known: Vec<_> = ViewKind::ALL.iter().map(|v| v.slug()).collect();
                format!("unknown view '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

/// The slice of analysis state one view was fetched for. Fields the view does
/// not depend on are `None`, so unrelated edits leave the key unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyKey {
    pub asset: String,
    pub range: Option<DateRange>,
    pub lookback: Option<Lookback>,
    pub year: Option<i32>,
    pub refresh_token: u64,
}

/// Backend payload for one view, before derivation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawSeries {
    PriceHistory(PriceSeries),
    Seasonality(Seasonality),
    CumulativeProfit(Vec<CumulativeProfitItem>),
    PatternReturns(PatternReturns),
    PatternStatistics(Vec<YearlyStatistic>),
    ProfitSummary(ProfitSummary),
    GainsLosses(GainsLosses),
    MiscMetrics(MiscMetrics),
    TradeStats(TradeStats),
}

impl RawSeries {
    pub fn kind(&self) -> ViewKind {
        match self {
            RawSeries::PriceHistory(_) => ViewKind::PriceHistory,
            RawSeries::Seasonality(_) => ViewKind::Seasonality,
            RawSeries::CumulativeProfit(_) => ViewKind::CumulativeProfit,
            RawSeries::PatternReturns(_) => ViewKind::PatternReturns,
            RawSeries::PatternStatistics(_) => ViewKind::PatternStatistics,
            RawSeries::ProfitSummary(_) => ViewKind::ProfitSummary,
            RawSeries::GainsLosses(_) => ViewKind::GainsLosses,
            RawSeries::MiscMetrics(_) => ViewKind::MiscMetrics,
            RawSeries::TradeStats(_) => ViewKind::TradeStats,
        }
    }
}

/// What a view renders. Always rebuilt from a `RawSeries`, never patched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "kebab-case")]
pub enum DerivedView {
    PriceHistory {
        points: Vec<LabeledPoint>,
    },
    Seasonality {
        points: Vec<LabeledPoint>,
    },
    CumulativeProfit {
        points: Vec<CumulativePoint>,
    },
    PatternReturns {
        bars: Vec<YearValue>,
    },
    PatternStatistics {
        rows: Vec<YearlyStatistic>,
        bars: Vec<YearRiseDrop>,
    },
    ProfitSummary(ProfitSummary),
    GainsLosses(GainsLosses),
    MiscMetrics(MiscMetrics),
    TradeStats {
        stats: TradeStats,
        split: TradeSplit,
    },
}

impl DerivedView {
    /// Deterministic in `(raw, lookback, reference_year)`.
    pub fn derive(raw: RawSeries, lookback: Lookback, reference_year: i32) -> Self {
        match raw {
            RawSeries::PriceHistory(series) => DerivedView::PriceHistory {
                points: price_points(&series),
            },
            RawSeries::Seasonality(series) => DerivedView::Seasonality {
                points: seasonality_points(&series),
            },
            RawSeries::CumulativeProfit(items) => {
                let values: Vec<YearValue> = items.iter().map(YearValue::from).collect();
                // Accumulate over the whole history, then window it.
                let points = cumulative_series(&values);
                DerivedView::CumulativeProfit {
                    points: filter_by_lookback(&points, lookback, reference_year),
                }
            }
            RawSeries::PatternReturns(returns) => DerivedView::PatternReturns {
                bars: filter_by_lookback(&pattern_return_bars(&returns), lookback, reference_year),
            },
            RawSeries::PatternStatistics(rows) => {
                let mut rows = filter_by_lookback(&rows, lookback, reference_year);
                rows.sort_by_key(|r| r.year);
                let bars = yearly_rise_drop(&rows);
                DerivedView::PatternStatistics { rows, bars }
            }
            RawSeries::ProfitSummary(summary) => DerivedView::ProfitSummary(summary),
            RawSeries::GainsLosses(gl) => DerivedView::GainsLosses(gl),
            RawSeries::MiscMetrics(m) => DerivedView::MiscMetrics(m),
            RawSeries::TradeStats(stats) => {
                let split = trade_split(stats.wins, stats.losses);
                DerivedView::TradeStats { stats, split }
            }
        }
    }

    /// True when there is nothing to draw. Summary cards are never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            DerivedView::PriceHistory { points } | DerivedView::Seasonality { points } => {
                points.is_empty()
            }
            DerivedView::CumulativeProfit { points } => points.is_empty(),
            DerivedView::PatternReturns { bars } => bars.is_empty(),
            DerivedView::PatternStatistics { rows, .. } => rows.is_empty(),
            DerivedView::ProfitSummary(_)
            | DerivedView::GainsLosses(_)
            | DerivedView::MiscMetrics(_)
            | DerivedView::TradeStats { .. } => false,
        }
    }
}

/// Call the endpoint behind `view` with the parameters in `key`.
///
/// Fields the view depends on are always present in its key; the fallbacks
/// only cover hand-built keys.
pub fn fetch_view(
    api: &dyn SeasonalityApi,
    view: ViewKind,
    key: &DependencyKey,
) -> Result<RawSeries, ApiError> {
    let asset = key.asset.as_str();
    let range = key.range.unwrap_or_default();
    let lookback = key.lookback.unwrap_or_default();

    let raw = match view {
        ViewKind::PriceHistory => {
            let year = key
                .year
                .ok_or_else(|| ApiError::InvalidRequest("price history needs a year".into()))?;
            RawSeries::PriceHistory(api.price_series(asset, year)?)
        }
        ViewKind::Seasonality => RawSeries::Seasonality(api.seasonality(asset, None, lookback)?),
        ViewKind::CumulativeProfit => {
            RawSeries::CumulativeProfit(api.cumulative_profit(asset, range)?)
        }
        ViewKind::PatternReturns => RawSeries::PatternReturns(api.pattern_returns(asset, range)?),
        ViewKind::PatternStatistics => {
            RawSeries::PatternStatistics(api.pattern_statistics(asset, range)?)
        }
        ViewKind::ProfitSummary => RawSeries::ProfitSummary(api.profit_summary(asset, range)?),
        ViewKind::GainsLosses => RawSeries::GainsLosses(api.gains_losses(asset, range)?),
        ViewKind::MiscMetrics => {
            RawSeries::MiscMetrics(api.misc_metrics(asset, range, lookback)?)
        }
        ViewKind::TradeStats => RawSeries::TradeStats(api.trade_stats(asset, range, lookback)?),
    };
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_round_trip() {
        for view in ViewKind::ALL {
            assert_eq!(view.slug().parse::<ViewKind>().unwrap(), view);
        }
        assert_eq!("trade_stats".parse::<ViewKind>().unwrap(), ViewKind::TradeStats);
        assert!("candles".parse::<ViewKind>().is_err());
    }

    #[test]
    fn seasonality_ignores_the_range() {
        let deps = ViewKind::Seasonality.dependencies();
        assert!(!deps.range);
        assert!(deps.lookback);
    }

    #[test]
    fn cumulative_is_windowed_after_accumulating() {
        let items: Vec<_> = (2013..=2025)
            .map(|year| CumulativeProfitItem {
                year,
                cumulative_profit: Some(1.0),
            })
            .collect();
        let derived = DerivedView::derive(
            RawSeries::CumulativeProfit(items),
            Lookback::Years(10),
            2025,
        );
        let DerivedView::CumulativeProfit { points } = derived else {
            panic!("wrong variant");
        };
        assert_eq!(points.len(), 10);
        assert_eq!(points[0].year, 2016);
        assert_eq!(points[0].cumulative, 4.0);
        assert_eq!(points[9].cumulative, 13.0);
    }

    #[test]
    fn statistics_get_rise_drop_bars() {
        let row = |year, pct: f64| YearlyStatistic {
            year,
            start_date: String::new(),
            end_date: String::new(),
            start_price: None,
            end_price: None,
            profit: None,
            profit_percentage: Some(pct),
            max_rise: Some(8.0),
            max_drop: Some(-3.0),
        };
        let derived = DerivedView::derive(
            RawSeries::PatternStatistics(vec![row(2024, 5.0), row(2010, 1.0)]),
            Lookback::Years(5),
            2025,
        );
        let DerivedView::PatternStatistics { rows, bars } = derived else {
            panic!("wrong variant");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(bars[0].bar.rise_extension, 3.0);
    }

    #[test]
    fn empty_payloads_are_empty_views() {
        let derived = DerivedView::derive(
            RawSeries::Seasonality(Seasonality::default()),
            Lookback::Max,
            2025,
        );
        assert!(derived.is_empty());
        let derived = DerivedView::derive(
            RawSeries::ProfitSummary(ProfitSummary::default()),
            Lookback::Max,
            2025,
        );
        assert!(!derived.is_empty());
    }

    #[test]
    fn derived_view_json_is_tagged() {
        let derived = DerivedView::derive(
            RawSeries::TradeStats(TradeStats {
                total_trades: 4,
                wins: 3,
                losses: 1,
                win_pct: Some(75.0),
                loss_pct: Some(25.0),
            }),
            Lookback::Max,
            2025,
        );
        let json = serde_json::to_value(&derived).unwrap();
        assert_eq!(json["view"], "trade-stats");
        assert_eq!(json["split"]["win_share"], 75.0);
    }
}
