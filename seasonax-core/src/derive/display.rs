//! Chart-ready arrays: label/value points, display scaling, highlight bands.

use serde::{Deserialize, Serialize};

use super::yearly::YearValue;
use crate::data::models::{PatternReturns, PriceSeries, Seasonality};
use crate::domain::{DateRange, MonthDay};

/// Coefficient actually applied. Anything that would flip or collapse the
/// ordering of values becomes 1.
pub fn effective_coefficient(coefficient: f64) -> f64 {
    if coefficient.is_finite() && coefficient > 0.0 {
        coefficient
    } else {
        1.0
    }
}

pub fn normalize_to_display_scale(values: &[f64], coefficient: f64) -> Vec<f64> {
    let c = effective_coefficient(coefficient);
    values.iter().map(|v| v / c).collect()
}

pub fn restore_from_display_scale(values: &[f64], coefficient: f64) -> Vec<f64> {
    let c = effective_coefficient(coefficient);
    values.iter().map(|v| v * c).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledPoint {
    pub label: String,
    pub value: f64,
}

/// Zip a label column with a value column, truncating to the shorter one.
/// Points with no finite value are left out of the line.
fn zip_columns(labels: &[String], values: &[Option<f64>]) -> Vec<LabeledPoint> {
    labels
        .iter()
        .zip(values)
        .filter_map(|(label, value)| match value {
            Some(v) if v.is_finite() => Some(LabeledPoint {
                label: label.clone(),
                value: *v,
            }),
            _ => None,
        })
        .collect()
}

pub fn price_points(series: &PriceSeries) -> Vec<LabeledPoint> {
    zip_columns(&series.dates, &series.prices)
}

pub fn seasonality_points(series: &Seasonality) -> Vec<LabeledPoint> {
    zip_columns(&series.dates, &series.values)
}

/// Column-form returns as per-year bars. Missing returns are 0.
pub fn pattern_return_bars(returns: &PatternReturns) -> Vec<YearValue> {
    let mut bars: Vec<_> = returns
        .year
        .iter()
        .zip(&returns.returns)
        .map(|(&year, &value)| YearValue {
            year,
            value: value.filter(|v| v.is_finite()).unwrap_or(0.0),
        })
        .collect();
    bars.sort_by_key(|b| b.year);
    bars
}

/// Indices of `points` whose label falls inside `range`. Labels that are not
/// calendar days never match.
pub fn seasonality_highlight(points: &[LabeledPoint], range: DateRange) -> Vec<usize> {
    points
        .iter()
        .enumerate()
        .filter(|(_, p)| {
            MonthDay::parse(&p.label)
                .map(|day| range.contains(day))
                .unwrap_or(false)
        })
        .map(|(i, _)| i)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeSplit {
    pub wins: u32,
    pub losses: u32,
    /// Percent of all trades.
    pub win_share: f64,
    pub loss_share: f64,
}

pub fn trade_split(wins: u32, losses: u32) -> TradeSplit {
    let total = u64::from(wins) + u64::from(losses);
    let share = |n: u32| {
        if total == 0 {
            0.0
        } else {
            f64::from(n) * 100.0 / total as f64
        }
    };
    TradeSplit {
        wins,
        losses,
        win_share: share(wins),
        loss_share: share(losses),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_round_trip_and_bad_coefficients() {
        let values = [100.0, 250.0, -50.0];
        let scaled = normalize_to_display_scale(&values, 50.0);
        assert_eq!(scaled, vec![2.0, 5.0, -1.0]);
        assert_eq!(restore_from_display_scale(&scaled, 50.0), values.to_vec());

        for bad in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            assert_eq!(normalize_to_display_scale(&values, bad), values.to_vec());
        }
    }

    #[test]
    fn zips_to_shorter_column_and_skips_gaps() {
        let series = Seasonality {
            dates: vec!["01-02".into(), "01-03".into(), "01-04".into()],
            values: vec![Some(1.0), None],
        };
        let points = seasonality_points(&series);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].label, "01-02");

        let prices = PriceSeries {
            dates: vec!["2024-01-02".into()],
            prices: vec![Some(185.5), Some(186.0)],
        };
        assert_eq!(price_points(&prices).len(), 1);
    }

    #[test]
    fn return_bars_default_missing_to_zero() {
        let returns = PatternReturns {
            year: vec![2023, 2021, 2022],
            returns: vec![Some(1.5), None, Some(-2.0)],
        };
        let bars = pattern_return_bars(&returns);
        let flat: Vec<_> = bars.iter().map(|b| (b.year, b.value)).collect();
        assert_eq!(flat, [(2021, 0.0), (2022, -2.0), (2023, 1.5)]);
    }

    #[test]
    fn highlight_uses_inclusive_normalized_range() {
        let points: Vec<_> = ["05-12", "05-13", "06-01", "06-12", "06-13", "junk"]
            .iter()
            .map(|l| LabeledPoint {
                label: l.to_string(),
                value: 0.0,
            })
            .collect();
        let range = DateRange::new(
            MonthDay::new(6, 12).unwrap(),
            MonthDay::new(5, 13).unwrap(),
        );
        assert_eq!(seasonality_highlight(&points, range), vec![1, 2, 3]);
    }

    #[test]
    fn trade_split_shares() {
        let split = trade_split(3, 1);
        assert_eq!((split.win_share, split.loss_share), (75.0, 25.0));
        let none = trade_split(0, 0);
        assert_eq!((none.win_share, none.loss_share), (0.0, 0.0));
    }
}
