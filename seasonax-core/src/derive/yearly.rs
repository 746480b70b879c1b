use serde::{Deserialize, Serialize};

use crate::data::models::{CumulativeProfitItem, YearlyStatistic};
use crate::domain::Lookback;

/// Anything tagged with a calendar year.
pub trait HasYear {
    fn year(&self) -> i32;
}

/// One year's value. Missing inputs are stored as 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearValue {
    pub year: i32,
    pub value: f64,
}

impl From<&CumulativeProfitItem> for YearValue {
    fn from(item: &CumulativeProfitItem) -> Self {
        Self {
            year: item.year,
            value: item.cumulative_profit.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CumulativePoint {
    pub year: i32,
    pub cumulative: f64,
}

impl HasYear for YearValue {
    fn year(&self) -> i32 {
        self.year
    }
}

impl HasYear for CumulativePoint {
    fn year(&self) -> i32 {
        self.year
    }
}

impl HasYear for YearlyStatistic {
    fn year(&self) -> i32 {
        self.year
    }
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Running sum in ascending year order, each point rounded to cents.
///
/// The sum itself is carried unrounded. Non-finite values count as 0. Input
/// order does not matter; equal years keep their relative order.
pub fn cumulative_series(points: &[YearValue]) -> Vec<CumulativePoint> {
    let mut sorted = points.to_vec();
    sorted.sort_by_key(|p| p.year);

    let mut running = 0.0;
    sorted
        .into_iter()
        .map(|p| {
            if p.value.is_finite() {
                running += p.value;
            }
            CumulativePoint {
                year: p.year,
                cumulative: round2(running),
            }
        })
        .collect()
}

/// Keep items whose year is strictly after `reference_year - n`.
pub fn filter_by_lookback<T: HasYear + Clone>(
    points: &[T],
    lookback: Lookback,
    reference_year: i32,
) -> Vec<T> {
    points
        .iter()
        .filter(|p| lookback.includes(p.year(), reference_year))
        .cloned()
        .collect()
}
