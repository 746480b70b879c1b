//! Split each year's maximum excursion into the realized profit and the
//! extensions beyond it, for stacked rise/drop bars.

use serde::{Deserialize, Serialize};

use super::yearly::HasYear;
use crate::data::models::YearlyStatistic;

/// `body` is the realized profit. `rise_extension >= 0` and
/// `drop_extension <= 0` are what the year reached past it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RiseDropBar {
    pub body: f64,
    pub rise_extension: f64,
    pub drop_extension: f64,
}

impl RiseDropBar {
    /// Highest point the stacked bar reaches.
    pub fn top(&self) -> f64 {
        self.body.max(0.0) + self.rise_extension
    }

    /// Lowest point the stacked bar reaches.
    pub fn bottom(&self) -> f64 {
        self.body.min(0.0) + self.drop_extension
    }
}

impl From<&YearlyStatistic> for RiseDropBar {
    fn from(row: &YearlyStatistic) -> Self {
        decompose_rise_drop(
            row.profit_percentage.unwrap_or(0.0),
            row.max_rise.unwrap_or(0.0),
            row.max_drop.unwrap_or(0.0),
        )
    }
}

/// For a winning year the rise extension is measured from the profit and the
/// drop from zero; for a losing year the reverse.
pub fn decompose_rise_drop(profit: f64, max_rise: f64, max_drop: f64) -> RiseDropBar {
    let (profit, max_rise, max_drop) = (finite(profit), finite(max_rise), finite(max_drop));
    if profit >= 0.0 {
        RiseDropBar {
            body: profit,
            rise_extension: (max_rise - profit).max(0.0),
            drop_extension: max_drop.min(0.0),
        }
    } else {
        RiseDropBar {
            body: profit,
            rise_extension: max_rise.max(0.0),
            drop_extension: (max_drop - profit).min(0.0),
        }
    }
}

fn finite(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearRiseDrop {
    pub year: i32,
    pub bar: RiseDropBar,
}

impl HasYear for YearRiseDrop {
    fn year(&self) -> i32 {
        self.year
    }
}

/// Bars for every row, in year order.
pub fn yearly_rise_drop(rows: &[YearlyStatistic]) -> Vec<YearRiseDrop> {
    let mut bars: Vec<_> = rows
        .iter()
        .map(|row| YearRiseDrop {
            year: row.year,
            bar: RiseDropBar::from(row),
        })
        .collect();
    bars.sort_by_key(|b| b.year);
    bars
}
