//! Pure transformations from backend series to the arrays the views draw.
//!
//! Nothing here does I/O or reads shared state. Missing numbers become
//! neutral defaults instead of errors.

pub mod display;
pub mod rise_drop;
pub mod yearly;

pub use display::{
    effective_coefficient, normalize_to_display_scale, pattern_return_bars, price_points,
    restore_from_display_scale, seasonality_highlight, seasonality_points, trade_split,
    LabeledPoint, TradeSplit,
};
pub use rise_drop::{decompose_rise_drop, yearly_rise_drop, RiseDropBar, YearRiseDrop};
pub use yearly::{
    cumulative_series, filter_by_lookback, round2, CumulativePoint, HasYear, YearValue,
};
