//! Domain types for Seasonax

pub mod calendar;
pub mod lookback;

pub use calendar::{normalize_label, CalendarError, DateRange, MonthDay, REFERENCE_YEAR};
pub use lookback::{Lookback, LookbackParseError, LOOKBACK_PRESETS, MAX_LOOKBACK_YEARS};
