//! Seasonax TUI: terminal dashboard over `seasonax-core`.
//!
//! Panels:
//! 1. Dashboard: seasonality curve with mouse range selection, cumulative
//!    profit, per-year pattern bars
//! 2. Statistics: price history, yearly table, summary cards
//! 3. Screener: filterable, sortable pattern search
//! 4. Help: keys and mouse

pub mod app;
pub mod input;
pub mod persistence;
pub mod theme;
pub mod ui;
pub mod worker;

pub use app::{AppState, Panel};
