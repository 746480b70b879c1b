//! Backend access: response models, the API trait, its HTTP client, and
//! CSV export.

pub mod circuit_breaker;
pub mod export;
pub mod http;
pub mod models;
pub mod provider;
pub mod screener;

pub use circuit_breaker::{BreakerState, CircuitBreaker};
pub use export::{export_file_name, inspect_csv, write_export, ExportError, ExportSummary};
pub use http::HttpSeasonalityApi;
pub use models::{
    asset_label, CumulativeProfitItem, GainsLosses, MiscMetrics, PatternReturns, PriceSeries,
    ProfitSummary, Seasonality, TradeStats, YearlyStatistic, KNOWN_ASSETS,
};
pub use provider::{ApiError, SeasonalityApi};
pub use screener::{
    sort_patterns, MarketGroup, ScreenerPattern, ScreenerQuery, SortColumn, SortOrder, SortState,
    StartOffset, PATTERN_LENGTHS,
};
