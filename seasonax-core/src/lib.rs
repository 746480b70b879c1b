//! Seasonax Core: state, selection, derivation and refresh for a seasonal
//! price-pattern dashboard.
//!
//! This crate contains everything below the rendering layer:
//! - Calendar types (year-less `MonthDay`, `DateRange`, `Lookback`)
//! - Shared analysis state and navigation overwrites
//! - Pointer-drag date-range selection
//! - Pure series derivation (cumulative sums, lookback windows, rise/drop bars)
//! - Per-view refresh coordination with bounded retries on an injected clock
//! - Backend API trait, HTTP client and screener model
//! - TOML configuration

pub mod config;
pub mod data;
pub mod derive;
pub mod domain;
pub mod refresh;
pub mod selection;
pub mod state;

pub use config::{ConfigError, DashboardConfig};
pub use data::{ApiError, HttpSeasonalityApi, SeasonalityApi};
pub use domain::{DateRange, Lookback, MonthDay};
pub use refresh::{FetchTicket, RefreshCoordinator, RetryPolicy, ViewKind};
pub use selection::{DateRangeSelector, PointerEvent, SelectionOutcome};
pub use state::{AnalysisState, NavigationParams, RangeSink};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything that crosses the worker channel, or is
    /// shared with it, is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<FetchTicket>();
        require_sync::<FetchTicket>();
        require_send::<refresh::RawSeries>();
        require_sync::<refresh::RawSeries>();
        require_send::<refresh::DerivedView>();
        require_sync::<refresh::DerivedView>();
        require_send::<ApiError>();
        require_sync::<ApiError>();
        require_send::<data::ScreenerQuery>();
        require_send::<data::ScreenerPattern>();
        require_send::<HttpSeasonalityApi>();
        require_sync::<HttpSeasonalityApi>();
        require_send::<RefreshCoordinator>();
        require_send::<AnalysisState>();
    }

    /// Architecture contract: the API trait is object-safe so the worker can
    /// hold `Arc<dyn SeasonalityApi>` and tests can swap in a fake.
    #[test]
    fn api_trait_is_object_safe() {
        fn _takes_dyn(api: &dyn SeasonalityApi) -> bool {
            api.is_available()
        }
    }
}
