//! Shared analysis state: the asset, pattern window, lookback and refresh
//! token every dashboard view reads from.

use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};

use crate::domain::{DateRange, Lookback, MonthDay};
use crate::refresh::{DependencyKey, ViewKind};

pub const DEFAULT_ASSET: &str = "AAPL";

/// Receiver of committed date ranges.
pub trait RangeSink {
    fn set_date_range(&mut self, start: MonthDay, end: MonthDay);
}

/// The one piece of mutable state the views depend on.
///
/// Owned by the application root; fields change only through the setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisState {
    asset: String,
    date_range: DateRange,
    lookback: Lookback,
    year: i32,
    refresh_token: u64,
}

impl Default for AnalysisState {
    fn default() -> Self {
        Self::new(DEFAULT_ASSET, Lookback::default(), Local::now().year())
    }
}

impl AnalysisState {
    pub fn new(asset: &str, lookback: Lookback, year: i32) -> Self {
        let asset = clean_ticker(asset).unwrap_or_else(|| DEFAULT_ASSET.to_string());
        Self {
            asset,
            date_range: DateRange::full_year(),
            lookback,
            year,
            refresh_token: 0,
        }
    }

    pub fn asset(&self) -> &str {
        &self.asset
    }

    pub fn date_range(&self) -> DateRange {
        self.date_range
    }

    pub fn lookback(&self) -> Lookback {
        self.lookback
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn refresh_token(&self) -> u64 {
        self.refresh_token
    }

    /// Blank tickers are ignored. Does not refresh.
    pub fn set_asset(&mut self, ticker: &str) {
        match clean_ticker(ticker) {
            Some(asset) => self.asset = asset,
            None => tracing::warn!("ignoring empty asset ticker"),
        }
    }

    pub fn set_lookback(&mut self, lookback: Lookback) {
        self.lookback = lookback;
    }

    pub fn set_year(&mut self, year: i32) {
        self.year = year;
    }

    /// Force every view to re-fetch even though nothing else changed.
    pub fn refresh(&mut self) {
        self.refresh_token = self.refresh_token.wrapping_add(1);
    }

    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Project the fields `view` depends on. Two states with equal keys for a
    /// view need not re-fetch it.
    pub fn key_for(&self, view: ViewKind) -> DependencyKey {
        let deps = view.dependencies();
        DependencyKey {
            asset: self.asset.clone(),
            range: deps.range.then_some(self.date_range),
            lookback: deps.lookback.then_some(self.lookback),
            year: deps.year.then_some(self.year),
            refresh_token: self.refresh_token,
        }
    }

    /// Overwrite from navigation parameters. Forces exactly one refresh when
    /// at least one field changed and returns whether it did.
    pub fn apply_navigation(&mut self, params: &NavigationParams) -> bool {
        let mut changed = false;

        if let Some(asset) = params.asset.as_deref().and_then(clean_ticker) {
            if asset != self.asset {
                self.asset = asset;
                changed = true;
            }
        }
        if let Some(range) = params.date_range {
            if range != self.date_range {
                self.date_range = range;
                changed = true;
            }
        }
        if let Some(lookback) = params.lookback {
            if lookback != self.lookback {
                self.lookback = lookback;
                changed = true;
            }
        }

        if changed {
            self.refresh();
            tracing::info!(
                asset = %self.asset,
                range = %self.date_range,
                lookback = %self.lookback,
                "navigation applied"
            );
        }
        changed
    }
}

impl RangeSink for AnalysisState {
    /// Stored verbatim; callers normalize.
    fn set_date_range(&mut self, start: MonthDay, end: MonthDay) {
        self.date_range = DateRange::new(start, end);
    }
}

fn clean_ticker(raw: &str) -> Option<String> {
    let t = raw.trim();
    (!t.is_empty()).then(|| t.to_ascii_uppercase())
}

/// A bulk overwrite of the analysis state, from a query string, CLI flags or
/// a screener row. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationParams {
    pub asset: Option<String>,
    pub date_range: Option<DateRange>,
    pub lookback: Option<Lookback>,
}

impl NavigationParams {
    pub fn is_empty(&self) -> bool {
        self.asset.is_none() && self.date_range.is_none() && self.lookback.is_none()
    }

    /// Parse `asset`, `start_day`, `end_day` and `years_back` from a query
    /// string such as `?asset=MSFT&start_day=05-13&end_day=06-12&years_back=max`.
    ///
    /// The range is taken only when both days parse. Unknown keys are skipped;
    /// bad values are logged and skipped.
    pub fn from_query(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        Self::from_pairs(form_urlencoded::parse(query.as_bytes()))
    }

    /// Same as [`from_query`](Self::from_query) over already decoded pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Self::default();
        let mut start = None;
        let mut end = None;

        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "asset" => params.asset = clean_ticker(value),
                "start_day" => start = parse_day(key, value),
                "end_day" => end = parse_day(key, value),
                "years_back" => match value.parse::<Lookback>() {
                    Ok(lb) => params.lookback = Some(lb),
                    Err(e) => tracing::warn!(error = %e, "ignoring navigation parameter"),
                },
                _ => {}
            }
        }

        if let (Some(start), Some(end)) = (start, end) {
            params.date_range = Some(DateRange::new(start, end));
        }
        params
    }
}

fn parse_day(key: &str, value: &str) -> Option<MonthDay> {
    match MonthDay::parse(value) {
        Ok(day) => Some(day),
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring navigation parameter");
            None
        }
    }
}
