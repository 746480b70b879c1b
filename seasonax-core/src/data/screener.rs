//! Pattern screener: query filters, result rows, client-side sorting.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{DateRange, Lookback, MonthDay};
use crate::state::NavigationParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MarketGroup {
    #[default]
    Nasdaq100,
    Sp500,
    Dow30,
    Russell2000,
    Forex,
    Crypto,
}

impl MarketGroup {
    pub const ALL: [MarketGroup; 6] = [
        MarketGroup::Nasdaq100,
        MarketGroup::Sp500,
        MarketGroup::Dow30,
        MarketGroup::Russell2000,
        MarketGroup::Forex,
        MarketGroup::Crypto,
    ];

    /// Name the backend expects in `market_group`.
    pub fn as_param(self) -> &'static str {
        match self {
            MarketGroup::Nasdaq100 => "NASDAQ 100",
            MarketGroup::Sp500 => "S&P 500",
            MarketGroup::Dow30 => "DOW 30",
            MarketGroup::Russell2000 => "Russell 2000",
            MarketGroup::Forex => "Forex",
            MarketGroup::Crypto => "Crypto",
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self)
    }

    /// Case-insensitive match on the backend name or a short alias.
    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|g| {
            g.as_param().to_ascii_lowercase() == needle
                || g.short_name() == needle.replace([' ', '&'], "")
        })
    }

    fn short_name(self) -> &'static str {
        match self {
            MarketGroup::Nasdaq100 => "nasdaq100",
            MarketGroup::Sp500 => "sp500",
            MarketGroup::Dow30 => "dow30",
            MarketGroup::Russell2000 => "russell2000",
            MarketGroup::Forex => "forex",
            MarketGroup::Crypto => "crypto",
        }
    }
}

impl fmt::Display for MarketGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

/// When the screened pattern window opens, relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StartOffset {
    #[default]
    Today,
    Tomorrow,
    In7Days,
    In15Days,
    In30Days,
}

impl StartOffset {
    pub const ALL: [StartOffset; 5] = [
        StartOffset::Today,
        StartOffset::Tomorrow,
        StartOffset::In7Days,
        StartOffset::In15Days,
        StartOffset::In30Days,
    ];

    pub fn as_param(self) -> &'static str {
        match self {
            StartOffset::Today => "today",
            StartOffset::Tomorrow => "+1d",
            StartOffset::In7Days => "+7d",
            StartOffset::In15Days => "+15d",
            StartOffset::In30Days => "+30d",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StartOffset::Today => "Today",
            StartOffset::Tomorrow => "Tomorrow",
            StartOffset::In7Days => "In 7 days",
            StartOffset::In15Days => "In 15 days",
            StartOffset::In30Days => "In 30 days",
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self)
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|o| o.as_param().eq_ignore_ascii_case(s) || o.label().eq_ignore_ascii_case(s))
    }
}

/// Pattern lengths the screener searches, in days. `60` covers 31..=60.
pub const PATTERN_LENGTHS: [u32; 4] = [7, 15, 30, 60];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenerQuery {
    pub market_group: MarketGroup,
    pub start_offset: StartOffset,
    pub pattern_length_days: u32,
    pub lookback: Lookback,
    /// Percent, 0..=100 in steps of 5.
    pub min_win_ratio: u32,
}

impl Default for ScreenerQuery {
    fn default() -> Self {
        Self {
            market_group: MarketGroup::default(),
            start_offset: StartOffset::default(),
            pattern_length_days: 60,
            lookback: Lookback::Years(15),
            min_win_ratio: 55,
        }
    }
}

impl ScreenerQuery {
    pub fn next_pattern_length(&mut self) {
        self.pattern_length_days = PATTERN_LENGTHS
            .iter()
            .copied()
            .find(|&d| d > self.pattern_length_days)
            .unwrap_or(PATTERN_LENGTHS[0]);
    }

    /// Step the minimum win ratio by `delta` percent, clamped to 0..=100.
    pub fn step_min_win(&mut self, delta: i32) {
        let next = self.min_win_ratio as i32 + delta;
        self.min_win_ratio = next.clamp(0, 100) as u32;
    }

    /// Query parameters in backend order.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("market_group", self.market_group.as_param().to_string()),
            ("start_date", self.start_offset.as_param().to_string()),
            ("pattern_length_days", self.pattern_length_days.to_string()),
            ("years_back", self.lookback.to_string()),
            ("min_win_ratio", self.min_win_ratio.to_string()),
        ]
    }
}

/// One screener hit. Returns and ratios are percentages from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenerPattern {
    #[serde(default)]
    pub rank: u32,
    pub symbol: String,
    #[serde(default)]
    pub instrument: String,
    #[serde(default)]
    pub annualized_return: Option<f64>,
    #[serde(default)]
    pub average_return: Option<f64>,
    #[serde(default)]
    pub median_return: Option<f64>,
    #[serde(default)]
    pub pattern_start: String,
    #[serde(default)]
    pub pattern_end: String,
    #[serde(default)]
    pub calendar_days: Option<u32>,
    #[serde(default)]
    pub max_profit: Option<f64>,
    #[serde(default)]
    pub max_loss: Option<f64>,
    #[serde(default)]
    pub num_winners: Option<u32>,
    #[serde(default)]
    pub num_trades: Option<u32>,
    #[serde(default)]
    pub win_ratio: Option<f64>,
    #[serde(default)]
    pub std_dev: Option<f64>,
    #[serde(default)]
    pub sharpe_ratio: Option<f64>,
}

impl ScreenerPattern {
    /// Parsed pattern window, `None` if either endpoint is not a calendar day.
    pub fn date_range(&self) -> Option<DateRange> {
        let start = MonthDay::parse(&self.pattern_start).ok()?;
        let end = MonthDay::parse(&self.pattern_end).ok()?;
        Some(DateRange::new(start, end).normalized())
    }

    /// Parameters that open this pattern in the dashboard.
    pub fn to_navigation(&self, lookback: Lookback) -> NavigationParams {
        NavigationParams {
            asset: Some(self.symbol.clone()),
            date_range: self.date_range(),
            lookback: Some(lookback),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortColumn {
    #[default]
    Rank,
    Symbol,
    AnnualizedReturn,
    AverageReturn,
    MedianReturn,
    WinRatio,
    MaxProfit,
    MaxLoss,
    SharpeRatio,
    CalendarDays,
}

impl SortColumn {
    pub const ALL: [SortColumn; 10] = [
        SortColumn::Rank,
        SortColumn::Symbol,
        SortColumn::AnnualizedReturn,
        SortColumn::AverageReturn,
        SortColumn::MedianReturn,
        SortColumn::WinRatio,
        SortColumn::MaxProfit,
        SortColumn::MaxLoss,
        SortColumn::SharpeRatio,
        SortColumn::CalendarDays,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortColumn::Rank => "Rank",
            SortColumn::Symbol => "Symbol",
            SortColumn::AnnualizedReturn => "Ann. return",
            SortColumn::AverageReturn => "Avg return",
            SortColumn::MedianReturn => "Median",
            SortColumn::WinRatio => "Win %",
            SortColumn::MaxProfit => "Max profit",
            SortColumn::MaxLoss => "Max loss",
            SortColumn::SharpeRatio => "Sharpe",
            SortColumn::CalendarDays => "Days",
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self)
    }

    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "");
        Self::ALL.into_iter().find(|c| {
            format!("{c:?}").to_ascii_lowercase() == needle
                || c.label().to_ascii_lowercase().replace(['.', ' ', '%'], "") == needle
        })
    }

    fn numeric(self, p: &ScreenerPattern) -> Option<f64> {
        match self {
            SortColumn::Rank => Some(f64::from(p.rank)),
            SortColumn::Symbol => None,
            SortColumn::AnnualizedReturn => p.annualized_return,
            SortColumn::AverageReturn => p.average_return,
            SortColumn::MedianReturn => p.median_return,
            SortColumn::WinRatio => p.win_ratio,
            SortColumn::MaxProfit => p.max_profit,
            SortColumn::MaxLoss => p.max_loss,
            SortColumn::SharpeRatio => p.sharpe_ratio,
            SortColumn::CalendarDays => p.calendar_days.map(f64::from),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn flip(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortOrder::Ascending => "↑",
            SortOrder::Descending => "↓",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    pub column: SortColumn,
    pub order: SortOrder,
}

impl SortState {
    /// Header-click semantics: the same column flips ascending to descending,
    /// any other column starts ascending.
    pub fn toggle(&mut self, column: SortColumn) {
        self.order = if self.column == column && self.order == SortOrder::Ascending {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        };
        self.column = column;
    }
}

/// Stable sort. Rows missing the sort value stay at the bottom in either
/// order.
pub fn sort_patterns(rows: &mut [ScreenerPattern], sort: SortState) {
    rows.sort_by(|a, b| {
        let ord = match sort.column {
            SortColumn::Symbol => Some(a.symbol.cmp(&b.symbol)),
            col => match (col.numeric(a), col.numeric(b)) {
                (Some(x), Some(y)) => Some(x.total_cmp(&y)),
                (Some(_), None) => return Ordering::Less,
                (None, Some(_)) => return Ordering::Greater,
                (None, None) => None,
            },
        };
        match (ord, sort.order) {
            (Some(o), SortOrder::Ascending) => o,
            (Some(o), SortOrder::Descending) => o.reverse(),
            (None, _) => Ordering::Equal,
        }
    });
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T) -> T {
    let idx = all.iter().position(|&x| x == current).unwrap_or(0);
    all[(idx + 1) % all.len()]
}
