//! Seasonax CLI: one-shot access to the dashboard's views.
//!
//! Commands:
//! - `view`: fetch one view for an asset and range, print the derived JSON
//! - `export`: save the yearly pattern table as CSV
//! - `screener`: search for seasonal patterns and print a sorted table
//! - `assets`: list the tickers the dashboard offers by default

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Datelike;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use seasonax_core::data::{
    export_file_name, sort_patterns, write_export, MarketGroup, ScreenerPattern, ScreenerQuery,
    SortColumn, SortOrder, SortState, StartOffset, KNOWN_ASSETS, PATTERN_LENGTHS,
};
use seasonax_core::domain::{DateRange, Lookback, MonthDay};
use seasonax_core::refresh::{fetch_view, DerivedView, ViewKind};
use seasonax_core::state::{AnalysisState, NavigationParams, RangeSink};
use seasonax_core::{DashboardConfig, HttpSeasonalityApi, SeasonalityApi};

#[derive(Parser)]
#[command(name = "seasonax", about = "Seasonax CLI: seasonal price-pattern analysis")]
struct Cli {
    /// Path to a TOML config file. Defaults to <config dir>/seasonax/config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct RangeArgs {
    /// Ticker symbol. Defaults to the configured asset.
    #[arg(long)]
    asset: Option<String>,

    /// First day of the pattern (MM-DD).
    #[arg(long, requires = "end")]
    start: Option<MonthDay>,

    /// Last day of the pattern (MM-DD).
    #[arg(long, requires = "start")]
    end: Option<MonthDay>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one view and print its derived series as JSON.
    View {
        /// price-history, seasonality, cumulative-profit, pattern-returns,
        /// pattern-statistics, profit-summary, gains-losses, misc-metrics, trade-stats.
        view: ViewKind,

        #[command(flatten)]
        range: RangeArgs,

        /// Years of history: a number or "max".
        #[arg(long)]
        years_back: Option<Lookback>,

        /// Calendar year for price-history. Defaults to this year.
        #[arg(long)]
        year: Option<i32>,

        /// Dashboard link query, e.g. "asset=MSFT&start_day=05-13&end_day=06-12".
        /// Applied after the other flags.
        #[arg(long)]
        link: Option<String>,
    },
    /// Save the yearly pattern table as CSV.
    Export {
        #[command(flatten)]
        range: RangeArgs,

        /// Output file. Defaults to ASSET_START_END.csv in the current directory.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Search for seasonal patterns.
    Screener {
        /// NASDAQ 100, S&P 500, DOW 30, Russell 2000, Forex, Crypto.
        #[arg(long, default_value = "NASDAQ 100", value_parser = parse_market)]
        market: MarketGroup,

        /// today, +1d, +7d, +15d, +30d.
        #[arg(long, default_value = "today", value_parser = parse_offset)]
        start_offset: StartOffset,

        /// Pattern length in days: 7, 15, 30 or 60.
        #[arg(long, default_value_t = 60, value_parser = parse_length)]
        length: u32,

        #[arg(long, default_value = "15")]
        years_back: Lookback,

        /// Minimum win ratio in percent.
        #[arg(long, default_value_t = 55, value_parser = clap::value_parser!(u32).range(0..=100))]
        min_win: u32,

        /// Column to sort by, e.g. rank, symbol, win-ratio, sharpe.
        #[arg(long, default_value = "rank", value_parser = parse_sort)]
        sort: SortColumn,

        /// Sort descending.
        #[arg(long, default_value_t = false)]
        desc: bool,

        /// Print JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List the default ticker choices.
    Assets,
}

fn parse_market(s: &str) -> Result<MarketGroup, String> {
    MarketGroup::parse(s).ok_or_else(|| format!("unknown market group '{s}'"))
}

fn parse_offset(s: &str) -> Result<StartOffset, String> {
    StartOffset::parse(s).ok_or_else(|| format!("unknown start offset '{s}'"))
}

fn parse_sort(s: &str) -> Result<SortColumn, String> {
    SortColumn::parse(s).ok_or_else(|| format!("unknown sort column '{s}'"))
}

fn parse_length(s: &str) -> Result<u32, String> {
    let n: u32 = s.parse().map_err(|e| format!("{e}"))?;
    if PATTERN_LENGTHS.contains(&n) {
        Ok(n)
    } else {
        Err(format!("pattern length must be one of {PATTERN_LENGTHS:?}"))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("seasonax=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = DashboardConfig::resolve(cli.config.as_deref()).context("loading configuration")?;
    let api = HttpSeasonalityApi::from_config(&config.api).context("building HTTP client")?;

    match cli.command {
        Commands::View {
            view,
            range,
            years_back,
            year,
            link,
        } => run_view(&api, &config, view, range, years_back, year, link),
        Commands::Export { range, output } => run_export(&api, &config, range, output),
        Commands::Screener {
            market,
            start_offset,
            length,
            years_back,
            min_win,
            sort,
            desc,
            json,
        } => {
            let query = ScreenerQuery {
                market_group: market,
                start_offset,
                pattern_length_days: length,
                lookback: years_back,
                min_win_ratio: min_win,
            };
            let order = if desc {
                SortOrder::Descending
            } else {
                SortOrder::Ascending
            };
            run_screener(&api, &query, SortState { column: sort, order }, json)
        }
        Commands::Assets => {
            for (ticker, label) in KNOWN_ASSETS {
                println!("{ticker:<6} {label}");
            }
            Ok(())
        }
    }
}

/// Analysis state for one command: configured defaults, then flags.
fn analysis_state(config: &DashboardConfig, range: &RangeArgs, lookback: Option<Lookback>) -> AnalysisState {
    let mut state = AnalysisState::new(
        range.asset.as_deref().unwrap_or(&config.defaults.asset),
        lookback.unwrap_or(config.defaults.lookback),
        chrono::Local::now().year(),
    );
    if let (Some(start), Some(end)) = (range.start, range.end) {
        state.set_date_range(start, end);
    }
    state
}

fn run_view(
    api: &dyn SeasonalityApi,
    config: &DashboardConfig,
    view: ViewKind,
    range: RangeArgs,
    years_back: Option<Lookback>,
    year: Option<i32>,
    link: Option<String>,
) -> Result<()> {
    let mut state = analysis_state(config, &range, years_back);
    if let Some(year) = year {
        state.set_year(year);
    }
    if let Some(query) = link {
        let params = NavigationParams::from_query(&query);
        if params.is_empty() {
            bail!("--link '{query}' has no usable parameters");
        }
        state.apply_navigation(&params);
    }

    let key = state.key_for(view);
    tracing::debug!(?key, %view, "fetching view");
    let raw = fetch_view(api, view, &key).map_err(|e| anyhow!("{view}: {e}"))?;
    let derived = DerivedView::derive(
        raw,
        key.lookback.unwrap_or(Lookback::Max),
        chrono::Local::now().year(),
    );
    if derived.is_empty() {
        tracing::warn!(%view, asset = %key.asset, "backend returned no data");
    }
    println!("{}", serde_json::to_string_pretty(&derived)?);
    Ok(())
}

fn run_export(
    api: &dyn SeasonalityApi,
    config: &DashboardConfig,
    range: RangeArgs,
    output: Option<PathBuf>,
) -> Result<()> {
    let state = analysis_state(config, &range, None);
    let range: DateRange = state.date_range();
    let path = output.unwrap_or_else(|| PathBuf::from(export_file_name(state.asset(), range)));

    let body = api
        .export_csv(state.asset(), range)
        .map_err(|e| anyhow!("export {} {range}: {e}", state.asset()))?;
    let summary = write_export(&body, &path)?;
    println!(
        "Wrote {} rows x {} columns to {}",
        summary.rows,
        summary.columns,
        summary.path.display()
    );
    Ok(())
}

fn run_screener(
    api: &dyn SeasonalityApi,
    query: &ScreenerQuery,
    sort: SortState,
    json: bool,
) -> Result<()> {
    let mut rows = api.screener(query).map_err(|e| anyhow!("screener: {e}"))?;
    sort_patterns(&mut rows, sort);

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    if rows.is_empty() {
        println!("No patterns matched.");
        return Ok(());
    }
    print_table(&rows);
    Ok(())
}

fn cell(v: Option<f64>) -> String {
    v.map_or_else(|| "-".into(), |x| format!("{x:.2}"))
}

fn print_table(rows: &[ScreenerPattern]) {
    println!(
        "{:>4}  {:<7} {:>10} {:>9} {:>8} {:>6} {:>9} {:>9} {:>7}  {}",
        "Rank", "Symbol", "Ann.ret%", "Avg%", "Median%", "Win%", "MaxProf%", "MaxLoss%", "Sharpe",
        "Window"
    );
    println!("{}", "-".repeat(96));
    for p in rows {
        println!(
            "{:>4}  {:<7} {:>10} {:>9} {:>8} {:>6} {:>9} {:>9} {:>7}  {}..{}",
            p.rank,
            p.symbol,
            cell(p.annualized_return),
            cell(p.average_return),
            cell(p.median_return),
            cell(p.win_ratio),
            cell(p.max_profit),
            cell(p.max_loss),
            cell(p.sharpe_ratio),
            p.pattern_start,
            p.pattern_end,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn view_args_parse() {
        let cli = Cli::try_parse_from([
            "seasonax",
            "view",
            "pattern_statistics",
            "--asset",
            "msft",
            "--start",
            "5-13",
            "--end",
            "06-12",
            "--years-back",
            "max",
        ])
        .unwrap();
        let Commands::View {
            view,
            range,
            years_back,
            ..
        } = cli.command
        else {
            panic!("expected view");
        };
        assert_eq!(view, ViewKind::PatternStatistics);
        assert_eq!(range.start.unwrap().to_string(), "05-13");
        assert_eq!(years_back, Some(Lookback::Max));

        let state = analysis_state(&DashboardConfig::default(), &range, years_back);
        assert_eq!(state.asset(), "MSFT");
        assert_eq!(state.date_range().to_string(), "05-13..06-12");
    }

    #[test]
    fn start_without_end_is_rejected() {
        assert!(Cli::try_parse_from(["seasonax", "export", "--start", "05-13"]).is_err());
    }

    #[test]
    fn screener_defaults_match_the_dashboard() {
        let cli = Cli::try_parse_from(["seasonax", "screener"]).unwrap();
        let Commands::Screener {
            market,
            start_offset,
            length,
            years_back,
            min_win,
            sort,
            desc,
            ..
        } = cli.command
        else {
            panic!("expected screener");
        };
        let defaults = ScreenerQuery::default();
        assert_eq!(market, defaults.market_group);
        assert_eq!(start_offset, defaults.start_offset);
        assert_eq!(length, defaults.pattern_length_days);
        assert_eq!(years_back, defaults.lookback);
        assert_eq!(min_win, defaults.min_win_ratio);
        assert_eq!(sort, SortColumn::Rank);
        assert!(!desc);
    }

    #[test]
    fn bad_pattern_length_is_rejected() {
        assert!(Cli::try_parse_from(["seasonax", "screener", "--length", "45"]).is_err());
    }
}
