//! Panel 2: price history for one year, the yearly statistics table, and the
//! summary cards for the committed range.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph};
use ratatui::Frame;

use seasonax_core::refresh::{DerivedView, ViewKind};

use crate::app::AppState;
use crate::theme;
use crate::ui::dashboard_panel::placeholder;
use crate::ui::plot::padded_bounds;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(5)])
        .split(area);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);

    render_price(f, rows[0], app);
    render_table(f, cols[0], app);
    render_cards(f, cols[1], app);
}

fn render_price(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted())
        .title(format!(
            " Price {} {} [h/l] year ",
            app.analysis.asset(),
            app.analysis.year()
        ))
        .title_style(theme::accent());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let points = match app.data(ViewKind::PriceHistory) {
        Some(DerivedView::PriceHistory { points }) if !points.is_empty() => points,
        _ => {
            f.render_widget(Paragraph::new(placeholder(app, ViewKind::PriceHistory)), inner);
            return;
        }
    };
    let data: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.value))
        .collect();
    let [lo, hi] = padded_bounds(points.iter().map(|p| p.value));
    let first = &points[0].label;
    let last = &points[points.len() - 1].label;

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .style(Style::default().fg(theme::ACCENT))
        .graph_type(GraphType::Line)
        .data(&data);
    let chart = Chart::new(vec![dataset])
        .x_axis(
            Axis::default()
                .style(theme::muted())
                .bounds([0.0, points.len().saturating_sub(1).max(1) as f64])
                .labels(vec![
                    Span::styled(first.as_str(), theme::muted()),
                    Span::styled(last.as_str(), theme::muted()),
                ]),
        )
        .y_axis(
            Axis::default()
                .style(theme::muted())
                .bounds([lo, hi])
                .labels(vec![
                    Span::styled(format!("{lo:.2}"), theme::muted()),
                    Span::styled(format!("{hi:.2}"), theme::muted()),
                ]),
        );
    f.render_widget(chart, inner);
}

fn render_table(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted())
        .title(format!(" Yearly statistics {} ", app.analysis.date_range()))
        .title_style(theme::accent());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = match app.data(ViewKind::PatternStatistics) {
        Some(DerivedView::PatternStatistics { rows, .. }) if !rows.is_empty() => rows,
        _ => {
            let p = Paragraph::new(placeholder(app, ViewKind::PatternStatistics));
            f.render_widget(p, inner);
            return;
        }
    };

    let mut lines = vec![Line::from(Span::styled(
        format!(
            "{:>4} {:>10} {:>10} {:>9} {:>9} {:>8} {:>8} {:>8}",
            "Year", "Start", "End", "Open", "Close", "Profit%", "MaxRise", "MaxDrop"
        ),
        theme::accent_bold(),
    ))];
    let visible = inner.height.saturating_sub(1) as usize;
    for r in rows.iter().rev().take(visible) {
        let pct = r.profit_percentage.unwrap_or(0.0);
        lines.push(Line::from(vec![
            Span::styled(
                format!(
                    "{:>4} {:>10} {:>10} {:>9} {:>9} ",
                    r.year,
                    r.start_date,
                    r.end_date,
                    num(r.start_price),
                    num(r.end_price)
                ),
                theme::text(),
            ),
            Span::styled(format!("{:>8}", num(r.profit_percentage)), theme::metric_color(pct)),
            Span::styled(format!(" {:>8}", num(r.max_rise)), theme::positive()),
            Span::styled(format!(" {:>8}", num(r.max_drop)), theme::negative()),
        ]));
    }
    f.render_widget(Paragraph::new(lines), inner);
}

fn render_cards(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted())
        .title(" Summary ")
        .title_style(theme::accent());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();

    section(&mut lines, "Profit");
    match app.data(ViewKind::ProfitSummary) {
        Some(DerivedView::ProfitSummary(s)) => {
            signed(&mut lines, "Total", s.total_profit, "%");
            signed(&mut lines, "Average", s.average_profit, "%");
        }
        _ => lines.push(placeholder(app, ViewKind::ProfitSummary)),
    }

    section(&mut lines, "Gains / losses");
    match app.data(ViewKind::GainsLosses) {
        Some(DerivedView::GainsLosses(g)) => {
            plain(&mut lines, "Gains", count(g.number_of_gains));
            plain(&mut lines, "Losses", count(g.number_of_losses));
            signed(&mut lines, "Profit", g.profit_percentage, "%");
            signed(&mut lines, "Max profit", g.max_profit, "%");
            signed(&mut lines, "Max loss", g.max_loss, "%");
        }
        _ => lines.push(placeholder(app, ViewKind::GainsLosses)),
    }

    section(&mut lines, "Risk");
    match app.data(ViewKind::MiscMetrics) {
        Some(DerivedView::MiscMetrics(m)) => {
            plain(&mut lines, "Trades", count(m.number_of_trades));
            plain(&mut lines, "Trading days", count(m.trading_days));
            plain(&mut lines, "Calendar days", count(m.calendar_days));
            plain(&mut lines, "Std dev", num(m.std_deviation));
            plain(&mut lines, "Volatility", num(m.volatility));
            signed(&mut lines, "Sharpe", m.sharpe_ratio, "");
            signed(&mut lines, "Sortino", m.sortino_ratio, "");
            plain(
                &mut lines,
                "Current streak",
                m.current_streak.map_or_else(|| "-".into(), |s| format!("{s:+}")),
            );
        }
        _ => lines.push(placeholder(app, ViewKind::MiscMetrics)),
    }

    section(&mut lines, "Trades");
    match app.data(ViewKind::TradeStats) {
        Some(DerivedView::TradeStats { stats, split }) => {
            plain(&mut lines, "Total", stats.total_trades.to_string());
            lines.push(Line::from(vec![
                Span::styled(format!("  {:>14}: ", "Wins / losses"), theme::muted()),
                Span::styled(
                    format!("{} ({:.0}%)", split.wins, split.win_share),
                    theme::positive(),
                ),
                Span::styled(" / ", theme::muted()),
                Span::styled(
                    format!("{} ({:.0}%)", split.losses, split.loss_share),
                    theme::negative(),
                ),
            ]));
            if split.wins + split.losses > 0 {
                lines.push(share_bar(split.win_share, inner.width.saturating_sub(4)));
            }
        }
        _ => lines.push(placeholder(app, ViewKind::TradeStats)),
    }

    f.render_widget(Paragraph::new(lines), inner);
}

fn num(v: Option<f64>) -> String {
    v.filter(|x| x.is_finite())
        .map_or_else(|| "-".into(), |x| format!("{x:.2}"))
}

fn count(v: Option<u32>) -> String {
    v.map_or_else(|| "-".into(), |x| x.to_string())
}

fn section(lines: &mut Vec<Line<'_>>, title: &str) {
    lines.push(Line::from(Span::styled(
        title.to_string(),
        theme::accent().add_modifier(Modifier::BOLD),
    )));
}

fn plain(lines: &mut Vec<Line<'_>>, label: &str, value: String) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {label:>14}: "), theme::muted()),
        Span::styled(value, theme::text()),
    ]));
}

fn signed(lines: &mut Vec<Line<'_>>, label: &str, value: Option<f64>, unit: &str) {
    let style = value.map_or_else(theme::muted, theme::metric_color);
    let text = value
        .filter(|v| v.is_finite())
        .map_or_else(|| "-".into(), |v| format!("{v:+.2}{unit}"));
    lines.push(Line::from(vec![
        Span::styled(format!("  {label:>14}: "), theme::muted()),
        Span::styled(text, style),
    ]));
}

/// Win share as a green/pink split bar.
fn share_bar(win_share: f64, width: u16) -> Line<'static> {
    let width = usize::from(width);
    let wins = ((win_share / 100.0) * width as f64).round() as usize;
    let wins = wins.min(width);
    Line::from(vec![
        Span::raw("  "),
        Span::styled("█".repeat(wins), theme::positive()),
        Span::styled("█".repeat(width - wins), theme::negative()),
    ])
}
