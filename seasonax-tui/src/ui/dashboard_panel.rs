//! Panel 1: seasonality curve with drag selection, cumulative profit, and
//! per-year pattern bars.

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph};
use ratatui::Frame;

use seasonax_core::data::asset_label;
use seasonax_core::derive::{seasonality_highlight, LabeledPoint};
use seasonax_core::domain::DateRange;
use seasonax_core::refresh::{DerivedView, ViewKind, ViewPhase};
use seasonax_core::selection::resolve_range;

use crate::app::AppState;
use crate::theme;
use crate::ui::plot::{padded_bounds, signed_bar, stacked_cells, StackedCells};
use crate::ui::DashboardLayout;

pub fn render(f: &mut Frame, layout: DashboardLayout, app: &AppState) {
    render_header(f, layout.header, app);
    render_seasonality(f, &layout, app);
    render_cumulative(f, layout.cumulative, app);
    render_bars(f, layout.bars, app);
}

/// Range shown as the selection band: the live drag if there is one,
/// otherwise the committed range.
pub fn band_range(app: &AppState) -> DateRange {
    app.selector
        .preview()
        .and_then(|(a, b)| resolve_range(&a, &b).ok())
        .unwrap_or_else(|| app.analysis.date_range())
}

/// What to show in place of a view that has nothing to draw.
pub fn placeholder(app: &AppState, view: ViewKind) -> Line<'static> {
    let phase = app
        .coordinator
        .view(view)
        .map(|s| s.phase())
        .unwrap_or(ViewPhase::Idle);
    match phase {
        ViewPhase::Loading { attempt: 0 } => Line::from(Span::styled("Loading...", theme::muted())),
        ViewPhase::Loading { attempt } | ViewPhase::Retrying { attempt, .. } => {
            let max = app.coordinator.policy().max_retries;
            Line::from(Span::styled(
                format!("Retrying ({attempt}/{max})..."),
                theme::warning(),
            ))
        }
        ViewPhase::Failed | ViewPhase::Success => {
            Line::from(Span::styled("No data", theme::muted()))
        }
        ViewPhase::Idle => Line::from(""),
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &AppState) {
    let a = &app.analysis;
    let mut spans = vec![
        Span::styled(format!("{} ", a.asset()), theme::accent_bold()),
        Span::styled(format!("{}  ", asset_label(a.asset())), theme::muted()),
        Span::styled("Range ", theme::muted()),
        Span::styled(format!("{}  ", a.date_range()), theme::text()),
        Span::styled("Lookback ", theme::muted()),
        Span::styled(format!("{}  ", a.lookback()), theme::text()),
    ];
    if let Some((start, end)) = app.selector.preview() {
        spans.push(Span::styled(format!("selecting {start}..{end}"), theme::neutral()));
    } else if app.coordinator.is_busy() {
        spans.push(Span::styled("loading", theme::warning()));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_seasonality(f: &mut Frame, layout: &DashboardLayout, app: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted())
        .title(format!(
            " Seasonality {} ({}y) · drag to select ",
            app.analysis.asset(),
            app.analysis.lookback()
        ))
        .title_style(theme::accent());
    f.render_widget(block, layout.seasonality);

    let points = match app.data(ViewKind::Seasonality) {
        Some(DerivedView::Seasonality { points }) if !points.is_empty() => points,
        _ => {
            let msg = Paragraph::new(placeholder(app, ViewKind::Seasonality));
            f.render_widget(msg, layout.seasonality_plot);
            return;
        }
    };
    render_seasonality_chart(f, layout.seasonality_plot, points, band_range(app));
}

fn render_seasonality_chart(f: &mut Frame, area: Rect, points: &[LabeledPoint], band: DateRange) {
    let bounds = padded_bounds(points.iter().map(|p| p.value));
    let line: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.value))
        .collect();
    let shaded: Vec<(f64, f64)> = seasonality_highlight(points, band)
        .into_iter()
        .map(|i| (i as f64, bounds[1]))
        .collect();

    let band = Dataset::default()
        .marker(symbols::Marker::Block)
        .style(Style::default().fg(theme::NEUTRAL))
        .graph_type(GraphType::Bar)
        .data(&shaded);
    let curve = Dataset::default()
        .marker(symbols::Marker::Braille)
        .style(Style::default().fg(theme::ACCENT))
        .graph_type(GraphType::Line)
        .data(&line);

    // No axis labels: the plot then fills `area`, which mouse mapping relies on.
    let chart = Chart::new(vec![band, curve])
        .x_axis(Axis::default().bounds([0.0, points.len().saturating_sub(1).max(1) as f64]))
        .y_axis(Axis::default().bounds(bounds));
    f.render_widget(chart, area);
}

fn render_cumulative(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted())
        .title(" Cumulative profit % ")
        .title_style(theme::accent());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let points = match app.data(ViewKind::CumulativeProfit) {
        Some(DerivedView::CumulativeProfit { points }) if !points.is_empty() => points,
        _ => {
            f.render_widget(Paragraph::new(placeholder(app, ViewKind::CumulativeProfit)), inner);
            return;
        }
    };

    let data: Vec<(f64, f64)> = points
        .iter()
        .map(|p| (f64::from(p.year), p.cumulative))
        .collect();
    let [y_min, y_max] = padded_bounds(points.iter().map(|p| p.cumulative));
    let first = points[0].year;
    let last = points[points.len() - 1].year;
    let color = theme::pnl_color(points[points.len() - 1].cumulative);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .style(Style::default().fg(color))
        .graph_type(GraphType::Line)
        .data(&data);
    let chart = Chart::new(vec![dataset])
        .x_axis(
            Axis::default()
                .style(theme::muted())
                .bounds([f64::from(first), f64::from(last.max(first + 1))])
                .labels(vec![
                    Span::styled(first.to_string(), theme::muted()),
                    Span::styled(last.to_string(), theme::muted()),
                ]),
        )
        .y_axis(
            Axis::default()
                .style(theme::muted())
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::styled(format!("{y_min:.0}"), theme::muted()),
                    Span::styled(format!("{y_max:.0}"), theme::muted()),
                ]),
        );
    f.render_widget(chart, inner);
}

const BODY: &str = "█";
const EXTENSION: &str = "░";

/// Axis-centred spans: drop extension, loss body, axis, gain body, rise
/// extension.
fn stacked_spans(cells: StackedCells, half: usize) -> Vec<Span<'static>> {
    let left_pad = half - (cells.drop + cells.loss);
    let right_pad = half - (cells.gain + cells.rise);
    vec![
        Span::raw(" ".repeat(left_pad)),
        Span::styled(EXTENSION.repeat(cells.drop), theme::negative()),
        Span::styled(BODY.repeat(cells.loss), theme::negative()),
        Span::styled("│", theme::muted()),
        Span::styled(BODY.repeat(cells.gain), theme::positive()),
        Span::styled(EXTENSION.repeat(cells.rise), theme::positive()),
        Span::raw(" ".repeat(right_pad)),
    ]
}

fn render_bars(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted())
        .title(" Pattern return by year (rise / drop) ")
        .title_style(theme::accent());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let half = (inner.width.saturating_sub(30) / 2).max(4) as usize;
    let visible = inner.height as usize;
    let mut lines: Vec<Line> = Vec::new();

    match app.data(ViewKind::PatternStatistics) {
        Some(DerivedView::PatternStatistics { bars, .. }) if !bars.is_empty() => {
            let max_abs = bars
                .iter()
                .map(|b| b.bar.top().abs().max(b.bar.bottom().abs()))
                .fold(0.0, f64::max);
            // newest years at the top
            for b in bars.iter().rev().take(visible) {
                let cells = stacked_cells(&b.bar, max_abs, half);
                let mut spans = vec![Span::styled(format!("{} ", b.year), theme::muted())];
                spans.extend(stacked_spans(cells, half));
                spans.extend([
                    Span::styled(format!(" {:+7.2}", b.bar.body), theme::metric_color(b.bar.body)),
                    Span::styled(format!(" ▲{:.2}", b.bar.rise_extension), theme::positive()),
                    Span::styled(format!(" ▼{:.2}", b.bar.drop_extension.abs()), theme::negative()),
                ]);
                lines.push(Line::from(spans));
            }
        }
        _ => match app.data(ViewKind::PatternReturns) {
            Some(DerivedView::PatternReturns { bars }) if !bars.is_empty() => {
                let max_abs = bars.iter().map(|b| b.value.abs()).fold(0.0, f64::max);
                for b in bars.iter().rev().take(visible) {
                    let (left, right) = signed_bar(b.value, max_abs, half);
                    lines.push(Line::from(vec![
                        Span::styled(format!("{} ", b.year), theme::muted()),
                        Span::styled(left, theme::metric_color(b.value)),
                        Span::styled("│", theme::muted()),
                        Span::styled(right, theme::metric_color(b.value)),
                        Span::styled(format!(" {:+7.2}", b.value), theme::metric_color(b.value)),
                    ]));
                }
            }
            _ => lines.push(placeholder(app, ViewKind::PatternReturns)),
        },
    }

    f.render_widget(Paragraph::new(lines), inner);
}
