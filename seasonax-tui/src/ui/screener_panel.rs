//! Panel 3: screener filters and the sortable pattern table.

use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use seasonax_core::data::{ScreenerPattern, SortColumn};

use crate::app::AppState;
use crate::theme;

/// Lines above the first table row.
pub const HEADER_LINES: u16 = 4;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let s = &app.screener;
    let q = &s.query;
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(vec![
        Span::styled("[m]arket ", theme::muted()),
        Span::styled(format!("{}  ", q.market_group.as_param()), theme::accent()),
        Span::styled("[d]start ", theme::muted()),
        Span::styled(format!("{}  ", q.start_offset.label()), theme::accent()),
        Span::styled("[l]ength ", theme::muted()),
        Span::styled(format!("{}d  ", q.pattern_length_days), theme::accent()),
        Span::styled("[y/Y]years ", theme::muted()),
        Span::styled(format!("{}  ", q.lookback), theme::accent()),
        Span::styled("[w/W]min win ", theme::muted()),
        Span::styled(format!("{}%", q.min_win_ratio), theme::accent()),
    ]));
    let status = if s.pending.is_some() {
        Span::styled("searching...", theme::warning())
    } else {
        Span::styled(format!("{} patterns", s.rows.len()), theme::accent())
    };
    lines.push(Line::from(vec![
        status,
        Span::styled(
            format!(
                "  sort: {} {}  [f]etch [j/k]move [s]ort [o]rder [Enter]open",
                s.sort.column.label(),
                s.sort.order.arrow()
            ),
            theme::muted(),
        ),
    ]));
    lines.push(Line::from(""));

    if s.rows.is_empty() {
        let hint = if s.pending.is_some() {
            "Waiting for the backend..."
        } else {
            "No patterns. Adjust filters and press f."
        };
        lines.push(Line::from(Span::styled(hint, theme::muted())));
        f.render_widget(Paragraph::new(lines), area);
        return;
    }

    lines.push(header_line(app));

    let visible = visible_rows(area);
    let start = s.scroll_offset;
    let end = (start + visible).min(s.rows.len());
    for (i, row) in s.rows[start..end].iter().enumerate() {
        lines.push(row_line(row, start + i == s.cursor));
    }

    f.render_widget(Paragraph::new(lines), area);
}

pub fn visible_rows(area: Rect) -> usize {
    area.height.saturating_sub(HEADER_LINES) as usize
}

fn header_line(app: &AppState) -> Line<'static> {
    let sort = app.screener.sort;
    let title = |c: SortColumn| {
        if c == sort.column {
            format!("{}{}", c.label(), sort.order.arrow())
        } else {
            c.label().to_string()
        }
    };
    Line::from(Span::styled(
        format!(
            "{:>4} {:<7} {:>12} {:>11} {:>9} {:>6} {:>11} {:>11} {:>9} {:>8}  {}",
            title(SortColumn::Rank),
            title(SortColumn::Symbol),
            title(SortColumn::AnnualizedReturn),
            title(SortColumn::AverageReturn),
            title(SortColumn::MedianReturn),
            title(SortColumn::WinRatio),
            title(SortColumn::MaxProfit),
            title(SortColumn::MaxLoss),
            title(SortColumn::SharpeRatio),
            title(SortColumn::CalendarDays),
            "Window",
        ),
        theme::accent_bold(),
    ))
}

fn pct(v: Option<f64>) -> String {
    v.map_or_else(|| "-".into(), |x| format!("{x:.2}"))
}

fn row_line(p: &ScreenerPattern, is_cursor: bool) -> Line<'static> {
    let base = if is_cursor {
        theme::accent().add_modifier(Modifier::REVERSED)
    } else {
        theme::text()
    };
    let pick = |style| if is_cursor { base } else { style };
    let ann = p.annualized_return.unwrap_or(0.0);
    Line::from(vec![
        Span::styled(format!("{:>4} {:<7} ", p.rank, p.symbol), base),
        Span::styled(
            format!("{:>12} ", pct(p.annualized_return)),
            pick(theme::metric_color(ann)),
        ),
        Span::styled(
            format!(
                "{:>11} {:>9} ",
                pct(p.average_return),
                pct(p.median_return)
            ),
            base,
        ),
        Span::styled(
            format!("{:>6} ", pct(p.win_ratio)),
            pick(theme::win_ratio_style(p.win_ratio.unwrap_or(0.0))),
        ),
        Span::styled(
            format!("{:>11} {:>11} ", pct(p.max_profit), pct(p.max_loss)),
            base,
        ),
        Span::styled(
            format!("{:>9} ", pct(p.sharpe_ratio)),
            pick(theme::sharpe_style(p.sharpe_ratio.unwrap_or(0.0))),
        ),
        Span::styled(
            format!(
                "{:>8}  {}..{}",
                p.calendar_days.map_or_else(|| "-".into(), |d| d.to_string()),
                p.pattern_start,
                p.pattern_end
            ),
            base,
        ),
    ])
}
