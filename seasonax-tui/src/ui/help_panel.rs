//! Panel 4: keyboard and mouse reference.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, _app: &AppState) {
    let mut lines: Vec<Line> = Vec::new();

    section(&mut lines, "Global");
    key(&mut lines, "1-4", "Switch to panel by number");
    key(&mut lines, "Tab / Shift+Tab", "Cycle panels forward / back");
    key(&mut lines, "a", "Change asset");
    key(&mut lines, "[ / ]", "Shorter / longer lookback");
    key(&mut lines, "r", "Refresh every view");
    key(&mut lines, "e", "Export the yearly table as CSV");
    key(&mut lines, "!", "Error history");
    key(&mut lines, "q", "Quit");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 1: Dashboard");
    key(&mut lines, "drag", "Select a date range on the seasonality chart");
    key(&mut lines, "", "Release, or leave the chart, to apply it");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 2: Statistics");
    key(&mut lines, "h / l", "Previous / next price year");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 3: Screener");
    key(&mut lines, "f", "Run the screener");
    key(&mut lines, "j / k", "Move cursor down / up");
    key(&mut lines, "s / o", "Cycle sort column / flip order");
    key(&mut lines, "m / d / l", "Market group / start / pattern length");
    key(&mut lines, "y / Y", "Longer / shorter lookback");
    key(&mut lines, "w / W", "Raise / lower minimum win ratio");
    key(&mut lines, "Enter", "Open the pattern in the dashboard");

    f.render_widget(Paragraph::new(lines), area);
}

fn section(lines: &mut Vec<Line<'_>>, title: &str) {
    lines.push(Line::from(Span::styled(title.to_string(), theme::accent_bold())));
}

fn key(lines: &mut Vec<Line<'_>>, keys: &str, desc: &str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {:>16}  ", keys), theme::accent()),
        Span::styled(desc.to_string(), theme::muted()),
    ]));
}
