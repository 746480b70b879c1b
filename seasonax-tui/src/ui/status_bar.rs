//! Bottom status bar: panel hints, retry indicator, last status message.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{AppState, StatusLevel};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut spans: Vec<Span> = Vec::new();

    spans.push(Span::styled(
        " 1:Dashboard 2:Stats 3:Screener 4:Help",
        theme::muted(),
    ));
    spans.push(Span::raw(" | "));

    let pending = app
        .coordinator
        .views()
        .filter_map(|v| app.coordinator.view(v))
        .filter(|slot| slot.phase().is_pending())
        .count();
    if pending > 0 {
        spans.push(Span::styled(format!("{pending} loading "), theme::warning()));
        spans.push(Span::raw("| "));
    }

    if let Some((msg, level)) = &app.status_message {
        let style = match level {
            StatusLevel::Info => theme::accent(),
            StatusLevel::Warning => theme::warning(),
            StatusLevel::Error => theme::negative(),
        };
        spans.push(Span::styled(msg.as_str(), style));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
