//! Top-level UI layout: one panel at a time plus a status bar.

pub mod dashboard_panel;
pub mod help_panel;
pub mod overlays;
pub mod plot;
pub mod screener_panel;
pub mod stats_panel;
pub mod status_bar;

use ratatui::layout::{Constraint, Direction, Layout, Margin, Rect};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

use crate::app::{AppState, Overlay, Panel};
use crate::theme;

/// Regions of the dashboard panel. Drawing and mouse hit-testing both derive
/// from `dashboard_layout` so they always agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardLayout {
    pub header: Rect,
    pub seasonality: Rect,
    /// Inside the seasonality border; one column per plotted x position.
    pub seasonality_plot: Rect,
    pub cumulative: Rect,
    pub bars: Rect,
}

/// Split the frame into panel area and the 1-line status bar.
pub fn frame_layout(frame: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame);
    (chunks[0], chunks[1])
}

/// Area inside the active panel's border.
pub fn panel_inner(frame: Rect) -> Rect {
    frame_layout(frame).0.inner(Margin::new(1, 1))
}

pub fn dashboard_layout(frame: Rect) -> DashboardLayout {
    let inner = panel_inner(frame);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Percentage(55),
            Constraint::Min(3),
        ])
        .split(inner);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[2]);

    DashboardLayout {
        header: rows[0],
        seasonality: rows[1],
        seasonality_plot: rows[1].inner(Margin::new(1, 1)),
        cumulative: bottom[0],
        bars: bottom[1],
    }
}

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    let (main_area, status_area) = frame_layout(f.area());

    draw_panel(f, main_area, app);
    status_bar::render(f, status_area, app);

    match &app.overlay {
        Overlay::AssetPrompt => overlays::render_asset_prompt(f, main_area, &app.asset_input),
        Overlay::ErrorHistory => overlays::render_error_history(f, main_area, app),
        Overlay::None => {}
    }
}

/// Draw the active panel with its border.
fn draw_panel(f: &mut Frame, area: Rect, app: &AppState) {
    let panel = app.active_panel;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(true))
        .title(format!(" {} [{}] ", panel.label(), panel.index() + 1))
        .title_style(theme::panel_title(true));

    let inner = block.inner(area);
    f.render_widget(block, area);

    match panel {
        Panel::Dashboard => dashboard_panel::render(f, dashboard_layout(f.area()), app),
        Panel::Statistics => stats_panel::render(f, inner, app),
        Panel::Screener => screener_panel::render(f, inner, app),
        Panel::Help => help_panel::render(f, inner, app),
    }
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
