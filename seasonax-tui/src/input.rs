//! Input dispatch: overlays first, then global keys, then the active panel.
//! Mouse drags over the seasonality chart drive the date-range selector.

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use seasonax_core::refresh::{DerivedView, ViewKind};
use seasonax_core::selection::SelectionOutcome;

use crate::app::{AppState, ErrorCategory, Overlay, Panel};
use crate::ui;
use crate::ui::plot::{contains, label_at_column};

pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    match &app.overlay {
        Overlay::AssetPrompt => {
            handle_asset_prompt(app, key);
            return;
        }
        Overlay::ErrorHistory => {
            handle_error_overlay(app, key);
            return;
        }
        Overlay::None => {}
    }

    match key.code {
        KeyCode::Char('q') => {
            app.running = false;
            return;
        }
        KeyCode::Char(c @ '1'..='4') => {
            if let Some(panel) = Panel::from_index(c as usize - '1' as usize) {
                app.active_panel = panel;
            }
            return;
        }
        KeyCode::Tab => {
            app.active_panel = if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.active_panel.prev()
            } else {
                app.active_panel.next()
            };
            return;
        }
        KeyCode::BackTab => {
            app.active_panel = app.active_panel.prev();
            return;
        }
        KeyCode::Char('a') => {
            app.asset_input.clear();
            app.overlay = Overlay::AssetPrompt;
            return;
        }
        KeyCode::Char('!') => {
            app.error_scroll = 0;
            app.overlay = Overlay::ErrorHistory;
            return;
        }
        KeyCode::Char('[') => {
            let lookback = app.analysis.lookback().shorter();
            app.analysis.set_lookback(lookback);
            app.set_status(format!("Lookback {lookback}"));
            return;
        }
        KeyCode::Char(']') => {
            let lookback = app.analysis.lookback().longer();
            app.analysis.set_lookback(lookback);
            app.set_status(format!("Lookback {lookback}"));
            return;
        }
        KeyCode::Char('r') => {
            app.analysis.refresh();
            app.set_status("Refreshing");
            return;
        }
        KeyCode::Char('e') => {
            app.request_export();
            return;
        }
        _ => {}
    }

    match app.active_panel {
        Panel::Statistics => handle_stats_key(app, key),
        Panel::Screener => handle_screener_key(app, key),
        Panel::Dashboard | Panel::Help => {}
    }
}

fn handle_asset_prompt(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.overlay = Overlay::None;
            app.asset_input.clear();
        }
        KeyCode::Enter => {
            let before = app.analysis.asset().to_string();
            app.analysis.set_asset(&app.asset_input);
            if app.analysis.asset() != before {
                app.set_status(format!("Loading {}", app.analysis.asset()));
            }
            app.asset_input.clear();
            app.overlay = Overlay::None;
        }
        KeyCode::Backspace => {
            app.asset_input.pop();
        }
        KeyCode::Char(c) if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '=' | '^') => {
            app.asset_input.push(c.to_ascii_uppercase());
        }
        _ => {}
    }
}

fn handle_error_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('!') => {
            app.overlay = Overlay::None;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.error_scroll + 1 < app.error_history.len() {
                app.error_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.error_scroll = app.error_scroll.saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_stats_key(app: &mut AppState, key: KeyEvent) {
    let year = app.analysis.year();
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => app.analysis.set_year(year - 1),
        KeyCode::Char('l') | KeyCode::Right => app.analysis.set_year(year + 1),
        _ => {}
    }
}

fn handle_screener_key(app: &mut AppState, key: KeyEvent) {
    let visible = ui::screener_panel::visible_rows(ui::panel_inner(app.frame_area));
    let s = &mut app.screener;
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => s.move_cursor(1, visible),
        KeyCode::Char('k') | KeyCode::Up => s.move_cursor(-1, visible),
        KeyCode::PageDown => s.move_cursor(visible as isize, visible),
        KeyCode::PageUp => s.move_cursor(-(visible as isize), visible),
        KeyCode::Char('s') => {
            let next = s.sort.column.next();
            s.sort.toggle(next);
            s.resort();
        }
        KeyCode::Char('o') => {
            s.sort.order = s.sort.order.flip();
            s.resort();
        }
        KeyCode::Char('m') => s.query.market_group = s.query.market_group.next(),
        KeyCode::Char('d') => s.query.start_offset = s.query.start_offset.next(),
        KeyCode::Char('l') => s.query.next_pattern_length(),
        KeyCode::Char('y') => s.query.lookback = s.query.lookback.longer(),
        KeyCode::Char('Y') => s.query.lookback = s.query.lookback.shorter(),
        KeyCode::Char('w') => s.query.step_min_win(5),
        KeyCode::Char('W') => s.query.step_min_win(-5),
        KeyCode::Char('f') => app.request_screener(),
        KeyCode::Enter => app.open_selected_pattern(),
        _ => {}
    }
}

/// Seasonality label under the pointer, if it is over the plotted curve.
fn label_under(app: &AppState, column: u16, row: u16) -> Option<String> {
    let plot = ui::dashboard_layout(app.frame_area).seasonality_plot;
    if !contains(plot, column, row) {
        return None;
    }
    match app.data(ViewKind::Seasonality) {
        Some(DerivedView::Seasonality { points }) => {
            label_at_column(points, plot, column).map(str::to_string)
        }
        _ => None,
    }
}

pub fn handle_mouse(app: &mut AppState, mouse: MouseEvent) {
    if app.active_panel != Panel::Dashboard || app.overlay != Overlay::None {
        return;
    }
    let label = label_under(app, mouse.column, mouse.row);

    let outcome = match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => match label {
            Some(label) => app.selector.pointer_down(&label),
            None => return,
        },
        MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
            if !app.selector.is_active() {
                return;
            }
            match label {
                Some(label) => app.selector.pointer_move(&label),
                None => app.selector.pointer_leave(&mut app.analysis),
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            if !app.selector.is_active() {
                return;
            }
            if let Some(label) = label {
                app.selector.pointer_move(&label);
            }
            app.selector.pointer_up(&mut app.analysis)
        }
        _ => return,
    };
    report(app, outcome);
}

fn report(app: &mut AppState, outcome: SelectionOutcome) {
    match outcome {
        SelectionOutcome::Committed(range) => app.set_status(format!("Range {range}")),
        SelectionOutcome::Aborted { label } => app.push_error(
            ErrorCategory::Selection,
            format!("Selection ignored: '{label}' is not a calendar day"),
            app.analysis.date_range().to_string(),
        ),
        SelectionOutcome::Ignored
        | SelectionOutcome::Tracking
        | SelectionOutcome::Cancelled => {}
    }
}
