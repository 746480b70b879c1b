//! Neon-on-charcoal palette and the style helpers the panels draw with.
//!
//! # Color Palette
//! - **Accent**: electric cyan (focus, the seasonality line)
//! - **Positive**: neon green (gains, rise extensions)
//! - **Negative**: hot pink (losses, drop extensions)
//! - **Warning**: neon orange (retries, stale data)
//! - **Neutral**: cool purple (selection band)
//! - **Muted**: steel blue (secondary text)

use ratatui::style::{Color, Modifier, Style};

pub const BACKGROUND: Color = Color::Rgb(18, 18, 20);
pub const ACCENT: Color = Color::Rgb(0, 255, 255);
pub const POSITIVE: Color = Color::Rgb(0, 255, 128);
pub const NEGATIVE: Color = Color::Rgb(255, 20, 147);
pub const WARNING: Color = Color::Rgb(255, 140, 0);
pub const NEUTRAL: Color = Color::Rgb(147, 112, 219);
pub const MUTED: Color = Color::Rgb(100, 149, 237);
pub const TEXT: Color = Color::White;

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn positive() -> Style {
    Style::default().fg(POSITIVE)
}

pub fn negative() -> Style {
    Style::default().fg(NEGATIVE)
}

pub fn warning() -> Style {
    Style::default().fg(WARNING)
}

pub fn neutral() -> Style {
    Style::default().fg(NEUTRAL)
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn text() -> Style {
    Style::default().fg(TEXT)
}

pub fn panel_border(active: bool) -> Style {
    if active {
        accent()
    } else {
        muted()
    }
}

pub fn panel_title(active: bool) -> Style {
    if active {
        accent_bold()
    } else {
        muted()
    }
}

/// Green for gains, pink for losses. Zero counts as a gain.
pub fn pnl_color(value: f64) -> Color {
    if value >= 0.0 {
        POSITIVE
    } else {
        NEGATIVE
    }
}

pub fn metric_color(value: f64) -> Style {
    Style::default().fg(pnl_color(value))
}

/// Win ratio in percent.
pub fn win_ratio_style(pct: f64) -> Style {
    let color = match pct {
        w if w >= 70.0 => POSITIVE,
        w if w >= 50.0 => ACCENT,
        w if w >= 40.0 => NEUTRAL,
        _ => WARNING,
    };
    Style::default().fg(color)
}

pub fn sharpe_style(sharpe: f64) -> Style {
    let color = match sharpe {
        s if s >= 2.0 => POSITIVE,
        s if s >= 1.0 => ACCENT,
        s if s >= 0.5 => NEUTRAL,
        s if s >= 0.0 => MUTED,
        _ => NEGATIVE,
    };
    Style::default().fg(color)
}
