// Allow dead code: Style functions defined for consistent UI
#![allow(dead_code)]

use ratatui::style::{Color, Modifier, Style};

use crate::scoring::Severity;

// Color palette
pub const PRIMARY: Color = Color::Rgb(64, 128, 192);
pub const MILD: Color = Color::Rgb(96, 160, 96);
pub const MODERATE: Color = Color::Rgb(192, 160, 64);
pub const SEVERE: Color = Color::Rgb(192, 64, 64);
pub const MUTED: Color = Color::Rgb(128, 128, 128);
pub const HIGHLIGHT: Color = Color::Rgb(48, 48, 64);

// Styles
pub fn title_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default()
        .bg(HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn muted_style() -> Style {
    Style::default().fg(MUTED)
}

pub fn success_style() -> Style {
    Style::default().fg(MILD)
}

pub fn error_style() -> Style {
    Style::default().fg(SEVERE)
}

pub fn tab_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(PRIMARY)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        Style::default().fg(Color::White)
    }
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(PRIMARY)
    } else {
        Style::default().fg(MUTED)
    }
}

pub fn search_style() -> Style {
    Style::default().fg(MODERATE)
}

pub fn status_bar_style() -> Style {
    Style::default().bg(Color::Rgb(32, 32, 40)).fg(Color::White)
}

pub fn help_key_style() -> Style {
    Style::default()
        .fg(MODERATE)
        .add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    Style::default().fg(Color::White)
}

/// Color for a severity band (incomplete renders muted).
pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Incomplete => MUTED,
        Severity::Mild => MILD,
        Severity::Moderate => MODERATE,
        Severity::Severe => SEVERE,
    }
}

pub fn severity_style(severity: Severity) -> Style {
    Style::default()
        .fg(severity_color(severity))
        .add_modifier(Modifier::BOLD)
}
