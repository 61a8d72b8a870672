//! Palette and the handful of text styles renderers share

use ratatui::style::{Color, Modifier, Style};

pub const ACCENT_PRIMARY: Color = Color::Rgb(235, 87, 87);
pub const ACCENT_SECONDARY: Color = Color::Rgb(111, 207, 151);
pub const ACCENT_HIGHLIGHT: Color = Color::Rgb(86, 204, 242);
pub const ACCENT_WARNING: Color = Color::Rgb(242, 201, 76);
pub const ACCENT_DIRECTORY: Color = Color::Rgb(90, 140, 245);
pub const TEXT_PRIMARY: Color = Color::Rgb(224, 224, 224);
pub const TEXT_SECONDARY: Color = Color::Rgb(130, 130, 130);
pub const BG_DARK: Color = Color::Rgb(30, 30, 30);
pub const BG_STRIPE: Color = Color::Rgb(38, 38, 44);
pub const BORDER_COLOR: Color = Color::Rgb(80, 80, 90);

pub fn dim() -> Style {
    Style::default().fg(TEXT_SECONDARY)
}

pub fn error() -> Style {
    Style::default().fg(ACCENT_PRIMARY)
}

pub fn warning() -> Style {
    Style::default().fg(ACCENT_WARNING)
}

pub fn heading() -> Style {
    Style::default()
        .fg(ACCENT_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn directory() -> Style {
    Style::default()
        .fg(ACCENT_DIRECTORY)
        .add_modifier(Modifier::BOLD)
}

pub fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}
