//! Colors and shared styles.

use ratatui::style::{Color, Modifier, Style};

pub mod colors {
    use ratatui::style::Color;

    pub const BG_DARK: Color = Color::Rgb(24, 24, 37);
    pub const BG_PANEL: Color = Color::Rgb(30, 30, 46);
    pub const PRIMARY: Color = Color::Rgb(137, 180, 250);
    pub const TEXT_PRIMARY: Color = Color::Rgb(205, 214, 244);
    pub const TEXT_SECONDARY: Color = Color::Rgb(166, 173, 200);
    pub const TEXT_MUTED: Color = Color::Rgb(108, 112, 134);
    pub const GREEN: Color = Color::Rgb(166, 227, 161);
    pub const YELLOW: Color = Color::Rgb(249, 226, 175);
    pub const RED: Color = Color::Rgb(243, 139, 168);
    pub const PEACH: Color = Color::Rgb(250, 179, 135);
}

pub mod styles {
    use super::{Color, Modifier, Style, colors};

    #[must_use]
    pub fn column_title(color: Color) -> Style {
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn selected_task() -> Style {
        Style::default()
            .fg(colors::BG_DARK)
            .bg(colors::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_highlight() -> Style {
        Style::default()
            .fg(colors::PEACH)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_hint() -> Style {
        Style::default().fg(colors::TEXT_MUTED)
    }
}

/// Column accent colors in board order.
#[must_use]
pub const fn status_color(column: usize) -> Color {
    match column {
        0 => colors::YELLOW,
        1 => colors::PRIMARY,
        _ => colors::GREEN,
    }
}
