use ratatui::style::{Color, Modifier, Style};

use crate::state::model::Level;

/// Dark theme that leaves the heatmap colors as the brightest thing on screen.
pub struct Theme;

impl Theme {
    // Core palette
    pub const BG: Color = Color::Rgb(12, 12, 16);
    pub const FG: Color = Color::Rgb(210, 210, 220);
    pub const FG_DIM: Color = Color::Rgb(130, 130, 145);
    pub const FG_MUTED: Color = Color::Rgb(70, 70, 80);

    // Accents, taken from the ends of the color scale
    pub const ACCENT_YELLOW: Color = Color::Rgb(253, 231, 37);
    pub const ACCENT_TEAL: Color = Color::Rgb(33, 145, 140);
    pub const ACCENT_RED: Color = Color::Rgb(255, 90, 90);

    /// Default full-screen style.
    pub fn base() -> Style {
        Style::default().fg(Self::FG).bg(Self::BG)
    }

    pub fn border() -> Style {
        Style::default().fg(Self::FG_MUTED)
    }

    pub fn title() -> Style {
        Style::default().fg(Self::FG).add_modifier(Modifier::BOLD)
    }

    pub fn dim() -> Style {
        Style::default().fg(Self::FG_DIM)
    }

    /// Selected tab.
    pub fn highlight() -> Style {
        Style::default()
            .fg(Self::ACCENT_YELLOW)
            .add_modifier(Modifier::BOLD)
    }

    /// Stream control while streaming.
    pub fn streaming() -> Style {
        Style::default()
            .fg(Self::ACCENT_TEAL)
            .add_modifier(Modifier::BOLD)
    }

    pub fn label() -> Style {
        Style::default().fg(Self::FG_DIM)
    }

    /// Label of the heatmap being dragged.
    pub fn label_active() -> Style {
        Style::default()
            .fg(Self::ACCENT_YELLOW)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    }

    pub fn level(level: Level) -> Style {
        match level {
            Level::Info => Self::dim(),
            Level::Warn => Style::default()
                .fg(Self::ACCENT_YELLOW)
                .add_modifier(Modifier::BOLD),
            Level::Error => Style::default()
                .fg(Self::ACCENT_RED)
                .add_modifier(Modifier::BOLD),
        }
    }
}
