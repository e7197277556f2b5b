//! Light and dark colour palettes.
//!
//! The palette is never stored: `theme_for` derives it from the current
//! [`ThemeMode`] on every draw.

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    /// Guess the terminal's colour scheme from `COLORFGBG`, light if unknown.
    pub fn detect() -> Self {
        std::env::var("COLORFGBG")
            .ok()
            .and_then(|v| Self::from_colorfgbg(&v))
            .unwrap_or_default()
    }

    /// Parse a `fg;bg` (or `fg;default;bg`) value; the last field is the
    /// background palette index.
    pub fn from_colorfgbg(value: &str) -> Option<Self> {
        let bg: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
        match bg {
            0..=6 | 8 => Some(ThemeMode::Dark),
            7 | 9..=15 => Some(ThemeMode::Light),
            _ => None,
        }
    }

    /// Label for the control that switches *away* from this mode.
    pub fn toggle_label(self) -> &'static str {
        match self {
            ThemeMode::Light => "Dark Mode",
            ThemeMode::Dark => "Light Mode",
        }
    }

    pub fn toggle_icon(self) -> &'static str {
        match self {
            ThemeMode::Light => "☾",
            ThemeMode::Dark => "☀",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub background: Color,
    pub panel: Color,
    pub app_bar: Color,
    pub app_bar_text: Color,
    pub accent: Color,
    pub text: Color,
    pub text_secondary: Color,
    pub text_muted: Color,
    pub border: Color,
    pub border_focus: Color,
    pub error: Color,
}

// Copper Sapphire night palette
const DARK: Theme = Theme {
    background: Color::Rgb(12, 12, 16),
    panel: Color::Rgb(18, 18, 24),
    app_bar: Color::Rgb(84, 112, 156),      // #54709C
    app_bar_text: Color::Rgb(240, 240, 245),
    accent: Color::Rgb(101, 150, 243),      // #6596F3
    text: Color::Rgb(240, 240, 245),
    text_secondary: Color::Rgb(180, 180, 190),
    text_muted: Color::Rgb(105, 116, 133),  // #697485
    border: Color::Rgb(45, 50, 60),
    border_focus: Color::Rgb(178, 220, 226), // #B2DCE2
    error: Color::Rgb(204, 92, 68),         // #CC5C44
};

// Paper-and-ink day palette
const LIGHT: Theme = Theme {
    background: Color::Rgb(250, 250, 247),
    panel: Color::Rgb(255, 255, 255),
    app_bar: Color::Rgb(101, 150, 243),
    app_bar_text: Color::Rgb(255, 255, 255),
    accent: Color::Rgb(52, 92, 170),
    text: Color::Rgb(28, 30, 36),
    text_secondary: Color::Rgb(70, 74, 84),
    text_muted: Color::Rgb(130, 136, 148),
    border: Color::Rgb(210, 214, 222),
    border_focus: Color::Rgb(138, 72, 38),  // #8A4826
    error: Color::Rgb(176, 58, 40),
};

pub fn theme_for(mode: ThemeMode) -> Theme {
    match mode {
        ThemeMode::Light => LIGHT,
        ThemeMode::Dark => DARK,
    }
}
