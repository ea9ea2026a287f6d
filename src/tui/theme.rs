//! Theme system for the TUI

use crate::storage::ThemePreference;
use ratatui::style::Color;

/// Theme colors for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    // Background colors
    pub bg_main: Color,
    pub bg_sidebar: Color,
    pub bg_code: Color,

    // Border colors
    pub border: Color,
    pub border_focused: Color,

    // Text colors
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_muted: Color,

    // Accent colors
    pub accent: Color,
    pub green: Color,
    pub yellow: Color,
    pub red: Color,

    // Message colors
    pub user_fg: Color,
    pub assistant_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn from_preference(pref: ThemePreference) -> Self {
        match pref {
            ThemePreference::Dark => Self::dark(),
            ThemePreference::Light => Self::light(),
        }
    }

    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            bg_main: Color::Rgb(24, 24, 37),
            bg_sidebar: Color::Rgb(30, 30, 46),
            bg_code: Color::Rgb(49, 50, 68),

            border: Color::Rgb(69, 71, 90),
            border_focused: Color::Rgb(137, 180, 250),

            text_primary: Color::Rgb(205, 214, 244),
            text_secondary: Color::Rgb(166, 173, 200),
            text_muted: Color::Rgb(108, 112, 134),

            accent: Color::Rgb(203, 166, 247),
            green: Color::Rgb(166, 227, 161),
            yellow: Color::Rgb(249, 226, 175),
            red: Color::Rgb(243, 139, 168),

            user_fg: Color::Rgb(137, 180, 250),
            assistant_fg: Color::Rgb(205, 214, 244),
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            bg_main: Color::Rgb(239, 241, 245),
            bg_sidebar: Color::Rgb(230, 233, 239),
            bg_code: Color::Rgb(220, 224, 232),

            border: Color::Rgb(172, 176, 190),
            border_focused: Color::Rgb(30, 102, 245),

            text_primary: Color::Rgb(76, 79, 105),
            text_secondary: Color::Rgb(92, 95, 119),
            text_muted: Color::Rgb(140, 143, 161),

            accent: Color::Rgb(136, 57, 239),
            green: Color::Rgb(64, 160, 43),
            yellow: Color::Rgb(223, 142, 29),
            red: Color::Rgb(210, 15, 57),

            user_fg: Color::Rgb(30, 102, 245),
            assistant_fg: Color::Rgb(76, 79, 105),
        }
    }
}
