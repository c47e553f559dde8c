//! Color themes for the admin console.
//!
//! Three schemes, selectable with `--theme` / `THEME`.

use std::fmt;
use std::str::FromStr;

use ratatui::style::Color;

use crate::normalize::{StatusTone, UserActivity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    /// Muted dark palette (default)
    #[default]
    Nord,
    /// Amber text on black
    Amber,
    /// Dark text on a light background
    Paper,
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nord" => Ok(Theme::Nord),
            "amber" | "amber-crt" => Ok(Theme::Amber),
            "paper" | "light" => Ok(Theme::Paper),
            _ => Err(format!("Unknown theme '{s}'. Available: nord, amber, paper")),
        }
    }
}

impl Theme {
    pub fn colors(&self) -> ColorScheme {
        match self {
            Theme::Nord => ColorScheme::nord(),
            Theme::Amber => ColorScheme::amber(),
            Theme::Paper => ColorScheme::paper(),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Nord => write!(f, "nord"),
            Theme::Amber => write!(f, "amber"),
            Theme::Paper => write!(f, "paper"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ColorScheme {
    pub background: Color,
    pub text: Color,
    pub text_dim: Color,
    pub focus_border: Color,
    pub unfocused_border: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
    /// Disabled nav entries and the "Soon" chip
    pub disabled: Color,
    /// Wallet / pending / referral chips
    pub chip: Color,
    pub status_pending: Color,
    pub status_paid: Color,
    pub status_cancelled: Color,
    pub status_unknown: Color,
    pub toast_success: Color,
    pub toast_error: Color,
    pub debug_indicator: Color,
}

impl ColorScheme {
    pub fn nord() -> Self {
        Self {
            background: Color::Black,
            text: Color::White,
            text_dim: Color::Gray,
            focus_border: Color::Rgb(136, 192, 208),
            unfocused_border: Color::DarkGray,
            selection_bg: Color::Rgb(136, 192, 208),
            selection_fg: Color::Black,
            disabled: Color::DarkGray,
            chip: Color::Cyan,
            status_pending: Color::Yellow,
            status_paid: Color::Green,
            status_cancelled: Color::Red,
            status_unknown: Color::Gray,
            toast_success: Color::Green,
            toast_error: Color::Red,
            debug_indicator: Color::Magenta,
        }
    }

    pub fn amber() -> Self {
        let amber = Color::Rgb(255, 176, 0);
        let amber_bright = Color::Rgb(255, 200, 100);
        let amber_dim = Color::Rgb(180, 120, 0);

        Self {
            background: Color::Black,
            text: amber,
            text_dim: amber_dim,
            focus_border: amber_bright,
            unfocused_border: amber_dim,
            selection_bg: amber,
            selection_fg: Color::Black,
            disabled: Color::Rgb(110, 75, 0),
            chip: amber_bright,
            status_pending: amber_bright,
            status_paid: Color::Rgb(100, 255, 100),
            status_cancelled: Color::Red,
            status_unknown: amber_dim,
            toast_success: Color::Rgb(100, 255, 100),
            toast_error: Color::Red,
            debug_indicator: Color::Rgb(255, 100, 255),
        }
    }

    pub fn paper() -> Self {
        Self {
            background: Color::Rgb(250, 248, 240),
            text: Color::Rgb(30, 30, 30),
            text_dim: Color::Rgb(100, 100, 100),
            focus_border: Color::Rgb(20, 90, 160),
            unfocused_border: Color::Rgb(170, 170, 170),
            selection_bg: Color::Rgb(20, 90, 160),
            selection_fg: Color::White,
            disabled: Color::Rgb(170, 170, 170),
            chip: Color::Rgb(20, 90, 160),
            status_pending: Color::Rgb(180, 110, 0),
            status_paid: Color::Rgb(0, 130, 60),
            status_cancelled: Color::Rgb(180, 30, 30),
            status_unknown: Color::Rgb(100, 100, 100),
            toast_success: Color::Rgb(0, 130, 60),
            toast_error: Color::Rgb(180, 30, 30),
            debug_indicator: Color::Rgb(140, 40, 140),
        }
    }

    pub fn tone(&self, tone: StatusTone) -> Color {
        match tone {
            StatusTone::Pending => self.status_pending,
            StatusTone::Paid => self.status_paid,
            StatusTone::Cancelled => self.status_cancelled,
            StatusTone::Unknown => self.status_unknown,
        }
    }

    pub fn activity(&self, activity: UserActivity) -> Color {
        match activity {
            UserActivity::Active => self.status_paid,
            UserActivity::Inactive => self.status_cancelled,
            UserActivity::Unknown => self.text_dim,
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::nord()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_parsing() {
        assert_eq!("nord".parse::<Theme>(), Ok(Theme::Nord));
        assert_eq!("AMBER".parse::<Theme>(), Ok(Theme::Amber));
        assert_eq!("light".parse::<Theme>(), Ok(Theme::Paper));
        assert!("dos".parse::<Theme>().is_err());
        assert_eq!(Theme::Paper.to_string(), "paper");
    }

    #[test]
    fn status_tones_are_distinct() {
        for theme in [Theme::Nord, Theme::Amber, Theme::Paper] {
            let c = theme.colors();
            assert_ne!(c.tone(StatusTone::Paid), c.tone(StatusTone::Cancelled));
            assert_ne!(c.tone(StatusTone::Pending), c.tone(StatusTone::Paid));
        }
    }
}
