//! Parrot/neon theme tokens for the Tradescope TUI
//!
//! Provides a consistent color palette:
//! - **Accent**: Electric cyan (focus, highlights, active tab)
//! - **Positive**: Neon green (yes side, success)
//! - **Negative**: Hot pink (no side, errors)
//! - **Warning**: Neon orange (loading, warnings)
//! - **Neutral**: Cool purple (headers, secondary info)
//! - **Muted**: Steel blue (hints, disabled)
//!
//! Panels use the free style functions; the palette struct backs them.

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub background: Color,
    pub accent: Color,
    pub positive: Color,
    pub negative: Color,
    pub warning: Color,
    pub neutral: Color,
    pub muted: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::parrot_neon()
    }
}

impl Theme {
    pub const fn parrot_neon() -> Self {
        Self {
            background: Color::Rgb(18, 18, 20),
            accent: Color::Rgb(0, 255, 255),
            positive: Color::Rgb(0, 255, 128),
            negative: Color::Rgb(255, 20, 147),
            warning: Color::Rgb(255, 140, 0),
            neutral: Color::Rgb(147, 112, 219),
            muted: Color::Rgb(100, 149, 237),
            text_primary: Color::White,
            text_secondary: Color::Rgb(170, 170, 170),
        }
    }

    /// Color for a taker side cell: yes = green, no = pink.
    pub fn side_color(&self, side: &str) -> Color {
        match side.to_ascii_lowercase().as_str() {
            "yes" => self.positive,
            "no" => self.negative,
            _ => self.text_secondary,
        }
    }

    /// Color for a market status.
    pub fn status_color(&self, status: &str) -> Color {
        match status {
            "active" | "open" => self.positive,
            "closed" | "settled" | "finalized" => self.muted,
            "" => self.text_secondary,
            _ => self.warning,
        }
    }
}

const PALETTE: Theme = Theme::parrot_neon();

pub fn accent() -> Style {
    Style::default().fg(PALETTE.accent)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn muted() -> Style {
    Style::default().fg(PALETTE.muted)
}

pub fn neutral() -> Style {
    Style::default().fg(PALETTE.neutral)
}

pub fn text() -> Style {
    Style::default().fg(PALETTE.text_primary)
}

pub fn positive() -> Style {
    Style::default().fg(PALETTE.positive)
}

pub fn negative() -> Style {
    Style::default().fg(PALETTE.negative)
}

pub fn warning() -> Style {
    Style::default().fg(PALETTE.warning)
}

/// Cursor row.
pub fn selected() -> Style {
    accent().add_modifier(Modifier::REVERSED)
}

pub fn side(value: &str) -> Style {
    Style::default().fg(PALETTE.side_color(value))
}

pub fn status(value: &str) -> Style {
    Style::default().fg(PALETTE.status_color(value))
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_creation() {
        let theme = Theme::default();
        assert_eq!(theme.background, Color::Rgb(18, 18, 20));
        assert_eq!(theme.accent, Color::Rgb(0, 255, 255));
    }

    #[test]
    fn test_side_color() {
        let theme = Theme::default();
        assert_eq!(theme.side_color("yes"), theme.positive);
        assert_eq!(theme.side_color("NO"), theme.negative);
        assert_eq!(theme.side_color(""), theme.text_secondary);
    }

    #[test]
    fn test_status_color() {
        let theme = Theme::default();
        assert_eq!(theme.status_color("active"), theme.positive);
        assert_eq!(theme.status_color("closed"), theme.muted);
        assert_eq!(theme.status_color("halted"), theme.warning);
    }

    #[test]
    fn test_style_helpers() {
        assert_eq!(accent_bold().fg, Some(PALETTE.accent));
        assert!(selected().add_modifier.contains(Modifier::REVERSED));
        assert_eq!(panel_border(false), muted());
    }
}
