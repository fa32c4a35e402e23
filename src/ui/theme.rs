//! Colour palette and text styles used across the UI.

use ratatui::style::{Color, Modifier, Style};

/// Trail and glow base colour.
const ACCENT: (u8, u8, u8) = (56, 189, 248);
/// Hover spotlight colour.
const GLOW: (u8, u8, u8) = (129, 140, 248);

/// Central theme. Change colours here and they propagate everywhere.
pub struct Theme;

impl Theme {
    // ── page ───────────────────────────────────────────────────
    pub fn hero_style() -> Style {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    }

    pub fn heading_style() -> Style {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    }

    pub fn body_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    /// Content mid-way through its entrance.
    pub fn entering_style() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn card_border_style(hovered: bool) -> Style {
        if hovered {
            Style::default().fg(Color::LightBlue)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    }

    pub fn card_title_style() -> Style {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    }

    pub fn card_subtitle_style() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::ITALIC)
    }

    /// Timeline rail below and above the gradient stop.
    pub fn timeline_style(lit: bool) -> Style {
        if lit {
            Style::default().fg(Theme::accent(1.0))
        } else {
            Style::default().fg(Color::DarkGray)
        }
    }

    // ── effects ────────────────────────────────────────────────
    /// Accent colour scaled toward black by `intensity` in `[0, 1]`.
    pub fn accent(intensity: f64) -> Color {
        scale(ACCENT, intensity)
    }

    pub fn glow(intensity: f64) -> Color {
        scale(GLOW, intensity)
    }

    /// Intro text fading from white to black.
    pub fn intro_style(fade: f64) -> Style {
        Style::default().fg(scale((255, 255, 255), fade))
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn nav_style(condensed: bool) -> Style {
        if condensed {
            Style::default().bg(Color::Black).fg(Color::Gray)
        } else {
            Style::default().fg(Color::White)
        }
    }

    pub fn brand_style() -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn title_style() -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn status_bar_style() -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    }

    pub fn back_to_top_style() -> Style {
        Style::default()
            .bg(Color::Cyan)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    }
}

fn scale((r, g, b): (u8, u8, u8), intensity: f64) -> Color {
    let k = if intensity.is_finite() {
        intensity.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let c = |v: u8| (v as f64 * k).round() as u8;
    Color::Rgb(c(r), c(g), c(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_colours_clamp() {
        assert_eq!(Theme::accent(1.0), Color::Rgb(56, 189, 248));
        assert_eq!(Theme::accent(0.0), Color::Rgb(0, 0, 0));
        assert_eq!(Theme::accent(4.0), Theme::accent(1.0));
        assert_eq!(Theme::glow(f64::NAN), Color::Rgb(0, 0, 0));
    }
}
