//! Full-screen typewriter intro and the diagnostics HUD.

use std::time::Instant;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::core::intro::IntroSequence;
use crate::ui::theme::Theme;

pub struct IntroWidget<'a> {
    pub intro: &'a IntroSequence,
    pub now: Instant,
}

impl<'a> Widget for IntroWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let fade = self.intro.fade(self.now);
        let mut text = self.intro.typed_text();
        text.push(if self.intro.cursor_visible(self.now) { '▌' } else { ' ' });

        let w = text.chars().count() as u16;
        let x = area.x + area.width.saturating_sub(w) / 2;
        let y = area.y + area.height / 2;
        buf.set_stringn(x, y, &text, area.width as usize, Theme::intro_style(fade));
    }
}

/// Engine diagnostics, toggled from the keyboard.
pub struct HudWidget<'a> {
    pub lines: &'a [String],
}

impl<'a> HudWidget<'a> {
    /// Area in the top-right corner of `screen` sized for the content.
    pub fn area(&self, screen: Rect) -> Rect {
        let w = self
            .lines
            .iter()
            .map(|l| l.chars().count() as u16)
            .max()
            .unwrap_or(0)
            .saturating_add(4)
            .min(screen.width);
        let h = (self.lines.len() as u16 + 2).min(screen.height);
        Rect::new(screen.x + screen.width - w, screen.y + 1.min(screen.height - h), w, h)
    }
}

impl<'a> Widget for HudWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let block = Block::default()
            .title(" engine ")
            .title_style(Theme::title_style())
            .borders(Borders::ALL)
            .border_style(Theme::border_style());
        let lines: Vec<Line> = self
            .lines
            .iter()
            .map(|l| Line::styled(format!(" {l}"), Style::default()))
            .collect();
        Paragraph::new(lines).block(block).render(area, buf);
    }
}
