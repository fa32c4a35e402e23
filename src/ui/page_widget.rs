//! Scrolling page widget.
//!
//! Draws the sections visible at the current scroll offset.  Elements the
//! reveal tracker reports hidden are left blank; revealed ones slide up
//! into place over a short entrance.  The experience section carries a
//! timeline rail lit up to the scroll-driven gradient stop, and its cards
//! show a spotlight under the pointer while hovered.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use kurbo::Point;
use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::Style,
    widgets::Widget,
};

use crate::app::page::{self, ElementId, PageLayout, PlacedCard, PlacedSection, TRACKED_SECTION};
use crate::core::hover::HoverGlow;
use crate::core::visibility::VisibilityTracker;
use crate::ui::layout::CellMetrics;
use crate::ui::theme::Theme;

/// Length of the entrance animation.
pub const ENTRANCE: Duration = Duration::from_millis(600);
/// Rows an element travels during its entrance.
const SLIDE_ROWS: f64 = 2.0;
/// Spotlight strength at its centre.
const GLOW_PEAK: f64 = 0.35;

/// Eased entrance progress in `[0, 1]` for an element revealed at `since`.
pub fn entrance_progress(since: Instant, now: Instant) -> f64 {
    let t = now.saturating_duration_since(since).as_secs_f64() / ENTRANCE.as_secs_f64();
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

pub struct PageWidget<'a> {
    pub layout: &'a PageLayout,
    /// Scroll offset in whole rows.
    pub scroll_rows: u32,
    pub reveal: &'a VisibilityTracker<ElementId>,
    /// When each currently visible element was revealed.
    pub revealed_at: &'a HashMap<ElementId, Instant>,
    pub now: Instant,
    /// Timeline gradient stop in percent.
    pub gradient_stop: f64,
    pub hover: &'a HashMap<usize, HoverGlow>,
    pub metrics: CellMetrics,
}

impl<'a> PageWidget<'a> {
    /// `None` while hidden, otherwise the entrance offset in rows and
    /// whether the element is still dimmed.
    fn entrance(&self, id: ElementId) -> Option<(i64, bool)> {
        if !self.reveal.is_visible(&id) {
            return None;
        }
        let e = self
            .revealed_at
            .get(&id)
            .map_or(1.0, |&at| entrance_progress(at, self.now));
        Some((((1.0 - e) * SLIDE_ROWS).round() as i64, e < 0.6))
    }

    /// Screen row (relative to `area`) of a document row.
    fn screen_row(&self, doc_row: u32) -> i64 {
        doc_row as i64 - self.scroll_rows as i64
    }
}

impl<'a> Widget for PageWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let (col, width) = page::text_column(area.width);
        let x = area.x + col;

        for section in &self.layout.sections {
            let top = self.screen_row(section.top);
            if top >= area.height as i64 || top + (section.height as i64) < 0 {
                continue;
            }
            if let Some((slide, dim)) = self.entrance(ElementId::Section(section.index)) {
                if section.index == 0 {
                    render_hero(section, top + slide, dim, area, buf);
                } else {
                    render_section(section, top + slide, dim, x, width, area, buf);
                }
            }
            if section.index == TRACKED_SECTION {
                self.render_timeline(section, top, area, buf);
            }
            for card in &section.cards {
                if let Some((slide, dim)) = self.entrance(ElementId::Card(card.index)) {
                    self.render_card(card, self.screen_row(card.top) + slide, dim, x, width, area, buf);
                }
            }
        }
    }
}

impl<'a> PageWidget<'a> {
    fn render_timeline(&self, section: &PlacedSection, top: i64, area: Rect, buf: &mut Buffer) {
        let x = area.x + 1;
        let h = section.height.max(1) as f64;
        for r in 0..section.height {
            let lit = (r as f64 / h) * 100.0 <= self.gradient_stop;
            put(buf, area, top + r as i64, x, "│", area.width, Theme::timeline_style(lit));
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn render_card(
        &self,
        card: &PlacedCard,
        top: i64,
        dim: bool,
        x: u16,
        width: u16,
        area: Rect,
        buf: &mut Buffer,
    ) {
        let Some(content) = page::card(card.index) else {
            return;
        };
        let glow = self.hover.get(&card.index).filter(|g| g.is_hovered());
        let hovered = glow.is_some();
        let border = Theme::card_border_style(hovered);
        let text = |s: Style| if dim { Theme::entering_style() } else { s };
        let inner = width.saturating_sub(4) as usize;

        let title = format!("╭─ {} ", content.title);
        let fill = (width as usize).saturating_sub(title.chars().count() + 1);
        put(buf, area, top, x, &format!("{title}{}╮", "─".repeat(fill)), width, border);
        put(buf, area, top, x + 3, content.title, width.saturating_sub(3), text(Theme::card_title_style()));

        let mut row = top + 1;
        let body = std::iter::once((content.subtitle.to_string(), Theme::card_subtitle_style()))
            .chain(card.lines.iter().map(|l| (l.clone(), Theme::body_style())));
        for (line, style) in body {
            put(buf, area, row, x, &format!("│ {:inner$} │", ""), width, border);
            put(buf, area, row, x + 2, &line, inner as u16, text(style));
            row += 1;
        }
        put(
            buf,
            area,
            row,
            x,
            &format!("╰{}╯", "─".repeat((width as usize).saturating_sub(2))),
            width,
            border,
        );

        if let Some(glow) = glow {
            for r in 0..card.height as i64 {
                let y = top + r;
                if y < 0 || y >= area.height as i64 {
                    continue;
                }
                for c in 0..width {
                    let local = Point::new(
                        (c as f64 + 0.5) * self.metrics.width,
                        (r as f64 + 0.5) * self.metrics.height,
                    );
                    let intensity = glow.intensity_at(local);
                    if intensity <= 0.0 {
                        continue;
                    }
                    if let Some(cell) = buf.cell_mut(Position::new(x + c, area.y + y as u16)) {
                        cell.set_bg(Theme::glow(intensity * GLOW_PEAK));
                    }
                }
            }
        }
    }
}

fn render_hero(section: &PlacedSection, top: i64, dim: bool, area: Rect, buf: &mut Buffer) {
    let Some(content) = page::SECTIONS.get(section.index) else {
        return;
    };
    let mid = top + section.height as i64 / 2 - 1;
    let style = |s: Style| if dim { Theme::entering_style() } else { s };
    put_centered(buf, area, mid, content.title, style(Theme::hero_style()));
    for (i, line) in section.lines.iter().enumerate() {
        put_centered(buf, area, mid + 2 + i as i64, line, style(Theme::body_style()));
    }
    put_centered(
        buf,
        area,
        top + section.height as i64 - 2,
        "scroll ↓",
        Theme::entering_style(),
    );
}

fn render_section(
    section: &PlacedSection,
    top: i64,
    dim: bool,
    x: u16,
    width: u16,
    area: Rect,
    buf: &mut Buffer,
) {
    let Some(content) = page::SECTIONS.get(section.index) else {
        return;
    };
    let style = |s: Style| if dim { Theme::entering_style() } else { s };
    put(buf, area, top, x, content.title, width, style(Theme::heading_style()));
    for (i, line) in section.lines.iter().enumerate() {
        put(buf, area, top + 2 + i as i64, x, line, width, style(Theme::body_style()));
    }
}

/// Write `text` at area-relative row `y`, if that row is on screen.
fn put(buf: &mut Buffer, area: Rect, y: i64, x: u16, text: &str, max: u16, style: Style) {
    if y < 0 || y >= area.height as i64 || x >= area.x + area.width {
        return;
    }
    let room = (area.x + area.width - x).min(max) as usize;
    buf.set_stringn(x, area.y + y as u16, text, room, style);
}

fn put_centered(buf: &mut Buffer, area: Rect, y: i64, text: &str, style: Style) {
    let w = text.chars().count() as u16;
    let x = area.x + area.width.saturating_sub(w) / 2;
    put(buf, area, y, x, text, area.width, style);
}
