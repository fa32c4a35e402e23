//! Layout helpers: split the terminal area into regions and map the cell
//! grid into the engine's logical-pixel space.

use kurbo::Point;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::app::page::SECTIONS;

/// Primary screen layout: navigation bar, scrolling page, status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppLayout {
    pub nav_area: Rect,
    pub page_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// Compute the layout from the full terminal area.
    pub fn from_area(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // navigation
                Constraint::Min(3),    // page (takes all remaining space)
                Constraint::Length(1), // status bar
            ])
            .split(area);

        Self {
            nav_area: chunks[0],
            page_area: chunks[1],
            status_area: chunks[2],
        }
    }
}

/// Size of one terminal cell in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    pub width: f64,
    pub height: f64,
}

impl Default for CellMetrics {
    fn default() -> Self {
        Self {
            width: 10.0,
            height: 20.0,
        }
    }
}

impl CellMetrics {
    /// Centre of the cell at `(col, row)`.
    pub fn cell_center(&self, col: u16, row: u16) -> Point {
        Point::new(
            (col as f64 + 0.5) * self.width,
            (row as f64 + 0.5) * self.height,
        )
    }

    pub fn rows_to_px(&self, rows: f64) -> f64 {
        rows * self.height
    }

    pub fn px_to_rows(&self, px: f64) -> f64 {
        px / self.height
    }

    /// `area` expressed in logical pixels.
    pub fn rect_px(&self, area: Rect) -> kurbo::Rect {
        kurbo::Rect::new(
            area.x as f64 * self.width,
            area.y as f64 * self.height,
            (area.x + area.width) as f64 * self.width,
            (area.y + area.height) as f64 * self.height,
        )
    }
}

const NAV_BRAND: &str = " glowtrail ";
const NAV_GAP: u16 = 2;

/// Column spans `(section, x_start, x_end)` of the navigation entries,
/// skipping the hero.  The brand is dropped when the bar is condensed.
pub fn nav_spans(area: Rect, condensed: bool) -> Vec<(usize, u16, u16)> {
    let mut x = area.x + 1;
    if !condensed {
        x += NAV_BRAND.len() as u16 + NAV_GAP;
    }
    let right = area.x + area.width;
    let mut spans = Vec::new();
    for (index, section) in SECTIONS.iter().enumerate().skip(1) {
        let w = section.id.len() as u16;
        if x + w > right {
            break;
        }
        spans.push((index, x, x + w));
        x += w + NAV_GAP;
    }
    spans
}

pub fn nav_brand() -> &'static str {
    NAV_BRAND
}

/// Label and column span of the back-to-top control in the status bar.
pub fn back_to_top_span(status: Rect) -> (&'static str, u16, u16) {
    const LABEL: &str = " ↑ top ";
    let w = LABEL.chars().count() as u16;
    let x = (status.x + status.width).saturating_sub(w);
    (LABEL, x, x + w)
}
