//! Pointer-trail overlay.
//!
//! [`TrailLayer`] is the engine's render surface: it keeps the last
//! published frame plus an overlay alpha that fades out while the pointer
//! is away.  [`TrailWidget`] strokes the frame's curve on top of whatever
//! is already in the buffer, one canvas per band, touching only the cells
//! the stroke covers.

use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Line},
        Widget,
    },
};

use crate::core::engine::{TrailFrame, TrailSurface};
use crate::core::smooth::BandStyle;
use crate::ui::layout::CellMetrics;
use crate::ui::theme::Theme;

/// Overlay alpha change per presented frame.
const FADE_STEP: f64 = 0.1;
/// Band opacities are tuned for additive blending on a dark page; a
/// terminal cell holds one colour, so they are boosted.
const GAIN: f64 = 5.0;
/// Flattening tolerance in logical pixels.
const TOLERANCE: f64 = 0.5;

/// Render surface kept in app state between frames.
#[derive(Debug, Clone, Default)]
pub struct TrailLayer {
    frame: Option<TrailFrame>,
    alpha: f64,
}

impl TrailSurface for TrailLayer {
    fn present(&mut self, frame: &TrailFrame) {
        self.alpha = if frame.pointer_active {
            (self.alpha + FADE_STEP).min(1.0)
        } else {
            (self.alpha - FADE_STEP).max(0.0)
        };
        self.frame = Some(frame.clone());
    }
}

impl TrailLayer {
    pub fn frame(&self) -> Option<&TrailFrame> {
        self.frame.as_ref()
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Forget the last frame, e.g. after the engine stopped.
    pub fn clear(&mut self) {
        self.frame = None;
        self.alpha = 0.0;
    }
}

pub struct TrailWidget<'a> {
    layer: &'a TrailLayer,
    metrics: CellMetrics,
}

impl<'a> TrailWidget<'a> {
    pub fn new(layer: &'a TrailLayer, metrics: CellMetrics) -> Self {
        Self { layer, metrics }
    }
}

impl<'a> Widget for TrailWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(frame) = self.layer.frame() else {
            return;
        };
        if frame.curve.is_empty() || self.layer.alpha <= 0.0 || area.is_empty() {
            return;
        }
        let segments = frame.curve.flatten(TOLERANCE);
        if segments.is_empty() {
            return;
        }

        for band in &frame.bands {
            let marker = marker_for(band);
            let mut scratch = Buffer::empty(area);
            stroke_band(&segments, band, marker, self.layer.alpha, self.metrics, area)
                .render(area, &mut scratch);
            overlay(&scratch, area, buf);
        }
    }
}

/// Wide bands use coarse markers, the core line uses braille dots.
fn marker_for(band: &BandStyle) -> Marker {
    if band.width >= 12.0 {
        Marker::Block
    } else if band.width >= 4.0 {
        Marker::HalfBlock
    } else {
        Marker::Braille
    }
}

/// Horizontal size of one canvas dot for `marker`, in cells.
fn dots_per_cell(marker: Marker) -> f64 {
    match marker {
        Marker::Braille => 2.0,
        _ => 1.0,
    }
}

/// Canvas drawing one band as parallel strokes spaced one dot apart.
/// Blurred bands dim toward their edges.
fn stroke_band<'s>(
    segments: &'s [(kurbo::Point, kurbo::Point)],
    band: &'s BandStyle,
    marker: Marker,
    alpha: f64,
    metrics: CellMetrics,
    area: Rect,
) -> Canvas<'s, impl Fn(&mut ratatui::widgets::canvas::Context) + 's> {
    let px = metrics.rect_px(area);
    let height = px.height();
    let dot = metrics.width / dots_per_cell(marker);
    let reach = ((band.width / 2.0) / dot).floor() as i32;
    let base = (band.opacity * GAIN * alpha).min(1.0);

    Canvas::default()
        .marker(marker)
        .x_bounds([px.x0, px.x1])
        .y_bounds([0.0, height])
        .paint(move |ctx| {
            for &(a, b) in segments {
                let d = b - a;
                let len = d.hypot();
                let normal = if len > 0.0 {
                    kurbo::Vec2::new(-d.y / len, d.x / len)
                } else {
                    kurbo::Vec2::ZERO
                };
                for k in -reach..=reach {
                    let falloff = if band.blurred {
                        1.0 - k.unsigned_abs() as f64 / (reach + 1) as f64
                    } else {
                        1.0
                    };
                    let shift = normal * (k as f64 * dot);
                    let (p, q) = (a + shift, b + shift);
                    // Canvas y grows upward; page y grows downward.
                    ctx.draw(&Line::new(
                        p.x,
                        height - (p.y - px.y0),
                        q.x,
                        height - (q.y - px.y0),
                        Theme::accent(base * falloff),
                    ));
                }
            }
        })
}

/// Copy every stroked cell from `scratch` onto `buf`, leaving the rest of
/// the page untouched.
fn overlay(scratch: &Buffer, area: Rect, buf: &mut Buffer) {
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            let pos = Position::new(x, y);
            let Some(src) = scratch.cell(pos) else {
                continue;
            };
            if src.symbol() == " " {
                continue;
            }
            if let Some(dst) = buf.cell_mut(pos) {
                dst.set_symbol(src.symbol()).set_fg(src.fg);
            }
        }
    }
}
