//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).

use std::collections::HashMap;
use std::time::Instant;

use kurbo::Rect as PxRect;
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::layout::Rect;

use crate::config::AppConfig;
use crate::core::device::DeviceProfile;
use crate::core::engine::TrailEngine;
use crate::core::hover::HoverGlow;
use crate::core::intro::{IntroSequence, INTRO_TEXT};
use crate::core::scheduler::RefreshSignal;
use crate::core::scroll::{ScrollProgressMapper, ScrollThresholds, SectionGeometry};
use crate::core::visibility::VisibilityTracker;
use crate::ui::layout::{AppLayout, CellMetrics};
use crate::ui::smooth_scroll::SmoothScroll;
use crate::ui::trail_widget::TrailLayer;

use super::page::{self, ElementId, PageLayout, TRACKED_SECTION};

/// Top-level application state.
pub struct AppState<R: RefreshSignal> {
    /// User configuration (tunables and key bindings).
    pub config: AppConfig,
    pub metrics: CellMetrics,
    /// Full terminal area.
    pub area: Rect,
    pub page: PageLayout,
    pub scroll: SmoothScroll,
    pub engine: TrailEngine<R>,
    /// Render surface the engine presents trail frames to.
    pub trail: TrailLayer,
    pub reveal: VisibilityTracker<ElementId>,
    /// Reveal instant of every currently visible element, for entrances.
    pub revealed_at: HashMap<ElementId, Instant>,
    pub progress: ScrollProgressMapper,
    pub thresholds: ScrollThresholds,
    /// Spotlight state per card index.
    pub hover: HashMap<usize, HoverGlow>,
    pub intro: Option<IntroSequence>,
    pub rng: StdRng,
    pub profile: DeviceProfile,
    /// Time of the latest refresh; widgets animate against it.
    pub now: Instant,
    pub show_hud: bool,
    /// Controls the main event loop.
    pub should_quit: bool,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
}

impl<R: RefreshSignal> AppState<R> {
    pub fn new(
        config: AppConfig,
        profile: DeviceProfile,
        signal: R,
        area: Rect,
        now: Instant,
    ) -> Self {
        let metrics = CellMetrics {
            width: config.cell_width,
            height: config.cell_height,
        };
        let engine = TrailEngine::new(&config.engine, profile, signal);
        let reveal = VisibilityTracker::new(config.engine.observer);
        let mut rng = StdRng::from_entropy();
        let intro = config
            .intro
            .then(|| IntroSequence::new(INTRO_TEXT, now, &mut rng));

        let mut state = Self {
            scroll: SmoothScroll::new(config.scroll_speed),
            config,
            metrics,
            area,
            page: PageLayout::default(),
            engine,
            trail: TrailLayer::default(),
            reveal,
            revealed_at: HashMap::new(),
            progress: ScrollProgressMapper::new(),
            thresholds: ScrollThresholds::default(),
            hover: HashMap::new(),
            intro,
            rng,
            profile,
            now,
            show_hud: false,
            should_quit: false,
            status_message: None,
        };
        state.relayout(area);
        let geometry = state.tracked_geometry();
        state.progress.attach(&geometry);
        state
    }

    pub fn layout(&self) -> AppLayout {
        AppLayout::from_area(self.area)
    }

    /// Recompute the page for a new terminal size.  Elements that still
    /// exist keep their reveal state; the next tick re-observes them.
    pub fn relayout(&mut self, area: Rect) {
        self.area = area;
        let page_area = self.layout().page_area;
        self.page = PageLayout::compute(page_area.width, page_area.height);
        let max = self.page.max_scroll(page_area.height) as f64;
        self.scroll.set_max(self.metrics.rows_to_px(max));

        let ids: Vec<ElementId> = self.page.elements().collect();
        self.reveal.retain(|id| ids.contains(id));
        self.revealed_at.retain(|id, _| ids.contains(id));
        for id in ids {
            self.reveal.register(id);
        }
        let cards: Vec<usize> = self.page.cards().map(|c| c.index).collect();
        self.hover.retain(|index, _| cards.contains(index));
        for index in cards {
            self.hover.entry(index).or_default();
        }
    }

    /// Scroll offset in whole rows, as drawn.
    pub fn scroll_rows(&self) -> u32 {
        self.metrics.px_to_rows(self.scroll.offset()).round().max(0.0) as u32
    }

    /// Viewport in logical pixels, origin at the page area's top-left.
    pub fn viewport_px(&self) -> PxRect {
        let page_area = self.layout().page_area;
        PxRect::new(
            0.0,
            0.0,
            page_area.width as f64 * self.metrics.width,
            self.metrics.rows_to_px(page_area.height as f64),
        )
    }

    /// Element bounds relative to the viewport, in logical pixels.
    pub fn element_px(&self, id: ElementId) -> Option<PxRect> {
        let (top, height) = self.page.span(id)?;
        let viewport = self.viewport_px();
        let y0 = self.metrics.rows_to_px(top as f64) - self.scroll.offset();
        Some(PxRect::new(
            0.0,
            y0,
            viewport.x1,
            y0 + self.metrics.rows_to_px(height as f64),
        ))
    }

    /// Card box on screen, in the engine's pixel space (terminal origin).
    pub fn card_screen_px(&self, index: usize) -> Option<PxRect> {
        let (top, height) = self.page.span(ElementId::Card(index))?;
        let page_area = self.layout().page_area;
        let (col, width) = page::text_column(page_area.width);
        let row = page_area.y as i64 + top as i64 - self.scroll_rows() as i64;
        let x0 = (page_area.x + col) as f64 * self.metrics.width;
        let y0 = self.metrics.rows_to_px(row as f64);
        Some(PxRect::new(
            x0,
            y0,
            x0 + width as f64 * self.metrics.width,
            y0 + self.metrics.rows_to_px(height as f64),
        ))
    }

    /// Scroll geometry of the section driving the timeline.
    pub fn tracked_geometry(&self) -> SectionGeometry {
        let (top, height) = self
            .page
            .span(ElementId::Section(TRACKED_SECTION))
            .unwrap_or_default();
        let scroll_y = self.scroll.offset();
        SectionGeometry {
            scroll_y,
            section_top: self.metrics.rows_to_px(top as f64) - scroll_y,
            section_height: self.metrics.rows_to_px(height as f64),
            viewport_height: self.viewport_px().height(),
        }
    }

    /// Smooth-scroll target for the top of `section`.
    pub fn section_offset_px(&self, section: usize) -> Option<f64> {
        let (top, _) = self.page.span(ElementId::Section(section))?;
        Some(self.metrics.rows_to_px(top as f64))
    }

    /// Stop the trail and detach every listener.  Idempotent.
    pub fn teardown(&mut self) {
        self.engine.stop();
        self.trail.clear();
        self.progress.detach();
        self.reveal.clear();
        self.revealed_at.clear();
        for glow in self.hover.values_mut() {
            glow.on_leave();
        }
    }

    pub fn intro_active(&self) -> bool {
        self.intro.as_ref().is_some_and(|i| !i.is_done())
    }

    /// Lines shown in the diagnostics HUD.
    pub fn hud_lines(&self) -> Vec<String> {
        let frame = self.trail.frame();
        vec![
            format!("device   {} ({:.0}px)", self.profile.class, self.profile.viewport_width),
            format!("trail    {:?}", self.engine.status()),
            format!("frames   {}", self.engine.frames()),
            format!("points   {}", self.engine.buffer().len()),
            format!(
                "segments {}",
                frame.map_or(0, |f| f.curve.elements().len())
            ),
            format!("overlay  {:.2}", self.trail.alpha()),
            format!("progress {:.3}", self.progress.progress()),
            format!("gradient {:.1}%", self.progress.gradient_stop()),
            format!(
                "visible  {}/{}",
                self.revealed_at.len(),
                self.reveal.len()
            ),
            format!("scroll   {:.0}px", self.scroll.offset()),
        ]
    }
}
