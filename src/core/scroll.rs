//! Scroll-driven parameters.
//!
//! [`ScrollProgressMapper`] turns the scroll offset and a section's current
//! geometry into a `[0, 1]` progress value: 0 while the section is still
//! below the viewport, 1 once it has scrolled out above.  Geometry is handed
//! in fresh on every call; nothing about the layout is cached between
//! notifications.

/// Scroll offset at which the navigation bar condenses.
pub const NAV_CONDENSE_OFFSET: f64 = 50.0;
/// Scroll offset past which the back-to-top control shows.
pub const BACK_TO_TOP_OFFSET: f64 = 500.0;

/// Layout snapshot for one scroll notification.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SectionGeometry {
    /// Absolute scroll offset of the page.
    pub scroll_y: f64,
    /// Section top relative to the viewport top (negative once scrolled past).
    pub section_top: f64,
    pub section_height: f64,
    pub viewport_height: f64,
}

impl SectionGeometry {
    /// Normalized progress of the viewport through the section.
    pub fn progress(&self) -> f64 {
        let start = self.scroll_y + self.section_top - self.viewport_height;
        let end = start + self.section_height + self.viewport_height;
        let span = end - start;
        if !(span.is_finite() && span > 0.0) {
            return 0.0;
        }
        let raw = (self.scroll_y - start) / span;
        if raw.is_finite() {
            raw.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Gradient stop (percent) driven by section progress: 30% → 80%.
pub fn gradient_stop(progress: f64) -> f64 {
    (30.0 + progress * 50.0).min(100.0)
}

/// Scroll listener keeping the latest progress of one tracked section.
#[derive(Debug, Clone, Default)]
pub struct ScrollProgressMapper {
    attached: bool,
    progress: f64,
}

impl ScrollProgressMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start listening and compute the initial value right away.
    pub fn attach(&mut self, geometry: &SectionGeometry) -> f64 {
        self.attached = true;
        self.on_scroll(geometry)
    }

    /// Stop listening.  Idempotent.
    pub fn detach(&mut self) {
        self.attached = false;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Recompute from `geometry`.  A detached mapper keeps its last value.
    pub fn on_scroll(&mut self, geometry: &SectionGeometry) -> f64 {
        if self.attached {
            self.progress = geometry.progress();
        }
        self.progress
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn gradient_stop(&self) -> f64 {
        gradient_stop(self.progress)
    }
}

/// Boolean page-chrome flags derived from the raw scroll offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollThresholds {
    pub nav_condensed: bool,
    pub show_back_to_top: bool,
}

impl ScrollThresholds {
    pub fn from_offset(scroll_y: f64) -> Self {
        Self {
            nav_condensed: scroll_y > NAV_CONDENSE_OFFSET,
            show_back_to_top: scroll_y > BACK_TO_TOP_OFFSET,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Section laid out at `doc_top` in a page with an 800-high viewport.
    fn geometry(scroll_y: f64, doc_top: f64, height: f64) -> SectionGeometry {
        SectionGeometry {
            scroll_y,
            section_top: doc_top - scroll_y,
            section_height: height,
            viewport_height: 800.0,
        }
    }

    #[test]
    fn progress_runs_from_entry_to_exit() {
        // Enters at scroll 1200, leaves at 1200 + 600 + 800.
        assert_eq!(geometry(0.0, 2000.0, 600.0).progress(), 0.0);
        assert_eq!(geometry(1200.0, 2000.0, 600.0).progress(), 0.0);
        assert!((geometry(1900.0, 2000.0, 600.0).progress() - 0.5).abs() < 1e-12);
        assert_eq!(geometry(2600.0, 2000.0, 600.0).progress(), 1.0);
    }

    #[test]
    fn progress_is_clamped_for_any_offset() {
        for scroll in [-1e9, -500.0, 0.0, 123.4, 5e3, 1e12] {
            let p = geometry(scroll, 2000.0, 600.0).progress();
            assert!((0.0..=1.0).contains(&p), "scroll {scroll} gave {p}");
        }
        // A stale section_top can push raw math out of range.
        let skewed = SectionGeometry {
            scroll_y: 100.0,
            section_top: -5000.0,
            section_height: 10.0,
            viewport_height: 10.0,
        };
        assert_eq!(skewed.progress(), 1.0);
    }

    #[test]
    fn degenerate_geometry_yields_zero() {
        assert_eq!(SectionGeometry::default().progress(), 0.0);
        let nan = SectionGeometry {
            scroll_y: f64::NAN,
            ..geometry(0.0, 10.0, 10.0)
        };
        assert_eq!(nan.progress(), 0.0);
    }

    #[test]
    fn gradient_stop_spans_thirty_to_eighty() {
        assert_eq!(gradient_stop(0.0), 30.0);
        assert_eq!(gradient_stop(1.0), 80.0);
        assert_eq!(gradient_stop(5.0), 100.0);
    }

    #[test]
    fn mapper_computes_eagerly_and_freezes_when_detached() {
        let mut m = ScrollProgressMapper::new();
        assert_eq!(m.on_scroll(&geometry(1900.0, 2000.0, 600.0)), 0.0);
        let p = m.attach(&geometry(1900.0, 2000.0, 600.0));
        assert!((p - 0.5).abs() < 1e-12);
        m.detach();
        m.detach();
        assert!((m.on_scroll(&geometry(9000.0, 2000.0, 600.0)) - 0.5).abs() < 1e-12);
        assert!((m.gradient_stop() - 55.0).abs() < 1e-9);
    }

    #[test]
    fn thresholds_flip_past_their_offsets() {
        assert_eq!(ScrollThresholds::from_offset(0.0), ScrollThresholds::default());
        let t = ScrollThresholds::from_offset(51.0);
        assert!(t.nav_condensed && !t.show_back_to_top);
        let t = ScrollThresholds::from_offset(500.0);
        assert!(!t.show_back_to_top);
        assert!(ScrollThresholds::from_offset(501.0).show_back_to_top);
    }
}
