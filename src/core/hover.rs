//! Card-local pointer spotlight.
//!
//! A cheaper cousin of the trail: one throttled sampler per hovered card,
//! storing the pointer relative to the card's top-left corner so the host
//! can centre a radial glow there.

use std::time::{Duration, Instant};

use kurbo::{Point, Rect};

use super::pointer::PointerSampler;

/// ~30 Hz is plenty for a soft radial glow.
pub const HOVER_SAMPLE_INTERVAL: Duration = Duration::from_millis(33);
/// Radius of the spotlight around the local pointer.
pub const GLOW_RADIUS: f64 = 500.0;

#[derive(Debug, Clone)]
pub struct HoverGlow {
    sampler: PointerSampler,
    local: Point,
}

impl Default for HoverGlow {
    fn default() -> Self {
        let mut sampler = PointerSampler::new(HOVER_SAMPLE_INTERVAL);
        sampler.attach();
        Self {
            sampler,
            local: Point::ZERO,
        }
    }
}

impl HoverGlow {
    /// Feed a pointer position in page coordinates while the card occupies
    /// `card`.  Returns `true` when the local position was updated.
    pub fn on_move(&mut self, now: Instant, pointer: Point, card: Rect) -> bool {
        let local = Point::new(pointer.x - card.x0, pointer.y - card.y0);
        if self.sampler.on_move(now, local) {
            self.local = local;
            true
        } else {
            false
        }
    }

    pub fn on_enter(&mut self) {
        self.sampler.on_enter();
    }

    pub fn on_leave(&mut self) {
        self.sampler.on_leave();
    }

    pub fn is_hovered(&self) -> bool {
        self.sampler.state().active
    }

    /// Spotlight centre relative to the card, while hovered.
    pub fn spot(&self) -> Option<Point> {
        self.is_hovered().then_some(self.local)
    }

    /// Glow strength at `local` (card-relative), fading linearly to zero
    /// at 40% of [`GLOW_RADIUS`].
    pub fn intensity_at(&self, local: Point) -> f64 {
        let Some(spot) = self.spot() else {
            return 0.0;
        };
        let reach = GLOW_RADIUS * 0.4;
        (1.0 - spot.distance(local) / reach).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_is_card_relative() {
        let mut glow = HoverGlow::default();
        let card = Rect::new(100.0, 200.0, 400.0, 300.0);
        assert!(glow.on_move(Instant::now(), Point::new(150.0, 260.0), card));
        assert_eq!(glow.spot(), Some(Point::new(50.0, 60.0)));
    }

    #[test]
    fn updates_are_throttled_to_thirty_hertz() {
        let mut glow = HoverGlow::default();
        let card = Rect::new(0.0, 0.0, 100.0, 100.0);
        let t0 = Instant::now();
        assert!(glow.on_move(t0, Point::new(1.0, 1.0), card));
        assert!(!glow.on_move(t0 + Duration::from_millis(20), Point::new(9.0, 9.0), card));
        assert!(glow.on_move(t0 + Duration::from_millis(33), Point::new(9.0, 9.0), card));
    }

    #[test]
    fn leaving_hides_the_spot() {
        let mut glow = HoverGlow::default();
        glow.on_move(Instant::now(), Point::new(5.0, 5.0), Rect::new(0.0, 0.0, 10.0, 10.0));
        glow.on_leave();
        assert_eq!(glow.spot(), None);
        assert_eq!(glow.intensity_at(Point::new(5.0, 5.0)), 0.0);
        glow.on_enter();
        assert_eq!(glow.intensity_at(Point::new(5.0, 5.0)), 1.0);
    }
}
