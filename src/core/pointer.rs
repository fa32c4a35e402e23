//! Throttled pointer sampling.
//!
//! The host delivers move notifications at whatever rate the input device
//! produces them.  The sampler keeps only what it can use: a move is accepted
//! when at least one sampling interval has passed since the last accepted
//! one, everything in between is dropped.  There is no queue; the single
//! [`PointerState`] is overwritten in place.

use std::time::{Duration, Instant};

use kurbo::Point;

/// Default sampling interval (~60 Hz ceiling).
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(16);

/// Last known pointer position and whether the pointer is over the surface.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    /// `None` until the first sample is accepted.
    pub position: Option<Point>,
    pub active: bool,
}

/// Rate-limited sink for raw pointer notifications.
#[derive(Debug, Clone)]
pub struct PointerSampler {
    interval: Duration,
    last_accepted: Option<Instant>,
    attached: bool,
    state: PointerState,
}

impl PointerSampler {
    /// A detached sampler; call [`attach`](Self::attach) to start listening.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_accepted: None,
            attached: false,
            state: PointerState::default(),
        }
    }

    pub fn attach(&mut self) {
        self.attached = true;
    }

    /// Stop listening and forget the pointer.  Safe to call repeatedly.
    pub fn detach(&mut self) {
        self.attached = false;
        self.last_accepted = None;
        self.state = PointerState::default();
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Offer a raw move.  Returns `true` if the sample was accepted.
    pub fn on_move(&mut self, now: Instant, position: Point) -> bool {
        if !self.attached {
            return false;
        }
        if let Some(last) = self.last_accepted {
            if now.saturating_duration_since(last) < self.interval {
                return false;
            }
        }
        self.last_accepted = Some(now);
        self.state.position = Some(position);
        self.state.active = true;
        true
    }

    pub fn on_enter(&mut self) {
        if self.attached {
            self.state.active = true;
        }
    }

    pub fn on_leave(&mut self) {
        if self.attached {
            self.state.active = false;
        }
    }

    pub fn state(&self) -> &PointerState {
        &self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attached() -> PointerSampler {
        let mut s = PointerSampler::new(DEFAULT_SAMPLE_INTERVAL);
        s.attach();
        s
    }

    #[test]
    fn samples_inside_interval_are_dropped() {
        let mut s = attached();
        let t0 = Instant::now();
        assert!(s.on_move(t0, Point::new(1.0, 1.0)));
        assert!(!s.on_move(t0 + Duration::from_millis(5), Point::new(9.0, 9.0)));
        assert_eq!(s.state().position, Some(Point::new(1.0, 1.0)));

        assert!(s.on_move(t0 + Duration::from_millis(16), Point::new(4.0, 2.0)));
        assert_eq!(s.state().position, Some(Point::new(4.0, 2.0)));
    }

    #[test]
    fn detached_sampler_ignores_everything() {
        let mut s = PointerSampler::new(DEFAULT_SAMPLE_INTERVAL);
        assert!(!s.on_move(Instant::now(), Point::new(3.0, 3.0)));
        s.on_enter();
        assert_eq!(*s.state(), PointerState::default());
    }

    #[test]
    fn enter_and_leave_toggle_activity() {
        let mut s = attached();
        s.on_enter();
        assert!(s.state().active);
        s.on_leave();
        assert!(!s.state().active);
        // A move implies the pointer is back over the surface.
        s.on_move(Instant::now(), Point::ZERO);
        assert!(s.state().active);
    }

    #[test]
    fn detach_resets_state_and_is_idempotent() {
        let mut s = attached();
        s.on_move(Instant::now(), Point::new(2.0, 2.0));
        s.detach();
        s.detach();
        assert!(!s.is_attached());
        assert_eq!(s.state().position, None);
    }
}
