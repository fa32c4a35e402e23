//! Page scrolling with exponential ease-out.
//!
//! Input moves a target offset; every refresh the displayed offset covers a
//! fixed share of the remaining distance, so motion starts fast and
//! decelerates into place.  Offsets are in logical pixels.

/// Distance below which the animation snaps to the target.
const SNAP_PX: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct SmoothScroll {
    offset: f64,
    target: f64,
    max: f64,
    /// Share of the remaining distance covered per tick.
    speed: f64,
}

impl SmoothScroll {
    pub fn new(speed: f64) -> Self {
        Self {
            offset: 0.0,
            target: 0.0,
            max: 0.0,
            speed: speed.clamp(0.05, 0.95),
        }
    }

    /// Set the largest reachable offset, pulling both offsets back inside.
    pub fn set_max(&mut self, max: f64) {
        self.max = max.max(0.0);
        self.target = self.target.clamp(0.0, self.max);
        self.offset = self.offset.clamp(0.0, self.max);
    }

    pub fn scroll_by(&mut self, delta: f64) {
        self.scroll_to(self.target + delta);
    }

    pub fn scroll_to(&mut self, target: f64) {
        self.target = target.clamp(0.0, self.max);
    }

    /// Move toward the target.  Returns `true` while in motion.
    pub fn tick(&mut self) -> bool {
        let remaining = self.target - self.offset;
        if remaining.abs() < SNAP_PX {
            self.offset = self.target;
            return false;
        }
        self.offset += remaining * self.speed;
        true
    }

    /// Current displayed offset.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn is_animating(&self) -> bool {
        self.offset != self.target
    }
}
