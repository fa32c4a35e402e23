//! Bounded, time-decaying trail of pointer samples.
//!
//! Each frame every point fades by a constant factor, points that became
//! invisible are pruned, the current pointer position is appended when it
//! moved far enough, and the buffer is cut back to its capacity.  The result
//! is a deterministic function of elapsed frames and input samples.

use kurbo::Point;

use super::error::ConfigError;
use super::pointer::PointerState;

/// Largest accepted trail capacity.
pub const MAX_CAPACITY: usize = 10_000;

/// Decay, pruning and capacity tunables for a [`TrailBuffer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailConfig {
    /// Per-frame opacity multiplier, in `(0, 1)`.
    pub decay: f64,
    /// Points fainter than this are discarded.
    pub prune_epsilon: f64,
    /// Minimum movement before a new point is recorded.
    pub min_distance: f64,
    /// Hard cap on buffered points.
    pub capacity: usize,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            decay: 0.95,
            prune_epsilon: 0.01,
            min_distance: 3.0,
            capacity: 50,
        }
    }
}

impl TrailConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.decay > 0.0 && self.decay < 1.0) {
            return Err(ConfigError::Decay(self.decay));
        }
        if !(self.prune_epsilon > 0.0 && self.prune_epsilon < 1.0) {
            return Err(ConfigError::PruneEpsilon(self.prune_epsilon));
        }
        if !(self.min_distance.is_finite() && self.min_distance >= 0.0) {
            return Err(ConfigError::MinDistance(self.min_distance));
        }
        if !(1..=MAX_CAPACITY).contains(&self.capacity) {
            return Err(ConfigError::Capacity {
                got: self.capacity,
                max: MAX_CAPACITY,
            });
        }
        Ok(())
    }
}

/// One decaying sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub x: f64,
    pub y: f64,
    /// Always within `[0, 1]`.
    pub opacity: f64,
}

impl TrailPoint {
    pub fn fresh(p: Point) -> Self {
        Self {
            x: p.x,
            y: p.y,
            opacity: 1.0,
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Insertion-ordered trail owned by a single engine.
#[derive(Debug, Clone)]
pub struct TrailBuffer {
    config: TrailConfig,
    points: Vec<TrailPoint>,
}

impl TrailBuffer {
    pub fn new(config: TrailConfig) -> Self {
        Self {
            config,
            points: Vec::new(),
        }
    }

    /// Run one frame: decay, prune, append, truncate.
    pub fn advance(&mut self, pointer: &PointerState) {
        let decay = self.config.decay;
        let epsilon = self.config.prune_epsilon;
        for p in &mut self.points {
            p.opacity = (p.opacity * decay).clamp(0.0, 1.0);
        }
        self.points.retain(|p| p.opacity >= epsilon);

        if let Some(pos) = pointer.position {
            self.record(pos);
        }
    }

    /// Append `pos` at full opacity if it is farther than the distance
    /// threshold from the newest point, then enforce the capacity.
    pub fn record(&mut self, pos: Point) -> bool {
        let far_enough = match self.points.last() {
            Some(last) => last.point().distance(pos) > self.config.min_distance,
            None => true,
        };
        if far_enough {
            self.points.push(TrailPoint::fresh(pos));
        }
        self.truncate();
        far_enough
    }

    fn truncate(&mut self) {
        let cap = self.config.capacity;
        if self.points.len() > cap {
            let excess = self.points.len() - cap;
            self.points.drain(..excess);
        }
    }

    pub fn points(&self) -> &[TrailPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn config(&self) -> &TrailConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f64, y: f64) -> PointerState {
        PointerState {
            position: Some(Point::new(x, y)),
            active: true,
        }
    }

    #[test]
    fn empty_pointer_leaves_buffer_empty() {
        let mut buf = TrailBuffer::new(TrailConfig::default());
        for _ in 0..5 {
            buf.advance(&PointerState::default());
        }
        assert!(buf.is_empty());
    }

    #[test]
    fn length_never_exceeds_capacity() {
        let cfg = TrailConfig {
            decay: 0.999,
            capacity: 30,
            ..TrailConfig::default()
        };
        let mut buf = TrailBuffer::new(cfg);
        for k in 0..500 {
            buf.advance(&at(k as f64 * 10.0, 0.0));
            assert!(buf.len() <= 30, "frame {k}: len {}", buf.len());
        }
        assert_eq!(buf.len(), 30);
        // The newest samples survive eviction.
        assert_eq!(buf.points().last().map(|p| p.x), Some(4990.0));
    }

    #[test]
    fn close_samples_do_not_grow_the_trail() {
        let mut buf = TrailBuffer::new(TrailConfig::default());
        assert!(buf.record(Point::new(0.0, 0.0)));
        assert!(!buf.record(Point::new(2.0, 2.0))); // ~2.83 < 3
        assert_eq!(buf.len(), 1);
        assert!(buf.record(Point::new(3.0, 3.0)));
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn exactly_threshold_distance_is_not_enough() {
        let mut buf = TrailBuffer::new(TrailConfig::default());
        buf.record(Point::new(0.0, 0.0));
        assert!(!buf.record(Point::new(3.0, 0.0)));
    }

    #[test]
    fn opacity_is_non_increasing_and_bounded() {
        let mut buf = TrailBuffer::new(TrailConfig::default());
        buf.advance(&at(0.0, 0.0));
        buf.advance(&at(10.0, 0.0));
        // No position: nothing re-seeds the trail once it fades out.
        let idle = PointerState::default();

        let mut prev: Vec<f64> = buf.points().iter().map(|p| p.opacity).collect();
        for _ in 0..200 {
            buf.advance(&idle);
            let now: Vec<f64> = buf.points().iter().map(|p| p.opacity).collect();
            for (a, b) in now.iter().zip(prev.iter().skip(prev.len() - now.len())) {
                assert!(a <= b);
                assert!((0.0..=1.0).contains(a));
            }
            prev = now;
        }
        assert!(buf.is_empty());
    }

    #[test]
    fn decay_then_prune_end_to_end() {
        let cfg = TrailConfig {
            decay: 0.9,
            prune_epsilon: 0.02,
            ..TrailConfig::default()
        };
        let mut buf = TrailBuffer::new(cfg);
        for i in 0..5 {
            assert!(buf.record(Point::new(i as f64 * 10.0, 0.0)));
        }
        let rest = at(40.0, 0.0);

        for _ in 0..10 {
            buf.advance(&rest);
        }
        assert_eq!(buf.len(), 5);
        for p in buf.points() {
            assert!((p.opacity - 0.9f64.powi(10)).abs() < 1e-12);
            assert!((p.opacity - 0.349).abs() < 1e-3);
        }

        // 0.9^37 ≈ 0.0203 survives, 0.9^38 ≈ 0.0183 does not.
        for _ in 10..37 {
            buf.advance(&rest);
        }
        assert_eq!(buf.len(), 5);
        buf.advance(&rest);
        // Everything faded out; the idle pointer re-seeds a single point.
        assert_eq!(buf.len(), 1);
        assert_eq!(buf.points()[0].opacity, 1.0);
    }

    #[test]
    fn config_validation_rejects_out_of_range() {
        assert!(TrailConfig::default().validate().is_ok());
        let bad = TrailConfig {
            decay: 1.0,
            ..TrailConfig::default()
        };
        assert_eq!(bad.validate(), Err(ConfigError::Decay(1.0)));
        let bad = TrailConfig {
            capacity: 0,
            ..TrailConfig::default()
        };
        assert_eq!(
            bad.validate(),
            Err(ConfigError::Capacity {
                got: 0,
                max: MAX_CAPACITY
            })
        );
    }

    #[test]
    fn oversized_capacity_is_rejected_before_allocating() {
        let bad = TrailConfig {
            capacity: usize::MAX,
            ..TrailConfig::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::Capacity { .. })));
        let max = TrailConfig {
            capacity: MAX_CAPACITY,
            ..TrailConfig::default()
        };
        assert!(max.validate().is_ok());
        // Construction never reserves up front, even for a large cap.
        assert!(TrailBuffer::new(max).is_empty());
    }
}
