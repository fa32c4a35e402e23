//! The pointer-trail engine: sampler, buffer and scheduler behind one
//! start/stop lifecycle.
//!
//! Input callbacks only touch the sampler.  All rendering work happens on
//! refreshes the scheduler accepts, so a burst of pointer events can never
//! cause more than one frame per interval.

use std::time::{Duration, Instant};

use kurbo::Point;
use tracing::{debug, trace};

use super::device::{DeviceProfile, DEFAULT_MOBILE_CUTOFF};
use super::error::ConfigError;
use super::pointer::{PointerSampler, DEFAULT_SAMPLE_INTERVAL};
use super::scheduler::{
    FrameScheduler, RefreshSignal, DEFAULT_TARGET_FPS, MAX_TARGET_FPS, MIN_TARGET_FPS,
};
use super::smooth::{smooth, BandStyle, TrailCurve, BANDS};
use super::trail::{TrailBuffer, TrailConfig};
use super::visibility::ObserverOptions;

/// Every engine tunable in one place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub sample_interval: Duration,
    pub target_fps: f64,
    pub trail: TrailConfig,
    pub observer: ObserverOptions,
    pub mobile_cutoff: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            target_fps: DEFAULT_TARGET_FPS,
            trail: TrailConfig::default(),
            observer: ObserverOptions::default(),
            mobile_cutoff: DEFAULT_MOBILE_CUTOFF,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.trail.validate()?;
        self.observer.validate()?;
        if self.sample_interval.is_zero() {
            return Err(ConfigError::Rate {
                what: "sample interval",
            });
        }
        if !(MIN_TARGET_FPS..=MAX_TARGET_FPS).contains(&self.target_fps) {
            return Err(ConfigError::FrameRate {
                got: self.target_fps,
                min: MIN_TARGET_FPS,
                max: MAX_TARGET_FPS,
            });
        }
        if !(self.mobile_cutoff.is_finite() && self.mobile_cutoff >= 0.0) {
            return Err(ConfigError::Cutoff(self.mobile_cutoff));
        }
        Ok(())
    }
}

/// What one accepted frame publishes.
#[derive(Debug, Clone, PartialEq)]
pub struct TrailFrame {
    pub curve: TrailCurve,
    pub bands: [BandStyle; 3],
    /// Live points in the buffer after this frame.
    pub points: usize,
    /// Whether the pointer is over the surface; hosts fade the overlay out
    /// while it is not.
    pub pointer_active: bool,
}

/// Render target for published frames.
pub trait TrailSurface {
    fn present(&mut self, frame: &TrailFrame);
}

/// Lifecycle of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    /// The device gate disabled the trail for this session.
    Inert,
    Stopped,
    Running,
}

pub struct TrailEngine<R: RefreshSignal> {
    inert: bool,
    sampler: PointerSampler,
    buffer: TrailBuffer,
    scheduler: FrameScheduler<R>,
    frames: u64,
}

impl<R: RefreshSignal> TrailEngine<R> {
    /// Build an engine.  The device gate is decided here, once.
    pub fn new(config: &EngineConfig, profile: DeviceProfile, signal: R) -> Self {
        let inert = profile.is_constrained(config.mobile_cutoff);
        debug!(
            class = %profile.class,
            width = profile.viewport_width,
            inert,
            "trail engine created"
        );
        Self {
            inert,
            sampler: PointerSampler::new(config.sample_interval),
            buffer: TrailBuffer::new(config.trail),
            scheduler: FrameScheduler::new(signal, config.target_fps),
            frames: 0,
        }
    }

    /// Attach the pointer listener and start the frame loop.  Does nothing
    /// on an inert engine.
    pub fn start(&mut self) -> EngineStatus {
        if !self.inert {
            self.sampler.attach();
            self.scheduler.start();
        }
        self.status()
    }

    /// Detach, cancel the pending frame and drop the trail.  Idempotent,
    /// and safe on an engine that never started.
    pub fn stop(&mut self) {
        self.sampler.detach();
        self.scheduler.stop();
        self.buffer.clear();
    }

    pub fn status(&self) -> EngineStatus {
        if self.inert {
            EngineStatus::Inert
        } else if self.scheduler.is_running() {
            EngineStatus::Running
        } else {
            EngineStatus::Stopped
        }
    }

    pub fn pointer_move(&mut self, now: Instant, position: Point) -> bool {
        self.sampler.on_move(now, position)
    }

    pub fn pointer_enter(&mut self) {
        self.sampler.on_enter();
    }

    pub fn pointer_leave(&mut self) {
        self.sampler.on_leave();
    }

    /// Handle one refresh of the host signal.
    ///
    /// Returns the published frame when the scheduler accepted the refresh.
    /// With no surface mounted the frame is still computed but nothing is
    /// presented.
    pub fn on_refresh<S>(&mut self, now: Instant, surface: Option<&mut S>) -> Option<TrailFrame>
    where
        S: TrailSurface + ?Sized,
    {
        if !self.scheduler.accept(now) {
            return None;
        }
        self.buffer.advance(self.sampler.state());
        let frame = TrailFrame {
            curve: smooth(self.buffer.points()),
            bands: BANDS,
            points: self.buffer.len(),
            pointer_active: self.sampler.state().active,
        };
        self.frames += 1;
        trace!(
            frame = self.frames,
            points = frame.points,
            path = %frame.curve.to_svg(),
            "trail frame"
        );
        match surface {
            Some(surface) => surface.present(&frame),
            None => debug!(frame = self.frames, "no trail surface mounted, skipping render"),
        }
        Some(frame)
    }

    pub fn buffer(&self) -> &TrailBuffer {
        &self.buffer
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn scheduler(&self) -> &FrameScheduler<R> {
        &self.scheduler
    }
}

impl<R: RefreshSignal> std::fmt::Debug for TrailEngine<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrailEngine")
            .field("status", &self.status())
            .field("points", &self.buffer.len())
            .field("frames", &self.frames)
            .finish()
    }
}

impl<R: RefreshSignal> Drop for TrailEngine<R> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::device::DeviceClass;
    use crate::core::scheduler::ManualRefresh;

    const DESKTOP: DeviceProfile = DeviceProfile {
        class: DeviceClass::Desktop,
        viewport_width: 1440.0,
    };

    #[derive(Default)]
    struct Recorder {
        frames: Vec<TrailFrame>,
    }

    impl TrailSurface for Recorder {
        fn present(&mut self, frame: &TrailFrame) {
            self.frames.push(frame.clone());
        }
    }

    fn engine(config: EngineConfig) -> TrailEngine<ManualRefresh> {
        TrailEngine::new(&config, DESKTOP, ManualRefresh::default())
    }

    /// Refresh times 34ms apart, so every one of them is accepted at 30 fps.
    fn frame_time(t0: Instant, k: u32) -> Instant {
        t0 + Duration::from_millis(34) * k
    }

    #[test]
    fn gated_engine_never_starts() {
        let profile = DeviceProfile {
            class: DeviceClass::Mobile,
            viewport_width: 390.0,
        };
        let mut e = TrailEngine::new(&EngineConfig::default(), profile, ManualRefresh::default());
        assert_eq!(e.start(), EngineStatus::Inert);
        assert_eq!(e.scheduler().signal().subscribed_total(), 0);

        let t0 = Instant::now();
        assert!(!e.pointer_move(t0, Point::new(10.0, 10.0)));
        let mut surface = Recorder::default();
        assert!(e.on_refresh(t0, Some(&mut surface)).is_none());
        assert!(surface.frames.is_empty());
        e.stop();
        e.stop();
    }

    #[test]
    fn no_samples_means_empty_curve() {
        let mut e = engine(EngineConfig::default());
        e.start();
        let mut surface = Recorder::default();
        let frame = e.on_refresh(Instant::now(), Some(&mut surface)).unwrap();
        assert!(frame.curve.is_empty());
        assert_eq!(frame.points, 0);
        assert_eq!(surface.frames.len(), 1);
    }

    #[test]
    fn missing_surface_skips_render_without_error() {
        let mut e = engine(EngineConfig::default());
        e.start();
        let t0 = Instant::now();
        e.pointer_move(t0, Point::new(5.0, 5.0));
        let frame = e.on_refresh::<Recorder>(t0, None).unwrap();
        assert_eq!(frame.points, 1);
    }

    #[test]
    fn bursts_collapse_into_one_frame() {
        let mut e = engine(EngineConfig::default());
        e.start();
        let t0 = Instant::now();
        let mut surface = Recorder::default();
        e.on_refresh(t0, Some(&mut surface));
        for i in 0..16u32 {
            e.pointer_move(t0 + Duration::from_millis(i.into()), Point::new(i as f64 * 50.0, 0.0));
            e.on_refresh(t0 + Duration::from_millis(i.into()), Some(&mut surface));
        }
        // Only the first sample got through the 16ms throttle, and no second
        // frame was due within 33ms.
        assert_eq!(surface.frames.len(), 1);
        e.on_refresh(t0 + Duration::from_millis(34), Some(&mut surface));
        assert_eq!(surface.frames.len(), 2);
        assert_eq!(e.buffer().len(), 1);
    }

    #[test]
    fn trail_decays_end_to_end() {
        let config = EngineConfig {
            trail: TrailConfig {
                decay: 0.9,
                prune_epsilon: 0.02,
                ..TrailConfig::default()
            },
            ..EngineConfig::default()
        };
        let mut e = engine(config);
        e.start();
        let t0 = Instant::now();
        let mut surface = Recorder::default();

        let mut k = 0;
        for i in 0..5 {
            let now = frame_time(t0, k);
            assert!(e.pointer_move(now, Point::new(i as f64 * 10.0, 0.0)));
            assert!(e.on_refresh(now, Some(&mut surface)).is_some());
            k += 1;
        }
        assert_eq!(e.buffer().len(), 5);
        let frame = surface.frames.last().unwrap();
        assert_eq!(frame.curve.start(), Some(Point::new(0.0, 0.0)));
        assert_eq!(frame.curve.end(), Some(Point::new(40.0, 0.0)));

        for _ in 0..10 {
            e.on_refresh(frame_time(t0, k), Some(&mut surface));
            k += 1;
        }
        // The newest point is 10 frames old, the oldest 14.
        let opacities: Vec<f64> = e.buffer().points().iter().map(|p| p.opacity).collect();
        assert!((opacities[4] - 0.9f64.powi(10)).abs() < 1e-12);
        assert!((opacities[0] - 0.9f64.powi(14)).abs() < 1e-12);
        assert_eq!(opacities.len(), 5);
    }

    #[test]
    fn stop_is_idempotent_and_releases_everything() {
        let mut e = engine(EngineConfig::default());
        e.stop();
        assert_eq!(e.start(), EngineStatus::Running);
        let t0 = Instant::now();
        e.pointer_move(t0, Point::new(1.0, 1.0));
        e.on_refresh::<Recorder>(t0, None);
        e.stop();
        e.stop();
        assert_eq!(e.status(), EngineStatus::Stopped);
        assert_eq!(e.scheduler().signal().live_subscriptions(), 0);
        assert!(e.buffer().is_empty());
        assert!(e.on_refresh::<Recorder>(frame_time(t0, 1), None).is_none());
    }

    #[test]
    fn leaving_marks_frames_inactive() {
        let mut e = engine(EngineConfig::default());
        e.start();
        let t0 = Instant::now();
        e.pointer_move(t0, Point::new(1.0, 1.0));
        e.pointer_leave();
        let frame = e.on_refresh::<Recorder>(t0, None).unwrap();
        assert!(!frame.pointer_active);
        e.pointer_enter();
        let frame = e.on_refresh::<Recorder>(frame_time(t0, 1), None).unwrap();
        assert!(frame.pointer_active);
    }

    #[test]
    fn config_validation_covers_rates_and_cutoff() {
        assert!(EngineConfig::default().validate().is_ok());
        let bad = EngineConfig {
            target_fps: 0.0,
            ..EngineConfig::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::FrameRate { .. })));
        let bad = EngineConfig {
            target_fps: 1e-30,
            ..EngineConfig::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::FrameRate { .. })));
        let bad = EngineConfig {
            sample_interval: Duration::ZERO,
            ..EngineConfig::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::Rate { .. })));
        let bad = EngineConfig {
            mobile_cutoff: -1.0,
            ..EngineConfig::default()
        };
        assert_eq!(bad.validate(), Err(ConfigError::Cutoff(-1.0)));
    }
}
