//! Self-throttling frame loop over an injectable refresh signal.
//!
//! The host owns the actual periodic signal (a display refresh, a timer
//! task, a test harness stepping by hand).  The scheduler subscribes to it on
//! [`start`](FrameScheduler::start), revokes the subscription on
//! [`stop`](FrameScheduler::stop) or drop, and decides for every delivered
//! refresh whether enough time has passed to run a frame.

use std::time::{Duration, Instant};

use tracing::debug;

/// Default frame rate the scheduler throttles down to.
pub const DEFAULT_TARGET_FPS: f64 = 30.0;
/// Slowest accepted frame rate.
pub const MIN_TARGET_FPS: f64 = 1.0;
/// Fastest accepted frame rate.
pub const MAX_TARGET_FPS: f64 = 240.0;

/// A periodic-tick source the scheduler can subscribe to and revoke.
pub trait RefreshSignal {
    /// Token for one live subscription.
    type Handle;

    /// Begin delivering refresh notifications to the owner.
    fn subscribe(&mut self) -> Self::Handle;

    /// Stop delivering notifications for `handle`.
    fn revoke(&mut self, handle: Self::Handle);
}

/// Throttled frame gate bound to one [`RefreshSignal`].
pub struct FrameScheduler<R: RefreshSignal> {
    signal: R,
    handle: Option<R::Handle>,
    interval: Duration,
    last_frame: Option<Instant>,
}

impl<R: RefreshSignal> FrameScheduler<R> {
    pub fn new(signal: R, target_fps: f64) -> Self {
        Self {
            signal,
            handle: None,
            interval: frame_interval(target_fps),
            last_frame: None,
        }
    }

    /// Subscribe to the refresh signal.  No-op when already running.
    pub fn start(&mut self) {
        if self.handle.is_none() {
            self.handle = Some(self.signal.subscribe());
            self.last_frame = None;
            debug!(interval = ?self.interval, "frame scheduler started");
        }
    }

    /// Revoke the pending subscription.  Safe to call any number of times,
    /// including before `start`.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.signal.revoke(handle);
            debug!("frame scheduler stopped");
        }
        self.last_frame = None;
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Decide whether the refresh delivered at `now` runs a frame.
    ///
    /// Early refreshes are skipped.  The overshoot past the interval is
    /// carried over so a 60 Hz signal settles into an even 30 Hz.
    pub fn accept(&mut self, now: Instant) -> bool {
        if self.handle.is_none() {
            return false;
        }
        let Some(last) = self.last_frame else {
            self.last_frame = Some(now);
            return true;
        };
        let elapsed = now.saturating_duration_since(last);
        if elapsed < self.interval {
            return false;
        }
        let overshoot = elapsed.as_nanos() % self.interval.as_nanos().max(1);
        self.last_frame = Some(now - Duration::from_nanos(overshoot as u64));
        true
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn signal(&self) -> &R {
        &self.signal
    }
}

impl<R: RefreshSignal> std::fmt::Debug for FrameScheduler<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("running", &self.is_running())
            .field("interval", &self.interval)
            .field("last_frame", &self.last_frame)
            .finish()
    }
}

impl<R: RefreshSignal> Drop for FrameScheduler<R> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Time between frames for `fps`, falling back to the default rate for
/// values outside the supported range.
pub fn frame_interval(fps: f64) -> Duration {
    let fps = if (MIN_TARGET_FPS..=MAX_TARGET_FPS).contains(&fps) {
        fps
    } else {
        DEFAULT_TARGET_FPS
    };
    Duration::try_from_secs_f64(1.0 / fps)
        .unwrap_or_else(|_| Duration::from_secs_f64(1.0 / DEFAULT_TARGET_FPS))
}

/// Hand-driven signal: records subscriptions so tests can check that every
/// subscription is eventually revoked.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ManualRefresh {
    next_id: u64,
    live: Vec<u64>,
    subscribed_total: u64,
}

#[cfg(test)]
impl ManualRefresh {
    pub fn live_subscriptions(&self) -> usize {
        self.live.len()
    }

    pub fn subscribed_total(&self) -> u64 {
        self.subscribed_total
    }
}

#[cfg(test)]
impl RefreshSignal for ManualRefresh {
    type Handle = u64;

    fn subscribe(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.subscribed_total += 1;
        self.live.push(id);
        id
    }

    fn revoke(&mut self, handle: u64) {
        self.live.retain(|&id| id != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFRESH: Duration = Duration::from_micros(16_667);

    #[test]
    fn stopped_scheduler_accepts_nothing() {
        let mut s = FrameScheduler::new(ManualRefresh::default(), 30.0);
        assert!(!s.accept(Instant::now()));
    }

    #[test]
    fn sixty_hertz_signal_is_halved() {
        let mut s = FrameScheduler::new(ManualRefresh::default(), 30.0);
        s.start();
        let t0 = Instant::now();
        let accepted = (0..60)
            .filter(|&i| s.accept(t0 + REFRESH * i))
            .count();
        assert_eq!(accepted, 30);
    }

    #[test]
    fn early_refreshes_are_skipped() {
        let mut s = FrameScheduler::new(ManualRefresh::default(), 30.0);
        s.start();
        let t0 = Instant::now();
        assert!(s.accept(t0));
        assert!(!s.accept(t0 + Duration::from_millis(10)));
        assert!(!s.accept(t0 + Duration::from_millis(33)));
        assert!(s.accept(t0 + Duration::from_millis(34)));
    }

    #[test]
    fn long_stall_yields_a_single_frame() {
        let mut s = FrameScheduler::new(ManualRefresh::default(), 30.0);
        s.start();
        let t0 = Instant::now();
        assert!(s.accept(t0));
        assert!(s.accept(t0 + Duration::from_secs(2)));
        assert!(!s.accept(t0 + Duration::from_secs(2) + Duration::from_millis(1)));
    }

    #[test]
    fn stop_revokes_and_is_idempotent() {
        let mut s = FrameScheduler::new(ManualRefresh::default(), 30.0);
        s.stop();
        s.start();
        s.start();
        assert_eq!(s.signal().live_subscriptions(), 1);
        assert_eq!(s.signal().subscribed_total(), 1);
        s.stop();
        s.stop();
        assert_eq!(s.signal().live_subscriptions(), 0);
        assert!(!s.accept(Instant::now()));
    }

    #[derive(Default)]
    struct Shared(std::rc::Rc<std::cell::Cell<i32>>);

    impl RefreshSignal for Shared {
        type Handle = ();
        fn subscribe(&mut self) {
            self.0.set(self.0.get() + 1);
        }
        fn revoke(&mut self, _: ()) {
            self.0.set(self.0.get() - 1);
        }
    }

    #[test]
    fn drop_releases_the_subscription() {
        let live = std::rc::Rc::new(std::cell::Cell::new(0));
        {
            let mut s = FrameScheduler::new(Shared(live.clone()), 30.0);
            s.start();
            assert_eq!(live.get(), 1);
        }
        assert_eq!(live.get(), 0);
    }

    #[test]
    fn bogus_rate_falls_back_to_default() {
        assert_eq!(frame_interval(0.0), frame_interval(DEFAULT_TARGET_FPS));
        assert_eq!(frame_interval(f64::NAN), frame_interval(DEFAULT_TARGET_FPS));
        assert_eq!(frame_interval(1e-30), frame_interval(DEFAULT_TARGET_FPS));
        assert_eq!(frame_interval(MIN_TARGET_FPS), Duration::from_secs(1));
    }
}
