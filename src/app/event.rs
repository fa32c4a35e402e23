//! Terminal event abstraction.
//!
//! Wraps crossterm events into a simpler enum and runs a background reader
//! that forwards them over a channel so the main loop stays non-blocking.
//! Two timers also feed the channel: an always-on page tick that animates
//! the page, and the display-refresh signal the trail's frame scheduler
//! subscribes to while the trail runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::core::scheduler::RefreshSignal;

/// High-level events consumed by the application.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    /// Pointer (terminal focus) entered the surface.
    FocusGained,
    /// Pointer (terminal focus) left the surface.
    FocusLost,
    /// Page animation tick; always running.
    Tick(Instant),
    /// One tick of the trail's display-refresh signal.
    Refresh(Instant),
}

/// Owns the background reader; dropping it stops the reader.
pub struct EventReader {
    stop: Arc<AtomicBool>,
}

impl Drop for EventReader {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

/// Spawns a blocking task that polls the terminal for events and sends
/// them through `tx`.
pub fn spawn_event_reader(tx: mpsc::UnboundedSender<AppEvent>, poll: Duration) -> EventReader {
    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();

    tokio::task::spawn_blocking(move || {
        while !flag.load(Ordering::Relaxed) {
            // Poll with a timeout so the stop flag is noticed promptly.
            if !event::poll(poll).unwrap_or(false) {
                continue;
            }
            let Ok(ev) = event::read() else {
                continue;
            };
            let app_event = match ev {
                CtEvent::Key(k) => AppEvent::Key(k),
                CtEvent::Mouse(m) => AppEvent::Mouse(m),
                CtEvent::Resize(w, h) => AppEvent::Resize(w, h),
                CtEvent::FocusGained => AppEvent::FocusGained,
                CtEvent::FocusLost => AppEvent::FocusLost,
                _ => continue,
            };
            if tx.send(app_event).is_err() {
                break; // receiver dropped
            }
        }
    });

    EventReader { stop }
}

/// Owns the page ticker task; dropping it stops the ticks.
pub struct PageTicker {
    handle: JoinHandle<()>,
}

impl Drop for PageTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawns the page tick: sends [`AppEvent::Tick`] every `period` regardless
/// of whether the trail is running.
pub fn spawn_page_ticker(tx: mpsc::UnboundedSender<AppEvent>, period: Duration) -> PageTicker {
    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            let tick = interval.tick().await;
            if tx.send(AppEvent::Tick(tick.into_std())).is_err() {
                break; // receiver dropped
            }
        }
    });
    PageTicker { handle }
}

/// Display-refresh signal backed by a tokio interval task.
///
/// Each subscription spawns one task that sends [`AppEvent::Refresh`] every
/// `period`; revoking aborts it.
pub struct TokioRefresh {
    tx: mpsc::UnboundedSender<AppEvent>,
    period: Duration,
}

impl TokioRefresh {
    pub fn new(tx: mpsc::UnboundedSender<AppEvent>, period: Duration) -> Self {
        Self { tx, period }
    }
}

impl RefreshSignal for TokioRefresh {
    type Handle = JoinHandle<()>;

    fn subscribe(&mut self) -> JoinHandle<()> {
        let tx = self.tx.clone();
        let period = self.period;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                let tick = interval.tick().await;
                if tx.send(AppEvent::Refresh(tick.into_std())).is_err() {
                    break;
                }
            }
        })
    }

    fn revoke(&mut self, handle: JoinHandle<()>) {
        handle.abort();
    }
}
