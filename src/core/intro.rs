//! Opening typewriter sequence.
//!
//! Types a phrase one character at a time with human-ish timing, holds it,
//! fades it out, then reports completion.  Time is passed in by the caller;
//! the jitter source is injected so the timing can be reproduced.

use std::time::{Duration, Instant};

use rand::Rng;

pub const INTRO_TEXT: &str = "Believe in yourself.";
pub const CURSOR_BLINK: Duration = Duration::from_millis(530);

const HOLD_AFTER_TYPING: Duration = Duration::from_millis(600);
const PAUSE: Duration = Duration::from_millis(1200);
const FADE_OUT: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntroPhase {
    Typing,
    Pause,
    FadeOut,
    Done,
}

#[derive(Debug, Clone)]
pub struct IntroSequence {
    text: Vec<char>,
    typed: usize,
    phase: IntroPhase,
    started: Instant,
    /// When the current step (next character or phase change) is due.
    next_at: Instant,
    /// Start of the fade, for [`fade`](Self::fade).
    fade_started: Option<Instant>,
}

impl IntroSequence {
    pub fn new(text: &str, now: Instant, rng: &mut impl Rng) -> Self {
        let mut seq = Self {
            text: text.chars().collect(),
            typed: 0,
            phase: IntroPhase::Typing,
            started: now,
            next_at: now,
            fade_started: None,
        };
        seq.next_at = now + seq.step_delay(rng);
        seq
    }

    /// Advance to whatever is due at `now`.  Returns the current phase.
    pub fn tick(&mut self, now: Instant, rng: &mut impl Rng) -> IntroPhase {
        while self.phase != IntroPhase::Done && now >= self.next_at {
            let due = self.next_at;
            match self.phase {
                IntroPhase::Typing => {
                    if self.typed < self.text.len() {
                        self.typed += 1;
                        self.next_at = due + self.step_delay(rng);
                    } else {
                        self.phase = IntroPhase::Pause;
                        self.next_at = due + PAUSE;
                    }
                }
                IntroPhase::Pause => {
                    self.phase = IntroPhase::FadeOut;
                    self.fade_started = Some(due);
                    self.next_at = due + FADE_OUT;
                }
                IntroPhase::FadeOut => self.phase = IntroPhase::Done,
                IntroPhase::Done => {}
            }
        }
        self.phase
    }

    /// Jump straight to the end.
    pub fn skip(&mut self) {
        self.typed = self.text.len();
        self.phase = IntroPhase::Done;
    }

    /// Delay before the next character appears, or the hold once the text
    /// is complete.
    fn step_delay(&self, rng: &mut impl Rng) -> Duration {
        let Some(&next) = self.text.get(self.typed) else {
            return HOLD_AFTER_TYPING;
        };
        let prev = self.typed.checked_sub(1).and_then(|i| self.text.get(i));

        let mut ms = 80.0 + rng.gen_range(0.0..40.0);
        if prev.is_some_and(|c| matches!(*c, '.' | ',' | '!' | '?')) {
            ms = 300.0 + rng.gen_range(0.0..100.0);
        }
        if next != ' ' && next.is_uppercase() {
            ms += 50.0;
        }
        if next == ' ' {
            ms = 60.0;
        }
        Duration::from_secs_f64(ms / 1000.0)
    }

    pub fn phase(&self) -> IntroPhase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase == IntroPhase::Done
    }

    pub fn typed_text(&self) -> String {
        self.text[..self.typed].iter().collect()
    }

    pub fn typed_len(&self) -> usize {
        self.typed
    }

    /// Cursor visibility, toggling every [`CURSOR_BLINK`].
    pub fn cursor_visible(&self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_millis() / CURSOR_BLINK.as_millis()) % 2 == 0
    }

    /// Remaining opacity of the overlay, `1.0` until the fade starts.
    pub fn fade(&self, now: Instant) -> f64 {
        match (self.phase, self.fade_started) {
            (IntroPhase::Done, _) => 0.0,
            (IntroPhase::FadeOut, Some(at)) => {
                let t = now.saturating_duration_since(at).as_secs_f64() / FADE_OUT.as_secs_f64();
                (1.0 - t).clamp(0.0, 1.0)
            }
            _ => 1.0,
        }
    }
}
