//! Viewport-intersection reveal tracking.
//!
//! Every registered element is either `Hidden` or `Visible`.  It becomes
//! visible once enough of it overlaps the (margin-adjusted) viewport and
//! goes back to hidden when it leaves, so entrance animations replay on
//! every entry.

use std::collections::HashMap;
use std::hash::Hash;
use std::str::FromStr;

use kurbo::Rect;

use super::error::ConfigError;

/// Default share of an element that must be on screen.
pub const DEFAULT_THRESHOLD: f64 = 0.1;
/// Default margin: the viewport bottom is pulled up by 100.
pub const DEFAULT_ROOT_MARGIN: &str = "0px 0px -100px 0px";

/// Reveal state of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevealState {
    #[default]
    Hidden,
    Visible,
}

impl RevealState {
    pub fn is_visible(self) -> bool {
        self == RevealState::Visible
    }
}

/// CSS-style offsets applied to the viewport before intersecting.
/// Positive values grow the observed region, negative values shrink it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RootMargin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl RootMargin {
    /// Parse 1-4 lengths in CSS shorthand order.  Lengths are `px` or bare
    /// numbers.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let bad = || ConfigError::Margin(s.to_string());
        let values = s
            .split_whitespace()
            .map(|tok| {
                let num = tok.strip_suffix("px").unwrap_or(tok);
                num.parse::<f64>().ok().filter(|v| v.is_finite())
            })
            .collect::<Option<Vec<f64>>>()
            .ok_or_else(bad)?;

        let (top, right, bottom, left) = match values[..] {
            [all] => (all, all, all, all),
            [v, h] => (v, h, v, h),
            [t, h, b] => (t, h, b, h),
            [t, r, b, l] => (t, r, b, l),
            _ => return Err(bad()),
        };
        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }

    /// The observed region for `viewport`.
    pub fn apply(&self, viewport: Rect) -> Rect {
        Rect::new(
            viewport.x0 - self.left,
            viewport.y0 - self.top,
            viewport.x1 + self.right,
            viewport.y1 + self.bottom,
        )
    }
}

impl FromStr for RootMargin {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Threshold and margin shared by every tracked element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverOptions {
    pub threshold: f64,
    pub margin: RootMargin,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            margin: RootMargin {
                bottom: -100.0,
                ..RootMargin::default()
            },
        }
    }
}

impl ObserverOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::Threshold(self.threshold));
        }
        Ok(())
    }

    fn is_intersecting(&self, ratio: f64) -> bool {
        ratio > 0.0 && ratio >= self.threshold
    }
}

/// Share of `element` inside `root`, in `[0, 1]`.
///
/// A zero-area element counts as fully visible when it lies within the root
/// and invisible otherwise.
pub fn intersection_ratio(element: Rect, root: Rect) -> f64 {
    let element = element.abs();
    let root = root.abs();
    let area = element.area();
    if area <= 0.0 {
        let inside = element.x0 >= root.x0
            && element.x1 <= root.x1
            && element.y0 >= root.y0
            && element.y1 <= root.y1;
        return if inside { 1.0 } else { 0.0 };
    }
    let overlap = element.intersect(root);
    (overlap.area() / area).clamp(0.0, 1.0)
}

/// Reveal states for a set of registered elements.
#[derive(Debug, Clone)]
pub struct VisibilityTracker<K> {
    options: ObserverOptions,
    states: HashMap<K, RevealState>,
}

impl<K: Eq + Hash> VisibilityTracker<K> {
    pub fn new(options: ObserverOptions) -> Self {
        Self {
            options,
            states: HashMap::new(),
        }
    }

    /// Start observing `key`.  Returns `false` if it was already registered.
    pub fn register(&mut self, key: K) -> bool {
        if self.states.contains_key(&key) {
            return false;
        }
        self.states.insert(key, RevealState::Hidden);
        true
    }

    /// Stop observing `key`.
    pub fn deregister(&mut self, key: &K) -> bool {
        self.states.remove(key).is_some()
    }

    /// Stop observing every key `keep` rejects.  Kept keys retain their
    /// state.
    pub fn retain(&mut self, mut keep: impl FnMut(&K) -> bool) {
        self.states.retain(|key, _| keep(key));
    }

    /// Drop every observation.  Idempotent.
    pub fn clear(&mut self) {
        self.states.clear();
    }

    /// Feed the current geometry of `key`.  Returns the new state when it
    /// changed.
    pub fn observe(&mut self, key: &K, element: Rect, viewport: Rect) -> Option<RevealState> {
        let root = self.options.margin.apply(viewport);
        self.observe_ratio(key, intersection_ratio(element, root))
    }

    /// Feed a precomputed intersection ratio for `key`.
    pub fn observe_ratio(&mut self, key: &K, ratio: f64) -> Option<RevealState> {
        let next = if self.options.is_intersecting(ratio) {
            RevealState::Visible
        } else {
            RevealState::Hidden
        };
        let state = self.states.get_mut(key)?;
        if *state == next {
            return None;
        }
        *state = next;
        Some(next)
    }

    pub fn state(&self, key: &K) -> Option<RevealState> {
        self.states.get(key).copied()
    }

    /// `false` for unknown keys.
    pub fn is_visible(&self, key: &K) -> bool {
        self.state(key).is_some_and(RevealState::is_visible)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn options(&self) -> &ObserverOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> VisibilityTracker<&'static str> {
        VisibilityTracker::new(ObserverOptions::default())
    }

    #[test]
    fn reveal_is_re_entrant() {
        let mut t = tracker();
        t.register("card");
        let mut seq = vec![t.state(&"card").unwrap()];
        for ratio in [0.5, 0.02, 0.6] {
            if let Some(s) = t.observe_ratio(&"card", ratio) {
                seq.push(s);
            }
        }
        assert_eq!(
            seq,
            vec![
                RevealState::Hidden,
                RevealState::Visible,
                RevealState::Hidden,
                RevealState::Visible
            ]
        );
    }

    #[test]
    fn repeated_observations_report_no_transition() {
        let mut t = tracker();
        t.register("a");
        assert_eq!(t.observe_ratio(&"a", 0.3), Some(RevealState::Visible));
        assert_eq!(t.observe_ratio(&"a", 0.9), None);
        assert!(t.is_visible(&"a"));
    }

    #[test]
    fn unregistered_keys_are_ignored() {
        let mut t = tracker();
        assert_eq!(t.observe_ratio(&"ghost", 1.0), None);
        assert!(!t.is_visible(&"ghost"));
        t.register("a");
        t.observe_ratio(&"a", 1.0);
        assert!(t.deregister(&"a"));
        assert!(!t.deregister(&"a"));
        assert!(!t.is_visible(&"a"));
    }

    #[test]
    fn retain_keeps_surviving_states() {
        let mut t = tracker();
        t.register("a");
        t.register("b");
        t.observe_ratio(&"a", 1.0);
        t.retain(|k| *k == "a");
        assert_eq!(t.len(), 1);
        assert!(t.is_visible(&"a"));
        assert!(!t.register("a"));
        assert!(t.is_visible(&"a"));
    }

    #[test]
    fn margin_shrinks_viewport_bottom() {
        let mut t = tracker();
        t.register("a");
        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
        // Fully inside the raw viewport but inside the trimmed 100px strip.
        let element = Rect::new(0.0, 520.0, 100.0, 580.0);
        assert_eq!(t.observe(&"a", element, viewport), None);
        let element = Rect::new(0.0, 400.0, 100.0, 480.0);
        assert_eq!(t.observe(&"a", element, viewport), Some(RevealState::Visible));
    }

    #[test]
    fn ratio_counts_the_overlapping_share() {
        let root = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(intersection_ratio(Rect::new(0.0, 50.0, 100.0, 150.0), root), 0.5);
        assert_eq!(intersection_ratio(Rect::new(0.0, 200.0, 10.0, 210.0), root), 0.0);
        assert_eq!(intersection_ratio(Rect::new(10.0, 10.0, 10.0, 10.0), root), 1.0);
    }

    #[test]
    fn root_margin_shorthand() {
        let m = RootMargin::parse(DEFAULT_ROOT_MARGIN).unwrap();
        assert_eq!(m, ObserverOptions::default().margin);
        let m: RootMargin = "10px 20".parse().unwrap();
        assert_eq!((m.top, m.right, m.bottom, m.left), (10.0, 20.0, 10.0, 20.0));
        let m = RootMargin::parse("1 2 3").unwrap();
        assert_eq!((m.top, m.right, m.bottom, m.left), (1.0, 2.0, 3.0, 2.0));
        assert!(RootMargin::parse("").is_err());
        assert!(RootMargin::parse("1 2 3 4 5").is_err());
        assert!(RootMargin::parse("10em").is_err());
    }

    #[test]
    fn zero_threshold_still_needs_overlap() {
        let mut t = VisibilityTracker::new(ObserverOptions {
            threshold: 0.0,
            ..ObserverOptions::default()
        });
        t.register(1);
        assert_eq!(t.observe_ratio(&1, 0.0), None);
        assert_eq!(t.observe_ratio(&1, 0.01), Some(RevealState::Visible));
    }
}
