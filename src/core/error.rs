//! Typed errors for engine configuration.
//!
//! The engine itself has no fatal paths; the only thing that can be wrong is
//! a tunable outside its meaningful range.

/// A rejected engine tunable.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// `decay` must lie strictly between 0 and 1.
    #[error("decay factor must be in (0, 1), got {0}")]
    Decay(f64),

    /// `prune_epsilon` must lie strictly between 0 and 1.
    #[error("prune epsilon must be in (0, 1), got {0}")]
    PruneEpsilon(f64),

    /// `min_distance` must be a finite non-negative length.
    #[error("distance threshold must be >= 0, got {0}")]
    MinDistance(f64),

    /// The trail needs room for at least one point, and a bounded number.
    #[error("trail capacity must be in 1..={max}, got {got}")]
    Capacity { got: usize, max: usize },

    /// Sampling intervals must be positive.
    #[error("{what} must be positive")]
    Rate { what: &'static str },

    /// Target frame rate outside the supported range.
    #[error("target frame rate must be in [{min}, {max}], got {got}")]
    FrameRate { got: f64, min: f64, max: f64 },

    /// Intersection threshold is a ratio.
    #[error("intersection threshold must be in [0, 1], got {0}")]
    Threshold(f64),

    /// Root margin did not parse as 1-4 CSS lengths.
    #[error("invalid root margin {0:?}")]
    Margin(String),

    /// Viewport cutoff must be a finite non-negative width.
    #[error("mobile cutoff must be >= 0, got {0}")]
    Cutoff(f64),
}
