//! Core engine – pointer trail, reveal tracking and scroll-driven parameters.
//!
//! Nothing in this module depends on any TUI or rendering crate.  Time is
//! always passed in as an [`Instant`](std::time::Instant) and periodic work
//! is driven through an injected [`scheduler::RefreshSignal`], so every piece
//! can be stepped by hand in tests.

pub mod device;
pub mod engine;
pub mod error;
pub mod hover;
pub mod intro;
pub mod pointer;
pub mod scheduler;
pub mod scroll;
pub mod smooth;
pub mod trail;
pub mod visibility;
