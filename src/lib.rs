//! Pointer-trail, scroll-progress and reveal animation engine.
//!
//! [`core`] is the engine itself and has no terminal dependency.  [`app`]
//! and [`ui`] are the terminal host that drives it from crossterm events
//! and draws with ratatui; [`config`] holds the user settings both share.

pub mod app;
pub mod config;
pub mod core;
pub mod ui;
